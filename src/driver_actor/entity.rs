//! [`ActorEntity`] implementation for [`Driver`].

use super::actions::{DriverAction, DriverActionResult};
use super::error::DriverError;
use crate::model::{normalize_email, Driver, DriverCreate, DriverId, DriverStatus, DriverUpdate};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use std::collections::BTreeSet;

impl Driver {
    fn sync_status(&mut self) {
        self.status = if self.active_orders.is_empty() {
            DriverStatus::Idle
        } else {
            DriverStatus::Occupied
        };
    }
}

#[async_trait]
impl ActorEntity for Driver {
    type Id = DriverId;
    type Create = DriverCreate;
    type Update = DriverUpdate;
    type Action = DriverAction;
    type ActionResult = DriverActionResult;
    type Context = ();
    type Error = DriverError;

    fn from_create_params(id: DriverId, params: DriverCreate) -> Result<Self, Self::Error> {
        let name = params.name.trim().to_string();
        if name.is_empty() {
            return Err(DriverError::Validation("name must not be empty".into()));
        }
        let email = normalize_email(&params.email);
        if !email.contains('@') {
            return Err(DriverError::Validation(format!(
                "invalid email: {}",
                params.email
            )));
        }
        Ok(Self {
            id,
            name,
            email,
            status: DriverStatus::Idle,
            location: None,
            active_orders: BTreeSet::new(),
        })
    }

    async fn on_update(&mut self, update: DriverUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DriverError::Validation("name must not be empty".into()));
            }
            self.name = name.to_string();
        }
        Ok(())
    }

    async fn on_delete(&self, _ctx: &()) -> Result<(), Self::Error> {
        if self.active_orders.is_empty() {
            return Ok(());
        }
        let orders: Vec<String> = self.active_orders.iter().map(ToString::to_string).collect();
        Err(DriverError::Conflict(format!(
            "{} is still bound to {}",
            self.id,
            orders.join(", ")
        )))
    }

    async fn handle_action(
        &mut self,
        action: DriverAction,
        _ctx: &(),
    ) -> Result<DriverActionResult, Self::Error> {
        match action {
            DriverAction::Engage(order_id) => {
                self.active_orders.insert(order_id);
                self.sync_status();
                Ok(DriverActionResult::Engage(self.clone()))
            }
            DriverAction::Release(order_id) => {
                self.active_orders.remove(&order_id);
                self.sync_status();
                Ok(DriverActionResult::Release(self.clone()))
            }
            DriverAction::Locate(location) => {
                if !(-90.0..=90.0).contains(&location.lat)
                    || !(-180.0..=180.0).contains(&location.lng)
                {
                    return Err(DriverError::Validation(format!(
                        "coordinates out of range: {}, {}",
                        location.lat, location.lng
                    )));
                }
                let stale = self
                    .location
                    .is_some_and(|current| location.timestamp < current.timestamp);
                if !stale {
                    self.location = Some(location);
                }
                Ok(DriverActionResult::Locate {
                    applied: !stale,
                    active_orders: self.active_orders.iter().copied().collect(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Location, OrderId};
    use chrono::{Duration, TimeZone, Utc};

    fn driver() -> Driver {
        Driver::from_create_params(
            DriverId(1),
            DriverCreate {
                name: "Rui".into(),
                email: "Rui@Drive.test".into(),
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn status_follows_active_orders() {
        let mut d = driver();
        assert_eq!(d.email, "rui@drive.test");
        d.handle_action(DriverAction::Engage(OrderId(1)), &()).await.unwrap();
        d.handle_action(DriverAction::Engage(OrderId(2)), &()).await.unwrap();
        assert_eq!(d.status, DriverStatus::Occupied);

        d.handle_action(DriverAction::Release(OrderId(1)), &()).await.unwrap();
        assert_eq!(d.status, DriverStatus::Occupied);
        d.handle_action(DriverAction::Release(OrderId(2)), &()).await.unwrap();
        assert_eq!(d.status, DriverStatus::Idle);
    }

    #[tokio::test]
    async fn bound_drivers_cannot_be_removed() {
        let mut d = driver();
        d.handle_action(DriverAction::Engage(OrderId(5)), &()).await.unwrap();
        let err = d.on_delete(&()).await.unwrap_err();
        assert_eq!(err, DriverError::Conflict("driver_1 is still bound to order_5".into()));

        d.handle_action(DriverAction::Release(OrderId(5)), &()).await.unwrap();
        d.on_delete(&()).await.unwrap();
    }

    #[tokio::test]
    async fn stale_pings_are_ignored() {
        let mut d = driver();
        let t0 = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
        let fresh = Location {
            lat: 40.0,
            lng: -74.0,
            timestamp: t0,
        };
        let old = Location {
            lat: 41.0,
            lng: -75.0,
            timestamp: t0 - Duration::seconds(30),
        };

        d.handle_action(DriverAction::Locate(fresh), &()).await.unwrap();
        let result = d.handle_action(DriverAction::Locate(old), &()).await.unwrap();
        assert!(matches!(result, DriverActionResult::Locate { applied: false, .. }));
        assert_eq!(d.location, Some(fresh));
    }

    #[tokio::test]
    async fn out_of_range_pings_are_rejected() {
        let mut d = driver();
        let bad = Location {
            lat: 123.0,
            lng: 0.0,
            timestamp: Utc::now(),
        };
        assert!(d.handle_action(DriverAction::Locate(bad), &()).await.is_err());
    }
}
