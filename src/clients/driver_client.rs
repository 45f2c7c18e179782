use crate::driver_actor::{DriverAction, DriverActionResult, DriverError};
use crate::model::{normalize_email, Driver, DriverCreate, DriverId, DriverStatus, Location, OrderId};
use actor_framework::{ActorClient, Filter, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Client for the driver actor.
#[derive(Clone)]
pub struct DriverClient {
    inner: ResourceClient<Driver>,
}

fn map_framework(e: FrameworkError) -> DriverError {
    e.into_entity::<DriverError>().unwrap_or_else(|e| match e {
        FrameworkError::NotFound(id) => DriverError::NotFound(id),
        other => DriverError::Unavailable(other.to_string()),
    })
}

impl DriverClient {
    pub fn new(inner: ResourceClient<Driver>) -> Self {
        Self { inner }
    }

    /// Registers a driver. Emails are unique, compared after normalization.
    #[instrument(skip(self))]
    pub async fn register_driver(&self, params: DriverCreate) -> Result<Driver, DriverError> {
        debug!("Sending request");
        let email = normalize_email(&params.email);
        let wanted = email.clone();
        let taken = self
            .inner
            .find(Filter::new(move |driver: &Driver| driver.email == wanted))
            .await
            .map_err(map_framework)?;
        if !taken.is_empty() {
            return Err(DriverError::Conflict(format!("email already registered: {email}")));
        }

        let id = self.inner.create(params).await.map_err(map_framework)?;
        let driver = self
            .inner
            .get(id)
            .await
            .map_err(map_framework)?
            .ok_or_else(|| DriverError::NotFound(id.to_string()))?;
        info!(driver_id = %id, "Driver registered");
        Ok(driver)
    }

    /// Marks `driver_id` as working on `order_id`.
    #[instrument(skip(self))]
    pub async fn engage(&self, driver_id: DriverId, order_id: OrderId) -> Result<Driver, DriverError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(driver_id, DriverAction::Engage(order_id))
            .await
            .map_err(map_framework)?
        {
            DriverActionResult::Engage(driver) => Ok(driver),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn release(&self, driver_id: DriverId, order_id: OrderId) -> Result<Driver, DriverError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(driver_id, DriverAction::Release(order_id))
            .await
            .map_err(map_framework)?
        {
            DriverActionResult::Release(driver) => {
                if driver.status == DriverStatus::Idle {
                    info!(driver_id = %driver_id, "Driver idle");
                }
                Ok(driver)
            }
            other => Err(unexpected(other)),
        }
    }

    /// Stores a ping. Returns whether it was applied and the orders it concerns.
    #[instrument(skip(self))]
    pub async fn locate(
        &self,
        driver_id: DriverId,
        location: Location,
    ) -> Result<(bool, Vec<OrderId>), DriverError> {
        match self
            .inner
            .perform_action(driver_id, DriverAction::Locate(location))
            .await
            .map_err(map_framework)?
        {
            DriverActionResult::Locate {
                applied,
                active_orders,
            } => Ok((applied, active_orders)),
            other => Err(unexpected(other)),
        }
    }

    /// Idle drivers ordered by id.
    #[instrument(skip(self))]
    pub async fn idle_drivers(&self) -> Result<Vec<Driver>, DriverError> {
        let mut idle = self
            .inner
            .find(Filter::new(|driver: &Driver| driver.status == DriverStatus::Idle))
            .await
            .map_err(map_framework)?;
        idle.sort_by_key(|driver| driver.id);
        Ok(idle)
    }
}

fn unexpected(result: DriverActionResult) -> DriverError {
    DriverError::Unavailable(format!("unexpected driver action result: {result:?}"))
}

#[async_trait]
impl ActorClient<Driver> for DriverClient {
    type Error = DriverError;

    fn inner(&self) -> &ResourceClient<Driver> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        map_framework(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actor_framework::mock::MockClient;
    use std::collections::BTreeSet;

    fn rui() -> Driver {
        Driver {
            id: DriverId(4),
            name: "Rui".into(),
            email: "rui@drive.test".into(),
            status: DriverStatus::Idle,
            location: None,
            active_orders: BTreeSet::new(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let mut mock = MockClient::<Driver>::new();
        mock.expect_find().return_ok(vec![rui()]);
        let client = DriverClient::new(mock.client());

        let err = client
            .register_driver(DriverCreate {
                name: "Someone".into(),
                email: " RUI@drive.test".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DriverError::Conflict(_)));
        mock.verify();
    }

    #[tokio::test]
    async fn engaging_an_unknown_driver_is_not_found() {
        let mut mock = MockClient::<Driver>::new();
        mock.expect_action(DriverId(9))
            .return_err(FrameworkError::NotFound("driver_9".into()));
        let client = DriverClient::new(mock.client());

        let err = client.engage(DriverId(9), OrderId(1)).await.unwrap_err();
        assert_eq!(err, DriverError::NotFound("driver_9".into()));
    }
}
