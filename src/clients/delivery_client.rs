//! # Delivery Client
//!
//! Binds drivers to orders and relays their progress. The binding itself is checked and
//! written by the order actor; drivers are engaged and released from there.

use super::catalog_client::{CatalogLookup, LookupPolicy};
use super::driver_client::DriverClient;
use super::order_client::{map_framework, unexpected};
use crate::driver_actor::DriverError;
use crate::model::{Caller, Driver, DriverBinding, DriverId, Location, Order, OrderId};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError};
use actor_framework::{ActorClient, Filter, ResourceClient};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

#[derive(Clone)]
pub struct DeliveryClient {
    orders: ResourceClient<Order>,
    drivers: DriverClient,
    catalog: Arc<dyn CatalogLookup>,
    lookup: LookupPolicy,
}

impl DeliveryClient {
    pub fn new(
        orders: ResourceClient<Order>,
        drivers: DriverClient,
        catalog: Arc<dyn CatalogLookup>,
        lookup: LookupPolicy,
    ) -> Self {
        Self {
            orders,
            drivers,
            catalog,
            lookup,
        }
    }

    async fn act(&self, id: OrderId, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        self.orders
            .perform_action(id, action)
            .await
            .map_err(map_framework)
    }

    /// Binds `driver_id` to an ACCEPTED or READY order that has no driver yet.
    #[instrument(skip(self, caller), fields(user = %caller.user_id))]
    pub async fn assign_driver(
        &self,
        caller: &Caller,
        order_id: OrderId,
        driver_id: DriverId,
    ) -> Result<DriverBinding, OrderError> {
        debug!("Sending request");
        if self.drivers.get(driver_id).await?.is_none() {
            return Err(DriverError::NotFound(driver_id.to_string()).into());
        }
        let action = OrderAction::AssignDriver {
            driver_id,
            caller: caller.clone(),
        };
        match self.act(order_id, action).await? {
            OrderActionResult::AssignDriver(binding) => Ok(binding),
            other => Err(unexpected(other)),
        }
    }

    /// Binds the idle driver closest to the order's cafe. Drivers that never reported a
    /// location are not considered.
    #[instrument(skip(self, caller), fields(user = %caller.user_id))]
    pub async fn assign_nearest_driver(
        &self,
        caller: &Caller,
        order_id: OrderId,
    ) -> Result<DriverBinding, OrderError> {
        debug!("Sending request");
        let order = self
            .orders
            .get(order_id)
            .await
            .map_err(map_framework)?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;
        if !caller.manages(order.cafe_id) {
            return Err(OrderError::Unauthorized(format!(
                "{} may not assign drivers to {order_id}",
                caller.email
            )));
        }

        let catalog = self.catalog.as_ref();
        let cafe_id = order.cafe_id;
        let cafe = self
            .lookup
            .run(move || catalog.resolve_cafe(cafe_id))
            .await
            .map_err(|e| OrderError::Unavailable(e.to_string()))?
            .ok_or_else(|| OrderError::NotFound(cafe_id.to_string()))?;

        let nearest = self
            .drivers
            .idle_drivers()
            .await?
            .into_iter()
            .filter_map(|driver| {
                let at = driver.location?;
                Some((haversine_km(cafe.lat, cafe.lng, at.lat, at.lng), driver.id))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        let Some((distance_km, driver_id)) = nearest else {
            return Err(DriverError::NotFound("no idle drivers available".into()).into());
        };
        info!(%driver_id, distance_km, "Nearest idle driver selected");
        self.assign_driver(caller, order_id, driver_id).await
    }

    /// READY to PICKED_UP by the bound driver.
    #[instrument(skip(self))]
    pub async fn pickup(&self, driver_id: DriverId, order_id: OrderId) -> Result<Order, OrderError> {
        debug!("Sending request");
        match self.act(order_id, OrderAction::Pickup { driver_id }).await? {
            OrderActionResult::Pickup(order) => Ok(order),
            other => Err(unexpected(other)),
        }
    }

    /// PICKED_UP to DELIVERED by the bound driver. Frees the driver.
    #[instrument(skip(self))]
    pub async fn deliver(&self, driver_id: DriverId, order_id: OrderId) -> Result<Order, OrderError> {
        debug!("Sending request");
        match self.act(order_id, OrderAction::Deliver { driver_id }).await? {
            OrderActionResult::Deliver(order) => Ok(order),
            other => Err(unexpected(other)),
        }
    }

    /// Stores a ping and forwards it to every order the driver is working on.
    ///
    /// Returns how many orders took the new location.
    #[instrument(skip(self))]
    pub async fn update_location(
        &self,
        driver_id: DriverId,
        lat: f64,
        lng: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<usize, OrderError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(OrderError::Validation(format!(
                "coordinates out of range: {lat}, {lng}"
            )));
        }
        let location = Location { lat, lng, timestamp };
        let (applied, active_orders) = self.drivers.locate(driver_id, location).await?;
        if !applied {
            debug!(%driver_id, "Stale driver location ignored");
        }

        let mut updated = 0;
        for order_id in active_orders {
            let action = OrderAction::RecordLocation {
                driver_id,
                location,
            };
            match self.act(order_id, action).await {
                Ok(OrderActionResult::RecordLocation(true)) => updated += 1,
                Ok(OrderActionResult::RecordLocation(false)) => {}
                Ok(other) => return Err(unexpected(other)),
                Err(e) => warn!(%order_id, error = %e, "Location not recorded on order"),
            }
        }
        Ok(updated)
    }

    /// Orders bound to `driver_id`, oldest first.
    pub async fn assigned_orders(
        &self,
        caller: &Caller,
        driver_id: DriverId,
    ) -> Result<Vec<Order>, OrderError> {
        if !(caller.is_admin() || caller.is_driver(driver_id)) {
            return Err(OrderError::Unauthorized(format!(
                "{} may not list orders of {driver_id}",
                caller.email
            )));
        }
        let mut orders = self
            .orders
            .find(Filter::new(move |order: &Order| order.is_bound_to(driver_id)))
            .await
            .map_err(map_framework)?;
        orders.sort_by_key(|order| (order.created_at, order.id));
        Ok(orders)
    }

    pub async fn driver(&self, driver_id: DriverId) -> Result<Option<Driver>, OrderError> {
        Ok(self.drivers.get(driver_id).await?)
    }
}
