use super::ids::{DriverId, OrderId};
use super::order::Location;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverStatus {
    Idle,
    Occupied,
}

/// A delivery driver.
///
/// `status` is `Occupied` exactly when `active_orders` is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub name: String,
    pub email: String,
    pub status: DriverStatus,
    pub location: Option<Location>,
    pub active_orders: BTreeSet<OrderId>,
}

#[derive(Debug, Clone)]
pub struct DriverCreate {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub struct DriverUpdate {
    pub name: Option<String>,
}
