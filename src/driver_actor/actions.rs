//! Custom actions for the driver actor.

use crate::model::{Driver, Location, OrderId};

#[derive(Debug, Clone)]
pub enum DriverAction {
    /// Records a new binding and marks the driver occupied.
    Engage(OrderId),
    /// Drops a binding; the driver becomes idle once none remain.
    Release(OrderId),
    /// Stores a position ping unless it is older than the stored one.
    Locate(Location),
}

/// Results from DriverActions; variants match 1:1 with DriverAction.
#[derive(Debug, Clone)]
pub enum DriverActionResult {
    Engage(Driver),
    Release(Driver),
    Locate {
        applied: bool,
        /// Orders the ping should be forwarded to.
        active_orders: Vec<OrderId>,
    },
}
