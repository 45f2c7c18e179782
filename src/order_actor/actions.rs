//! Custom actions for the order actor.
//!
//! Every state change after placement is an action, so the check and the write happen inside
//! one turn of the actor loop.

use crate::model::{Caller, DriverBinding, DriverId, Location, Order, OrderStatus};

#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Staff, driver, payments or admin moving the order along the table.
    Transition { to: OrderStatus, caller: Caller },
    /// Customer self-cancel inside the grace window.
    Cancel { caller: Caller },
    AssignDriver { driver_id: DriverId, caller: Caller },
    Pickup { driver_id: DriverId },
    Deliver { driver_id: DriverId },
    /// Overwrites `last_known_location` if the driver is bound and the ping is not stale.
    RecordLocation { driver_id: DriverId, location: Location },
}

/// Results from OrderActions; variants match 1:1 with OrderAction.
#[derive(Debug, Clone)]
pub enum OrderActionResult {
    Transition(Order),
    Cancel(Order),
    AssignDriver(DriverBinding),
    Pickup(Order),
    Deliver(Order),
    RecordLocation(bool),
}
