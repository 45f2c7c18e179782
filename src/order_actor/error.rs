//! Error types for the order actor and the order-facing clients.

use crate::cart_actor::CartError;
use crate::driver_actor::DriverError;
use crate::error::{ErrorKind, ErrorReport};
use crate::model::{CafeId, DriverId, OrderStatus};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Illegal transition {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Cancellation window closed at {until}")]
    CancellationWindowExpired { until: DateTime<Utc> },

    #[error("Cannot place an order from an empty cart")]
    EmptyCart,

    #[error("Cart holds items from {cart}, not {requested}")]
    MixedCafe { cart: CafeId, requested: CafeId },

    /// A line no longer resolves to an active item, or the catalog could not confirm it.
    #[error("Item unavailable: {0}")]
    ItemUnavailable(String),

    #[error("Order already assigned to {driver}")]
    AlreadyAssigned { driver: DriverId },

    #[error("Order is {status}; not ready for this step")]
    OrderNotReady { status: OrderStatus },

    #[error("Order conflict: {0}")]
    Conflict(String),

    #[error("Order validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("Order actor unavailable: {0}")]
    Unavailable(String),
}

impl OrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::NotFound(_) => ErrorKind::NotFound,
            OrderError::Unauthorized(_) => ErrorKind::Unauthorized,
            OrderError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            OrderError::CancellationWindowExpired { .. } => ErrorKind::CancellationWindowExpired,
            OrderError::EmptyCart | OrderError::MixedCafe { .. } | OrderError::Validation(_) => {
                ErrorKind::Validation
            }
            OrderError::ItemUnavailable(_) => ErrorKind::ItemUnavailable,
            OrderError::AlreadyAssigned { .. } => ErrorKind::AlreadyAssigned,
            OrderError::OrderNotReady { .. } => ErrorKind::OrderNotReady,
            OrderError::Conflict(_) => ErrorKind::Conflict,
            OrderError::Cart(e) => e.kind(),
            OrderError::Driver(e) => e.kind(),
            OrderError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::new(self.kind(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_errors_keep_their_kind() {
        let err = OrderError::from(DriverError::NotFound("driver_3".into()));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.report().reason, "Driver not found: driver_3");

        let err = OrderError::from(CartError::Conflict("version 4 != 5".into()));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn placement_rejections_are_validation_errors() {
        assert_eq!(OrderError::EmptyCart.kind(), ErrorKind::Validation);
        let mixed = OrderError::MixedCafe {
            cart: CafeId(1),
            requested: CafeId(2),
        };
        assert_eq!(mixed.kind(), ErrorKind::Validation);
        assert_eq!(mixed.to_string(), "Cart holds items from cafe_1, not cafe_2");
    }
}
