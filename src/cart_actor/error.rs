//! Error types for the cart actor.

use crate::catalog_actor::CatalogError;
use crate::error::{ErrorKind, ErrorReport};
use crate::model::CafeId;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("Cart validation error: {0}")]
    Validation(String),

    /// The item is unknown or no longer offered.
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    #[error("Cart holds items from {cart}; cannot add an item from {item}")]
    MixedCafe { cart: CafeId, item: CafeId },

    #[error("Cart item not found: {0}")]
    NotFound(String),

    /// The cart changed between snapshot and checkout.
    #[error("Cart conflict: {0}")]
    Conflict(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(#[from] CatalogError),

    #[error("Cart actor unavailable: {0}")]
    Unavailable(String),
}

impl CartError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CartError::Validation(_) | CartError::MixedCafe { .. } => ErrorKind::Validation,
            CartError::InvalidItem(_) => ErrorKind::ItemUnavailable,
            CartError::NotFound(_) => ErrorKind::NotFound,
            CartError::Conflict(_) => ErrorKind::Conflict,
            CartError::CatalogUnavailable(_) | CartError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::new(self.kind(), self)
    }
}
