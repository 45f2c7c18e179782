//! Error types for the driver actor.

use crate::error::{ErrorKind, ErrorReport};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DriverError {
    #[error("Driver not found: {0}")]
    NotFound(String),

    #[error("Driver validation error: {0}")]
    Validation(String),

    #[error("Driver conflict: {0}")]
    Conflict(String),

    #[error("Driver actor unavailable: {0}")]
    Unavailable(String),
}

impl DriverError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DriverError::NotFound(_) => ErrorKind::NotFound,
            DriverError::Validation(_) => ErrorKind::Validation,
            DriverError::Conflict(_) => ErrorKind::Conflict,
            DriverError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::new(self.kind(), self)
    }
}
