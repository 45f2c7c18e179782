//! Error types for the catalog actors and lookups.

use crate::error::{ErrorKind, ErrorReport};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Catalog record not found: {0}")]
    NotFound(String),

    #[error("Catalog validation error: {0}")]
    Validation(String),

    /// Every attempt of a deadline-bounded lookup ran out of time.
    #[error("Catalog lookup timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::NotFound(_) => ErrorKind::NotFound,
            CatalogError::Validation(_) => ErrorKind::Validation,
            CatalogError::Timeout { .. } | CatalogError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::new(self.kind(), self)
    }

    /// Transient failures worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CatalogError::Timeout { .. } | CatalogError::Unavailable(_)
        )
    }
}
