//! Stable error codes shared by every actor error.
//!
//! Each error enum keeps its own variants and human-readable `Display`; `kind()` collapses
//! them onto [`ErrorKind`], which is what a transport layer would hand to clients.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    InvalidTransition,
    CancellationWindowExpired,
    ItemUnavailable,
    AlreadyAssigned,
    OrderNotReady,
    Conflict,
    /// A collaborator or actor could not be reached.
    Unavailable,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::InvalidTransition => "INVALID_TRANSITION",
            ErrorKind::CancellationWindowExpired => "CANCELLATION_WINDOW_EXPIRED",
            ErrorKind::ItemUnavailable => "ITEM_UNAVAILABLE",
            ErrorKind::AlreadyAssigned => "ALREADY_ASSIGNED",
            ErrorKind::OrderNotReady => "ORDER_NOT_READY",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Unavailable => "UNAVAILABLE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The body a rejected operation reports: a stable code and a reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub reason: String,
}

impl ErrorReport {
    pub fn new(kind: ErrorKind, reason: impl fmt::Display) -> Self {
        Self {
            kind,
            reason: reason.to_string(),
        }
    }
}
