//! The authenticated identity attached to every request.

use super::ids::{CafeId, DriverId, UserId};
use serde::{Deserialize, Serialize};

/// What the caller is allowed to act as.
///
/// Staff and owners are scoped to a single cafe; a driver role carries the driver record it
/// speaks for. `Payments` is the payment collaborator reversing a charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "role", content = "scope")]
pub enum Role {
    Customer,
    Staff(CafeId),
    Owner(CafeId),
    Driver(DriverId),
    Admin,
    Payments,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: UserId, email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
        }
    }

    pub fn customer(user_id: UserId, email: impl Into<String>) -> Self {
        Self::new(user_id, email, Role::Customer)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Staff or owner of `cafe`, or an admin.
    pub fn manages(&self, cafe: CafeId) -> bool {
        match self.role {
            Role::Staff(scope) | Role::Owner(scope) => scope == cafe,
            Role::Admin => true,
            _ => false,
        }
    }

    /// The driver this caller speaks for, if any.
    pub fn driver_id(&self) -> Option<DriverId> {
        match self.role {
            Role::Driver(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_driver(&self, driver: DriverId) -> bool {
        self.driver_id() == Some(driver)
    }
}

/// Trimmed, lower-cased email used as a grouping key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
