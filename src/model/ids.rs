//! Type-safe identifiers.
//!
//! All ids wrap a `u32` so the actor can mint them from its counter, and display with a
//! resource prefix (`order_3`) for logs.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// A platform user, as issued by the authentication collaborator.
    UserId,
    "user"
);
entity_id!(CafeId, "cafe");
entity_id!(ItemId, "item");
entity_id!(
    /// A line in one user's cart; unique within that cart only.
    CartItemId,
    "line"
);
entity_id!(OrderId, "order");
entity_id!(DriverId, "driver");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_with_prefix_and_serialize_bare() {
        assert_eq!(OrderId(3).to_string(), "order_3");
        assert_eq!(CartItemId::from(12).to_string(), "line_12");
        assert_eq!(serde_json::to_string(&CafeId(9)).unwrap(), "9");
    }
}
