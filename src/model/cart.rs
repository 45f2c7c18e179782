//! Per-user carts.

use super::caller::normalize_email;
use super::ids::{CafeId, CartItemId, ItemId, UserId};
use serde::{Deserialize, Serialize};

/// One line of a cart. `quantity` is never zero; a line that would reach zero is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub item_id: ItemId,
    pub quantity: u32,
    /// Who the line is "for". `None` means the cart owner.
    pub assignee_email: Option<String>,
}

impl CartItem {
    /// Lines merge when they reference the same item for the same person.
    pub fn same_line(&self, item_id: ItemId, assignee_email: Option<&str>) -> bool {
        self.item_id == item_id && self.assignee_email.as_deref() == assignee_email
    }
}

/// A user's open cart.
///
/// `cafe_id` is `Some` exactly when the cart has lines; every line belongs to that cafe.
/// `version` increases on every observable change and is what checkout compares against.
/// While `checkout_pending` is set the cart is empty and refuses edits until the placement
/// either settles or restores the checked-out lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub owner: UserId,
    pub cafe_id: Option<CafeId>,
    pub items: Vec<CartItem>,
    pub next_line_id: u32,
    pub version: u64,
    #[serde(default)]
    pub checkout_pending: bool,
}

impl Cart {
    pub fn empty(owner: UserId) -> Self {
        Self {
            owner,
            cafe_id: None,
            items: Vec::new(),
            next_line_id: 1,
            version: 0,
            checkout_pending: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn line(&self, id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|line| line.id == id)
    }
}

/// Normalizes an optional assignee. Blank strings mean "for the owner".
pub fn normalize_assignee(assignee_email: Option<&str>) -> Option<String> {
    assignee_email
        .map(normalize_email)
        .filter(|email| !email.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_assignee_means_owner() {
        assert_eq!(normalize_assignee(Some("   ")), None);
        assert_eq!(normalize_assignee(None), None);
        assert_eq!(
            normalize_assignee(Some(" Ann@Mail.test")),
            Some("ann@mail.test".to_string())
        );
    }
}
