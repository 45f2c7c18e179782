//! Custom actions for the cart actor.
//!
//! Catalog lookups happen in [`CartClient`](crate::clients::CartClient) before an action is
//! sent, so every action here runs without awaiting anything and a shard never stalls on
//! the catalog.

use crate::model::{CafeId, Cart, CartItem, CartItemId, ItemId};

#[derive(Debug, Clone)]
pub enum CartAction {
    /// Adds `quantity` of an already-resolved item, merging with an existing line for the
    /// same item and assignee.
    AddLine {
        item_id: ItemId,
        cafe_id: CafeId,
        quantity: u32,
        assignee_email: Option<String>,
    },
    /// Sets a line's quantity; zero or less removes the line.
    SetQuantity { line_id: CartItemId, quantity: i64 },
    /// Removes a line if present.
    RemoveLine(CartItemId),
    Clear,
    /// Empties the cart if it is still at `expected_version`.
    Checkout { expected_version: u64 },
    /// Puts lines taken by a failed checkout back, exactly as they were.
    Restore { cafe_id: CafeId, lines: Vec<CartItem> },
    /// Ends a checkout whose order was created; the cart accepts edits again.
    Settle,
}

/// Results from CartActions; variants match 1:1 with CartAction.
#[derive(Debug, Clone)]
pub enum CartActionResult {
    AddLine(CartItem),
    /// `None` when the line was removed.
    SetQuantity(Option<CartItem>),
    /// Whether a line was actually removed.
    RemoveLine(bool),
    Clear(()),
    /// The cart as it was before being emptied.
    Checkout(Cart),
    Restore(()),
    Settle(()),
}
