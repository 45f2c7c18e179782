//! # Cart Client
//!
//! Resolves items against the catalog, then hands the cart shard an action that needs no
//! further I/O. The owner is always the calling user.

use super::catalog_client::{resolve_with_deadline, CatalogLookup, LookupPolicy};
use crate::aggregation::{summarize, CartSummary};
use crate::cart_actor::{CartAction, CartActionResult, CartError};
use crate::model::{CafeId, Caller, Cart, CartItem, CartItemId, ItemId, MenuItem, UserId};
use actor_framework::{FrameworkError, PooledClient};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Clone)]
pub struct CartClient {
    carts: PooledClient<Cart>,
    catalog: Arc<dyn CatalogLookup>,
    lookup: LookupPolicy,
}

fn map_framework(e: FrameworkError) -> CartError {
    e.into_entity::<CartError>().unwrap_or_else(|e| match e {
        FrameworkError::NotFound(id) => CartError::NotFound(id),
        other => CartError::Unavailable(other.to_string()),
    })
}

fn unexpected(result: CartActionResult) -> CartError {
    CartError::Unavailable(format!("unexpected cart action result: {result:?}"))
}

impl CartClient {
    pub fn new(
        carts: PooledClient<Cart>,
        catalog: Arc<dyn CatalogLookup>,
        lookup: LookupPolicy,
    ) -> Self {
        Self {
            carts,
            catalog,
            lookup,
        }
    }

    async fn act(&self, owner: UserId, action: CartAction) -> Result<CartActionResult, CartError> {
        self.carts
            .perform_action(owner, action)
            .await
            .map_err(map_framework)
    }

    /// Adds an item, merging with the line for the same item and assignee.
    #[instrument(skip(self, caller), fields(user = %caller.user_id))]
    pub async fn add_item(
        &self,
        caller: &Caller,
        item_id: ItemId,
        quantity: i64,
        assignee_email: Option<&str>,
    ) -> Result<CartItem, CartError> {
        debug!("Sending request");
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or_else(|| CartError::Validation(format!("quantity must be at least 1, got {quantity}")))?;

        let item = resolve_with_deadline(self.catalog.as_ref(), item_id, self.lookup)
            .await?
            .filter(|item| item.active)
            .ok_or_else(|| CartError::InvalidItem(item_id.to_string()))?;

        let action = CartAction::AddLine {
            item_id,
            cafe_id: item.cafe_id,
            quantity,
            assignee_email: assignee_email.map(str::to_string),
        };
        match self.act(caller.user_id, action).await? {
            CartActionResult::AddLine(line) => {
                info!(line_id = %line.id, quantity = line.quantity, "Cart line saved");
                Ok(line)
            }
            other => Err(unexpected(other)),
        }
    }

    /// Sets a line's quantity. `Ok(None)` means the line was removed.
    #[instrument(skip(self, caller), fields(user = %caller.user_id))]
    pub async fn update_quantity(
        &self,
        caller: &Caller,
        line_id: CartItemId,
        quantity: i64,
    ) -> Result<Option<CartItem>, CartError> {
        debug!("Sending request");
        match self
            .act(caller.user_id, CartAction::SetQuantity { line_id, quantity })
            .await?
        {
            CartActionResult::SetQuantity(line) => Ok(line),
            other => Err(unexpected(other)),
        }
    }

    /// Removes a line. Removing an absent line is not an error.
    #[instrument(skip(self, caller), fields(user = %caller.user_id))]
    pub async fn remove_item(&self, caller: &Caller, line_id: CartItemId) -> Result<bool, CartError> {
        debug!("Sending request");
        match self.act(caller.user_id, CartAction::RemoveLine(line_id)).await? {
            CartActionResult::RemoveLine(removed) => Ok(removed),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self, caller), fields(user = %caller.user_id))]
    pub async fn clear(&self, caller: &Caller) -> Result<(), CartError> {
        debug!("Sending request");
        match self.act(caller.user_id, CartAction::Clear).await? {
            CartActionResult::Clear(()) => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// The user's cart; an empty one if the user never touched it.
    pub async fn cart(&self, owner: UserId) -> Result<Cart, CartError> {
        Ok(self
            .carts
            .get(owner)
            .await
            .map_err(map_framework)?
            .unwrap_or_else(|| Cart::empty(owner)))
    }

    pub async fn items(&self, caller: &Caller) -> Result<Vec<CartItem>, CartError> {
        Ok(self.cart(caller.user_id).await?.items)
    }

    /// Per-person totals against the live catalog.
    ///
    /// Items that fail to resolve are reported in `unavailable_items` rather than failing the
    /// whole summary.
    #[instrument(skip(self, caller), fields(user = %caller.user_id))]
    pub async fn summary(&self, caller: &Caller) -> Result<CartSummary, CartError> {
        let cart = self.cart(caller.user_id).await?;
        let mut resolved: HashMap<ItemId, MenuItem> = HashMap::new();
        for line in &cart.items {
            if resolved.contains_key(&line.item_id) {
                continue;
            }
            match resolve_with_deadline(self.catalog.as_ref(), line.item_id, self.lookup).await {
                Ok(Some(item)) => {
                    resolved.insert(line.item_id, item);
                }
                Ok(None) => {}
                Err(e) => warn!(item_id = %line.item_id, error = %e, "Item left out of summary"),
            }
        }
        Ok(summarize(&caller.email, &cart.items, &resolved))
    }

    /// Empties the cart if it is still at `expected_version`, returning what it held.
    pub(crate) async fn checkout(&self, owner: UserId, expected_version: u64) -> Result<Cart, CartError> {
        match self
            .act(owner, CartAction::Checkout { expected_version })
            .await?
        {
            CartActionResult::Checkout(snapshot) => Ok(snapshot),
            other => Err(unexpected(other)),
        }
    }

    /// Returns checked-out lines to the cart after a failed placement.
    pub(crate) async fn restore(
        &self,
        owner: UserId,
        cafe_id: CafeId,
        lines: Vec<CartItem>,
    ) -> Result<(), CartError> {
        match self.act(owner, CartAction::Restore { cafe_id, lines }).await? {
            CartActionResult::Restore(()) => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Reopens the cart once the order for a checkout exists.
    pub(crate) async fn settle(&self, owner: UserId) -> Result<(), CartError> {
        match self.act(owner, CartAction::Settle).await? {
            CartActionResult::Settle(()) => Ok(()),
            other => Err(unexpected(other)),
        }
    }
}
