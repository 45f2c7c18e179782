//! [`ActorEntity`] implementation for [`Cart`].
//!
//! Carts are keyed by their owner and materialize empty on the first action, so there is no
//! create step. Every rule that reads and then writes a cart lives in `handle_action`, where
//! the owning shard serializes it.

use super::actions::{CartAction, CartActionResult};
use super::error::CartError;
use crate::model::{normalize_assignee, CafeId, Cart, CartItem, CartItemId, ItemId, UserId};
use actor_framework::ActorEntity;
use async_trait::async_trait;

impl Cart {
    fn touch(&mut self) {
        self.version += 1;
        if self.items.is_empty() {
            self.cafe_id = None;
        }
    }

    fn merge_line(
        &mut self,
        item_id: ItemId,
        cafe_id: CafeId,
        quantity: u32,
        assignee_email: Option<String>,
    ) -> Result<CartItem, CartError> {
        if quantity == 0 {
            return Err(CartError::Validation("quantity must be at least 1".into()));
        }
        match self.cafe_id {
            Some(cart) if cart != cafe_id && !self.items.is_empty() => {
                return Err(CartError::MixedCafe {
                    cart,
                    item: cafe_id,
                });
            }
            _ => {}
        }

        let assignee = normalize_assignee(assignee_email.as_deref());
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.same_line(item_id, assignee.as_deref()))
        {
            line.quantity = line.quantity.checked_add(quantity).ok_or_else(|| {
                CartError::Validation(format!("quantity overflow on {}", line.id))
            })?;
            return Ok(line.clone());
        }

        let line = CartItem {
            id: CartItemId(self.next_line_id),
            item_id,
            quantity,
            assignee_email: assignee,
        };
        self.next_line_id += 1;
        self.cafe_id = Some(cafe_id);
        self.items.push(line.clone());
        Ok(line)
    }

    fn set_quantity(
        &mut self,
        line_id: CartItemId,
        quantity: i64,
    ) -> Result<Option<CartItem>, CartError> {
        let index = self
            .items
            .iter()
            .position(|line| line.id == line_id)
            .ok_or_else(|| CartError::NotFound(line_id.to_string()))?;
        if quantity <= 0 {
            self.items.remove(index);
            return Ok(None);
        }
        let quantity = u32::try_from(quantity)
            .map_err(|_| CartError::Validation(format!("quantity {quantity} is too large")))?;
        self.items[index].quantity = quantity;
        Ok(Some(self.items[index].clone()))
    }
}

#[async_trait]
impl ActorEntity for Cart {
    type Id = UserId;
    type Create = ();
    type Update = ();
    type Action = CartAction;
    type ActionResult = CartActionResult;
    type Context = ();
    type Error = CartError;

    fn from_create_params(owner: UserId, _params: ()) -> Result<Self, Self::Error> {
        Ok(Cart::empty(owner))
    }

    fn materialize(owner: &UserId) -> Option<Self> {
        Some(Cart::empty(*owner))
    }

    async fn on_update(&mut self, _update: (), _ctx: &()) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: CartAction,
        _ctx: &(),
    ) -> Result<CartActionResult, Self::Error> {
        let resolves_checkout = matches!(action, CartAction::Restore { .. } | CartAction::Settle);
        if self.checkout_pending != resolves_checkout {
            return Err(CartError::Conflict(if self.checkout_pending {
                format!("checkout of the cart of {} is in progress", self.owner)
            } else {
                format!("the cart of {} has no checkout in progress", self.owner)
            }));
        }
        match action {
            CartAction::AddLine {
                item_id,
                cafe_id,
                quantity,
                assignee_email,
            } => {
                let line = self.merge_line(item_id, cafe_id, quantity, assignee_email)?;
                self.touch();
                Ok(CartActionResult::AddLine(line))
            }
            CartAction::SetQuantity { line_id, quantity } => {
                let line = self.set_quantity(line_id, quantity)?;
                self.touch();
                Ok(CartActionResult::SetQuantity(line))
            }
            CartAction::RemoveLine(line_id) => {
                let before = self.items.len();
                self.items.retain(|line| line.id != line_id);
                let removed = self.items.len() < before;
                if removed {
                    self.touch();
                }
                Ok(CartActionResult::RemoveLine(removed))
            }
            CartAction::Clear => {
                if !self.items.is_empty() {
                    self.items.clear();
                    self.touch();
                }
                Ok(CartActionResult::Clear(()))
            }
            CartAction::Checkout { expected_version } => {
                if self.version != expected_version {
                    return Err(CartError::Conflict(format!(
                        "cart of {} is at version {}, expected {}",
                        self.owner, self.version, expected_version
                    )));
                }
                if self.items.is_empty() {
                    return Err(CartError::Validation("cart is empty".into()));
                }
                let snapshot = self.clone();
                self.items.clear();
                self.checkout_pending = true;
                self.touch();
                Ok(CartActionResult::Checkout(snapshot))
            }
            CartAction::Restore { cafe_id, lines } => {
                if let Some(last) = lines.iter().map(|line| line.id.0).max() {
                    self.next_line_id = self.next_line_id.max(last + 1);
                }
                self.items = lines;
                self.cafe_id = Some(cafe_id);
                self.checkout_pending = false;
                self.touch();
                Ok(CartActionResult::Restore(()))
            }
            CartAction::Settle => {
                self.checkout_pending = false;
                Ok(CartActionResult::Settle(()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAFE: CafeId = CafeId(1);

    async fn add(
        cart: &mut Cart,
        item: u32,
        cafe: CafeId,
        quantity: u32,
        assignee: Option<&str>,
    ) -> Result<CartItem, CartError> {
        let action = CartAction::AddLine {
            item_id: ItemId(item),
            cafe_id: cafe,
            quantity,
            assignee_email: assignee.map(str::to_string),
        };
        match cart.handle_action(action, &()).await? {
            CartActionResult::AddLine(line) => Ok(line),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn same_item_and_assignee_merge() {
        let mut cart = Cart::empty(UserId(1));
        let first = add(&mut cart, 10, CAFE, 2, Some("Ann@Mail.test")).await.unwrap();
        let second = add(&mut cart, 10, CAFE, 3, Some(" ann@mail.test")).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity, 5);
        assert_eq!(cart.items.len(), 1);

        add(&mut cart, 10, CAFE, 1, None).await.unwrap();
        assert_eq!(cart.items.len(), 2, "different assignee is a different line");
    }

    #[tokio::test]
    async fn second_cafe_is_rejected_until_cart_empties() {
        let mut cart = Cart::empty(UserId(1));
        let line = add(&mut cart, 10, CAFE, 1, None).await.unwrap();
        let err = add(&mut cart, 20, CafeId(2), 1, None).await.unwrap_err();
        assert_eq!(
            err,
            CartError::MixedCafe {
                cart: CAFE,
                item: CafeId(2)
            }
        );

        cart.handle_action(CartAction::RemoveLine(line.id), &())
            .await
            .unwrap();
        assert_eq!(cart.cafe_id, None);
        add(&mut cart, 20, CafeId(2), 1, None).await.unwrap();
        assert_eq!(cart.cafe_id, Some(CafeId(2)));
    }

    #[tokio::test]
    async fn non_positive_quantity_removes_line() {
        let mut cart = Cart::empty(UserId(1));
        let line = add(&mut cart, 10, CAFE, 4, None).await.unwrap();
        let result = cart
            .handle_action(
                CartAction::SetQuantity {
                    line_id: line.id,
                    quantity: -1,
                },
                &(),
            )
            .await
            .unwrap();
        assert!(matches!(result, CartActionResult::SetQuantity(None)));
        assert!(cart.is_empty());

        let missing = cart
            .handle_action(
                CartAction::SetQuantity {
                    line_id: line.id,
                    quantity: 2,
                },
                &(),
            )
            .await;
        assert!(matches!(missing, Err(CartError::NotFound(_))));
    }

    #[tokio::test]
    async fn clear_and_remove_do_not_bump_version_when_nothing_changes() {
        let mut cart = Cart::empty(UserId(1));
        add(&mut cart, 10, CAFE, 1, None).await.unwrap();
        cart.handle_action(CartAction::Clear, &()).await.unwrap();
        let version = cart.version;

        cart.handle_action(CartAction::Clear, &()).await.unwrap();
        let removed = cart
            .handle_action(CartAction::RemoveLine(CartItemId(1)), &())
            .await
            .unwrap();
        assert!(matches!(removed, CartActionResult::RemoveLine(false)));
        assert_eq!(cart.version, version);
    }

    #[tokio::test]
    async fn checkout_requires_unchanged_version() {
        let mut cart = Cart::empty(UserId(1));
        add(&mut cart, 10, CAFE, 1, None).await.unwrap();
        let stale = cart.version - 1;

        let conflict = cart
            .handle_action(
                CartAction::Checkout {
                    expected_version: stale,
                },
                &(),
            )
            .await;
        assert!(matches!(conflict, Err(CartError::Conflict(_))));

        let expected_version = cart.version;
        let result = cart
            .handle_action(CartAction::Checkout { expected_version }, &())
            .await
            .unwrap();
        match result {
            CartActionResult::Checkout(snapshot) => assert_eq!(snapshot.items.len(), 1),
            other => panic!("unexpected result {other:?}"),
        }
        assert!(cart.is_empty());
        assert_eq!(cart.cafe_id, None);
    }

    async fn check_out(cart: &mut Cart) -> Cart {
        let expected_version = cart.version;
        match cart
            .handle_action(CartAction::Checkout { expected_version }, &())
            .await
            .unwrap()
        {
            CartActionResult::Checkout(snapshot) => snapshot,
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn pending_checkout_refuses_edits_and_restores_verbatim() {
        let mut cart = Cart::empty(UserId(1));
        add(&mut cart, 10, CAFE, 2, None).await.unwrap();
        add(&mut cart, 11, CAFE, 1, Some("bo@mail.test")).await.unwrap();
        let snapshot = check_out(&mut cart).await;
        assert!(cart.checkout_pending);

        let other_cafe = add(&mut cart, 30, CafeId(2), 1, None).await;
        assert!(matches!(other_cafe, Err(CartError::Conflict(_))));
        let clear = cart.handle_action(CartAction::Clear, &()).await;
        assert!(matches!(clear, Err(CartError::Conflict(_))));

        cart.handle_action(
            CartAction::Restore {
                cafe_id: CAFE,
                lines: snapshot.items.clone(),
            },
            &(),
        )
        .await
        .unwrap();
        assert!(!cart.checkout_pending);
        assert_eq!(cart.items, snapshot.items);
        assert_eq!(cart.cafe_id, Some(CAFE));

        let fresh = add(&mut cart, 12, CAFE, 1, None).await.unwrap();
        assert_eq!(fresh.id, CartItemId(3));
    }

    #[tokio::test]
    async fn settle_reopens_an_empty_cart() {
        let mut cart = Cart::empty(UserId(1));
        add(&mut cart, 10, CAFE, 1, None).await.unwrap();
        check_out(&mut cart).await;

        cart.handle_action(CartAction::Settle, &()).await.unwrap();
        assert!(!cart.checkout_pending);
        assert!(cart.is_empty());
        add(&mut cart, 30, CafeId(2), 1, None).await.unwrap();
        assert_eq!(cart.cafe_id, Some(CafeId(2)));

        let stray = cart.handle_action(CartAction::Settle, &()).await;
        assert!(matches!(stray, Err(CartError::Conflict(_))));
    }
}
