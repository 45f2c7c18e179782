//! # Order Client
//!
//! Placement, status changes and the read side of orders.
//!
//! Placement validates against the catalog before anything is written. The cart is then
//! emptied with a versioned checkout, so lines added while the catalog was being consulted
//! are never dropped silently: the checkout fails and placement starts over.

use super::cart_client::CartClient;
use super::catalog_client::{resolve_with_deadline, CatalogLookup, LookupPolicy};
use crate::aggregation::{
    cafe_analytics, calorie_intake, counts_toward_intake, CafeAnalytics, CalorieIntake,
};
use crate::cart_actor::CartError;
use crate::catalog_actor::CatalogError;
use crate::model::{
    normalize_email, round_money, CafeId, Caller, Order, OrderCreate, OrderId, OrderLine, OrderStatus,
    OrderSummary, RevenuePolicy,
};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError};
use actor_framework::{Filter, FrameworkError, ResourceClient};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    carts: CartClient,
    catalog: Arc<dyn CatalogLookup>,
    lookup: LookupPolicy,
    checkout_retries: u32,
    revenue_policy: RevenuePolicy,
}

pub(crate) fn map_framework(e: FrameworkError) -> OrderError {
    e.into_entity::<OrderError>().unwrap_or_else(|e| match e {
        FrameworkError::NotFound(id) => OrderError::NotFound(id),
        other => OrderError::Unavailable(other.to_string()),
    })
}

pub(crate) fn unexpected(result: OrderActionResult) -> OrderError {
    OrderError::Unavailable(format!("unexpected order action result: {result:?}"))
}

/// Owner, staff or owner of the cafe, the bound driver, or an admin.
pub(crate) fn may_view(caller: &Caller, order: &Order) -> bool {
    caller.user_id == order.user_id
        || caller.manages(order.cafe_id)
        || caller.driver_id().is_some_and(|id| order.is_bound_to(id))
}

impl OrderClient {
    pub fn new(
        inner: ResourceClient<Order>,
        carts: CartClient,
        catalog: Arc<dyn CatalogLookup>,
        lookup: LookupPolicy,
        checkout_retries: u32,
        revenue_policy: RevenuePolicy,
    ) -> Self {
        Self {
            inner,
            carts,
            catalog,
            lookup,
            checkout_retries,
            revenue_policy,
        }
    }

    /// Turns the caller's cart into a PENDING order and empties the cart.
    ///
    /// Every line is re-resolved against the catalog; if any line cannot be confirmed the
    /// placement fails and the cart is left as it was.
    #[instrument(skip(self, caller, payment_ref), fields(user = %caller.user_id))]
    pub async fn place_order(
        &self,
        caller: &Caller,
        cafe_id: CafeId,
        payment_ref: Option<String>,
    ) -> Result<Order, OrderError> {
        debug!("Sending request");
        for attempt in 1..=self.checkout_retries {
            let cart = self.carts.cart(caller.user_id).await?;
            if cart.is_empty() {
                return Err(OrderError::EmptyCart);
            }
            match cart.cafe_id {
                Some(cart_cafe) if cart_cafe != cafe_id => {
                    return Err(OrderError::MixedCafe {
                        cart: cart_cafe,
                        requested: cafe_id,
                    });
                }
                _ => {}
            }

            let catalog = self.catalog.as_ref();
            let cafe = self
                .lookup
                .run(move || catalog.resolve_cafe(cafe_id))
                .await
                .map_err(|e| unconfirmed(cafe_id, e))?
                .ok_or_else(|| OrderError::NotFound(cafe_id.to_string()))?;
            if !cafe.active {
                return Err(OrderError::ItemUnavailable(format!("{cafe_id} is closed")));
            }

            let mut lines = Vec::with_capacity(cart.items.len());
            for line in &cart.items {
                let item = resolve_with_deadline(catalog, line.item_id, self.lookup)
                    .await
                    .map_err(|e| unconfirmed(line.item_id, e))?
                    .filter(|item| item.active && item.cafe_id == cafe_id)
                    .ok_or_else(|| OrderError::ItemUnavailable(line.item_id.to_string()))?;
                let quantity = Decimal::from(line.quantity);
                lines.push(OrderLine {
                    item_id: item.id,
                    name: item.name,
                    quantity: line.quantity,
                    unit_price: item.price,
                    subtotal_price: round_money(item.price * quantity),
                    subtotal_calories: u64::from(item.calories) * u64::from(line.quantity),
                    assignee_email: line.assignee_email.clone(),
                });
            }

            let snapshot = match self.carts.checkout(caller.user_id, cart.version).await {
                Ok(snapshot) => snapshot,
                Err(CartError::Conflict(reason)) => {
                    warn!(attempt, %reason, "Cart changed during placement; retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let params = OrderCreate {
                user_id: caller.user_id,
                cafe_id,
                payment_ref,
                items: lines,
            };
            return match self.create_order(params).await {
                Ok(order) => {
                    info!(order_id = %order.id, total = %order.total_price, "Order placed");
                    // The order stands even if the cart stays held.
                    if let Err(e) = self.carts.settle(caller.user_id).await {
                        warn!(order_id = %order.id, error = %e, "Cart settle failed");
                    }
                    Ok(order)
                }
                Err(e) => {
                    warn!(error = %e, "Order creation failed; restoring cart");
                    self.carts
                        .restore(caller.user_id, cafe_id, snapshot.items)
                        .await?;
                    Err(e)
                }
            };
        }
        Err(OrderError::Conflict(format!(
            "cart kept changing; gave up after {} attempts",
            self.checkout_retries
        )))
    }

    async fn create_order(&self, params: OrderCreate) -> Result<Order, OrderError> {
        let id = self.inner.create(params).await.map_err(map_framework)?;
        self.inner
            .get(id)
            .await
            .map_err(map_framework)?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    async fn act(&self, id: OrderId, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(map_framework)
    }

    /// Moves an order along the status table on behalf of `caller`.
    #[instrument(skip(self, caller), fields(user = %caller.user_id))]
    pub async fn update_status(
        &self,
        caller: &Caller,
        id: OrderId,
        to: OrderStatus,
    ) -> Result<Order, OrderError> {
        debug!("Sending request");
        let action = OrderAction::Transition {
            to,
            caller: caller.clone(),
        };
        match self.act(id, action).await? {
            OrderActionResult::Transition(order) => Ok(order),
            other => Err(unexpected(other)),
        }
    }

    /// Customer self-cancel, allowed while the order is PENDING or ACCEPTED and the grace
    /// window is open.
    #[instrument(skip(self, caller), fields(user = %caller.user_id))]
    pub async fn cancel_order(&self, caller: &Caller, id: OrderId) -> Result<Order, OrderError> {
        debug!("Sending request");
        let action = OrderAction::Cancel {
            caller: caller.clone(),
        };
        match self.act(id, action).await? {
            OrderActionResult::Cancel(order) => {
                info!(order_id = %id, "Order cancelled by customer");
                Ok(order)
            }
            other => Err(unexpected(other)),
        }
    }

    pub async fn order(&self, caller: &Caller, id: OrderId) -> Result<Order, OrderError> {
        let order = self
            .inner
            .get(id)
            .await
            .map_err(map_framework)?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))?;
        if !may_view(caller, &order) {
            return Err(OrderError::Unauthorized(format!(
                "{} may not view {id}",
                caller.email
            )));
        }
        Ok(order)
    }

    pub async fn summary(&self, caller: &Caller, id: OrderId) -> Result<OrderSummary, OrderError> {
        Ok(self.order(caller, id).await?.summary())
    }

    /// The caller's own orders, newest first.
    pub async fn my_orders(&self, caller: &Caller) -> Result<Vec<Order>, OrderError> {
        let user = caller.user_id;
        let orders = self
            .inner
            .find(Filter::new(move |order: &Order| order.user_id == user))
            .await
            .map_err(map_framework)?;
        Ok(newest_first(orders))
    }

    /// A cafe's orders, newest first, optionally narrowed to one status.
    #[instrument(skip(self, caller), fields(user = %caller.user_id))]
    pub async fn cafe_orders(
        &self,
        caller: &Caller,
        cafe_id: CafeId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, OrderError> {
        self.require_manager(caller, cafe_id)?;
        let orders = self
            .inner
            .find(Filter::new(move |order: &Order| {
                order.cafe_id == cafe_id && status.map_or(true, |s| order.status == s)
            }))
            .await
            .map_err(map_framework)?;
        Ok(newest_first(orders))
    }

    #[instrument(skip(self, caller), fields(user = %caller.user_id))]
    pub async fn cafe_analytics(
        &self,
        caller: &Caller,
        cafe_id: CafeId,
    ) -> Result<CafeAnalytics, OrderError> {
        let orders = self.cafe_orders(caller, cafe_id, None).await?;
        Ok(cafe_analytics(&orders, self.revenue_policy))
    }

    /// Calories the caller ate on `day`: their own unassigned lines plus every line
    /// assigned to their email, in orders that were not cancelled or declined.
    #[instrument(skip(self, caller), fields(user = %caller.user_id))]
    pub async fn calorie_intake(
        &self,
        caller: &Caller,
        day: NaiveDate,
    ) -> Result<CalorieIntake, OrderError> {
        let user = caller.user_id;
        let email = normalize_email(&caller.email);
        let wanted = email.clone();
        let orders = self
            .inner
            .find(Filter::new(move |order: &Order| {
                order.created_at.date_naive() == day
                    && counts_toward_intake(order.status)
                    && (order.user_id == user
                        || order
                            .items
                            .iter()
                            .any(|line| line.assignee_email.as_deref() == Some(wanted.as_str())))
            }))
            .await
            .map_err(map_framework)?;
        Ok(calorie_intake(&orders, user, &email, day))
    }

    fn require_manager(&self, caller: &Caller, cafe_id: CafeId) -> Result<(), OrderError> {
        if caller.manages(cafe_id) {
            Ok(())
        } else {
            Err(OrderError::Unauthorized(format!(
                "{} is not staff of {cafe_id}",
                caller.email
            )))
        }
    }
}

fn unconfirmed(what: impl std::fmt::Display, e: CatalogError) -> OrderError {
    OrderError::ItemUnavailable(format!("{what} could not be confirmed: {e}"))
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    orders
}
