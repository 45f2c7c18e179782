//! [`ActorEntity`] implementation for [`Order`].
//!
//! An order is created once from a validated cart snapshot and never edited field by field
//! afterwards. Status changes, cancellation and the driver binding are actions, each checked
//! and applied in a single turn of the actor loop, so two competing transitions on the same
//! order are decided in mailbox order.

use super::actions::{OrderAction, OrderActionResult};
use super::error::OrderError;
use super::OrderContext;
use crate::driver_actor::DriverError;
use crate::model::{
    round_money, Caller, DriverBinding, DriverId, Order, OrderCreate, OrderId, OrderStatus,
    OrderUpdate, Role,
};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, info, warn};

/// Six uppercase hex characters.
fn pickup_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..0x100_0000);
    format!("{code:06X}")
}

impl Order {
    fn check_transition(&self, to: OrderStatus) -> Result<(), OrderError> {
        if self.status.can_transition_to(to) {
            Ok(())
        } else {
            Err(OrderError::InvalidTransition {
                from: self.status,
                to,
            })
        }
    }

    fn authorize_transition(&self, to: OrderStatus, caller: &Caller) -> Result<(), OrderError> {
        let allowed = match to {
            OrderStatus::Accepted
            | OrderStatus::Declined
            | OrderStatus::Ready
            | OrderStatus::Cancelled => caller.manages(self.cafe_id),
            OrderStatus::PickedUp | OrderStatus::Delivered => {
                caller.is_admin() || caller.driver_id().is_some_and(|id| self.is_bound_to(id))
            }
            OrderStatus::Refunded => caller.is_admin() || caller.role == Role::Payments,
            OrderStatus::Pending => false,
        };
        if allowed {
            Ok(())
        } else {
            Err(OrderError::Unauthorized(format!(
                "{} may not move {} to {to}",
                caller.email, self.id
            )))
        }
    }

    fn check_bound(&self, driver_id: DriverId) -> Result<(), OrderError> {
        if self.is_bound_to(driver_id) {
            Ok(())
        } else {
            Err(OrderError::Unauthorized(format!(
                "{} is not assigned to {driver_id}",
                self.id
            )))
        }
    }

    /// Applies an already checked transition and its side effects.
    async fn apply(&mut self, to: OrderStatus, ctx: &OrderContext) -> Result<(), OrderError> {
        let now = ctx.clock.now();
        if let Some(binding) = self.driver_binding.as_mut() {
            match to {
                OrderStatus::PickedUp => binding.pickup_at = Some(now),
                OrderStatus::Delivered => binding.deliver_at = Some(now),
                _ => {}
            }
        }
        let from = self.status;
        self.status = to;
        self.updated_at = now;

        if matches!(to, OrderStatus::Delivered | OrderStatus::Cancelled) {
            if let Some(driver_id) = self.driver_id() {
                match ctx.drivers.release(driver_id, self.id).await {
                    Ok(_) => {}
                    Err(DriverError::NotFound(_)) => {
                        warn!(order_id = %self.id, %driver_id, "Bound driver is gone; nothing to release");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        info!(order_id = %self.id, %from, %to, "Order status changed");
        Ok(())
    }
}

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = OrderUpdate;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Context = OrderContext;
    type Error = OrderError;

    /// Builds the PENDING order from frozen lines. Timestamps are stamped in `on_create`.
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, Self::Error> {
        if params.items.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        let total_price = round_money(params.items.iter().map(|line| line.subtotal_price).sum());
        let total_calories = params.items.iter().map(|line| line.subtotal_calories).sum();
        let placeholder = DateTime::<Utc>::default();
        Ok(Self {
            id,
            user_id: params.user_id,
            cafe_id: params.cafe_id,
            status: OrderStatus::Pending,
            created_at: placeholder,
            updated_at: placeholder,
            items: params.items,
            total_price,
            total_calories,
            can_cancel_until: placeholder,
            payment_ref: params.payment_ref,
            pickup_code: String::new(),
            driver_binding: None,
        })
    }

    async fn on_create(&mut self, ctx: &OrderContext) -> Result<(), Self::Error> {
        let now = ctx.clock.now();
        self.created_at = now;
        self.updated_at = now;
        self.can_cancel_until = now + ctx.cancel_grace;
        self.pickup_code = pickup_code();
        debug!(order_id = %self.id, until = %self.can_cancel_until, "Cancellation window opened");
        Ok(())
    }

    async fn on_update(&mut self, _update: OrderUpdate, _ctx: &OrderContext) -> Result<(), Self::Error> {
        Err(OrderError::Validation(
            "orders change through status actions only".into(),
        ))
    }

    /// Orders end in a terminal status; they are never removed.
    async fn on_delete(&self, _ctx: &OrderContext) -> Result<(), Self::Error> {
        Err(OrderError::Validation(format!(
            "{} cannot be deleted; orders end in a terminal status",
            self.id
        )))
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        ctx: &OrderContext,
    ) -> Result<OrderActionResult, Self::Error> {
        match action {
            OrderAction::Transition { to, caller } => {
                self.check_transition(to)?;
                self.authorize_transition(to, &caller)?;
                self.apply(to, ctx).await?;
                Ok(OrderActionResult::Transition(self.clone()))
            }
            OrderAction::Cancel { caller } => {
                if caller.user_id != self.user_id {
                    return Err(OrderError::Unauthorized(format!(
                        "{} does not own {}",
                        caller.email, self.id
                    )));
                }
                if !matches!(self.status, OrderStatus::Pending | OrderStatus::Accepted) {
                    return Err(OrderError::InvalidTransition {
                        from: self.status,
                        to: OrderStatus::Cancelled,
                    });
                }
                if ctx.clock.now() >= self.can_cancel_until {
                    return Err(OrderError::CancellationWindowExpired {
                        until: self.can_cancel_until,
                    });
                }
                self.apply(OrderStatus::Cancelled, ctx).await?;
                Ok(OrderActionResult::Cancel(self.clone()))
            }
            OrderAction::AssignDriver { driver_id, caller } => {
                if !(caller.manages(self.cafe_id) || caller.is_driver(driver_id)) {
                    return Err(OrderError::Unauthorized(format!(
                        "{} may not assign drivers to {}",
                        caller.email, self.id
                    )));
                }
                if let Some(driver) = self.driver_id() {
                    return Err(OrderError::AlreadyAssigned { driver });
                }
                if !matches!(self.status, OrderStatus::Accepted | OrderStatus::Ready) {
                    return Err(OrderError::OrderNotReady {
                        status: self.status,
                    });
                }
                let driver = ctx.drivers.engage(driver_id, self.id).await?;
                let now = ctx.clock.now();
                let binding = DriverBinding {
                    driver_id,
                    driver_email: driver.email,
                    assigned_at: now,
                    pickup_at: None,
                    deliver_at: None,
                    last_known_location: driver.location,
                };
                self.driver_binding = Some(binding.clone());
                self.updated_at = now;
                info!(order_id = %self.id, %driver_id, "Driver assigned");
                Ok(OrderActionResult::AssignDriver(binding))
            }
            OrderAction::Pickup { driver_id } => {
                self.check_bound(driver_id)?;
                if self.status != OrderStatus::Ready {
                    return Err(OrderError::OrderNotReady {
                        status: self.status,
                    });
                }
                self.apply(OrderStatus::PickedUp, ctx).await?;
                Ok(OrderActionResult::Pickup(self.clone()))
            }
            OrderAction::Deliver { driver_id } => {
                self.check_bound(driver_id)?;
                if self.status != OrderStatus::PickedUp {
                    return Err(OrderError::OrderNotReady {
                        status: self.status,
                    });
                }
                self.apply(OrderStatus::Delivered, ctx).await?;
                Ok(OrderActionResult::Deliver(self.clone()))
            }
            OrderAction::RecordLocation {
                driver_id,
                location,
            } => {
                let in_flight = self.status.is_in_flight();
                let Some(binding) = self
                    .driver_binding
                    .as_mut()
                    .filter(|binding| binding.driver_id == driver_id && in_flight)
                else {
                    return Ok(OrderActionResult::RecordLocation(false));
                };
                let stale = binding
                    .last_known_location
                    .is_some_and(|current| location.timestamp < current.timestamp);
                if !stale {
                    binding.last_known_location = Some(location);
                }
                Ok(OrderActionResult::RecordLocation(!stale))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::DriverClient;
    use crate::clock::ManualClock;
    use crate::driver_actor::{DriverAction, DriverActionResult};
    use crate::model::{CafeId, Driver, DriverStatus, ItemId, Location, OrderLine, UserId};
    use actor_framework::mock::{create_mock_client, expect_action, MockClient};
    use actor_framework::FrameworkError;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 8, 0, 0).unwrap()
    }

    fn context(clock: Arc<ManualClock>, drivers: &MockClient<Driver>) -> OrderContext {
        OrderContext {
            clock,
            cancel_grace: Duration::minutes(15),
            drivers: DriverClient::new(drivers.client()),
        }
    }

    fn driver(id: u32, active: &[OrderId]) -> Driver {
        Driver {
            id: DriverId(id),
            name: "Rui".into(),
            email: "rui@drive.test".into(),
            status: if active.is_empty() {
                DriverStatus::Idle
            } else {
                DriverStatus::Occupied
            },
            location: None,
            active_orders: active.iter().copied().collect::<BTreeSet<_>>(),
        }
    }

    async fn placed(ctx: &OrderContext) -> Order {
        let line = OrderLine {
            item_id: ItemId(1),
            name: "Flat white".into(),
            quantity: 2,
            unit_price: dec!(4.50),
            subtotal_price: dec!(9.00),
            subtotal_calories: 240,
            assignee_email: None,
        };
        let mut order = Order::from_create_params(
            OrderId(1),
            OrderCreate {
                user_id: UserId(7),
                cafe_id: CafeId(1),
                payment_ref: Some("pay_1".into()),
                items: vec![line],
            },
        )
        .unwrap();
        order.on_create(ctx).await.unwrap();
        order
    }

    fn staff() -> Caller {
        Caller::new(UserId(2), "staff@cafe.test", Role::Staff(CafeId(1)))
    }

    #[tokio::test]
    async fn creation_stamps_window_and_pickup_code() {
        let drivers = MockClient::<Driver>::new();
        let ctx = context(Arc::new(ManualClock::new(start())), &drivers);
        let order = placed(&ctx).await;

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.created_at, start());
        assert_eq!(order.can_cancel_until, start() + Duration::minutes(15));
        assert_eq!(order.total_price.to_string(), "9.00");
        assert_eq!(order.pickup_code.len(), 6);
        assert!(order
            .pickup_code
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[tokio::test]
    async fn illegal_edges_fail_before_authorization() {
        let drivers = MockClient::<Driver>::new();
        let ctx = context(Arc::new(ManualClock::new(start())), &drivers);
        let mut order = placed(&ctx).await;

        let customer = Caller::customer(UserId(7), "me@mail.test");
        let err = order
            .handle_action(
                OrderAction::Transition {
                    to: OrderStatus::PickedUp,
                    caller: customer.clone(),
                },
                &ctx,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition { .. }));

        let err = order
            .handle_action(
                OrderAction::Transition {
                    to: OrderStatus::Accepted,
                    caller: customer,
                },
                &ctx,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn cancel_window_is_exclusive_at_the_deadline() {
        let drivers = MockClient::<Driver>::new();
        let clock = Arc::new(ManualClock::new(start()));
        let ctx = context(clock.clone(), &drivers);
        let owner = Caller::customer(UserId(7), "me@mail.test");

        let mut order = placed(&ctx).await;
        clock.set(order.can_cancel_until);
        let err = order
            .handle_action(OrderAction::Cancel { caller: owner.clone() }, &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::CancellationWindowExpired { .. }));

        clock.set(order.can_cancel_until - Duration::milliseconds(1));
        let result = order
            .handle_action(OrderAction::Cancel { caller: owner }, &ctx)
            .await
            .unwrap();
        assert!(matches!(result, OrderActionResult::Cancel(o) if o.status == OrderStatus::Cancelled));
    }

    #[tokio::test]
    async fn assignment_engages_driver_and_rejects_rebinding() {
        let mut drivers = MockClient::<Driver>::new();
        drivers
            .expect_action(DriverId(3))
            .return_ok(DriverActionResult::Engage(driver(3, &[OrderId(1)])));
        let ctx = context(Arc::new(ManualClock::new(start())), &drivers);
        let mut order = placed(&ctx).await;

        let early = order
            .handle_action(
                OrderAction::AssignDriver {
                    driver_id: DriverId(3),
                    caller: staff(),
                },
                &ctx,
            )
            .await
            .unwrap_err();
        assert!(matches!(early, OrderError::OrderNotReady { status: OrderStatus::Pending }));

        order.status = OrderStatus::Accepted;
        let result = order
            .handle_action(
                OrderAction::AssignDriver {
                    driver_id: DriverId(3),
                    caller: staff(),
                },
                &ctx,
            )
            .await
            .unwrap();
        match result {
            OrderActionResult::AssignDriver(binding) => {
                assert_eq!(binding.driver_email, "rui@drive.test");
                assert_eq!(binding.assigned_at, start());
            }
            other => panic!("unexpected: {other:?}"),
        }

        let again = order
            .handle_action(
                OrderAction::AssignDriver {
                    driver_id: DriverId(5),
                    caller: staff(),
                },
                &ctx,
            )
            .await
            .unwrap_err();
        assert_eq!(again, OrderError::AlreadyAssigned { driver: DriverId(3) });
        drivers.verify();
    }

    #[tokio::test]
    async fn delivery_releases_the_driver() {
        let mut drivers = MockClient::<Driver>::new();
        drivers
            .expect_action(DriverId(3))
            .return_ok(DriverActionResult::Release(driver(3, &[])));
        let clock = Arc::new(ManualClock::new(start()));
        let ctx = context(clock.clone(), &drivers);
        let mut order = placed(&ctx).await;
        order.status = OrderStatus::PickedUp;
        order.driver_binding = Some(DriverBinding {
            driver_id: DriverId(3),
            driver_email: "rui@drive.test".into(),
            assigned_at: start(),
            pickup_at: Some(start()),
            deliver_at: None,
            last_known_location: None,
        });

        let wrong = order
            .handle_action(OrderAction::Deliver { driver_id: DriverId(4) }, &ctx)
            .await
            .unwrap_err();
        assert!(matches!(wrong, OrderError::Unauthorized(_)));

        clock.advance(Duration::minutes(20));
        let result = order
            .handle_action(OrderAction::Deliver { driver_id: DriverId(3) }, &ctx)
            .await
            .unwrap();
        let OrderActionResult::Deliver(delivered) = result else {
            panic!("unexpected result");
        };
        let binding = delivered.driver_binding.unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
        assert!(binding.pickup_at.unwrap() <= binding.deliver_at.unwrap());
        drivers.verify();
    }

    #[tokio::test]
    async fn delivery_completes_when_the_bound_driver_is_gone() {
        let (client, mut requests) = create_mock_client::<Driver>(4);
        let responder = tokio::spawn(async move {
            let (id, action, respond_to) = expect_action(&mut requests).await.unwrap();
            assert_eq!(id, DriverId(3));
            assert!(matches!(action, DriverAction::Release(OrderId(1))));
            let _ = respond_to.send(Err(FrameworkError::NotFound("driver_3".into())));
        });
        let ctx = OrderContext {
            clock: Arc::new(ManualClock::new(start())),
            cancel_grace: Duration::minutes(15),
            drivers: DriverClient::new(client),
        };
        let mut order = placed(&ctx).await;
        order.status = OrderStatus::PickedUp;
        order.driver_binding = Some(DriverBinding {
            driver_id: DriverId(3),
            driver_email: "rui@drive.test".into(),
            assigned_at: start(),
            pickup_at: Some(start()),
            deliver_at: None,
            last_known_location: None,
        });

        let result = order
            .handle_action(OrderAction::Deliver { driver_id: DriverId(3) }, &ctx)
            .await
            .unwrap();
        assert!(matches!(result, OrderActionResult::Deliver(o) if o.status == OrderStatus::Delivered));
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn orders_refuse_deletion() {
        let drivers = MockClient::<Driver>::new();
        let ctx = context(Arc::new(ManualClock::new(start())), &drivers);
        let order = placed(&ctx).await;
        let err = order.on_delete(&ctx).await.unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[tokio::test]
    async fn location_is_recorded_only_for_the_bound_driver() {
        let drivers = MockClient::<Driver>::new();
        let ctx = context(Arc::new(ManualClock::new(start())), &drivers);
        let mut order = placed(&ctx).await;
        order.status = OrderStatus::Ready;
        order.driver_binding = Some(DriverBinding {
            driver_id: DriverId(3),
            driver_email: "rui@drive.test".into(),
            assigned_at: start(),
            pickup_at: None,
            deliver_at: None,
            last_known_location: None,
        });
        let ping = |minutes| Location {
            lat: 40.7,
            lng: -74.0,
            timestamp: start() + Duration::minutes(minutes),
        };

        let other = order
            .handle_action(
                OrderAction::RecordLocation {
                    driver_id: DriverId(4),
                    location: ping(1),
                },
                &ctx,
            )
            .await
            .unwrap();
        assert!(matches!(other, OrderActionResult::RecordLocation(false)));

        for (minutes, applied) in [(5, true), (2, false), (5, true)] {
            let result = order
                .handle_action(
                    OrderAction::RecordLocation {
                        driver_id: DriverId(3),
                        location: ping(minutes),
                    },
                    &ctx,
                )
                .await
                .unwrap();
            assert!(matches!(result, OrderActionResult::RecordLocation(a) if a == applied));
        }
        let stored = order.driver_binding.unwrap().last_known_location.unwrap();
        assert_eq!(stored.timestamp, start() + Duration::minutes(5));
    }
}
