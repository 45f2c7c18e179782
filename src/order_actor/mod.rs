//! # Order Actor
//!
//! Placed orders and their status machine. All orders live in one actor: every
//! read-check-write on an order runs inside `handle_action`, so a transition decided there
//! cannot be interleaved with another request for the same order.
//!
//! The actor context carries the clock, the cancellation grace period and the driver client
//! used to engage and release drivers as bindings change.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::DriverClient;
use crate::clock::Clock;
use crate::model::Order;
use actor_framework::{ResourceActor, ResourceClient};
use std::sync::Arc;

/// Dependencies injected into the order actor when it starts.
#[derive(Clone)]
pub struct OrderContext {
    pub clock: Arc<dyn Clock>,
    pub cancel_grace: chrono::Duration,
    pub drivers: DriverClient,
}

/// Creates the order actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, ResourceClient<Order>) {
    ResourceActor::new(buffer_size)
}
