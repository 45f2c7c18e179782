//! # Cart Actor
//!
//! One cart per user, held on a [`ResourcePool`] of cart actors routed by owner. Requests for
//! the same user land on the same shard and are applied one at a time; users on different
//! shards never share a mailbox.
//!
//! - [`entity`]: `ActorEntity` for [`Cart`]
//! - [`actions`]: [`CartAction`] and [`CartActionResult`]
//! - [`error`]: [`CartError`]

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::Cart;
use actor_framework::{PooledClient, ResourcePool};

/// Creates the cart pool and its client.
pub fn new(shards: usize, buffer_size: usize) -> (ResourcePool<Cart>, PooledClient<Cart>) {
    ResourcePool::new(shards, buffer_size)
}
