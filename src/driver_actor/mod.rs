//! # Driver Actor
//!
//! Driver records, their availability and their latest position. Which order a driver is
//! bound to is recorded on the order; the driver keeps the set of in-flight orders so a
//! location ping can be forwarded to each of them.
//!
//! - [`entity`]: `ActorEntity` for [`Driver`]
//! - [`actions`]: [`DriverAction`] and [`DriverActionResult`]
//! - [`error`]: [`DriverError`]

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::Driver;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates the driver actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Driver>, ResourceClient<Driver>) {
    ResourceActor::new(buffer_size)
}
