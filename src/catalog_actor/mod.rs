//! # Catalog Actors
//!
//! Cafes and menu items, each owned by its own [`ResourceActor`]. The engine consumes them
//! read-only through [`CatalogLookup`](crate::clients::CatalogLookup); only the
//! administrative methods on [`CatalogClient`](crate::clients::CatalogClient) mutate them.
//!
//! - [`entity`]: `ActorEntity` for [`Cafe`] and [`MenuItem`]
//! - [`error`]: [`CatalogError`]

pub mod entity;
pub mod error;

pub use entity::CatalogAction;
pub use error::*;

use crate::model::{Cafe, MenuItem};
use actor_framework::{ResourceActor, ResourceClient};

/// Creates the cafe actor and its client.
pub fn new_cafes(buffer_size: usize) -> (ResourceActor<Cafe>, ResourceClient<Cafe>) {
    ResourceActor::new(buffer_size)
}

/// Creates the menu-item actor and its client.
pub fn new_items(buffer_size: usize) -> (ResourceActor<MenuItem>, ResourceClient<MenuItem>) {
    ResourceActor::new(buffer_size)
}
