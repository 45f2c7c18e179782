//! # Actor Framework
//!
//! Type-safe resource actors on Tokio. Each resource type gets an actor task that owns its
//! entities exclusively and processes requests one at a time; callers talk to it through a
//! cloneable client over an mpsc mailbox and receive replies on oneshot channels.
//!
//! ## Layers
//!
//! 1. **Entity** ([`ActorEntity`]): the domain type, its DTOs, actions and hooks.
//! 2. **Runtime** ([`ResourceActor`], [`ResourcePool`]): the message loop and its store.
//! 3. **Interface** ([`ResourceClient`], [`PooledClient`], [`ActorClient`]): typed requests.
//!
//! Business rules live in the entity hooks. Because one task owns the store, a hook that
//! reads and then writes an entity is never interleaved with another request for it, which
//! is the only locking the domain code needs.
//!
//! ## Example
//!
//! ```rust
//! use actor_framework::{ActorEntity, Filter, ResourceActor};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)]
//! struct Cafe {
//!     id: u32,
//!     name: String,
//!     open: bool,
//! }
//!
//! #[derive(Debug)] struct CafeCreate { name: String }
//! #[derive(Debug)] struct CafeUpdate { name: Option<String> }
//! #[derive(Debug)] enum CafeAction { Close }
//! #[derive(Debug, thiserror::Error)]
//! enum CafeError {
//!     #[error("cafe already closed")]
//!     AlreadyClosed,
//! }
//!
//! #[async_trait]
//! impl ActorEntity for Cafe {
//!     type Id = u32;
//!     type Create = CafeCreate;
//!     type Update = CafeUpdate;
//!     type Action = CafeAction;
//!     type ActionResult = ();
//!     type Context = ();
//!     type Error = CafeError;
//!
//!     fn from_create_params(id: u32, params: CafeCreate) -> Result<Self, Self::Error> {
//!         Ok(Self { id, name: params.name, open: true })
//!     }
//!
//!     async fn on_update(&mut self, update: CafeUpdate, _: &()) -> Result<(), Self::Error> {
//!         if let Some(name) = update.name { self.name = name; }
//!         Ok(())
//!     }
//!
//!     async fn handle_action(&mut self, action: CafeAction, _: &()) -> Result<(), Self::Error> {
//!         match action {
//!             CafeAction::Close if !self.open => Err(CafeError::AlreadyClosed),
//!             CafeAction::Close => {
//!                 self.open = false;
//!                 Ok(())
//!             }
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ResourceActor::<Cafe>::new(10);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client.create(CafeCreate { name: "Corner".into() }).await.unwrap();
//!     client.perform_action(id, CafeAction::Close).await.unwrap();
//!
//!     let err = client.perform_action(id, CafeAction::Close).await.unwrap_err();
//!     assert!(matches!(err.into_entity::<CafeError>(), Ok(CafeError::AlreadyClosed)));
//!
//!     let open = client.find(Filter::new(|c: &Cafe| c.open)).await.unwrap();
//!     assert!(open.is_empty());
//! }
//! ```
//!
//! ## Context injection
//!
//! Dependencies are handed to [`ResourceActor::run`] rather than to the constructor, so
//! actors can be created first and wired afterwards. An order actor that needs a clock and
//! a driver client declares `type Context = OrderContext` and receives it when spawned.
//!
//! ## Shutdown
//!
//! An actor's loop ends when every client clone has been dropped. Orchestrators drop their
//! clients and then await the join handles; a dependency graph between actors must stay
//! acyclic for this to terminate.
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers requests from scripted expectations; see the [`mock`] module.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod pool;
pub mod tracing;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{Filter, ResourceRequest, Response};
pub use pool::{PooledClient, ResourcePool};
