//! # ActorEntity Trait
//!
//! The contract a resource type implements to be owned by a [`ResourceActor`](crate::ResourceActor).
//! Associated types pin down the id, the create/update DTOs, the custom actions and their
//! results, the injected runtime context and the entity's own error type, so a cart action
//! can never be sent to an order actor.
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::on_create`] and [`ActorEntity::on_delete`] default to `Ok(())`.
//! - [`ActorEntity::materialize`] defaults to `None`. Entities keyed by an external id
//!   (a cart keyed by its owner) return a fresh value here so the first action on an
//!   unknown id creates the entity instead of failing with `NotFound`.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by `ResourceActor`.
///
/// # Async & Context
/// Hooks are `#[async_trait]` and receive the `Context` handed to `run()`. Dependencies are
/// bound late: the actor is constructed first and wired when it starts.
///
/// # Atomicity
/// The actor runs `on_update` and `handle_action` against a clone of the stored entity and
/// writes the clone back only when the hook returns `Ok`. A hook may therefore mutate
/// `self` freely before discovering an error.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this entity.
    /// Must be convertible from u32 for automatic ID generation.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Enum representing resource-specific operations.
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// One error enum per actor, shared by every hook.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full Entity from the ID and Payload.
    /// This is called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Builds the initial value for an id that has never been stored.
    fn materialize(_id: &Self::Id) -> Option<Self> {
        None
    }

    // --- Lifecycle Hooks (Async) ---

    /// Called after construction and before the entity is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the entity is removed from the system.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a custom resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
