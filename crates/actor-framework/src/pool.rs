//! # Keyed Actor Pool
//!
//! A single `ResourceActor` serializes every request it receives, including requests for
//! unrelated entities. `ResourcePool` runs several actors of the same entity type and routes
//! each id to exactly one of them, so requests for one id stay serialized while different ids
//! spread over independent mailboxes.
//!
//! ```rust
//! use actor_framework::{ActorEntity, Filter, ResourcePool};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)] struct Tab { owner: u32, total: u32 }
//! #[derive(Debug)] struct TabCreate;
//! #[derive(Debug)] struct TabUpdate;
//! #[derive(Debug)] enum TabAction { Add(u32) }
//! #[derive(Debug, thiserror::Error)] #[error("tab error")] struct TabError;
//!
//! #[async_trait]
//! impl ActorEntity for Tab {
//!     type Id = u32; type Create = TabCreate; type Update = TabUpdate;
//!     type Action = TabAction; type ActionResult = u32; type Context = (); type Error = TabError;
//!     fn from_create_params(owner: u32, _: TabCreate) -> Result<Self, Self::Error> {
//!         Ok(Self { owner, total: 0 })
//!     }
//!     fn materialize(owner: &u32) -> Option<Self> {
//!         Some(Self { owner: *owner, total: 0 })
//!     }
//!     async fn on_update(&mut self, _: TabUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
//!     async fn handle_action(&mut self, action: TabAction, _: &()) -> Result<u32, Self::Error> {
//!         let TabAction::Add(amount) = action;
//!         self.total += amount;
//!         Ok(self.total)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (pool, client) = ResourcePool::<Tab>::new(4, 16);
//!     pool.spawn(());
//!
//!     client.perform_action(7, TabAction::Add(3)).await.unwrap();
//!     assert_eq!(client.perform_action(7, TabAction::Add(2)).await.unwrap(), 5);
//!     assert_eq!(client.find(Filter::all()).await.unwrap().len(), 1);
//! }
//! ```
//!
//! The pool has no `create`: every shard numbers its own entities, so generated ids would
//! collide across shards. Pooled entities are keyed by an external id and come into
//! existence through [`ActorEntity::materialize`].

use crate::actor::ResourceActor;
use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::Filter;
use std::hash::{BuildHasher, RandomState};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// The unstarted actors of a pool.
pub struct ResourcePool<T: ActorEntity> {
    actors: Vec<ResourceActor<T>>,
}

impl<T: ActorEntity> ResourcePool<T> {
    /// Creates `shards` actors (at least one) with `buffer_size` mailboxes each.
    pub fn new(shards: usize, buffer_size: usize) -> (Self, PooledClient<T>) {
        let (actors, clients): (Vec<_>, Vec<_>) = (0..shards.max(1))
            .map(|_| ResourceActor::new(buffer_size))
            .unzip();
        (Self { actors }, PooledClient::from_clients(clients))
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Spawns every shard with its own clone of the context.
    pub fn spawn(self, context: T::Context) -> Vec<JoinHandle<()>>
    where
        T::Context: Clone,
    {
        self.actors
            .into_iter()
            .map(|actor| tokio::spawn(actor.run(context.clone())))
            .collect()
    }
}

/// Routes each request to the shard that owns its id.
pub struct PooledClient<T: ActorEntity> {
    shards: Arc<[ResourceClient<T>]>,
    router: RandomState,
}

impl<T: ActorEntity> Clone for PooledClient<T> {
    fn clone(&self) -> Self {
        Self {
            shards: self.shards.clone(),
            router: self.router.clone(),
        }
    }
}

impl<T: ActorEntity> PooledClient<T> {
    /// Builds a pooled client over existing clients, one per shard.
    ///
    /// With a single client every id routes to it, which is how tests put a
    /// [`MockClient`](crate::mock::MockClient) behind a pool.
    pub fn from_clients(clients: Vec<ResourceClient<T>>) -> Self {
        Self {
            shards: clients.into(),
            router: RandomState::new(),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Index of the shard owning `id`. Stable for the lifetime of this client and its clones.
    pub fn shard_of(&self, id: &T::Id) -> usize {
        match self.shards.len() {
            0 | 1 => 0,
            n => (self.router.hash_one(id) % n as u64) as usize,
        }
    }

    fn shard(&self, id: &T::Id) -> Result<&ResourceClient<T>, FrameworkError> {
        self.shards
            .get(self.shard_of(id))
            .ok_or(FrameworkError::ActorClosed)
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.shard(&id)?.get(id).await
    }

    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<T, FrameworkError> {
        self.shard(&id)?.update(id, update).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.shard(&id)?.delete(id).await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        self.shard(&id)?.perform_action(id, action).await
    }

    /// Queries every shard in turn and concatenates the matches.
    pub async fn find(&self, filter: Filter<T>) -> Result<Vec<T>, FrameworkError> {
        let mut found = Vec::new();
        for shard in self.shards.iter() {
            found.extend(shard.find(filter.clone()).await?);
        }
        Ok(found)
    }
}
