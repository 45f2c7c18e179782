//! # Generic Actor Server
//!
//! `ResourceActor` owns the store for one entity type and processes every request
//! sequentially in its own Tokio task. Exclusive ownership of the store inside that task is
//! what serializes concurrent callers: two requests for the same entity can never interleave.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that manages a collection of entities.
///
/// # Usage Pattern
///
/// 1.  **Create**: Call `ResourceActor::new()` to get the `actor` (server) and `client` (interface).
/// 2.  **Wire**: Pass dependencies (other clients) into `actor.run(context)`.
/// 3.  **Run**: Spawn the actor's run loop in a background task.
///
/// ```rust
/// use actor_framework::{ActorEntity, ResourceActor};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Counter { id: u32, hits: u32 }
/// #[derive(Debug)] struct CounterCreate;
/// #[derive(Debug)] struct CounterUpdate;
/// #[derive(Debug)] enum CounterAction { Hit }
/// #[derive(Debug, thiserror::Error)] #[error("counter error")] struct CounterError;
///
/// #[async_trait]
/// impl ActorEntity for Counter {
///     type Id = u32;
///     type Create = CounterCreate;
///     type Update = CounterUpdate;
///     type Action = CounterAction;
///     type ActionResult = u32;
///     type Context = ();
///     type Error = CounterError;
///
///     fn from_create_params(id: u32, _: CounterCreate) -> Result<Self, Self::Error> {
///         Ok(Self { id, hits: 0 })
///     }
///     async fn on_update(&mut self, _: CounterUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, _: CounterAction, _: &()) -> Result<u32, Self::Error> {
///         self.hits += 1;
///         Ok(self.hits)
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ResourceActor::<Counter>::new(10);
///     tokio::spawn(actor.run(()));
///
///     let id = client.create(CounterCreate).await.unwrap();
///     assert_eq!(client.perform_action(id, CounterAction::Hit).await.unwrap(), 1);
/// }
/// ```
///
/// # Operations
///
/// * **Create**: next id from the counter, `from_create_params`, `on_create`, insert.
/// * **Get**: clone of the stored entity, or `None`.
/// * **Update** / **Action**: run the hook on a draft clone and commit the draft only on
///   success. For an unknown id, [`ActorEntity::materialize`] supplies the draft; if it
///   returns `None` the request fails with `NotFound`.
/// * **Delete**: `on_delete`, then remove.
/// * **Find**: clones of every entity accepted by the filter, in no particular order.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id: u32,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// `buffer_size` is the mailbox capacity; senders wait while it is full.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id: 1,
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Runs the actor's event loop, processing messages until the channel closes.
    ///
    /// The `context` is handed to every entity hook.
    pub async fn run(mut self, context: T::Context) {
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let id = T::Id::from(self.next_id);
                    self.next_id += 1;

                    match T::from_create_params(id.clone(), params) {
                        Ok(mut item) => {
                            if let Err(e) = item.on_create(&context).await {
                                warn!(entity_type, error = %e, "on_create failed");
                                let _ =
                                    respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                                continue;
                            }
                            self.store.insert(id.clone(), item);
                            info!(entity_type, %id, size = self.store.len(), "Created");
                            let _ = respond_to.send(Ok(id));
                        }
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let Some(mut draft) = self.draft(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    if let Err(e) = draft.on_update(update, &context).await {
                        warn!(entity_type, %id, error = %e, "Update failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    self.store.insert(id.clone(), draft.clone());
                    info!(entity_type, %id, "Updated");
                    let _ = respond_to.send(Ok(draft));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    if let Some(item) = self.store.get(&id) {
                        if let Err(e) = item.on_delete(&context).await {
                            warn!(entity_type, %id, error = %e, "on_delete failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                        self.store.remove(&id);
                        info!(entity_type, %id, size = self.store.len(), "Deleted");
                        let _ = respond_to.send(Ok(()));
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let Some(mut draft) = self.draft(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    match draft.handle_action(action, &context).await {
                        Ok(result) => {
                            self.store.insert(id.clone(), draft);
                            info!(entity_type, %id, "Action ok");
                            let _ = respond_to.send(Ok(result));
                        }
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Action failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::Find { filter, respond_to } => {
                    let matches: Vec<T> = self
                        .store
                        .values()
                        .filter(|item| filter.matches(item))
                        .cloned()
                        .collect();
                    debug!(entity_type, found = matches.len(), "Find");
                    let _ = respond_to.send(Ok(matches));
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }

    fn draft(&self, id: &T::Id) -> Option<T> {
        self.store.get(id).cloned().or_else(|| T::materialize(id))
    }
}
