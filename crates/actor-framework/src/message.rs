//! # Generic Messages
//!
//! The request envelope exchanged between `ResourceClient` and `ResourceActor`.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// A read-only predicate evaluated inside the actor by [`ResourceRequest::Find`].
///
/// Clones share the predicate, so one filter can be sent to every shard of a pool.
pub struct Filter<T>(Arc<dyn Fn(&T) -> bool + Send + Sync>);

impl<T> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Filter<T> {
    pub fn new(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Matches every entity.
    pub fn all() -> Self {
        Self::new(|_| true)
    }

    pub fn matches(&self, entity: &T) -> bool {
        (self.0)(entity)
    }
}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter(..)")
    }
}

/// Internal message type sent to the actor to request operations.
///
/// The variants are the CRUD lifecycle of a resource plus two extensions:
///
/// - **Create / Get / Update / Delete**: standard lifecycle on one entity.
/// - **Action**: a resource-specific [`ActorEntity::Action`] on one entity.
/// - **Find**: a snapshot of every stored entity accepted by a [`Filter`].
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    Find {
        filter: Filter<T>,
        respond_to: Response<Vec<T>>,
    },
}
