//! # Catalog Client
//!
//! [`CatalogLookup`] is the read-only contract the engine consumes. [`CatalogClient`]
//! implements it over the cafe and menu-item actors and adds the administrative operations
//! used to seed and edit the catalog.
//!
//! Lookups are the one place the engine waits on a collaborator, so callers wrap them in
//! [`LookupPolicy::run`]: a deadline per attempt and a bounded number of retries.

use crate::catalog_actor::CatalogError;
use crate::model::{
    Cafe, CafeCreate, CafeId, CafeUpdate, ItemId, MenuItem, MenuItemCreate, MenuItemUpdate,
};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// `Ok(None)` when the item does not exist.
    async fn resolve_item(&self, id: ItemId) -> Result<Option<MenuItem>, CatalogError>;

    async fn resolve_cafe(&self, id: CafeId) -> Result<Option<Cafe>, CatalogError>;
}

/// Deadline and retry budget for catalog lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupPolicy {
    pub timeout: Duration,
    /// Attempts after the first one.
    pub retries: u32,
}

impl LookupPolicy {
    /// Runs `lookup` until it succeeds, fails permanently, or the budget is spent.
    ///
    /// Each attempt is cut off after `timeout`. Timeouts and `Unavailable` errors are
    /// retried; anything else is returned immediately.
    pub async fn run<T, F, Fut>(&self, mut lookup: F) -> Result<T, CatalogError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CatalogError>>,
    {
        let attempts = self.retries + 1;
        let mut last = CatalogError::Timeout { attempts };
        for attempt in 1..=attempts {
            match tokio::time::timeout(self.timeout, lookup()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) if e.is_transient() => {
                    warn!(attempt, error = %e, "Catalog lookup failed");
                    last = e;
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    warn!(attempt, timeout_ms = self.timeout.as_millis() as u64, "Catalog lookup timed out");
                    last = CatalogError::Timeout { attempts };
                }
            }
        }
        Err(last)
    }
}

/// Resolves an item under `policy`.
pub async fn resolve_with_deadline(
    catalog: &dyn CatalogLookup,
    id: ItemId,
    policy: LookupPolicy,
) -> Result<Option<MenuItem>, CatalogError> {
    policy.run(move || catalog.resolve_item(id)).await
}

/// Client for the cafe and menu-item actors.
#[derive(Clone)]
pub struct CatalogClient {
    items: ResourceClient<MenuItem>,
    cafes: ResourceClient<Cafe>,
}

fn map_framework(e: FrameworkError) -> CatalogError {
    e.into_entity::<CatalogError>().unwrap_or_else(|e| match e {
        FrameworkError::NotFound(id) => CatalogError::NotFound(id),
        other => CatalogError::Unavailable(other.to_string()),
    })
}

impl CatalogClient {
    pub fn new(items: ResourceClient<MenuItem>, cafes: ResourceClient<Cafe>) -> Self {
        Self { items, cafes }
    }

    #[instrument(skip(self))]
    pub async fn create_cafe(&self, params: CafeCreate) -> Result<Cafe, CatalogError> {
        debug!("Sending request");
        let id = self.cafes.create(params).await.map_err(map_framework)?;
        let cafe = self
            .cafes
            .get(id)
            .await
            .map_err(map_framework)?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        info!(cafe_id = %id, "Cafe created");
        Ok(cafe)
    }

    #[instrument(skip(self))]
    pub async fn update_cafe(&self, id: CafeId, update: CafeUpdate) -> Result<Cafe, CatalogError> {
        debug!("Sending request");
        self.cafes.update(id, update).await.map_err(map_framework)
    }

    /// Adds an item to an existing cafe's menu.
    #[instrument(skip(self))]
    pub async fn create_item(&self, params: MenuItemCreate) -> Result<MenuItem, CatalogError> {
        debug!("Sending request");
        if self.resolve_cafe(params.cafe_id).await?.is_none() {
            return Err(CatalogError::NotFound(params.cafe_id.to_string()));
        }
        let id = self.items.create(params).await.map_err(map_framework)?;
        let item = self
            .items
            .get(id)
            .await
            .map_err(map_framework)?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        info!(item_id = %id, "Menu item created");
        Ok(item)
    }

    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        id: ItemId,
        update: MenuItemUpdate,
    ) -> Result<MenuItem, CatalogError> {
        debug!("Sending request");
        let item = self.items.update(id, update).await.map_err(map_framework)?;
        info!(item_id = %id, price = %item.price, active = item.active, "Menu item updated");
        Ok(item)
    }
}

#[async_trait]
impl CatalogLookup for CatalogClient {
    async fn resolve_item(&self, id: ItemId) -> Result<Option<MenuItem>, CatalogError> {
        self.items.get(id).await.map_err(map_framework)
    }

    async fn resolve_cafe(&self, id: CafeId) -> Result<Option<Cafe>, CatalogError> {
        self.cafes.get(id).await.map_err(map_framework)
    }
}

#[async_trait]
impl ActorClient<MenuItem> for CatalogClient {
    type Error = CatalogError;

    fn inner(&self) -> &ResourceClient<MenuItem> {
        &self.items
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        map_framework(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn policy(retries: u32) -> LookupPolicy {
        LookupPolicy {
            timeout: Duration::from_millis(20),
            retries,
        }
    }

    #[tokio::test]
    async fn slow_lookups_time_out_after_bounded_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<(), _> = policy(1)
            .run(|| {
                counter.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(())
                }
            })
            .await;
        assert_eq!(result, Err(CatalogError::Timeout { attempts: 2 }));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn transient_failure_is_retried_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result = policy(1)
            .run(|| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(CatalogError::Unavailable("warming up".into()))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;
        assert_eq!(result, Ok(1));
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<(), _> = policy(3)
            .run(|| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(CatalogError::Validation("bad id".into())) }
            })
            .await;
        assert!(matches!(result, Err(CatalogError::Validation(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
