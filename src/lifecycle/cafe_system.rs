use crate::clients::{CartClient, CatalogClient, CatalogLookup, DeliveryClient, DriverClient, OrderClient};
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::order_actor::OrderContext;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

/// Starts and stops every actor of the engine.
///
/// Actors are created first and wired when they are spawned: the order actor receives the
/// driver client and the clock as its context, and every client that consults the catalog
/// shares one [`CatalogLookup`].
///
/// # Example
///
/// ```no_run
/// use cafe_orders::clock::SystemClock;
/// use cafe_orders::config::EngineConfig;
/// use cafe_orders::lifecycle::CafeSystem;
/// use std::sync::Arc;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = EngineConfig::load(None)?;
/// let system = CafeSystem::new(&config, Arc::new(SystemClock));
/// // ... system.carts, system.orders, system.delivery ...
/// system.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct CafeSystem {
    pub catalog: CatalogClient,
    pub carts: CartClient,
    pub orders: OrderClient,
    pub drivers: DriverClient,
    pub delivery: DeliveryClient,
    handles: Vec<JoinHandle<()>>,
}

impl CafeSystem {
    /// Spawns all actors. Must be called inside a Tokio runtime.
    pub fn new(config: &EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let buffer = config.mailbox_size;
        let lookup = config.lookup_policy();

        let (cafe_actor, cafe_client) = crate::catalog_actor::new_cafes(buffer);
        let (item_actor, item_client) = crate::catalog_actor::new_items(buffer);
        let (cart_pool, cart_clients) = crate::cart_actor::new(config.cart_shards, buffer);
        let (driver_actor, driver_client) = crate::driver_actor::new(buffer);
        let (order_actor, order_client) = crate::order_actor::new(buffer);

        let catalog = CatalogClient::new(item_client, cafe_client);
        let drivers = DriverClient::new(driver_client);
        let lookup_source: Arc<dyn CatalogLookup> = Arc::new(catalog.clone());

        let mut handles = vec![
            tokio::spawn(cafe_actor.run(())),
            tokio::spawn(item_actor.run(())),
            tokio::spawn(driver_actor.run(())),
        ];
        handles.extend(cart_pool.spawn(()));
        handles.push(tokio::spawn(order_actor.run(OrderContext {
            clock,
            cancel_grace: config.cancel_grace(),
            drivers: drivers.clone(),
        })));

        let carts = CartClient::new(cart_clients, lookup_source.clone(), lookup);
        let orders = OrderClient::new(
            order_client.clone(),
            carts.clone(),
            lookup_source.clone(),
            lookup,
            config.checkout_retries,
            config.revenue_policy,
        );
        let delivery = DeliveryClient::new(order_client, drivers.clone(), lookup_source, lookup);

        info!(
            cart_shards = config.cart_shards,
            actors = handles.len(),
            "Cafe system started"
        );
        Self {
            catalog,
            carts,
            orders,
            drivers,
            delivery,
            handles,
        }
    }

    /// Drops every client, then waits for each actor to drain its mailbox and stop.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        info!("Shutting down cafe system...");
        let Self {
            catalog,
            carts,
            orders,
            drivers,
            delivery,
            handles,
        } = self;
        drop((catalog, carts, orders, drivers, delivery));

        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Actor task failed");
                return Err(e);
            }
        }
        info!("Cafe system shutdown complete.");
        Ok(())
    }
}
