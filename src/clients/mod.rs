//! Domain clients over the [`ResourceClient`](actor_framework::ResourceClient)s.
//!
//! Catalog I/O and cross-actor choreography live here. Rules that read and then write a
//! single cart or order are left to the owning actor.

pub mod cart_client;
pub mod catalog_client;
pub mod delivery_client;
pub mod driver_client;
pub mod order_client;

pub use cart_client::CartClient;
pub use catalog_client::{resolve_with_deadline, CatalogClient, CatalogLookup, LookupPolicy};
pub use delivery_client::{haversine_km, DeliveryClient};
pub use driver_client::DriverClient;
pub use order_client::OrderClient;
