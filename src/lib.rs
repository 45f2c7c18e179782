//! # Cafe Orders
//!
//! The order and cart lifecycle engine of a cafe ordering platform, built on
//! [`actor_framework`].
//!
//! ## Components
//!
//! - **[catalog_actor]**: cafes and menu items, read by everything else through
//!   [`CatalogLookup`](clients::CatalogLookup).
//! - **[cart_actor]**: one cart per user on a sharded pool, mutated through
//!   [`CartClient`](clients::CartClient).
//! - **[order_actor]**: immutable order snapshots plus the status state machine, driven by
//!   [`OrderClient`](clients::OrderClient).
//! - **[driver_actor]**: drivers and their availability; bindings between drivers and orders
//!   are managed by [`DeliveryClient`](clients::DeliveryClient).
//! - **[aggregation]**: pure cart summaries and cafe analytics.
//! - **[lifecycle]**: [`CafeSystem`](lifecycle::CafeSystem) wires and shuts down all of the above.
//!
//! Identity is supplied by the caller as a [`Caller`](model::Caller); the engine only
//! authorizes.

pub mod aggregation;
pub mod cart_actor;
pub mod catalog_actor;
pub mod clients;
pub mod clock;
pub mod config;
pub mod driver_actor;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
