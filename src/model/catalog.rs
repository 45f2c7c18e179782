//! Cafes and menu items.
//!
//! Both implement [`ActorEntity`](actor_framework::ActorEntity) in
//! [`catalog_actor`](crate::catalog_actor). The rest of the engine treats them as read-only
//! data reached through [`CatalogLookup`](crate::clients::CatalogLookup).

use super::ids::{CafeId, ItemId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cafe {
    pub id: CafeId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct CafeCreate {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CafeUpdate {
    pub name: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: ItemId,
    pub cafe_id: CafeId,
    pub name: String,
    pub price: Decimal,
    pub calories: u32,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct MenuItemCreate {
    pub cafe_id: CafeId,
    pub name: String,
    pub price: Decimal,
    pub calories: u32,
}

/// Partial update; `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub calories: Option<u32>,
    pub active: Option<bool>,
}
