//! [`ActorEntity`] implementations for [`Cafe`] and [`MenuItem`].

use super::error::CatalogError;
use crate::model::{
    Cafe, CafeCreate, CafeId, CafeUpdate, ItemId, MenuItem, MenuItemCreate, MenuItemUpdate,
};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Catalog records have no custom actions.
#[derive(Debug, Clone)]
pub enum CatalogAction {}

fn require_name(name: &str) -> Result<String, CatalogError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CatalogError::Validation("name must not be empty".into()));
    }
    Ok(name.to_string())
}

fn require_price(price: Decimal) -> Result<Decimal, CatalogError> {
    if price.is_sign_negative() {
        return Err(CatalogError::Validation(format!(
            "price must not be negative, got {price}"
        )));
    }
    Ok(price)
}

fn require_coordinates(lat: f64, lng: f64) -> Result<(), CatalogError> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(CatalogError::Validation(format!(
            "coordinates out of range: {lat}, {lng}"
        )));
    }
    Ok(())
}

#[async_trait]
impl ActorEntity for Cafe {
    type Id = CafeId;
    type Create = CafeCreate;
    type Update = CafeUpdate;
    type Action = CatalogAction;
    type ActionResult = ();
    type Context = ();
    type Error = CatalogError;

    fn from_create_params(id: CafeId, params: CafeCreate) -> Result<Self, Self::Error> {
        require_coordinates(params.lat, params.lng)?;
        Ok(Self {
            id,
            name: require_name(&params.name)?,
            lat: params.lat,
            lng: params.lng,
            active: true,
        })
    }

    async fn on_update(&mut self, update: CafeUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            self.name = require_name(&name)?;
        }
        if let Some(active) = update.active {
            self.active = active;
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: CatalogAction, _ctx: &()) -> Result<(), Self::Error> {
        match action {}
    }
}

#[async_trait]
impl ActorEntity for MenuItem {
    type Id = ItemId;
    type Create = MenuItemCreate;
    type Update = MenuItemUpdate;
    type Action = CatalogAction;
    type ActionResult = ();
    type Context = ();
    type Error = CatalogError;

    fn from_create_params(id: ItemId, params: MenuItemCreate) -> Result<Self, Self::Error> {
        Ok(Self {
            id,
            cafe_id: params.cafe_id,
            name: require_name(&params.name)?,
            price: require_price(params.price)?,
            calories: params.calories,
            active: true,
        })
    }

    async fn on_update(&mut self, update: MenuItemUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            self.name = require_name(&name)?;
        }
        if let Some(price) = update.price {
            self.price = require_price(price)?;
        }
        if let Some(calories) = update.calories {
            self.calories = calories;
        }
        if let Some(active) = update.active {
            self.active = active;
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: CatalogAction, _ctx: &()) -> Result<(), Self::Error> {
        match action {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn negative_prices_are_rejected() {
        let params = MenuItemCreate {
            cafe_id: CafeId(1),
            name: "Latte".into(),
            price: dec!(-1.00),
            calories: 120,
        };
        assert!(matches!(
            MenuItem::from_create_params(ItemId(1), params),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn cafe_coordinates_are_range_checked() {
        let params = CafeCreate {
            name: "Pole Cafe".into(),
            lat: 91.0,
            lng: 0.0,
        };
        assert!(Cafe::from_create_params(CafeId(1), params).is_err());
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let mut item = MenuItem::from_create_params(
            ItemId(1),
            MenuItemCreate {
                cafe_id: CafeId(1),
                name: " Scone ".into(),
                price: dec!(2.50),
                calories: 300,
            },
        )
        .unwrap();
        assert_eq!(item.name, "Scone");

        item.on_update(
            MenuItemUpdate {
                price: Some(dec!(2.75)),
                ..Default::default()
            },
            &(),
        )
        .await
        .unwrap();
        assert_eq!(item.price, dec!(2.75));
        assert_eq!(item.calories, 300);
        assert!(item.active);
    }
}
