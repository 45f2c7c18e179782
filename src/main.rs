use actor_framework::tracing::setup_tracing;
use cafe_orders::clock::SystemClock;
use cafe_orders::config::EngineConfig;
use cafe_orders::lifecycle::CafeSystem;
use cafe_orders::model::{
    CafeCreate, Caller, DriverCreate, MenuItemCreate, OrderStatus, Role, UserId,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Walks one order from cart to doorstep. An optional first argument names a config file.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = EngineConfig::load(path.as_deref())?;
    let system = CafeSystem::new(&config, Arc::new(SystemClock));

    if let Err(e) = demo(&system).await {
        error!(error = %e, "Demo failed");
    }

    system.shutdown().await?;
    Ok(())
}

async fn demo(system: &CafeSystem) -> Result<(), Box<dyn std::error::Error>> {
    let cafe = system
        .catalog
        .create_cafe(CafeCreate {
            name: "Corner Roast".into(),
            lat: 40.7411,
            lng: -73.9897,
        })
        .await?;
    let latte = system
        .catalog
        .create_item(MenuItemCreate {
            cafe_id: cafe.id,
            name: "Latte".into(),
            price: Decimal::new(450, 2),
            calories: 190,
        })
        .await?;
    let bagel = system
        .catalog
        .create_item(MenuItemCreate {
            cafe_id: cafe.id,
            name: "Bagel".into(),
            price: Decimal::new(350, 2),
            calories: 280,
        })
        .await?;

    let alice = Caller::customer(UserId(1), "alice@mail.test");
    system.carts.add_item(&alice, latte.id, 2, None).await?;
    system
        .carts
        .add_item(&alice, bagel.id, 1, Some("bob@mail.test"))
        .await?;
    let summary = system.carts.summary(&alice).await?;
    info!(total = %summary.total_price, calories = summary.total_calories, people = summary.by_person.len(), "Cart summary");

    let order = system
        .orders
        .place_order(&alice, cafe.id, Some("pay_demo".into()))
        .await?;
    info!(order_id = %order.id, code = %order.pickup_code, total = %order.total_price, "Order placed");

    let staff = Caller::new(UserId(2), "barista@cornerroast.test", Role::Owner(cafe.id));
    system
        .orders
        .update_status(&staff, order.id, OrderStatus::Accepted)
        .await?;

    let driver = system
        .drivers
        .register_driver(DriverCreate {
            name: "Rui".into(),
            email: "rui@drive.test".into(),
        })
        .await?;
    system
        .delivery
        .update_location(driver.id, 40.7420, -73.9880, Utc::now())
        .await?;
    let binding = system.delivery.assign_nearest_driver(&staff, order.id).await?;
    info!(driver = %binding.driver_email, "Driver assigned");

    system
        .orders
        .update_status(&staff, order.id, OrderStatus::Ready)
        .await?;
    system.delivery.pickup(driver.id, order.id).await?;
    let delivered = system.delivery.deliver(driver.id, order.id).await?;
    info!(order_id = %delivered.id, status = %delivered.status, "Order finished");

    let analytics = system.orders.cafe_analytics(&staff, cafe.id).await?;
    info!(?analytics, "Cafe analytics");
    Ok(())
}
