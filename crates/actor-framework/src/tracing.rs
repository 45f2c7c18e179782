//! # Tracing Setup
//!
//! Every actor logs through `tracing` with an `entity_type` field instead of a module path,
//! so the subscriber hides targets and prints spans inline.
//!
//! ```bash
//! RUST_LOG=info cargo run     # state changes only
//! RUST_LOG=debug cargo run    # request payloads as well
//! RUST_LOG=cafe_orders=debug,actor_framework=warn cargo run
//! ```
//!
//! At `info` a placed order reads roughly as:
//!
//! ```text
//! INFO place_order: Action ok entity_type="Cart" id=user_1
//! INFO place_order: Created entity_type="Order" id=order_1 size=1
//! INFO place_order: Order placed order_id=order_1 total=23.00
//! ```

use tracing_subscriber::EnvFilter;

/// Installs the global compact subscriber.
///
/// The filter comes from `RUST_LOG` and falls back to `info`. Calling it more than once is
/// harmless: later calls leave the first subscriber in place.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
