//! System wiring.

pub mod cafe_system;

pub use cafe_system::CafeSystem;
