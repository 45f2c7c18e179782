//! Pure read-side computations. Nothing here touches an actor; callers collect the inputs.

pub mod analytics;
pub mod cart_summary;
pub mod intake;

pub use analytics::{cafe_analytics, CafeAnalytics, TopItem, TOP_ITEMS_LIMIT};
pub use cart_summary::{summarize, CartSummary, PersonTotals};
pub use intake::{calorie_intake, counts_toward_intake, CalorieIntake};
