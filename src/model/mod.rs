//! Plain data types shared by the actors, clients and aggregations.

pub mod caller;
pub mod cart;
pub mod catalog;
pub mod driver;
pub mod ids;
pub mod order;

pub use caller::*;
pub use cart::*;
pub use catalog::*;
pub use driver::*;
pub use ids::*;
pub use order::*;

use rust_decimal::Decimal;

/// Rounds to cents and fixes the scale at two places, so 23 prints as `23.00`.
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_is_rounded_to_cents() {
        assert_eq!(round_money(dec!(23)).to_string(), "23.00");
        assert_eq!(round_money(dec!(3.333)).to_string(), "3.33");
        assert_eq!(round_money(dec!(0.125)), dec!(0.12));
    }
}
