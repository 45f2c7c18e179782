//! Per-person totals for a shared cart.

use crate::model::{normalize_email, round_money, CartItem, CartItemId, ItemId, MenuItem};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonTotals {
    pub calories: u64,
    pub price: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    /// Keyed by normalized email; unassigned lines count for the owner.
    pub by_person: BTreeMap<String, PersonTotals>,
    pub total_calories: u64,
    pub total_price: Decimal,
    /// Lines left out because their item is missing, inactive or could not be looked up.
    pub unavailable_items: Vec<CartItemId>,
}

/// Totals `lines` against the items in `resolved`.
///
/// A line counts only if its item is present in `resolved` and active. Prices are rounded to
/// cents after summing.
pub fn summarize(
    owner_email: &str,
    lines: &[CartItem],
    resolved: &HashMap<ItemId, MenuItem>,
) -> CartSummary {
    let owner = normalize_email(owner_email);
    let mut summary = CartSummary::default();

    for line in lines {
        let Some(item) = resolved.get(&line.item_id).filter(|item| item.active) else {
            summary.unavailable_items.push(line.id);
            continue;
        };
        let price = item.price * Decimal::from(line.quantity);
        let calories = u64::from(item.calories) * u64::from(line.quantity);

        let person = line
            .assignee_email
            .as_deref()
            .map(normalize_email)
            .unwrap_or_else(|| owner.clone());
        let totals = summary.by_person.entry(person).or_default();
        totals.price += price;
        totals.calories += calories;

        summary.total_price += price;
        summary.total_calories += calories;
    }

    for totals in summary.by_person.values_mut() {
        totals.price = round_money(totals.price);
    }
    summary.total_price = round_money(summary.total_price);
    summary
}
