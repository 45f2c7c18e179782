//! Cafe dashboards computed from order snapshots.

use crate::model::{round_money, Order, RevenuePolicy};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const TOP_ITEMS_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopItem {
    pub name: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CafeAnalytics {
    /// Every order counts, whatever its status, by its UTC placement date.
    pub orders_per_day: BTreeMap<NaiveDate, u64>,
    /// Only revenue-eligible orders count.
    pub revenue_per_day: BTreeMap<NaiveDate, Decimal>,
    /// Best sellers by quantity across all orders, ties broken by name.
    pub top_items: Vec<TopItem>,
}

pub fn cafe_analytics(orders: &[Order], policy: RevenuePolicy) -> CafeAnalytics {
    let mut analytics = CafeAnalytics::default();
    let mut sold: HashMap<&str, u64> = HashMap::new();

    for order in orders {
        let day = order.created_at.date_naive();
        *analytics.orders_per_day.entry(day).or_default() += 1;
        if order.status.is_revenue_eligible(policy) {
            *analytics.revenue_per_day.entry(day).or_default() += order.total_price;
        }
        for line in &order.items {
            *sold.entry(line.name.as_str()).or_default() += u64::from(line.quantity);
        }
    }

    for revenue in analytics.revenue_per_day.values_mut() {
        *revenue = round_money(*revenue);
    }

    let mut top: Vec<TopItem> = sold
        .into_iter()
        .map(|(name, quantity)| TopItem {
            name: name.to_string(),
            quantity,
        })
        .collect();
    top.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.name.cmp(&b.name)));
    top.truncate(TOP_ITEMS_LIMIT);
    analytics.top_items = top;
    analytics
}
