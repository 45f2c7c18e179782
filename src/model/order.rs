//! Orders, their status machine and the driver binding.

use super::ids::{CafeId, DriverId, ItemId, OrderId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Declined,
    Ready,
    PickedUp,
    Cancelled,
    Refunded,
    Delivered,
}

/// Which statuses count towards realized revenue.
///
/// Dashboards have disagreed on this; `Broad` is the default until product confirms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenuePolicy {
    /// ACCEPTED, READY, PICKED_UP and DELIVERED.
    #[default]
    Broad,
    DeliveredOnly,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::Declined,
        OrderStatus::Ready,
        OrderStatus::PickedUp,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
        OrderStatus::Delivered,
    ];

    /// The transition table. Every edge not listed here is illegal, including self-loops.
    pub fn allowed_targets(self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Accepted, Declined, Cancelled],
            Accepted => &[Ready, Cancelled],
            Ready => &[PickedUp],
            PickedUp => &[Delivered],
            Delivered => &[Refunded],
            Cancelled | Declined | Refunded => &[],
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.allowed_targets().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }

    /// Derived, never stored.
    pub fn is_revenue_eligible(self, policy: RevenuePolicy) -> bool {
        use OrderStatus::*;
        match policy {
            RevenuePolicy::Broad => matches!(self, Accepted | Ready | PickedUp | Delivered),
            RevenuePolicy::DeliveredOnly => self == Delivered,
        }
    }

    /// Statuses in which a bound driver still has work to do on the order.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            OrderStatus::Accepted | OrderStatus::Ready | OrderStatus::PickedUp
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::Declined => "DECLINED",
            OrderStatus::Ready => "READY",
            OrderStatus::PickedUp => "PICKED_UP",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Refunded => "REFUNDED",
            OrderStatus::Delivered => "DELIVERED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

/// Parses the wire literal, case-insensitively, as the status query parameter arrives.
impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A position reported by a driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverBinding {
    pub driver_id: DriverId,
    pub driver_email: String,
    pub assigned_at: DateTime<Utc>,
    pub pickup_at: Option<DateTime<Utc>>,
    pub deliver_at: Option<DateTime<Utc>>,
    /// Latest ping only; older pings are overwritten.
    pub last_known_location: Option<Location>,
}

/// A frozen line: price and calories are copied from the catalog at placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal_price: Decimal,
    pub subtotal_calories: u64,
    pub assignee_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub cafe_id: CafeId,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderLine>,
    pub total_price: Decimal,
    pub total_calories: u64,
    pub can_cancel_until: DateTime<Utc>,
    pub payment_ref: Option<String>,
    /// Six uppercase hex characters shown to the customer at the counter.
    pub pickup_code: String,
    pub driver_binding: Option<DriverBinding>,
}

#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: UserId,
    pub cafe_id: CafeId,
    pub payment_ref: Option<String>,
    pub items: Vec<OrderLine>,
}

/// Orders are changed only through actions; the empty update exists for the CRUD surface.
#[derive(Debug, Clone)]
pub struct OrderUpdate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInfo {
    pub driver_id: DriverId,
    pub driver_email: String,
}

/// Summary line: the frozen values without pricing internals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemSummary {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: u32,
    pub subtotal_price: Decimal,
    pub subtotal_calories: u64,
}

/// The itemized detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub cafe_id: CafeId,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub total_price: Decimal,
    pub total_calories: u64,
    pub can_cancel_until: DateTime<Utc>,
    pub items: Vec<OrderItemSummary>,
    pub driver_info: Option<DriverInfo>,
}

impl Order {
    pub fn driver_id(&self) -> Option<DriverId> {
        self.driver_binding.as_ref().map(|binding| binding.driver_id)
    }

    pub fn is_bound_to(&self, driver: DriverId) -> bool {
        self.driver_id() == Some(driver)
    }

    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            id: self.id,
            cafe_id: self.cafe_id,
            status: self.status,
            created_at: self.created_at,
            total_price: self.total_price,
            total_calories: self.total_calories,
            can_cancel_until: self.can_cancel_until,
            items: self
                .items
                .iter()
                .map(|line| OrderItemSummary {
                    item_id: line.item_id,
                    name: line.name.clone(),
                    quantity: line.quantity,
                    subtotal_price: line.subtotal_price,
                    subtotal_calories: line.subtotal_calories,
                })
                .collect(),
            driver_info: self.driver_binding.as_ref().map(|binding| DriverInfo {
                driver_id: binding.driver_id,
                driver_email: binding.driver_email.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_matches_lifecycle() {
        use OrderStatus::*;
        let legal = [
            (Pending, Accepted),
            (Pending, Declined),
            (Pending, Cancelled),
            (Accepted, Ready),
            (Accepted, Cancelled),
            (Ready, PickedUp),
            (PickedUp, Delivered),
            (Delivered, Refunded),
        ];
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    legal.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
        assert!(Cancelled.is_terminal() && Declined.is_terminal() && Refunded.is_terminal());
        assert!(!Pending.can_transition_to(PickedUp));
    }

    #[test]
    fn revenue_eligibility_depends_on_policy() {
        use OrderStatus::*;
        let broad: Vec<_> = OrderStatus::ALL
            .into_iter()
            .filter(|s| s.is_revenue_eligible(RevenuePolicy::Broad))
            .collect();
        assert_eq!(broad, vec![Accepted, Ready, PickedUp, Delivered]);
        assert!(!Ready.is_revenue_eligible(RevenuePolicy::DeliveredOnly));
        assert!(Delivered.is_revenue_eligible(RevenuePolicy::DeliveredOnly));
    }

    #[test]
    fn statuses_use_wire_literals() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::PickedUp).unwrap(),
            "\"PICKED_UP\""
        );
        assert_eq!("picked_up".parse::<OrderStatus>().unwrap(), OrderStatus::PickedUp);
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }
}
