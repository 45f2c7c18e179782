//! Daily calorie intake per person, from the frozen lines of placed orders.

use crate::model::{normalize_email, Order, OrderStatus, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalorieIntake {
    pub date: NaiveDate,
    pub calories: u64,
}

/// Whether an order's food reached, or is still heading to, the people on it.
pub fn counts_toward_intake(status: OrderStatus) -> bool {
    !matches!(status, OrderStatus::Cancelled | OrderStatus::Declined)
}

/// Calories eaten on `day` (UTC placement date) by the person identified by `user` and
/// `email`.
///
/// A line assigned to someone counts for that assignee only; an unassigned line counts for
/// the order's owner.
pub fn calorie_intake(orders: &[Order], user: UserId, email: &str, day: NaiveDate) -> CalorieIntake {
    let wanted = normalize_email(email);
    let wanted = wanted.as_str();
    let calories = orders
        .iter()
        .filter(|order| order.created_at.date_naive() == day && counts_toward_intake(order.status))
        .flat_map(|order| {
            order.items.iter().filter(move |line| match &line.assignee_email {
                Some(assignee) => *assignee == wanted,
                None => order.user_id == user,
            })
        })
        .map(|line| line.subtotal_calories)
        .sum();
    CalorieIntake {
        date: day,
        calories,
    }
}
