// server/src/models/order.rs

use crate::errors::AppError;
use crate::models::user::Role;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Builds `#GOEATS-<YYYYMMDD>-<n>` where `n` is `current_max_id + 1`, zero-padded to five digits.
pub fn format_order_number(date: NaiveDate, current_max_id: i64) -> String {
  format!("#GOEATS-{}-{:05}", date.format("%Y%m%d"), current_max_id + 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
  Pending,
  Placed,
  Accepted,
  Preparing,
  ReadyForPickup,
  PickedUp,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Placed => "placed",
      OrderStatus::Accepted => "accepted",
      OrderStatus::Preparing => "preparing",
      OrderStatus::ReadyForPickup => "ready_for_pickup",
      OrderStatus::PickedUp => "picked_up",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  /// The role that drives `self -> next`, or `None` if the move is not allowed at all.
  pub fn transition_actor(self, next: OrderStatus) -> Option<Role> {
    use OrderStatus::*;
    match (self, next) {
      (Placed, Accepted) | (Placed, Cancelled) | (Accepted, Preparing) | (Preparing, ReadyForPickup) => {
        Some(Role::Restaurant)
      }
      (ReadyForPickup, PickedUp) | (PickedUp, Delivered) => Some(Role::Partner),
      _ => None,
    }
  }

  /// Whether `role` may move an order from `self` to `next`. Admins may make any allowed move.
  pub fn can_transition(self, next: OrderStatus, role: Role) -> bool {
    match self.transition_actor(next) {
      Some(actor) => role == Role::Admin || role == actor,
      None => false,
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(match s {
      "pending" => OrderStatus::Pending,
      "placed" => OrderStatus::Placed,
      "accepted" => OrderStatus::Accepted,
      "preparing" => OrderStatus::Preparing,
      "ready_for_pickup" => OrderStatus::ReadyForPickup,
      "picked_up" => OrderStatus::PickedUp,
      "delivered" => OrderStatus::Delivered,
      "cancelled" => OrderStatus::Cancelled,
      other => return Err(AppError::Validation(format!("Unknown order status '{}'.", other))),
    })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Pending,
  Success,
  Failed,
}

impl PaymentStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      PaymentStatus::Pending => "pending",
      PaymentStatus::Success => "success",
      PaymentStatus::Failed => "failed",
    }
  }
}

impl fmt::Display for PaymentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

pub const ORDER_COLUMNS: &str = "id, order_number, customer_id, restaurant_id, address_id, partner_id, subtotal, \
  tax_amount, delivery_fee, total_amount, payment_method, payment_status, order_status, placed_at, updated_at";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: i64,
  pub order_number: String,
  pub customer_id: i64,
  pub restaurant_id: i64,
  pub address_id: i64,
  pub partner_id: Option<i64>,
  pub subtotal: Decimal,
  pub tax_amount: Decimal,
  pub delivery_fee: Decimal,
  pub total_amount: Decimal,
  pub payment_method: String,
  pub payment_status: String,
  pub order_status: String,
  pub placed_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn order_number_uses_next_id_and_compact_date() {
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    assert_eq!(format_order_number(date, 41), "#GOEATS-20240601-00042");
    assert_eq!(format_order_number(date, 0), "#GOEATS-20240601-00001");
  }

  #[test]
  fn order_number_grows_past_five_digits() {
    let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
    assert_eq!(format_order_number(date, 123_456), "#GOEATS-20251231-123457");
  }

  #[test]
  fn restaurant_drives_kitchen_transitions() {
    assert!(OrderStatus::Placed.can_transition(OrderStatus::Accepted, Role::Restaurant));
    assert!(OrderStatus::Placed.can_transition(OrderStatus::Cancelled, Role::Restaurant));
    assert!(OrderStatus::Accepted.can_transition(OrderStatus::Preparing, Role::Restaurant));
    assert!(OrderStatus::Preparing.can_transition(OrderStatus::ReadyForPickup, Role::Restaurant));
    assert!(!OrderStatus::ReadyForPickup.can_transition(OrderStatus::PickedUp, Role::Restaurant));
  }

  #[test]
  fn partner_drives_delivery_transitions() {
    assert!(OrderStatus::ReadyForPickup.can_transition(OrderStatus::PickedUp, Role::Partner));
    assert!(OrderStatus::PickedUp.can_transition(OrderStatus::Delivered, Role::Partner));
    assert!(!OrderStatus::Placed.can_transition(OrderStatus::Accepted, Role::Partner));
  }

  #[test]
  fn admin_may_only_make_allowed_moves() {
    assert!(OrderStatus::PickedUp.can_transition(OrderStatus::Delivered, Role::Admin));
    assert!(!OrderStatus::Delivered.can_transition(OrderStatus::Placed, Role::Admin));
    assert!(!OrderStatus::Pending.can_transition(OrderStatus::Placed, Role::Admin));
  }

  #[test]
  fn customers_cannot_move_orders() {
    assert!(!OrderStatus::Placed.can_transition(OrderStatus::Cancelled, Role::Customer));
  }

  #[test]
  fn status_strings_round_trip_through_from_str() {
    for status in [OrderStatus::ReadyForPickup, OrderStatus::PickedUp, OrderStatus::Cancelled] {
      assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
    }
    assert!("shipped".parse::<OrderStatus>().is_err());
  }
}
