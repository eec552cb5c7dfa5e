// server/src/models/order_item.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// A line item. `price` is the unit price at the time the order was placed.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
  pub id: i64,
  pub order_id: i64,
  pub menu_item_id: i64,
  pub qty: i32,
  pub price: Decimal,
}
