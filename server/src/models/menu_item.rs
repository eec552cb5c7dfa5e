// server/src/models/menu_item.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

pub const MENU_ITEM_COLUMNS: &str =
  "id, restaurant_id, name, description, price, is_available, created_at, updated_at";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MenuItem {
  pub id: i64,
  pub restaurant_id: i64,
  pub name: String,
  pub description: Option<String>,
  pub price: Decimal,
  pub is_available: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
