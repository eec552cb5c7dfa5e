// server/src/models/address.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Address {
  pub id: i64,
  pub customer_id: i64,
  pub label: String,
  pub line1: String,
  pub line2: Option<String>,
  pub city: String,
  pub postcode: String,
  pub created_at: DateTime<Utc>,
}
