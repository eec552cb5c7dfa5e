// server/src/models/payment_transaction.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PaymentTransaction {
  pub id: i64,
  pub order_id: i64,
  /// The processor's charge id.
  pub transaction_ref: String,
  pub payment_mode: String,
  pub amount: Decimal,
  /// Status string as reported by the processor.
  pub status: String,
  pub created_at: DateTime<Utc>,
}
