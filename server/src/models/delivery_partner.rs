// server/src/models/delivery_partner.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

pub const PARTNER_COLUMNS: &str = "id, user_id, vehicle_type, license_number, status, created_at";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DeliveryPartner {
  pub id: i64,
  pub user_id: i64,
  pub vehicle_type: String,
  pub license_number: String,
  pub status: String,
  pub created_at: DateTime<Utc>,
}
