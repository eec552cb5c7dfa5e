// server/src/models/restaurant.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Onboarding state shared by restaurants and delivery partners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
  Pending,
  Approved,
  Rejected,
}

impl ApprovalStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      ApprovalStatus::Pending => "pending",
      ApprovalStatus::Approved => "approved",
      ApprovalStatus::Rejected => "rejected",
    }
  }

  pub fn from_decision(approve: bool) -> Self {
    if approve {
      ApprovalStatus::Approved
    } else {
      ApprovalStatus::Rejected
    }
  }
}

pub const RESTAURANT_COLUMNS: &str = "id, owner_id, name, address, phone, cuisine, status, created_at";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Restaurant {
  pub id: i64,
  pub owner_id: i64,
  pub name: String,
  pub address: String,
  pub phone: Option<String>,
  pub cuisine: Option<String>,
  pub status: String,
  pub created_at: DateTime<Utc>,
}
