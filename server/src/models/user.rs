// server/src/models/user.rs

use crate::errors::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Customer,
  Restaurant,
  Partner,
  Admin,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Role::Customer => "customer",
      Role::Restaurant => "restaurant",
      Role::Partner => "partner",
      Role::Admin => "admin",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "customer" => Ok(Role::Customer),
      "restaurant" => Ok(Role::Restaurant),
      "partner" => Ok(Role::Partner),
      "admin" => Ok(Role::Admin),
      other => Err(AppError::Internal(format!("Unknown role '{}' stored for user", other))),
    }
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
  pub id: i64,
  pub name: String,
  pub email: String,
  pub phone: Option<String>,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub role: String,
  pub created_at: DateTime<Utc>,
}
