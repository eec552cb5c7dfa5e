// server/src/web/handlers/address_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::{Address, Role};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::response;

#[derive(Deserialize, Debug)]
pub struct NewAddressPayload {
  pub label: String,
  pub line1: String,
  pub line2: Option<String>,
  pub city: String,
  pub postcode: String,
}

impl NewAddressPayload {
  fn validate(&self) -> Result<(), AppError> {
    let required = [
      ("label", &self.label),
      ("line1", &self.line1),
      ("city", &self.city),
      ("postcode", &self.postcode),
    ];
    match required.iter().find(|(_, v)| v.trim().is_empty()) {
      Some((field, _)) => Err(AppError::Validation(format!("{} is required.", field))),
      None => Ok(()),
    }
  }
}

#[instrument(name = "handler::create_address", skip(app_state, payload), fields(user_id = auth_user.user_id))]
pub async fn create_address_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<NewAddressPayload>,
) -> Result<HttpResponse, AppError> {
  auth_user.require(Role::Customer)?;
  payload.validate()?;

  let address = sqlx::query_as::<_, Address>(
    "INSERT INTO addresses (customer_id, label, line1, line2, city, postcode) VALUES ($1, $2, $3, $4, $5, $6) \
     RETURNING id, customer_id, label, line1, line2, city, postcode, created_at",
  )
  .bind(auth_user.user_id)
  .bind(payload.label.trim())
  .bind(payload.line1.trim())
  .bind(payload.line2.as_deref())
  .bind(payload.city.trim())
  .bind(payload.postcode.trim())
  .fetch_one(&app_state.db_pool)
  .await?;

  info!(address_id = address.id, "Address saved.");
  Ok(response::created("Address saved.", address))
}

#[instrument(name = "handler::list_addresses", skip(app_state), fields(user_id = auth_user.user_id))]
pub async fn list_addresses_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  auth_user.require(Role::Customer)?;
  let addresses = sqlx::query_as::<_, Address>(
    "SELECT id, customer_id, label, line1, line2, city, postcode, created_at \
     FROM addresses WHERE customer_id = $1 ORDER BY id",
  )
  .bind(auth_user.user_id)
  .fetch_all(&app_state.db_pool)
  .await?;
  Ok(response::ok("Addresses retrieved.", addresses))
}
