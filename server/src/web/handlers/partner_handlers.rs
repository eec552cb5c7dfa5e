// server/src/web/handlers/partner_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::db;
use crate::errors::AppError;
use crate::models::order::ORDER_COLUMNS;
use crate::models::{ApprovalStatus, Order, Role};
use crate::pipelines::contexts::{SignupCtxData, SignupKind};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::handlers::auth_handlers::run_signup;
use crate::web::response;

#[derive(Deserialize, Debug)]
pub struct RegisterPartnerPayload {
  pub name: String,
  pub email: String,
  pub phone: Option<String>,
  pub password: String,
  pub vehicle_type: String,
  pub license_number: String,
}

#[instrument(name = "handler::register_partner", skip(app_state, payload))]
pub async fn register_partner_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RegisterPartnerPayload>,
) -> Result<HttpResponse, AppError> {
  let p = payload.into_inner();
  let data = SignupCtxData::new(
    app_state.db_pool.clone(),
    SignupKind::Partner {
      vehicle_type: p.vehicle_type,
      license_number: p.license_number,
    },
    p.name,
    p.email,
    p.phone,
    p.password,
  );
  let (user, partner_id) = run_signup(&app_state, data).await?;
  info!(user_id = user.id, partner_id = ?partner_id, "Delivery partner registered, awaiting approval.");
  Ok(response::created(
    "Delivery partner registered. Deliveries can be assigned once approved.",
    json!({ "user": user, "partner_id": partner_id, "status": ApprovalStatus::Pending }),
  ))
}

#[instrument(name = "handler::partner_orders", skip(app_state), fields(user_id = auth_user.user_id))]
pub async fn partner_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  auth_user.require(Role::Partner)?;
  let partner = db::partner_by_user(&app_state.db_pool, auth_user.user_id)
    .await?
    .ok_or_else(|| AppError::NotFound("No delivery partner profile for this account.".to_string()))?;

  let orders = sqlx::query_as::<_, Order>(&format!(
    "SELECT {} FROM orders WHERE partner_id = $1 ORDER BY placed_at DESC, id DESC",
    ORDER_COLUMNS
  ))
  .bind(partner.id)
  .fetch_all(&app_state.db_pool)
  .await?;
  Ok(response::ok("Assigned orders retrieved.", orders))
}
