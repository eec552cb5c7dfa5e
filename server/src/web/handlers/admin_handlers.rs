// server/src/web/handlers/admin_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::db;
use crate::errors::AppError;
use crate::models::delivery_partner::PARTNER_COLUMNS;
use crate::models::order::ORDER_COLUMNS;
use crate::models::restaurant::RESTAURANT_COLUMNS;
use crate::models::{ApprovalStatus, DeliveryPartner, Order, OrderStatus, Restaurant, Role};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::response;

#[derive(Deserialize, Debug)]
pub struct StatusFilter {
  pub status: Option<ApprovalStatus>,
}

#[derive(Deserialize, Debug)]
pub struct ApprovalPayload {
  pub approve: bool,
}

#[derive(Deserialize, Debug)]
pub struct AssignPartnerPayload {
  pub partner_id: i64,
}

#[instrument(name = "handler::admin_list_restaurants", skip(app_state))]
pub async fn list_restaurants_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  filter: web::Query<StatusFilter>,
) -> Result<HttpResponse, AppError> {
  auth_user.require(Role::Admin)?;
  let restaurants = sqlx::query_as::<_, Restaurant>(&format!(
    "SELECT {} FROM restaurants WHERE ($1::TEXT IS NULL OR status = $1) ORDER BY id",
    RESTAURANT_COLUMNS
  ))
  .bind(filter.status.map(ApprovalStatus::as_str))
  .fetch_all(&app_state.db_pool)
  .await?;
  Ok(response::ok("Restaurants retrieved.", restaurants))
}

#[instrument(name = "handler::admin_list_partners", skip(app_state))]
pub async fn list_partners_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  filter: web::Query<StatusFilter>,
) -> Result<HttpResponse, AppError> {
  auth_user.require(Role::Admin)?;
  let partners = sqlx::query_as::<_, DeliveryPartner>(&format!(
    "SELECT {} FROM delivery_partners WHERE ($1::TEXT IS NULL OR status = $1) ORDER BY id",
    PARTNER_COLUMNS
  ))
  .bind(filter.status.map(ApprovalStatus::as_str))
  .fetch_all(&app_state.db_pool)
  .await?;
  Ok(response::ok("Delivery partners retrieved.", partners))
}

#[instrument(name = "handler::admin_restaurant_approval", skip(app_state))]
pub async fn restaurant_approval_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<i64>,
  payload: web::Json<ApprovalPayload>,
) -> Result<HttpResponse, AppError> {
  auth_user.require(Role::Admin)?;
  let restaurant_id = path.into_inner();
  let status = ApprovalStatus::from_decision(payload.approve);
  let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
    "UPDATE restaurants SET status = $1 WHERE id = $2 RETURNING {}",
    RESTAURANT_COLUMNS
  ))
  .bind(status.as_str())
  .bind(restaurant_id)
  .fetch_optional(&app_state.db_pool)
  .await?
  .ok_or_else(|| AppError::NotFound(format!("Restaurant {} not found.", restaurant_id)))?;
  info!(restaurant_id, status = status.as_str(), "Restaurant approval decided.");
  Ok(response::ok("Restaurant approval updated.", restaurant))
}

#[instrument(name = "handler::admin_partner_approval", skip(app_state))]
pub async fn partner_approval_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<i64>,
  payload: web::Json<ApprovalPayload>,
) -> Result<HttpResponse, AppError> {
  auth_user.require(Role::Admin)?;
  let partner_id = path.into_inner();
  let status = ApprovalStatus::from_decision(payload.approve);
  let partner = sqlx::query_as::<_, DeliveryPartner>(&format!(
    "UPDATE delivery_partners SET status = $1 WHERE id = $2 RETURNING {}",
    PARTNER_COLUMNS
  ))
  .bind(status.as_str())
  .bind(partner_id)
  .fetch_optional(&app_state.db_pool)
  .await?
  .ok_or_else(|| AppError::NotFound(format!("Delivery partner {} not found.", partner_id)))?;
  info!(partner_id, status = status.as_str(), "Partner approval decided.");
  Ok(response::ok("Delivery partner approval updated.", partner))
}

#[instrument(name = "handler::admin_assign_partner", skip(app_state))]
pub async fn assign_partner_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<i64>,
  payload: web::Json<AssignPartnerPayload>,
) -> Result<HttpResponse, AppError> {
  auth_user.require(Role::Admin)?;
  let order_id = path.into_inner();

  let partner = db::find_partner(&app_state.db_pool, payload.partner_id).await?;
  if partner.status != ApprovalStatus::Approved.as_str() {
    return Err(AppError::Validation("Only approved partners can be assigned.".to_string()));
  }
  let order = db::find_order(&app_state.db_pool, order_id).await?;
  let closed = [OrderStatus::Delivered.as_str(), OrderStatus::Cancelled.as_str()];
  if closed.contains(&order.order_status.as_str()) {
    return Err(AppError::Validation(format!(
      "Order {} is already {}.",
      order_id, order.order_status
    )));
  }

  let order = sqlx::query_as::<_, Order>(&format!(
    "UPDATE orders SET partner_id = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
    ORDER_COLUMNS
  ))
  .bind(partner.id)
  .bind(order_id)
  .fetch_one(&app_state.db_pool)
  .await?;
  info!(order_id, partner_id = partner.id, "Delivery partner assigned.");
  Ok(response::ok("Delivery partner assigned.", order))
}
