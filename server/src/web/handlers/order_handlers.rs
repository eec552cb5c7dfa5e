// server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::db;
use crate::errors::AppError;
use crate::models::order::ORDER_COLUMNS;
use crate::models::{Order, OrderItem, OrderStatus, PaymentTransaction, Role};
use crate::pipelines::contexts::{PlaceOrderCtxData, PlaceOrderRequest};
use crate::pipelines::place_order_pipeline::run_place_order;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::response;

#[instrument(
  name = "handler::place_order",
  skip(app_state, payload),
  fields(user_id = auth_user.user_id, restaurant_id = payload.restaurant_id)
)]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
  auth_user.require(Role::Customer)?;
  let request = payload.into_inner();
  if request.customer_id != auth_user.user_id {
    warn!(customer_id = request.customer_id, "Order placed on behalf of another customer.");
    return Err(AppError::Forbidden("You can only place orders for yourself.".to_string()));
  }

  let data = PlaceOrderCtxData::from_state(&app_state, Utc::now().date_naive(), request);
  let placed = run_place_order(&app_state.flows, data).await?;
  Ok(response::created("Order placed successfully.", placed))
}

/// Customers see their own orders; admins see every order.
#[instrument(name = "handler::list_orders", skip(app_state), fields(user_id = auth_user.user_id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  auth_user.require_any(&[Role::Customer, Role::Admin])?;
  let orders = if auth_user.is_admin() {
    sqlx::query_as::<_, Order>(&format!("SELECT {} FROM orders ORDER BY placed_at DESC, id DESC", ORDER_COLUMNS))
      .fetch_all(&app_state.db_pool)
      .await?
  } else {
    sqlx::query_as::<_, Order>(&format!(
      "SELECT {} FROM orders WHERE customer_id = $1 ORDER BY placed_at DESC, id DESC",
      ORDER_COLUMNS
    ))
    .bind(auth_user.user_id)
    .fetch_all(&app_state.db_pool)
    .await?
  };
  Ok(response::ok("Orders retrieved.", orders))
}

/// Whether `user` is the customer, the restaurant owner, the assigned partner or an admin.
async fn can_view(app_state: &AppState, user: &AuthenticatedUser, order: &Order) -> Result<bool, AppError> {
  Ok(match user.role {
    Role::Admin => true,
    Role::Customer => order.customer_id == user.user_id,
    Role::Restaurant => db::restaurant_by_owner(&app_state.db_pool, user.user_id)
      .await?
      .is_some_and(|r| r.id == order.restaurant_id),
    Role::Partner => match order.partner_id {
      Some(partner_id) => db::partner_by_user(&app_state.db_pool, user.user_id)
        .await?
        .is_some_and(|p| p.id == partner_id),
      None => false,
    },
  })
}

#[instrument(name = "handler::get_order", skip(app_state), fields(user_id = auth_user.user_id))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let order = db::find_order(&app_state.db_pool, order_id).await?;
  if !can_view(&app_state, &auth_user, &order).await? {
    return Err(AppError::Forbidden("You cannot view this order.".to_string()));
  }

  let items = sqlx::query_as::<_, OrderItem>(
    "SELECT id, order_id, menu_item_id, qty, price FROM order_items WHERE order_id = $1 ORDER BY id",
  )
  .bind(order_id)
  .fetch_all(&app_state.db_pool)
  .await?;
  let payment = sqlx::query_as::<_, PaymentTransaction>(
    "SELECT id, order_id, transaction_ref, payment_mode, amount, status, created_at \
     FROM payment_transactions WHERE order_id = $1 ORDER BY id LIMIT 1",
  )
  .bind(order_id)
  .fetch_optional(&app_state.db_pool)
  .await?;

  Ok(response::ok(
    "Order retrieved.",
    json!({ "order": order, "items": items, "payment_transaction": payment }),
  ))
}

#[derive(Deserialize, Debug)]
pub struct UpdateStatusPayload {
  pub status: String,
}

#[instrument(name = "handler::update_order_status", skip(app_state), fields(user_id = auth_user.user_id))]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<i64>,
  payload: web::Json<UpdateStatusPayload>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let next: OrderStatus = payload.status.parse()?;
  let order = db::find_order(&app_state.db_pool, order_id).await?;
  let current: OrderStatus = order
    .order_status
    .parse()
    .map_err(|_| AppError::Internal(format!("Order {} has an unknown status.", order_id)))?;

  let Some(actor) = current.transition_actor(next) else {
    return Err(AppError::Validation(format!(
      "Cannot move an order from '{}' to '{}'.",
      current, next
    )));
  };

  if !auth_user.is_admin() {
    if auth_user.role != actor {
      return Err(AppError::Forbidden(format!(
        "Only a {} can move an order to '{}'.",
        actor, next
      )));
    }
    let owns_order = match actor {
      Role::Restaurant => db::restaurant_by_owner(&app_state.db_pool, auth_user.user_id)
        .await?
        .is_some_and(|r| r.id == order.restaurant_id),
      Role::Partner => match (order.partner_id, db::partner_by_user(&app_state.db_pool, auth_user.user_id).await?) {
        (Some(assigned), Some(partner)) => assigned == partner.id,
        _ => false,
      },
      _ => false,
    };
    if !owns_order {
      return Err(AppError::Forbidden("This order is not yours to update.".to_string()));
    }
  }

  let updated = sqlx::query_as::<_, Order>(&format!(
    "UPDATE orders SET order_status = $1, updated_at = NOW() WHERE id = $2 AND order_status = $3 RETURNING {}",
    ORDER_COLUMNS
  ))
  .bind(next.as_str())
  .bind(order_id)
  .bind(current.as_str())
  .fetch_optional(&app_state.db_pool)
  .await?
  .ok_or_else(|| AppError::Conflict("The order status changed meanwhile; reload and retry.".to_string()))?;

  info!(order_id, from = %current, to = %next, "Order status updated.");
  Ok(response::ok("Order status updated.", updated))
}
