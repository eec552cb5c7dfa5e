// server/src/web/handlers/restaurant_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::db;
use crate::errors::AppError;
use crate::models::menu_item::MENU_ITEM_COLUMNS;
use crate::models::order::ORDER_COLUMNS;
use crate::models::restaurant::RESTAURANT_COLUMNS;
use crate::models::{ApprovalStatus, MenuItem, Order, Restaurant, Role};
use crate::pipelines::contexts::{SignupCtxData, SignupKind};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::handlers::auth_handlers::run_signup;
use crate::web::response;

#[derive(Deserialize, Debug)]
pub struct RegisterRestaurantPayload {
  pub name: String,
  pub email: String,
  pub phone: Option<String>,
  pub password: String,
  pub restaurant_name: String,
  pub address: String,
  pub cuisine: Option<String>,
}

#[instrument(name = "handler::register_restaurant", skip(app_state, payload))]
pub async fn register_restaurant_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RegisterRestaurantPayload>,
) -> Result<HttpResponse, AppError> {
  let p = payload.into_inner();
  let data = SignupCtxData::new(
    app_state.db_pool.clone(),
    SignupKind::Restaurant {
      restaurant_name: p.restaurant_name,
      address: p.address,
      cuisine: p.cuisine,
    },
    p.name,
    p.email,
    p.phone,
    p.password,
  );
  let (user, restaurant_id) = run_signup(&app_state, data).await?;
  info!(user_id = user.id, restaurant_id = ?restaurant_id, "Restaurant registered, awaiting approval.");
  Ok(response::created(
    "Restaurant registered. It will be listed once approved.",
    json!({ "user": user, "restaurant_id": restaurant_id, "status": ApprovalStatus::Pending }),
  ))
}

#[instrument(name = "handler::list_restaurants", skip(app_state))]
pub async fn list_restaurants_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let restaurants = sqlx::query_as::<_, Restaurant>(&format!(
    "SELECT {} FROM restaurants WHERE status = $1 ORDER BY name",
    RESTAURANT_COLUMNS
  ))
  .bind(ApprovalStatus::Approved.as_str())
  .fetch_all(&app_state.db_pool)
  .await?;
  Ok(response::ok("Restaurants retrieved.", restaurants))
}

#[instrument(name = "handler::restaurant_menu", skip(app_state))]
pub async fn restaurant_menu_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let restaurant = db::find_restaurant(&app_state.db_pool, path.into_inner()).await?;
  if restaurant.status != ApprovalStatus::Approved.as_str() {
    return Err(AppError::NotFound(format!("Restaurant {} not found.", restaurant.id)));
  }
  let items = sqlx::query_as::<_, MenuItem>(&format!(
    "SELECT {} FROM menu_items WHERE restaurant_id = $1 AND is_available ORDER BY name",
    MENU_ITEM_COLUMNS
  ))
  .bind(restaurant.id)
  .fetch_all(&app_state.db_pool)
  .await?;
  Ok(response::ok("Menu retrieved.", json!({ "restaurant": restaurant, "items": items })))
}

// --- Owner console ---

/// The caller's restaurant, which must be approved before it can manage a menu or see orders.
async fn approved_restaurant_of(app_state: &AppState, user: &AuthenticatedUser) -> Result<Restaurant, AppError> {
  user.require(Role::Restaurant)?;
  let restaurant = db::restaurant_by_owner(&app_state.db_pool, user.user_id)
    .await?
    .ok_or_else(|| AppError::NotFound("No restaurant is registered for this account.".to_string()))?;
  if restaurant.status != ApprovalStatus::Approved.as_str() {
    warn!(restaurant_id = restaurant.id, status = %restaurant.status, "Console used before approval.");
    return Err(AppError::Forbidden("Restaurant is not approved yet.".to_string()));
  }
  Ok(restaurant)
}

#[derive(Deserialize, Debug)]
pub struct NewMenuItemPayload {
  pub name: String,
  pub description: Option<String>,
  pub price: Decimal,
  #[serde(default = "default_available")]
  pub is_available: bool,
}

fn default_available() -> bool {
  true
}

#[derive(Deserialize, Debug)]
pub struct UpdateMenuItemPayload {
  pub name: Option<String>,
  pub description: Option<String>,
  pub price: Option<Decimal>,
  pub is_available: Option<bool>,
}

fn check_price(price: Decimal) -> Result<(), AppError> {
  if price < Decimal::ZERO {
    return Err(AppError::Validation("Price cannot be negative.".to_string()));
  }
  Ok(())
}

#[instrument(name = "handler::create_menu_item", skip(app_state, payload), fields(user_id = auth_user.user_id))]
pub async fn create_menu_item_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<NewMenuItemPayload>,
) -> Result<HttpResponse, AppError> {
  let restaurant = approved_restaurant_of(&app_state, &auth_user).await?;
  if payload.name.trim().is_empty() {
    return Err(AppError::Validation("Item name is required.".to_string()));
  }
  check_price(payload.price)?;

  let item = sqlx::query_as::<_, MenuItem>(&format!(
    "INSERT INTO menu_items (restaurant_id, name, description, price, is_available) \
     VALUES ($1, $2, $3, $4, $5) RETURNING {}",
    MENU_ITEM_COLUMNS
  ))
  .bind(restaurant.id)
  .bind(payload.name.trim())
  .bind(payload.description.as_deref())
  .bind(payload.price)
  .bind(payload.is_available)
  .fetch_one(&app_state.db_pool)
  .await?;
  info!(menu_item_id = item.id, restaurant_id = restaurant.id, "Menu item created.");
  Ok(response::created("Menu item created.", item))
}

#[instrument(name = "handler::update_menu_item", skip(app_state, payload), fields(user_id = auth_user.user_id))]
pub async fn update_menu_item_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<i64>,
  payload: web::Json<UpdateMenuItemPayload>,
) -> Result<HttpResponse, AppError> {
  let restaurant = approved_restaurant_of(&app_state, &auth_user).await?;
  let item_id = path.into_inner();
  if payload.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
    return Err(AppError::Validation("Item name cannot be empty.".to_string()));
  }
  if let Some(price) = payload.price {
    check_price(price)?;
  }

  let item = sqlx::query_as::<_, MenuItem>(&format!(
    "UPDATE menu_items SET name = COALESCE($1, name), description = COALESCE($2, description), \
     price = COALESCE($3, price), is_available = COALESCE($4, is_available), updated_at = NOW() \
     WHERE id = $5 AND restaurant_id = $6 RETURNING {}",
    MENU_ITEM_COLUMNS
  ))
  .bind(payload.name.as_deref().map(str::trim))
  .bind(payload.description.as_deref())
  .bind(payload.price)
  .bind(payload.is_available)
  .bind(item_id)
  .bind(restaurant.id)
  .fetch_optional(&app_state.db_pool)
  .await?
  .ok_or_else(|| AppError::NotFound(format!("Menu item {} not found.", item_id)))?;
  Ok(response::ok("Menu item updated.", item))
}

#[instrument(name = "handler::list_own_menu", skip(app_state), fields(user_id = auth_user.user_id))]
pub async fn list_own_menu_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let restaurant = approved_restaurant_of(&app_state, &auth_user).await?;
  let items = sqlx::query_as::<_, MenuItem>(&format!(
    "SELECT {} FROM menu_items WHERE restaurant_id = $1 ORDER BY id",
    MENU_ITEM_COLUMNS
  ))
  .bind(restaurant.id)
  .fetch_all(&app_state.db_pool)
  .await?;
  Ok(response::ok("Menu retrieved.", items))
}

#[instrument(name = "handler::restaurant_orders", skip(app_state), fields(user_id = auth_user.user_id))]
pub async fn restaurant_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let restaurant = approved_restaurant_of(&app_state, &auth_user).await?;
  let orders = sqlx::query_as::<_, Order>(&format!(
    "SELECT {} FROM orders WHERE restaurant_id = $1 ORDER BY placed_at DESC, id DESC",
    ORDER_COLUMNS
  ))
  .bind(restaurant.id)
  .fetch_all(&app_state.db_pool)
  .await?;
  Ok(response::ok("Orders retrieved.", orders))
}
