// server/src/db.rs

//! Row lookups shared by several handlers.

use crate::errors::{AppError, Result};
use crate::models::delivery_partner::PARTNER_COLUMNS;
use crate::models::order::ORDER_COLUMNS;
use crate::models::restaurant::RESTAURANT_COLUMNS;
use crate::models::{DeliveryPartner, Order, Restaurant};
use sqlx::PgPool;

pub async fn find_order(pool: &PgPool, order_id: i64) -> Result<Order> {
  sqlx::query_as::<_, Order>(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
    .bind(order_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found.", order_id)))
}

pub async fn restaurant_by_owner(pool: &PgPool, owner_id: i64) -> Result<Option<Restaurant>> {
  let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
    "SELECT {} FROM restaurants WHERE owner_id = $1",
    RESTAURANT_COLUMNS
  ))
  .bind(owner_id)
  .fetch_optional(pool)
  .await?;
  Ok(restaurant)
}

pub async fn find_restaurant(pool: &PgPool, restaurant_id: i64) -> Result<Restaurant> {
  sqlx::query_as::<_, Restaurant>(&format!("SELECT {} FROM restaurants WHERE id = $1", RESTAURANT_COLUMNS))
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Restaurant {} not found.", restaurant_id)))
}

pub async fn partner_by_user(pool: &PgPool, user_id: i64) -> Result<Option<DeliveryPartner>> {
  let partner = sqlx::query_as::<_, DeliveryPartner>(&format!(
    "SELECT {} FROM delivery_partners WHERE user_id = $1",
    PARTNER_COLUMNS
  ))
  .bind(user_id)
  .fetch_optional(pool)
  .await?;
  Ok(partner)
}

pub async fn find_partner(pool: &PgPool, partner_id: i64) -> Result<DeliveryPartner> {
  sqlx::query_as::<_, DeliveryPartner>(&format!(
    "SELECT {} FROM delivery_partners WHERE id = $1",
    PARTNER_COLUMNS
  ))
  .bind(partner_id)
  .fetch_optional(pool)
  .await?
  .ok_or_else(|| AppError::NotFound(format!("Delivery partner {} not found.", partner_id)))
}
