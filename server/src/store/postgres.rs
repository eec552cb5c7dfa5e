// server/src/store/postgres.rs
use super::{NewOrder, NewOrderItem, NewPaymentTransaction, OrderStore, OrderTx, FOREIGN_ADDRESS_MESSAGE};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  async fn begin(&self) -> Result<Box<dyn OrderTx>> {
    let tx = self.pool.begin().await?;
    debug!("order transaction opened");
    Ok(Box::new(PgOrderTx { tx }))
  }

  #[instrument(name = "pg_order_store::update_order_statuses", skip(self))]
  async fn update_order_statuses(&self, order_id: i64, payment_status: &str, order_status: &str) -> Result<()> {
    sqlx::query("UPDATE orders SET payment_status = $1, order_status = $2, updated_at = NOW() WHERE id = $3")
      .bind(payment_status)
      .bind(order_status)
      .bind(order_id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }
}

struct PgOrderTx {
  tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl OrderTx for PgOrderTx {
  async fn max_order_id(&mut self) -> Result<i64> {
    let max = sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(id), 0) FROM orders")
      .fetch_one(&mut *self.tx)
      .await?;
    Ok(max)
  }

  async fn insert_order(&mut self, order: &NewOrder) -> Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
      "INSERT INTO orders (order_number, customer_id, restaurant_id, address_id, subtotal, tax_amount, \
       delivery_fee, total_amount, payment_method, payment_status, order_status) \
       SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11 \
       WHERE EXISTS (SELECT 1 FROM addresses WHERE id = $4 AND customer_id = $2) \
       RETURNING id",
    )
    .bind(&order.order_number)
    .bind(order.customer_id)
    .bind(order.restaurant_id)
    .bind(order.address_id)
    .bind(order.subtotal)
    .bind(order.tax_amount)
    .bind(order.delivery_fee)
    .bind(order.total_amount)
    .bind(&order.payment_method)
    .bind(&order.payment_status)
    .bind(&order.order_status)
    .fetch_optional(&mut *self.tx)
    .await?;
    id.ok_or_else(|| AppError::Validation(FOREIGN_ADDRESS_MESSAGE.to_string()))
  }

  async fn insert_order_item(&mut self, order_id: i64, item: &NewOrderItem) -> Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
      "INSERT INTO order_items (order_id, menu_item_id, qty, price) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(order_id)
    .bind(item.menu_item_id)
    .bind(item.qty)
    .bind(item.price)
    .fetch_one(&mut *self.tx)
    .await?;
    Ok(id)
  }

  async fn insert_payment_transaction(&mut self, payment: &NewPaymentTransaction) -> Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
      "INSERT INTO payment_transactions (order_id, transaction_ref, payment_mode, amount, status) \
       VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(payment.order_id)
    .bind(&payment.transaction_ref)
    .bind(&payment.payment_mode)
    .bind(payment.amount)
    .bind(&payment.status)
    .fetch_one(&mut *self.tx)
    .await?;
    Ok(id)
  }

  async fn commit(self: Box<Self>) -> Result<()> {
    self.tx.commit().await?;
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> Result<()> {
    self.tx.rollback().await?;
    Ok(())
  }
}
