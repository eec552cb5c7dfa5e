// server/src/store/mod.rs

//! Storage port for the order placement flow.
//!
//! The flow only needs a handful of writes inside one transaction plus a
//! single status update after commit, so that is all the port exposes.
//! [`postgres::PgOrderStore`] backs the running server; [`memory::MemoryOrderStore`]
//! backs tests and can be told to fail at any individual write.

pub mod memory;
pub mod postgres;

use crate::errors::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

pub use memory::{FailPoint, MemoryOrderStore};
pub use postgres::PgOrderStore;

/// Returned when an order names an address that is not the customer's own.
pub const FOREIGN_ADDRESS_MESSAGE: &str = "Delivery address not found for this customer.";

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
  pub order_number: String,
  pub customer_id: i64,
  pub restaurant_id: i64,
  pub address_id: i64,
  pub subtotal: Decimal,
  pub tax_amount: Decimal,
  pub delivery_fee: Decimal,
  pub total_amount: Decimal,
  pub payment_method: String,
  pub payment_status: String,
  pub order_status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
  pub menu_item_id: i64,
  pub qty: i32,
  /// Unit price as sent by the client.
  pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPaymentTransaction {
  pub order_id: i64,
  pub transaction_ref: String,
  pub payment_mode: String,
  pub amount: Decimal,
  pub status: String,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Opens a transaction. Dropping the returned handle without `commit` discards its writes.
  async fn begin(&self) -> Result<Box<dyn OrderTx>>;

  /// Sets both status columns of an order. Runs outside any transaction.
  async fn update_order_statuses(&self, order_id: i64, payment_status: &str, order_status: &str) -> Result<()>;
}

#[async_trait]
pub trait OrderTx: Send {
  /// `MAX(id)` over orders, `0` when there are none. Takes no lock.
  async fn max_order_id(&mut self) -> Result<i64>;

  /// Fails with `Validation` when `address_id` does not belong to `customer_id`.
  async fn insert_order(&mut self, order: &NewOrder) -> Result<i64>;

  async fn insert_order_item(&mut self, order_id: i64, item: &NewOrderItem) -> Result<i64>;

  async fn insert_payment_transaction(&mut self, payment: &NewPaymentTransaction) -> Result<i64>;

  async fn commit(self: Box<Self>) -> Result<()>;

  async fn rollback(self: Box<Self>) -> Result<()>;
}
