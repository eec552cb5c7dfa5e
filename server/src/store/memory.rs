// server/src/store/memory.rs

//! In-process [`OrderStore`] used by tests and local runs without Postgres.
//!
//! Ids come from counters that survive rollbacks, like database sequences.
//! Writes made through a transaction stay private to it until commit.
//! Addresses must be registered with [`MemoryOrderStore::add_address`] before
//! an order can be delivered to them.

use super::{NewOrder, NewOrderItem, NewPaymentTransaction, OrderStore, OrderTx, FOREIGN_ADDRESS_MESSAGE};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A write that can be made to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
  Begin,
  MaxOrderId,
  InsertOrder,
  InsertOrderItem,
  InsertPaymentTransaction,
  Commit,
  UpdateOrderStatuses,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredOrder {
  pub id: i64,
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
pub struct StoredOrderItem {
  pub id: i64,
  pub order_id: i64,
  pub menu_item_id: i64,
  pub qty: i32,
  pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredPaymentTransaction {
  pub id: i64,
  pub order_id: i64,
  pub transaction_ref: String,
  pub payment_mode: String,
  pub amount: Decimal,
  pub status: String,
}

#[derive(Default)]
struct Tables {
  orders: Vec<StoredOrder>,
  items: Vec<StoredOrderItem>,
  payments: Vec<StoredPaymentTransaction>,
  /// address id -> owning customer id
  addresses: HashMap<i64, i64>,
  order_seq: i64,
  item_seq: i64,
  payment_seq: i64,
  commits: usize,
  rollbacks: usize,
}

#[derive(Default)]
struct Shared {
  tables: Mutex<Tables>,
  failing: Mutex<HashSet<FailPoint>>,
}

impl Shared {
  fn check(&self, point: FailPoint) -> Result<()> {
    if self.failing.lock().contains(&point) {
      return Err(AppError::Internal(format!("injected failure at {:?}", point)));
    }
    Ok(())
  }
}

#[derive(Clone, Default)]
pub struct MemoryOrderStore {
  shared: Arc<Shared>,
}

impl MemoryOrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_address(&self, address_id: i64, customer_id: i64) {
    self.shared.tables.lock().addresses.insert(address_id, customer_id);
  }

  pub fn fail_at(&self, point: FailPoint) {
    self.shared.failing.lock().insert(point);
  }

  pub fn clear_failures(&self) {
    self.shared.failing.lock().clear();
  }

  pub fn orders(&self) -> Vec<StoredOrder> {
    self.shared.tables.lock().orders.clone()
  }

  pub fn order_items(&self) -> Vec<StoredOrderItem> {
    self.shared.tables.lock().items.clone()
  }

  pub fn payment_transactions(&self) -> Vec<StoredPaymentTransaction> {
    self.shared.tables.lock().payments.clone()
  }

  pub fn commit_count(&self) -> usize {
    self.shared.tables.lock().commits
  }

  pub fn rollback_count(&self) -> usize {
    self.shared.tables.lock().rollbacks
  }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
  async fn begin(&self) -> Result<Box<dyn OrderTx>> {
    self.shared.check(FailPoint::Begin)?;
    Ok(Box::new(MemoryOrderTx {
      shared: self.shared.clone(),
      orders: Vec::new(),
      items: Vec::new(),
      payments: Vec::new(),
    }))
  }

  async fn update_order_statuses(&self, order_id: i64, payment_status: &str, order_status: &str) -> Result<()> {
    self.shared.check(FailPoint::UpdateOrderStatuses)?;
    let mut tables = self.shared.tables.lock();
    if let Some(order) = tables.orders.iter_mut().find(|o| o.id == order_id) {
      order.payment_status = payment_status.to_string();
      order.order_status = order_status.to_string();
    }
    Ok(())
  }
}

struct MemoryOrderTx {
  shared: Arc<Shared>,
  orders: Vec<StoredOrder>,
  items: Vec<StoredOrderItem>,
  payments: Vec<StoredPaymentTransaction>,
}

#[async_trait]
impl OrderTx for MemoryOrderTx {
  async fn max_order_id(&mut self) -> Result<i64> {
    self.shared.check(FailPoint::MaxOrderId)?;
    let tables = self.shared.tables.lock();
    let committed = tables.orders.iter().map(|o| o.id).max();
    let staged = self.orders.iter().map(|o| o.id).max();
    // An empty table reads 0 even when the sequence has moved on.
    Ok(committed.max(staged).unwrap_or(0))
  }

  async fn insert_order(&mut self, order: &NewOrder) -> Result<i64> {
    self.shared.check(FailPoint::InsertOrder)?;
    let mut tables = self.shared.tables.lock();
    if tables.addresses.get(&order.address_id) != Some(&order.customer_id) {
      return Err(AppError::Validation(FOREIGN_ADDRESS_MESSAGE.to_string()));
    }
    let taken = tables
      .orders
      .iter()
      .chain(self.orders.iter())
      .any(|o| o.order_number == order.order_number);
    if taken {
      return Err(AppError::Internal(format!(
        "duplicate order number {}",
        order.order_number
      )));
    }
    tables.order_seq += 1;
    let id = tables.order_seq;
    self.orders.push(StoredOrder {
      id,
      order_number: order.order_number.clone(),
      customer_id: order.customer_id,
      restaurant_id: order.restaurant_id,
      address_id: order.address_id,
      subtotal: order.subtotal,
      tax_amount: order.tax_amount,
      delivery_fee: order.delivery_fee,
      total_amount: order.total_amount,
      payment_method: order.payment_method.clone(),
      payment_status: order.payment_status.clone(),
      order_status: order.order_status.clone(),
    });
    Ok(id)
  }

  async fn insert_order_item(&mut self, order_id: i64, item: &NewOrderItem) -> Result<i64> {
    self.shared.check(FailPoint::InsertOrderItem)?;
    let mut tables = self.shared.tables.lock();
    tables.item_seq += 1;
    let id = tables.item_seq;
    self.items.push(StoredOrderItem {
      id,
      order_id,
      menu_item_id: item.menu_item_id,
      qty: item.qty,
      price: item.price,
    });
    Ok(id)
  }

  async fn insert_payment_transaction(&mut self, payment: &NewPaymentTransaction) -> Result<i64> {
    self.shared.check(FailPoint::InsertPaymentTransaction)?;
    let mut tables = self.shared.tables.lock();
    tables.payment_seq += 1;
    let id = tables.payment_seq;
    self.payments.push(StoredPaymentTransaction {
      id,
      order_id: payment.order_id,
      transaction_ref: payment.transaction_ref.clone(),
      payment_mode: payment.payment_mode.clone(),
      amount: payment.amount,
      status: payment.status.clone(),
    });
    Ok(id)
  }

  async fn commit(self: Box<Self>) -> Result<()> {
    self.shared.check(FailPoint::Commit)?;
    let this = *self;
    let mut tables = this.shared.tables.lock();
    tables.orders.extend(this.orders);
    tables.items.extend(this.items);
    tables.payments.extend(this.payments);
    tables.commits += 1;
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> Result<()> {
    self.shared.tables.lock().rollbacks += 1;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  fn seeded_store() -> MemoryOrderStore {
    let store = MemoryOrderStore::new();
    store.add_address(3, 1);
    store
  }

  fn new_order(number: &str) -> NewOrder {
    NewOrder {
      order_number: number.to_string(),
      customer_id: 1,
      restaurant_id: 2,
      address_id: 3,
      subtotal: dec!(10),
      tax_amount: dec!(1),
      delivery_fee: dec!(2),
      total_amount: dec!(13),
      payment_method: "card".to_string(),
      payment_status: "pending".to_string(),
      order_status: "pending".to_string(),
    }
  }

  #[tokio::test]
  async fn staged_rows_are_invisible_until_commit() {
    let store = seeded_store();
    let mut tx = store.begin().await.unwrap();
    tx.insert_order(&new_order("#A")).await.unwrap();
    assert!(store.orders().is_empty());
    tx.commit().await.unwrap();
    assert_eq!(store.orders().len(), 1);
  }

  #[tokio::test]
  async fn rollback_keeps_the_sequence_moving() {
    let store = seeded_store();
    let mut tx = store.begin().await.unwrap();
    assert_eq!(tx.insert_order(&new_order("#A")).await.unwrap(), 1);
    tx.rollback().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    assert_eq!(tx.max_order_id().await.unwrap(), 0);
    assert_eq!(tx.insert_order(&new_order("#A")).await.unwrap(), 2);
    tx.commit().await.unwrap();
    assert_eq!(store.rollback_count(), 1);
    assert_eq!(store.commit_count(), 1);
  }

  #[tokio::test]
  async fn duplicate_order_number_is_rejected() {
    let store = seeded_store();
    let mut tx = store.begin().await.unwrap();
    tx.insert_order(&new_order("#A")).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    assert!(tx.insert_order(&new_order("#A")).await.is_err());
  }

  #[tokio::test]
  async fn injected_failure_hits_only_its_point() {
    let store = seeded_store();
    store.fail_at(FailPoint::InsertOrderItem);
    let mut tx = store.begin().await.unwrap();
    let order_id = tx.insert_order(&new_order("#A")).await.unwrap();
    let item = NewOrderItem { menu_item_id: 1, qty: 1, price: dec!(10) };
    assert!(tx.insert_order_item(order_id, &item).await.is_err());
    store.clear_failures();
    assert!(tx.insert_order_item(order_id, &item).await.is_ok());
  }

  #[tokio::test]
  async fn orders_only_go_to_the_customers_own_address() {
    let store = seeded_store();
    store.add_address(4, 2);
    let mut tx = store.begin().await.unwrap();

    let mut foreign = new_order("#A");
    foreign.address_id = 4;
    assert!(matches!(tx.insert_order(&foreign).await, Err(AppError::Validation(_))));

    let mut unknown = new_order("#B");
    unknown.address_id = 99;
    assert!(matches!(tx.insert_order(&unknown).await, Err(AppError::Validation(_))));

    assert!(tx.insert_order(&new_order("#C")).await.is_ok());
  }
}
