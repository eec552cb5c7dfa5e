// server/src/pipelines/contexts.rs

//! Data carried through each flow. Handlers receive these wrapped in `flow::FlowCtx`.

use crate::errors::{AppError, Result};
use crate::models::{OrderStatus, PaymentStatus, Role, User};
use crate::services::auth_service::TokenService;
use crate::services::payment_gateway::{Charge, PaymentGateway};
use crate::state::AppState;
use crate::store::{OrderStore, OrderTx};
use chrono::NaiveDate;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;

// --- Order placement ---

#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineRequest {
  pub menu_item_id: i64,
  pub qty: i32,
  pub price: Decimal,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
  pub customer_id: i64,
  pub restaurant_id: i64,
  pub address_id: i64,
  pub subtotal: Decimal,
  pub tax_amount: Decimal,
  pub delivery_fee: Decimal,
  pub total_amount: Decimal,
  pub items: Vec<OrderLineRequest>,
  pub stripe_token: String,
}

/// Holds the open order transaction between steps.
///
/// A step takes the transaction out, awaits on it with no lock held and puts
/// it back before looking at the result, so a failed step leaves it here for
/// the runner to roll back.
#[derive(Default)]
pub struct TxSlot(Mutex<Option<Box<dyn OrderTx>>>);

impl TxSlot {
  pub fn put(&self, tx: Box<dyn OrderTx>) {
    *self.0.lock() = Some(tx);
  }

  pub fn take(&self) -> Result<Box<dyn OrderTx>> {
    self
      .0
      .lock()
      .take()
      .ok_or_else(|| AppError::Internal("No open order transaction.".to_string()))
  }

  pub fn is_open(&self) -> bool {
    self.0.lock().is_some()
  }
}

pub struct PlaceOrderCtxData {
  pub store: Arc<dyn OrderStore>,
  pub payments: Arc<dyn PaymentGateway>,
  pub currency: String,
  /// Date stamped into the order number.
  pub order_date: NaiveDate,
  pub request: PlaceOrderRequest,

  pub tx: TxSlot,
  pub order_number: Option<String>,
  pub order_id: Option<i64>,
  pub order_item_ids: Vec<i64>,
  pub charge: Option<Charge>,
  pub payment_transaction_id: Option<i64>,
  pub payment_status: PaymentStatus,
  pub order_status: OrderStatus,
  pub statuses_persisted: bool,
}

impl PlaceOrderCtxData {
  pub fn new(
    store: Arc<dyn OrderStore>,
    payments: Arc<dyn PaymentGateway>,
    currency: impl Into<String>,
    order_date: NaiveDate,
    request: PlaceOrderRequest,
  ) -> Self {
    Self {
      store,
      payments,
      currency: currency.into(),
      order_date,
      request,
      tx: TxSlot::default(),
      order_number: None,
      order_id: None,
      order_item_ids: Vec::new(),
      charge: None,
      payment_transaction_id: None,
      payment_status: PaymentStatus::Pending,
      order_status: OrderStatus::Pending,
      statuses_persisted: false,
    }
  }

  pub fn from_state(state: &AppState, order_date: NaiveDate, request: PlaceOrderRequest) -> Self {
    Self::new(
      state.order_store.clone(),
      state.payments.clone(),
      state.config.payment_currency.clone(),
      order_date,
      request,
    )
  }
}

// --- Accounts ---

/// What kind of account a signup creates, with the profile that goes with it.
#[derive(Debug, Clone)]
pub enum SignupKind {
  Customer,
  Restaurant {
    restaurant_name: String,
    address: String,
    cuisine: Option<String>,
  },
  Partner {
    vehicle_type: String,
    license_number: String,
  },
}

impl SignupKind {
  pub fn role(&self) -> Role {
    match self {
      SignupKind::Customer => Role::Customer,
      SignupKind::Restaurant { .. } => Role::Restaurant,
      SignupKind::Partner { .. } => Role::Partner,
    }
  }
}

pub struct SignupCtxData {
  pub db_pool: PgPool,
  pub kind: SignupKind,
  pub name: String,
  pub email: String,
  pub phone: Option<String>,
  pub password: String,
  pub password_hash: Option<String>,
  pub created_user: Option<User>,
  /// Id of the restaurant or partner row created alongside the user.
  pub profile_id: Option<i64>,
}

impl SignupCtxData {
  pub fn new(
    db_pool: PgPool,
    kind: SignupKind,
    name: String,
    email: String,
    phone: Option<String>,
    password: String,
  ) -> Self {
    Self {
      db_pool,
      kind,
      name,
      email: email.trim().to_ascii_lowercase(),
      phone,
      password,
      password_hash: None,
      created_user: None,
      profile_id: None,
    }
  }
}

pub struct SigninCtxData {
  pub db_pool: PgPool,
  pub tokens: Arc<TokenService>,
  pub email: String,
  pub password: String,
  pub user: Option<User>,
  pub token: Option<String>,
}

impl SigninCtxData {
  pub fn new(db_pool: PgPool, tokens: Arc<TokenService>, email: String, password: String) -> Self {
    Self {
      db_pool,
      tokens,
      email: email.trim().to_ascii_lowercase(),
      password,
      user: None,
      token: None,
    }
  }
}
