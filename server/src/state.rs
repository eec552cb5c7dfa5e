// server/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::auth_service::TokenService;
use crate::services::payment_gateway::PaymentGateway;
use crate::store::OrderStore;
use flow::FlowRegistry;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub db_pool: PgPool,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub config: Arc<AppConfig>,
  pub tokens: Arc<TokenService>,
  /// Storage port used by the order flow.
  pub order_store: Arc<dyn OrderStore>,
  pub payments: Arc<dyn PaymentGateway>,
}
