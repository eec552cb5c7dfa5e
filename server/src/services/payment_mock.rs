// server/src/services/payment_mock.rs
use crate::errors::{AppError, Result};
use crate::services::payment_gateway::{Charge, ChargeRequest, PaymentGateway};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, instrument};
use uuid::Uuid;

/// Card token the mock always declines.
pub const DECLINED_TOKEN: &str = "tok_chargeDeclined";

/// In-process processor for local runs and tests. Succeeds with status
/// `succeeded` unless the token is [`DECLINED_TOKEN`] or the amount is zero.
#[derive(Default)]
pub struct MockPaymentGateway {
  calls: AtomicUsize,
  requests: Mutex<Vec<ChargeRequest>>,
}

impl MockPaymentGateway {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn call_count(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn requests(&self) -> Vec<ChargeRequest> {
    self.requests.lock().clone()
  }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
  fn name(&self) -> &'static str {
    "mock"
  }

  #[instrument(name = "mock_gateway::charge", skip(self, request), fields(amount = request.amount_minor))]
  async fn charge(&self, request: &ChargeRequest) -> Result<Charge> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    self.requests.lock().push(request.clone());

    if request.card_token == DECLINED_TOKEN {
      info!("Mock charge declined.");
      return Err(AppError::Payment("Your card was declined.".to_string()));
    }
    if request.amount_minor <= 0 {
      return Err(AppError::Payment("Amount must be greater than zero.".to_string()));
    }

    let id = format!("mock_pi_{}", Uuid::new_v4().simple());
    info!(charge_id = %id, "Mock charge succeeded.");
    Ok(Charge {
      id,
      status: "succeeded".to_string(),
    })
  }
}
