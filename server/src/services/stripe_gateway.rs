// server/src/services/stripe_gateway.rs

//! Stripe PaymentIntents adapter: one form-encoded POST creates and confirms the charge.

use crate::errors::{AppError, Result};
use crate::services::payment_gateway::{Charge, ChargeRequest, PaymentGateway};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};

pub struct StripeGateway {
  client: Client,
  secret_key: String,
  api_base: String,
}

#[derive(Debug, Deserialize)]
struct PaymentIntentBody {
  id: String,
  status: String,
}

impl StripeGateway {
  pub fn new(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
    Self {
      client: Client::new(),
      secret_key: secret_key.into(),
      api_base: api_base.into(),
    }
  }

  fn form(request: &ChargeRequest) -> Vec<(&'static str, String)> {
    vec![
      ("amount", request.amount_minor.to_string()),
      ("currency", request.currency.clone()),
      ("confirm", "true".to_string()),
      ("payment_method_types[]", "card".to_string()),
      ("payment_method_data[type]", "card".to_string()),
      ("payment_method_data[card][token]", request.card_token.clone()),
      ("metadata[order_number]", request.order_number.clone()),
    ]
  }

  /// Only `succeeded` and `processing` intents count as captured. Anything else
  /// (`requires_action`, `requires_payment_method`, ...) holds no funds.
  fn charge_from_intent(intent: PaymentIntentBody) -> Result<Charge> {
    match intent.status.as_str() {
      "succeeded" => {}
      "processing" => {
        warn!(charge_id = %intent.id, "Stripe payment intent is still processing.");
      }
      other => {
        warn!(charge_id = %intent.id, charge_status = %other, "Stripe payment intent was not captured.");
        return Err(AppError::Payment(format!("Payment was not completed (status {}).", other)));
      }
    }
    Ok(Charge {
      id: intent.id,
      status: intent.status,
    })
  }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
  fn name(&self) -> &'static str {
    "stripe"
  }

  #[instrument(
    name = "stripe_gateway::charge",
    skip(self, request),
    fields(amount = request.amount_minor, currency = %request.currency, order_number = %request.order_number)
  )]
  async fn charge(&self, request: &ChargeRequest) -> Result<Charge> {
    let url = format!("{}/v1/payment_intents", self.api_base);
    let response = self
      .client
      .post(&url)
      .bearer_auth(&self.secret_key)
      .form(&Self::form(request))
      .send()
      .await
      .map_err(|e| {
        error!(error = %e, "Stripe request failed.");
        AppError::Gateway(format!("Stripe request failed: {}", e))
      })?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      warn!(status = %status, body = %body, "Stripe declined the payment intent.");
      return Err(AppError::Payment(format!("Payment was not accepted (HTTP {}).", status.as_u16())));
    }

    let intent: PaymentIntentBody = response.json().await.map_err(|e| {
      error!(error = %e, "Unreadable Stripe response body.");
      AppError::Gateway(format!("Unreadable Stripe response: {}", e))
    })?;
    debug!(charge_id = %intent.id, charge_status = %intent.status, "Stripe payment intent confirmed.");
    Self::charge_from_intent(intent)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn form_carries_amount_token_and_confirm_flag() {
    let request = ChargeRequest {
      amount_minor: 11_500,
      currency: "usd".to_string(),
      card_token: "tok_visa".to_string(),
      order_number: "#GOEATS-20240601-00001".to_string(),
    };
    let form = StripeGateway::form(&request);
    let get = |key: &str| form.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str());
    assert_eq!(get("amount"), Some("11500"));
    assert_eq!(get("currency"), Some("usd"));
    assert_eq!(get("confirm"), Some("true"));
    assert_eq!(get("payment_method_types[]"), Some("card"));
    assert_eq!(get("payment_method_data[type]"), Some("card"));
    assert_eq!(get("payment_method_data[card][token]"), Some("tok_visa"));
  }

  fn intent(status: &str) -> PaymentIntentBody {
    PaymentIntentBody {
      id: "pi_123".to_string(),
      status: status.to_string(),
    }
  }

  #[test]
  fn succeeded_intent_is_a_charge() {
    let charge = StripeGateway::charge_from_intent(intent("succeeded")).unwrap();
    assert_eq!((charge.id.as_str(), charge.status.as_str()), ("pi_123", "succeeded"));
  }

  #[test]
  fn processing_intent_is_kept() {
    assert!(StripeGateway::charge_from_intent(intent("processing")).is_ok());
  }

  #[test]
  fn intent_awaiting_authentication_is_declined() {
    let err = StripeGateway::charge_from_intent(intent("requires_action")).unwrap_err();
    assert!(matches!(err, AppError::Payment(m) if m.contains("requires_action")));
  }
}
