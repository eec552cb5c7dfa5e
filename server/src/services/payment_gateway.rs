// server/src/services/payment_gateway.rs

//! The card-processor port used by the order flow.

use crate::errors::{AppError, Result};
use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// One charge to create and confirm in a single call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRequest {
  /// Amount in the currency's minor units.
  pub amount_minor: i64,
  pub currency: String,
  pub card_token: String,
  /// Carried as processor metadata.
  pub order_number: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Charge {
  /// Processor-side id of the charge.
  pub id: String,
  /// Status string exactly as reported by the processor.
  pub status: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  /// Tag stored as the transaction's payment mode.
  fn name(&self) -> &'static str;

  /// Creates and confirms a charge. Any `Err` means nothing was captured.
  async fn charge(&self, request: &ChargeRequest) -> Result<Charge>;
}

/// Converts a major-unit amount to minor units (`total * 100`), truncating anything past two decimals.
pub fn minor_units(amount: Decimal) -> Result<i64> {
  (amount * Decimal::ONE_HUNDRED)
    .trunc()
    .to_i64()
    .ok_or_else(|| AppError::Validation(format!("Amount {} is out of range.", amount)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn minor_units_scale_by_one_hundred() {
    assert_eq!(minor_units(dec!(115)).unwrap(), 11_500);
    assert_eq!(minor_units(dec!(12.34)).unwrap(), 1_234);
    assert_eq!(minor_units(dec!(0)).unwrap(), 0);
  }

  #[test]
  fn minor_units_drop_sub_cent_fractions() {
    assert_eq!(minor_units(dec!(9.999)).unwrap(), 999);
  }
}
