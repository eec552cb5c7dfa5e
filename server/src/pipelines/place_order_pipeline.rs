// server/src/pipelines/place_order_pipeline.rs

//! Order placement: intake, payment capture and the reconciliation write.
//!
//! Everything up to `commit_transaction` runs inside one store transaction.
//! If any step fails, [`run_place_order`] rolls that transaction back, so the
//! order is either fully persisted with its payment record or not at all. The
//! one exception is a failure after the processor has already captured funds:
//! the rollback still happens and the charge is reported at error level for
//! manual reconciliation. The final status flip runs on its own after commit
//! and only logs when it fails.

use crate::errors::{AppError, Result};
use crate::models::order::format_order_number;
use crate::models::{OrderStatus, PaymentStatus};
use crate::pipelines::contexts::{PlaceOrderCtxData, PlaceOrderRequest};
use crate::services::payment_gateway::{minor_units, ChargeRequest};
use crate::store::{NewOrder, NewOrderItem, NewPaymentTransaction};
use flow::{Control, Flow, FlowCtx, FlowRegistry, Outcome};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

pub const PAYMENT_METHOD_CARD: &str = "card";

/// Returned to the client once the order is committed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlacedOrder {
  pub order_id: i64,
  pub order_number: String,
  pub payment_status: PaymentStatus,
}

pub fn build_place_order_flow() -> Flow<PlaceOrderCtxData, AppError> {
  let mut p = Flow::<PlaceOrderCtxData, AppError>::new(&[
    ("validate_order_request", false),
    ("open_transaction", false),
    ("assign_order_number", false),
    ("insert_order_header", false),
    ("insert_line_items", false),
    ("capture_payment", false),
    ("record_payment_transaction", false),
    ("commit_transaction", false),
    ("mark_order_placed", true),
  ]);

  p.on("validate_order_request", |ctx: FlowCtx<PlaceOrderCtxData>| async move {
    validate(&ctx.read().request)?;
    Ok::<_, AppError>(Control::Continue)
  });

  p.on("open_transaction", |ctx: FlowCtx<PlaceOrderCtxData>| async move {
    let store = ctx.read().store.clone();
    let tx = store.begin().await?;
    ctx.read().tx.put(tx);
    debug!("Order transaction opened.");
    Ok::<_, AppError>(Control::Continue)
  });

  p.on("assign_order_number", |ctx: FlowCtx<PlaceOrderCtxData>| async move {
    let (mut tx, order_date) = {
      let guard = ctx.read();
      (guard.tx.take()?, guard.order_date)
    };
    let max_id = tx.max_order_id().await;
    ctx.read().tx.put(tx);

    let order_number = format_order_number(order_date, max_id?);
    debug!(%order_number, "Order number assigned.");
    ctx.write().order_number = Some(order_number);
    Ok::<_, AppError>(Control::Continue)
  });

  p.on("insert_order_header", |ctx: FlowCtx<PlaceOrderCtxData>| async move {
    let (mut tx, new_order) = {
      let guard = ctx.read();
      let order_number = guard
        .order_number
        .clone()
        .ok_or_else(|| AppError::Internal("Order number was not assigned.".to_string()))?;
      let r = &guard.request;
      let new_order = NewOrder {
        order_number,
        customer_id: r.customer_id,
        restaurant_id: r.restaurant_id,
        address_id: r.address_id,
        subtotal: r.subtotal,
        tax_amount: r.tax_amount,
        delivery_fee: r.delivery_fee,
        total_amount: r.total_amount,
        payment_method: PAYMENT_METHOD_CARD.to_string(),
        payment_status: PaymentStatus::Pending.as_str().to_string(),
        order_status: OrderStatus::Pending.as_str().to_string(),
      };
      (guard.tx.take()?, new_order)
    };
    let inserted = tx.insert_order(&new_order).await;
    ctx.read().tx.put(tx);

    let order_id = inserted?;
    info!(order_id, order_number = %new_order.order_number, "Order header inserted.");
    ctx.write().order_id = Some(order_id);
    Ok::<_, AppError>(Control::Continue)
  });

  p.on("insert_line_items", |ctx: FlowCtx<PlaceOrderCtxData>| async move {
    let (mut tx, order_id, items) = {
      let guard = ctx.read();
      let items: Vec<NewOrderItem> = guard
        .request
        .items
        .iter()
        .map(|line| NewOrderItem {
          menu_item_id: line.menu_item_id,
          qty: line.qty,
          price: line.price,
        })
        .collect();
      (guard.tx.take()?, order_id_of(&guard)?, items)
    };

    let mut ids = Vec::with_capacity(items.len());
    let mut failure = None;
    for item in &items {
      match tx.insert_order_item(order_id, item).await {
        Ok(id) => ids.push(id),
        Err(e) => {
          failure = Some(e);
          break;
        }
      }
    }
    ctx.read().tx.put(tx);

    if let Some(e) = failure {
      return Err(e);
    }
    debug!(order_id, count = ids.len(), "Line items inserted.");
    ctx.write().order_item_ids = ids;
    Ok::<_, AppError>(Control::Continue)
  });

  p.on("capture_payment", |ctx: FlowCtx<PlaceOrderCtxData>| async move {
    let (gateway, request) = {
      let guard = ctx.read();
      let request = ChargeRequest {
        amount_minor: minor_units(guard.request.total_amount)?,
        currency: guard.currency.clone(),
        card_token: guard.request.stripe_token.clone(),
        order_number: guard.order_number.clone().unwrap_or_default(),
      };
      (guard.payments.clone(), request)
    };

    match gateway.charge(&request).await {
      Ok(charge) => {
        info!(charge_id = %charge.id, charge_status = %charge.status, "Payment captured.");
        ctx.write().charge = Some(charge);
        Ok::<_, AppError>(Control::Continue)
      }
      Err(e) => {
        ctx.write().payment_status = PaymentStatus::Failed;
        warn!(error = %e, order_number = %request.order_number, "Payment capture failed.");
        Err(e)
      }
    }
  });

  p.after("capture_payment", |ctx: FlowCtx<PlaceOrderCtxData>| async move {
    ctx.write().payment_status = PaymentStatus::Success;
    Ok::<_, AppError>(Control::Continue)
  });

  p.on("record_payment_transaction", |ctx: FlowCtx<PlaceOrderCtxData>| async move {
    let (mut tx, payment, order_number) = {
      let guard = ctx.read();
      let charge = guard
        .charge
        .clone()
        .ok_or_else(|| AppError::Internal("No captured charge to record.".to_string()))?;
      let payment = NewPaymentTransaction {
        order_id: order_id_of(&guard)?,
        transaction_ref: charge.id,
        payment_mode: guard.payments.name().to_string(),
        amount: guard.request.total_amount,
        status: charge.status,
      };
      (guard.tx.take()?, payment, guard.order_number.clone().unwrap_or_default())
    };
    let inserted = tx.insert_payment_transaction(&payment).await;
    ctx.read().tx.put(tx);

    match inserted {
      Ok(id) => {
        ctx.write().payment_transaction_id = Some(id);
        Ok::<_, AppError>(Control::Continue)
      }
      Err(e) => {
        error!(
          charge_id = %payment.transaction_ref,
          order_number = %order_number,
          amount = %payment.amount,
          error = %e,
          "Unreconciled charge: payment captured but its record could not be written. The order is rolled back."
        );
        Err(e)
      }
    }
  });

  p.on("commit_transaction", |ctx: FlowCtx<PlaceOrderCtxData>| async move {
    let tx = ctx.read().tx.take()?;
    tx.commit().await?;
    debug!("Order transaction committed.");
    Ok::<_, AppError>(Control::Continue)
  });

  p.on("mark_order_placed", |ctx: FlowCtx<PlaceOrderCtxData>| async move {
    let (store, order_id, payment_status) = {
      let guard = ctx.read();
      (guard.store.clone(), order_id_of(&guard)?, guard.payment_status)
    };
    let next_status = OrderStatus::Placed;
    match store
      .update_order_statuses(order_id, payment_status.as_str(), next_status.as_str())
      .await
    {
      Ok(()) => {
        let mut guard = ctx.write();
        guard.order_status = next_status;
        guard.statuses_persisted = true;
      }
      Err(e) => {
        warn!(order_id, error = %e, "Order committed but its status update failed.");
      }
    }
    Ok::<_, AppError>(Control::Continue)
  });

  p
}

fn order_id_of(data: &PlaceOrderCtxData) -> Result<i64> {
  data
    .order_id
    .ok_or_else(|| AppError::Internal("Order header was not inserted.".to_string()))
}

fn validate(request: &PlaceOrderRequest) -> Result<()> {
  if request.items.is_empty() {
    return Err(AppError::Validation("Order must contain at least one item.".to_string()));
  }
  if request.customer_id <= 0 || request.restaurant_id <= 0 || request.address_id <= 0 {
    return Err(AppError::Validation(
      "customer_id, restaurant_id and address_id are required.".to_string(),
    ));
  }
  let amounts = [
    ("subtotal", request.subtotal),
    ("tax_amount", request.tax_amount),
    ("delivery_fee", request.delivery_fee),
    ("total_amount", request.total_amount),
  ];
  if let Some((field, _)) = amounts.iter().find(|(_, v)| *v < Decimal::ZERO) {
    return Err(AppError::Validation(format!("{} cannot be negative.", field)));
  }
  if let Some((field, _)) = amounts.iter().find(|(_, v)| !is_whole_cents(*v)) {
    return Err(AppError::Validation(format!("{} cannot have more than two decimal places.", field)));
  }
  for item in &request.items {
    if item.menu_item_id <= 0 {
      return Err(AppError::Validation("Each item needs a menu_item_id.".to_string()));
    }
    if item.qty < 1 {
      return Err(AppError::Validation("Item quantity must be at least 1.".to_string()));
    }
    if item.price < Decimal::ZERO {
      return Err(AppError::Validation("Item price cannot be negative.".to_string()));
    }
    if !is_whole_cents(item.price) {
      return Err(AppError::Validation(
        "Item price cannot have more than two decimal places.".to_string(),
      ));
    }
  }
  if request.stripe_token.trim().is_empty() {
    return Err(AppError::Validation("A payment token is required.".to_string()));
  }
  Ok(())
}

// Amounts are stored as NUMERIC(10,2) and charged in minor units; both must agree.
fn is_whole_cents(amount: Decimal) -> bool {
  amount.normalize().scale() <= 2
}

/// Runs the registered order flow and rolls back the open transaction on any failure.
#[instrument(
  name = "place_order",
  skip_all,
  fields(
    customer_id = data.request.customer_id,
    restaurant_id = data.request.restaurant_id,
    items = data.request.items.len()
  )
)]
pub async fn run_place_order(flows: &FlowRegistry<AppError>, data: PlaceOrderCtxData) -> Result<PlacedOrder> {
  let ctx = FlowCtx::new(data);
  let outcome = flows.run(ctx.clone()).await;

  let pending_tx = ctx.read().tx.take().ok();
  if let Some(tx) = pending_tx {
    match tx.rollback().await {
      Ok(()) => debug!("Order transaction rolled back."),
      Err(e) => error!(error = %e, "Rolling back the order transaction failed."),
    }
  }

  match outcome? {
    Outcome::Completed => {}
    Outcome::Halted => return Err(AppError::Internal("Order flow halted unexpectedly.".to_string())),
  }

  let guard = ctx.read();
  let placed = PlacedOrder {
    order_id: order_id_of(&guard)?,
    order_number: guard
      .order_number
      .clone()
      .ok_or_else(|| AppError::Internal("Order number was not assigned.".to_string()))?,
    payment_status: guard.payment_status,
  };
  info!(order_id = placed.order_id, order_number = %placed.order_number, "Order placed.");
  Ok(placed)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::pipelines::contexts::OrderLineRequest;
  use rust_decimal_macros::dec;

  fn request() -> PlaceOrderRequest {
    PlaceOrderRequest {
      customer_id: 7,
      restaurant_id: 3,
      address_id: 9,
      subtotal: dec!(100),
      tax_amount: dec!(5),
      delivery_fee: dec!(10),
      total_amount: dec!(115),
      items: vec![OrderLineRequest {
        menu_item_id: 1,
        qty: 2,
        price: dec!(50),
      }],
      stripe_token: "tok_test".to_string(),
    }
  }

  #[test]
  fn valid_request_passes() {
    assert!(validate(&request()).is_ok());
  }

  #[test]
  fn empty_items_are_rejected() {
    let mut r = request();
    r.items.clear();
    assert!(matches!(validate(&r), Err(AppError::Validation(m)) if m.contains("at least one item")));
  }

  #[test]
  fn zero_quantity_is_rejected() {
    let mut r = request();
    r.items[0].qty = 0;
    assert!(matches!(validate(&r), Err(AppError::Validation(_))));
  }

  #[test]
  fn negative_amounts_are_rejected() {
    let mut r = request();
    r.delivery_fee = dec!(-1);
    assert!(matches!(validate(&r), Err(AppError::Validation(m)) if m.contains("delivery_fee")));
  }

  #[test]
  fn sub_cent_amounts_are_rejected() {
    let mut r = request();
    r.total_amount = dec!(9.999);
    assert!(matches!(validate(&r), Err(AppError::Validation(m)) if m.contains("total_amount")));

    let mut r = request();
    r.items[0].price = dec!(49.995);
    assert!(matches!(validate(&r), Err(AppError::Validation(m)) if m.contains("Item price")));
  }

  #[test]
  fn trailing_zeros_do_not_count_as_extra_precision() {
    let mut r = request();
    r.subtotal = dec!(100.000);
    r.tax_amount = dec!(5.50);
    assert!(validate(&r).is_ok());
  }

  #[test]
  fn total_is_not_recomputed() {
    let mut r = request();
    r.total_amount = dec!(1);
    assert!(validate(&r).is_ok());
  }

  #[test]
  fn flow_layout_matches_the_sequence() {
    let flow = build_place_order_flow();
    assert_eq!(
      flow.step_names(),
      vec![
        "validate_order_request",
        "open_transaction",
        "assign_order_number",
        "insert_order_header",
        "insert_line_items",
        "capture_payment",
        "record_payment_transaction",
        "commit_transaction",
        "mark_order_placed",
      ]
    );
  }
}
