// tests/common/mod.rs
#![allow(dead_code)]

use flow::{Control, FlowCtx, FlowError, Handler};
use once_cell::sync::Lazy;
use tracing::Level;

#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub trail: String,
  pub visited: Vec<String>,
  pub halt_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  // FlowError is not PartialEq, so keep its Debug rendering.
  #[error("flow error: {0}")]
  Flow(String),

  #[error("handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(err: FlowError) -> Self {
    TestError::Flow(format!("{:?}", err))
  }
}

/// Appends `mark` to the trail, records the visit, and halts when `halt_at` names this step.
pub fn recording(step: &'static str, mark: &'static str) -> Handler<TestContext, TestError> {
  Box::new(move |ctx: FlowCtx<TestContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.trail.push_str(mark);
      guard.visited.push(step.to_string());
      tracing::debug!(target: "test_handlers", step, counter = guard.counter, "visited");
      if guard.halt_at.as_deref() == Some(step) {
        return Ok(Control::Halt);
      }
      Ok::<_, TestError>(Control::Continue)
    })
  })
}

pub fn failing(step: &'static str, message: &'static str) -> Handler<TestContext, TestError> {
  Box::new(move |ctx: FlowCtx<TestContext>| {
    Box::pin(async move {
      ctx.write().visited.push(step.to_string());
      tracing::warn!(target: "test_handlers", step, message, "failing on purpose");
      Err::<Control, _>(TestError::Handler(message.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
