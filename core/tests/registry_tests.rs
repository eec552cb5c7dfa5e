// tests/registry_tests.rs
mod common;

use common::*;
use flow::{Control, Flow, FlowCtx, FlowRegistry, Outcome};
use serial_test::serial;

#[derive(Debug, Default)]
struct AlphaData {
  label: String,
}

#[derive(Debug, Default)]
struct BetaData {
  total: i64,
}

fn alpha_flow() -> Flow<AlphaData, TestError> {
  let mut flow = Flow::new(&[("label", false)]);
  flow.on("label", |ctx: FlowCtx<AlphaData>| async move {
    ctx.write().label = "alpha".to_string();
    Ok::<_, TestError>(Control::Continue)
  });
  flow
}

fn beta_flow() -> Flow<BetaData, TestError> {
  let mut flow = Flow::new(&[("sum", false), ("stop", false)]);
  flow.on("sum", |ctx: FlowCtx<BetaData>| async move {
    ctx.write().total += 40;
    Ok::<_, TestError>(Control::Continue)
  });
  flow.on("stop", |_ctx: FlowCtx<BetaData>| async move { Ok::<_, TestError>(Control::Halt) });
  flow
}

#[tokio::test]
#[serial]
async fn dispatches_by_context_type() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();
  registry.register(alpha_flow());
  registry.register(beta_flow());
  assert!(registry.contains::<AlphaData>());
  assert!(registry.contains::<BetaData>());

  let alpha = FlowCtx::new(AlphaData::default());
  assert_eq!(registry.run(alpha.clone()).await.unwrap(), Outcome::Completed);
  assert_eq!(alpha.read().label, "alpha");

  let beta = FlowCtx::new(BetaData::default());
  assert_eq!(registry.run(beta.clone()).await.unwrap(), Outcome::Halted);
  assert_eq!(beta.read().total, 40);
}

#[tokio::test]
#[serial]
async fn unregistered_context_type_is_an_error() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();
  registry.register(alpha_flow());

  match registry.run(FlowCtx::new(BetaData::default())).await {
    Err(TestError::Flow(msg)) => {
      assert!(msg.contains("NotRegistered"));
      assert!(msg.contains("BetaData"));
    }
    other => panic!("expected NotRegistered, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn registering_twice_keeps_the_latest_flow() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();
  registry.register(alpha_flow());

  let mut replacement = Flow::<AlphaData, TestError>::new(&[("relabel", false)]);
  replacement.on("relabel", |ctx: FlowCtx<AlphaData>| async move {
    ctx.write().label = "replacement".to_string();
    Ok::<_, TestError>(Control::Continue)
  });
  registry.register(replacement);

  let ctx = FlowCtx::new(AlphaData::default());
  registry.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().label, "replacement");
}

#[tokio::test]
#[serial]
async fn handler_errors_surface_through_the_registry() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();
  let mut flow = Flow::<TestContext, TestError>::new(&[("explode", false)]);
  flow.on("explode", failing("explode", "nope"));
  registry.register(flow);

  let err = registry.run(FlowCtx::new(TestContext::default())).await.unwrap_err();
  assert_eq!(err, TestError::Handler("nope".to_string()));
}
