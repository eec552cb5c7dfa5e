// tests/flow_execution_tests.rs
mod common;

use common::*;
use flow::{Control, Flow, FlowCtx, FlowError, Outcome};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
#[serial]
async fn runs_steps_in_declared_order() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new(&[("one", false), ("two", false), ("three", false)]);
  flow.on("three", recording("three", "3"));
  flow.on("one", recording("one", "1"));
  flow.on("two", recording("two", "2"));

  let ctx = FlowCtx::new(TestContext::default());
  let outcome = flow.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, Outcome::Completed);
  let guard = ctx.read();
  assert_eq!(guard.trail, "123");
  assert_eq!(guard.visited, vec!["one", "two", "three"]);
}

#[tokio::test]
#[serial]
async fn before_on_after_run_in_phase_order() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new(&[("only", false)]);
  flow.after("only", recording("after", "c"));
  flow.on("only", recording("on", "b"));
  flow.before("only", recording("before", "a"));
  flow.on("only", recording("on_again", "B"));

  let ctx = FlowCtx::new(TestContext::default());
  flow.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().trail, "abBc");
}

#[tokio::test]
#[serial]
async fn halt_stops_remaining_handlers_and_steps() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new(&[("first", false), ("stop", false), ("never", false)]);
  flow.on("first", recording("first", "F"));
  flow.on("stop", recording("stop", "S"));
  flow.after("stop", recording("stop_after", "X"));
  flow.on("never", recording("never", "N"));

  let ctx = FlowCtx::new(TestContext {
    halt_at: Some("stop".to_string()),
    ..Default::default()
  });
  let outcome = flow.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, Outcome::Halted);
  assert_eq!(ctx.read().trail, "FS");
}

#[tokio::test]
#[serial]
async fn handler_error_aborts_the_run() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new(&[("good", false), ("bad", false), ("unreached", false)]);
  flow.on("good", recording("good", "G"));
  flow.on("bad", failing("bad", "boom"));
  flow.on("unreached", recording("unreached", "U"));

  let ctx = FlowCtx::new(TestContext::default());
  let err = flow.run(ctx.clone()).await.unwrap_err();

  assert_eq!(err, TestError::Handler("boom".to_string()));
  assert_eq!(ctx.read().visited, vec!["good", "bad"]);
}

#[tokio::test]
#[serial]
async fn skip_condition_is_evaluated_when_the_step_is_reached() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new(&[("bump", false), ("guarded", false), ("tail", false)]);
  flow.on("bump", recording("bump", "b"));
  flow.on("guarded", recording("guarded", "g"));
  flow.on("tail", recording("tail", "t"));
  flow.skip_if("guarded", Arc::new(|ctx: &FlowCtx<TestContext>| ctx.read().counter > 0));

  let ctx = FlowCtx::new(TestContext::default());
  flow.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().trail, "bt");
}

#[tokio::test]
#[serial]
async fn optional_step_without_handlers_is_skipped() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new(&[("a", false), ("maybe", true), ("b", false)]);
  flow.on("a", recording("a", "a"));
  flow.on("b", recording("b", "b"));

  let ctx = FlowCtx::new(TestContext::default());
  assert_eq!(flow.run(ctx.clone()).await.unwrap(), Outcome::Completed);
  assert_eq!(ctx.read().trail, "ab");
}

#[tokio::test]
#[serial]
async fn required_step_without_handlers_fails() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new(&[("a", false), ("empty", false)]);
  flow.on("a", recording("a", "a"));

  let ctx = FlowCtx::new(TestContext::default());
  match flow.run(ctx.clone()).await {
    Err(TestError::Flow(msg)) => {
      assert!(msg.contains("MissingHandler"));
      assert!(msg.contains("empty"));
    }
    other => panic!("expected a missing handler error, got {:?}", other),
  }
  // Steps before the empty one still ran.
  assert_eq!(ctx.read().trail, "a");
}

#[tokio::test]
#[serial]
async fn structural_edits_change_execution() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new(&[("start", false), ("end", false)]);
  flow.insert_after("start", "middle", false);
  flow.insert_before("start", "preamble", true);
  flow.on("start", recording("start", "s"));
  flow.on("middle", recording("middle", "m"));
  flow.on("end", recording("end", "e"));
  assert_eq!(flow.step_names(), vec!["preamble", "start", "middle", "end"]);

  flow.remove_step("middle");
  assert!(!flow.has_step("middle"));

  let ctx = FlowCtx::new(TestContext::default());
  flow.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().trail, "se");
}

#[tokio::test]
#[serial]
async fn set_optional_relaxes_a_required_step() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new(&[("pending", false)]);
  flow.set_optional("pending", true);
  let outcome = flow.run(FlowCtx::new(TestContext::default())).await.unwrap();
  assert_eq!(outcome, Outcome::Completed);
}

#[tokio::test]
#[serial]
async fn handlers_may_await_between_short_lock_sections() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new(&[("slow", false)]);
  flow.on("slow", |ctx: FlowCtx<TestContext>| async move {
    let start = ctx.read().counter;
    tokio::time::sleep(Duration::from_millis(5)).await;
    ctx.write().counter = start + 10;
    Ok::<_, TestError>(Control::Continue)
  });

  let ctx = FlowCtx::new(TestContext::default());
  flow.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().counter, 10);
}

#[tokio::test]
#[serial]
async fn flow_error_as_the_handler_error_type() {
  setup_tracing();
  let mut flow = Flow::<TestContext, FlowError>::new(&[("task", false)]);
  flow.on("task", |_ctx: FlowCtx<TestContext>| async move {
    Err::<Control, _>(anyhow::anyhow!("upstream unavailable"))
  });

  match flow.run(FlowCtx::new(TestContext::default())).await {
    Err(FlowError::Handler { source }) => assert_eq!(source.to_string(), "upstream unavailable"),
    other => panic!("expected FlowError::Handler, got {:?}", other),
  }
}

#[test]
#[should_panic(expected = "is not defined")]
fn wiring_an_unknown_step_panics() {
  let mut flow = Flow::<TestContext, TestError>::new(&[("real", false)]);
  flow.on("typo", recording("typo", "x"));
}

#[test]
#[should_panic(expected = "defined twice")]
fn duplicate_step_names_panic() {
  let _ = Flow::<TestContext, TestError>::new(&[("dup", false), ("dup", true)]);
}
