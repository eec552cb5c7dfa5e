// core/src/flow/hooks.rs
use super::Flow;
use crate::core::context::FlowCtx;
use crate::core::control::Control;
use crate::core::handler::{boxed, Handler};
use crate::error::FlowError;
use std::collections::HashMap;
use std::future::Future;

impl<T, E> Flow<T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Adds a handler that runs ahead of the step's `on` handlers.
  pub fn before<F, Fut, UserErr>(&mut self, step: &str, handler_fn: F)
  where
    F: Fn(FlowCtx<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Control, UserErr>> + Send + 'static,
    UserErr: Into<E> + 'static,
  {
    self.position_or_panic(step);
    push(&mut self.before, step, boxed(handler_fn));
  }

  /// Adds a main handler for the step. Handlers of one phase run in insertion order.
  pub fn on<F, Fut, UserErr>(&mut self, step: &str, handler_fn: F)
  where
    F: Fn(FlowCtx<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Control, UserErr>> + Send + 'static,
    UserErr: Into<E> + 'static,
  {
    self.position_or_panic(step);
    push(&mut self.on, step, boxed(handler_fn));
  }

  pub fn after<F, Fut, UserErr>(&mut self, step: &str, handler_fn: F)
  where
    F: Fn(FlowCtx<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Control, UserErr>> + Send + 'static,
    UserErr: Into<E> + 'static,
  {
    self.position_or_panic(step);
    push(&mut self.after, step, boxed(handler_fn));
  }
}

fn push<T, E>(table: &mut HashMap<String, Vec<Handler<T, E>>>, step: &str, handler: Handler<T, E>)
where
  T: Send + Sync + 'static,
{
  table.entry(step.to_string()).or_default().push(handler);
}
