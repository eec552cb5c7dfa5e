// core/src/registry.rs

//! A registry of flows keyed by the type of their context data.

use crate::core::context::FlowCtx;
use crate::core::control::Outcome;
use crate::error::FlowError;
use crate::flow::Flow;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, Level};

#[async_trait]
trait ErasedFlow<AppErr>: Send + Sync {
  /// `ctx` must box a `FlowCtx<T>` for the flow's own `T`.
  async fn run_erased(&self, ctx: Box<dyn Any + Send>) -> Result<Outcome, AppErr>;
}

struct Registered<T, FlowErr>
where
  T: Send + Sync + 'static,
  FlowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  flow: Flow<T, FlowErr>,
}

#[async_trait]
impl<T, FlowErr, AppErr> ErasedFlow<AppErr> for Registered<T, FlowErr>
where
  T: Send + Sync + 'static,
  FlowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
  AppErr: From<FlowErr> + From<FlowError> + Send + 'static,
{
  async fn run_erased(&self, ctx: Box<dyn Any + Send>) -> Result<Outcome, AppErr> {
    let ctx = match ctx.downcast::<FlowCtx<T>>() {
      Ok(ctx) => *ctx,
      Err(_) => {
        return Err(AppErr::from(FlowError::ContextMismatch {
          expected: std::any::type_name::<T>().to_string(),
        }))
      }
    };
    self.flow.run(ctx).await.map_err(AppErr::from)
  }
}

/// Holds at most one flow per context type and dispatches runs to it.
///
/// `AppErr` is what [`FlowRegistry::run`] reports; every registered flow's error
/// type must convert into it.
pub struct FlowRegistry<AppErr = FlowError> {
  flows: RwLock<HashMap<TypeId, Arc<dyn ErasedFlow<AppErr>>>>,
  _app_err: PhantomData<fn() -> AppErr>,
}

impl<AppErr> FlowRegistry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      flows: RwLock::new(HashMap::new()),
      _app_err: PhantomData,
    }
  }

  /// Registers `flow` for context type `T`, replacing any earlier flow for `T`.
  pub fn register<T, FlowErr>(&self, flow: Flow<T, FlowErr>)
  where
    T: Send + Sync + 'static,
    FlowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
    AppErr: From<FlowErr>,
  {
    event!(Level::DEBUG, context_type = %std::any::type_name::<T>(), steps = ?flow.step_names(), "registering flow");
    let previous = self
      .flows
      .write()
      .insert(TypeId::of::<T>(), Arc::new(Registered { flow }));
    if previous.is_some() {
      event!(Level::WARN, context_type = %std::any::type_name::<T>(), "replaced an already registered flow");
    }
  }

  pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
    self.flows.read().contains_key(&TypeId::of::<T>())
  }

  /// Runs the flow registered for `T`. The caller keeps its own handle on `ctx`
  /// to read results afterwards.
  pub async fn run<T: Send + Sync + 'static>(&self, ctx: FlowCtx<T>) -> Result<Outcome, AppErr> {
    let runner = self.flows.read().get(&TypeId::of::<T>()).cloned();
    let Some(runner) = runner else {
      let type_name = std::any::type_name::<T>();
      event!(Level::ERROR, context_type = %type_name, "no flow registered");
      return Err(AppErr::from(FlowError::NotRegistered {
        type_name: type_name.to_string(),
      }));
    };
    runner.run_erased(Box::new(ctx)).await
  }
}

impl<AppErr> Default for FlowRegistry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}
