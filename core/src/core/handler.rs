// core/src/core/handler.rs
use super::context::FlowCtx;
use super::control::Control;
use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<O> = Pin<Box<dyn Future<Output = O> + Send>>;

/// A boxed step handler. It receives its own handle to the flow context and
/// resolves to a [`Control`] signal or the flow's error type.
pub type Handler<T, E> = Box<dyn Fn(FlowCtx<T>) -> BoxFuture<Result<Control, E>> + Send + Sync>;

pub(crate) fn boxed<T, E, F, Fut, UserErr>(handler_fn: F) -> Handler<T, E>
where
  T: Send + Sync + 'static,
  F: Fn(FlowCtx<T>) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<Control, UserErr>> + Send + 'static,
  UserErr: Into<E> + 'static,
  E: 'static,
{
  Box::new(move |ctx| {
    let fut = handler_fn(ctx);
    Box::pin(async move { fut.await.map_err(Into::into) })
  })
}
