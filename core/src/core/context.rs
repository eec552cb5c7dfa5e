// core/src/core/context.rs
use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::sync::Arc;

/// Shared, lockable data that every handler of a flow run operates on.
///
/// Cloning is cheap and yields a handle to the same data. Guards returned by
/// the accessors block other handles and MUST be released before any `.await`.
pub struct FlowCtx<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> FlowCtx<T> {
  pub fn new(data: T) -> Self {
    FlowCtx(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }

  pub fn try_read(&self) -> Option<RwLockReadGuard<'_, T>> {
    self.0.try_read()
  }

  pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, T>> {
    self.0.try_write()
  }

  /// Read guard narrowed to one part of the data, e.g. `ctx.map_read(|d| &d.items)`.
  pub fn map_read<U: ?Sized>(&self, f: impl FnOnce(&T) -> &U) -> MappedRwLockReadGuard<'_, U> {
    RwLockReadGuard::map(self.read(), f)
  }

  pub fn map_write<U: ?Sized>(&self, f: impl FnOnce(&mut T) -> &mut U) -> MappedRwLockWriteGuard<'_, U> {
    RwLockWriteGuard::map(self.write(), f)
  }

  /// Number of live handles to this context.
  pub fn handle_count(&self) -> usize {
    Arc::strong_count(&self.0)
  }
}

impl<T: Send + Sync + 'static> Clone for FlowCtx<T> {
  fn clone(&self) -> Self {
    FlowCtx(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + 'static + Default> Default for FlowCtx<T> {
  fn default() -> Self {
    Self::new(T::default())
  }
}

impl<T: Send + Sync + 'static + fmt::Debug> fmt::Debug for FlowCtx<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.try_read() {
      Some(guard) => f.debug_tuple("FlowCtx").field(&*guard).finish(),
      None => f.write_str("FlowCtx(<locked>)"),
    }
  }
}
