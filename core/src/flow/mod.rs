// core/src/flow/mod.rs

//! The [`Flow`] type: step layout and handler tables. Handler registration
//! lives in `hooks`, the run loop in `execution`.

mod execution;
mod hooks;

use crate::core::handler::Handler;
use crate::core::step::{SkipCondition, StepDef};
use crate::error::FlowError;
use std::collections::HashMap;

pub struct Flow<T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<T>>,
  pub(crate) before: HashMap<String, Vec<Handler<T, E>>>,
  pub(crate) on: HashMap<String, Vec<Handler<T, E>>>,
  pub(crate) after: HashMap<String, Vec<Handler<T, E>>>,
}

impl<T, E> Flow<T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Builds a flow from `(step_name, optional)` pairs, in execution order.
  ///
  /// # Panics
  /// If a step name appears twice.
  pub fn new(steps: &[(&str, bool)]) -> Self {
    let mut flow = Self {
      steps: Vec::with_capacity(steps.len()),
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    };
    for (name, optional) in steps {
      flow.assert_absent(name);
      flow.steps.push(StepDef::new(*name, *optional));
    }
    flow
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn has_step(&self, name: &str) -> bool {
    self.position(name).is_some()
  }

  pub fn insert_before(&mut self, existing: &str, name: impl Into<String>, optional: bool) {
    let idx = self.position_or_panic(existing);
    let name = name.into();
    self.assert_absent(&name);
    self.steps.insert(idx, StepDef::new(name, optional));
  }

  pub fn insert_after(&mut self, existing: &str, name: impl Into<String>, optional: bool) {
    let idx = self.position_or_panic(existing);
    let name = name.into();
    self.assert_absent(&name);
    self.steps.insert(idx + 1, StepDef::new(name, optional));
  }

  /// Removes a step and every handler attached to it. Unknown names are ignored.
  pub fn remove_step(&mut self, name: &str) {
    if let Some(idx) = self.position(name) {
      self.steps.remove(idx);
      self.before.remove(name);
      self.on.remove(name);
      self.after.remove(name);
    }
  }

  pub fn set_optional(&mut self, name: &str, optional: bool) {
    let idx = self.position_or_panic(name);
    self.steps[idx].optional = optional;
  }

  /// Skips `name` whenever `cond` holds at the moment the step is reached.
  pub fn skip_if(&mut self, name: &str, cond: SkipCondition<T>) {
    let idx = self.position_or_panic(name);
    self.steps[idx].skip_if = Some(cond);
  }

  fn position(&self, name: &str) -> Option<usize> {
    self.steps.iter().position(|s| s.name == name)
  }

  // Wiring a handler to a misspelled step is a programming error, not a runtime condition.
  pub(crate) fn position_or_panic(&self, name: &str) -> usize {
    match self.position(name) {
      Some(idx) => idx,
      None => panic!("flow setup error: step '{}' is not defined", name),
    }
  }

  fn assert_absent(&self, name: &str) {
    if self.position(name).is_some() {
      panic!("flow setup error: step '{}' is defined twice", name);
    }
  }
}
