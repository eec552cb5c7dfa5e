// core/src/core/control.rs

/// What a handler wants the flow to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
  /// Run the remaining handlers and steps.
  Continue,
  /// End the run now. Nothing after this handler executes.
  Halt,
}

/// How a flow run ended when no handler returned an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// Every step was executed, skipped by its condition, or optional without handlers.
  Completed,
  /// A handler returned [`Control::Halt`].
  Halted,
}
