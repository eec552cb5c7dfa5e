// core/src/flow/execution.rs
use super::Flow;
use crate::core::context::FlowCtx;
use crate::core::control::{Control, Outcome};
use crate::core::handler::Handler;
use crate::error::FlowError;
use tracing::{event, instrument, Instrument, Level};

#[derive(Clone, Copy, Debug)]
enum Phase {
  Before,
  On,
  After,
}

impl Phase {
  fn as_str(self) -> &'static str {
    match self {
      Phase::Before => "before",
      Phase::On => "on",
      Phase::After => "after",
    }
  }
}

impl<T, E> Flow<T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step in order against `ctx`.
  ///
  /// The first handler error aborts the run and is returned as is. A handler
  /// answering [`Control::Halt`] ends the run with [`Outcome::Halted`].
  #[instrument(
    name = "Flow::run",
    skip_all,
    fields(context_type = %std::any::type_name::<T>(), steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx: FlowCtx<T>) -> Result<Outcome, E> {
    for (index, step) in self.steps.iter().enumerate() {
      let name = step.name.as_str();
      let span = tracing::info_span!("flow_step", step = name, index);

      if let Some(cond) = &step.skip_if {
        if cond(&ctx) {
          event!(parent: &span, Level::DEBUG, "step skipped by condition");
          continue;
        }
      }

      let phases = [
        (Phase::Before, self.before.get(name)),
        (Phase::On, self.on.get(name)),
        (Phase::After, self.after.get(name)),
      ];
      if phases.iter().all(|(_, handlers)| handlers.map_or(true, |h| h.is_empty())) {
        if step.optional {
          event!(parent: &span, Level::DEBUG, "optional step has no handlers");
          continue;
        }
        event!(parent: &span, Level::ERROR, "non-optional step has no handlers");
        return Err(E::from(FlowError::MissingHandler {
          step: step.name.clone(),
        }));
      }

      for (phase, handlers) in phases {
        let Some(handlers) = handlers else { continue };
        let control = run_phase(phase, handlers, &ctx).instrument(span.clone()).await?;
        if control == Control::Halt {
          event!(parent: &span, Level::INFO, phase = phase.as_str(), "flow halted");
          return Ok(Outcome::Halted);
        }
      }
    }

    event!(Level::DEBUG, "flow completed");
    Ok(Outcome::Completed)
  }
}

async fn run_phase<T, E>(phase: Phase, handlers: &[Handler<T, E>], ctx: &FlowCtx<T>) -> Result<Control, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error,
{
  for handler in handlers {
    match handler(ctx.clone()).await {
      Ok(Control::Continue) => {}
      Ok(Control::Halt) => return Ok(Control::Halt),
      Err(e) => {
        event!(Level::ERROR, phase = phase.as_str(), error = %e, "handler failed");
        return Err(e);
      }
    }
  }
  Ok(Control::Continue)
}
