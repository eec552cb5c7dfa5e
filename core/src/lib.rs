// core/src/lib.rs

//! A small asynchronous step-flow engine.
//!
//! A [`Flow`] is an ordered list of named steps. Each step can carry `before`,
//! `on` and `after` handlers which receive a shared [`FlowCtx`] and answer with
//! a [`Control`] signal. Flows are registered in a [`FlowRegistry`] keyed by the
//! type of data they operate on, so request handlers only need to build the
//! context and hand it over.
//!
//! Handlers lock the context for short, synchronous sections only. A guard must
//! never be held across an `.await`.

pub mod core;
pub mod error;
pub mod flow;
pub mod registry;

pub use crate::core::context::FlowCtx;
pub use crate::core::control::{Control, Outcome};
pub use crate::core::handler::Handler;
pub use crate::core::step::{SkipCondition, StepDef};
pub use crate::error::{FlowError, FlowResult};
pub use crate::flow::Flow;
pub use crate::registry::FlowRegistry;
