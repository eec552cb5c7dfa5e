// server/src/pipelines/mod.rs

//! The flows behind order placement, signup and signin.

use crate::errors::AppError;
use flow::FlowRegistry;

pub mod contexts;
pub mod place_order_pipeline;
pub mod signin_pipeline;
pub mod signup_pipeline;

/// Registers every application flow. Called once at startup.
pub fn register_all_flows(registry: &FlowRegistry<AppError>) {
  registry.register(place_order_pipeline::build_place_order_flow());
  registry.register(signup_pipeline::build_signup_flow());
  registry.register(signin_pipeline::build_signin_flow());
  tracing::info!("All application flows registered.");
}
