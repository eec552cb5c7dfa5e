pub mod context;
pub mod control;
pub mod handler;
pub mod step;
