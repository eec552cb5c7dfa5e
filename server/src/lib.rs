// server/src/lib.rs

//! GoEats: a multi-tenant food-delivery REST backend on actix-web and Postgres.

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;
