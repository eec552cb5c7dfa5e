// server/src/services/mod.rs

pub mod auth_service;
pub mod payment_gateway;
pub mod payment_mock;
pub mod stripe_gateway;
