// server/src/web/handlers/mod.rs

pub mod address_handlers;
pub mod admin_handlers;
pub mod auth_handlers;
pub mod order_handlers;
pub mod partner_handlers;
pub mod restaurant_handlers;
