// server/src/web/routes.rs

use crate::web::handlers::{
  address_handlers, admin_handlers, auth_handlers, order_handlers, partner_handlers, restaurant_handlers,
};
use crate::errors::AppError;
use actix_web::{web, HttpResponse};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Malformed bodies, paths and query strings render through the same error envelope.
fn configure_extractors(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(
      web::JsonConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("Invalid request body: {}", err)).into()),
    )
    .app_data(
      web::PathConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("Invalid path parameter: {}", err)).into()),
    )
    .app_data(
      web::QueryConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("Invalid query string: {}", err)).into()),
    );
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  configure_extractors(cfg);
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/auth")
          .route("/signup", web::post().to(auth_handlers::signup_handler))
          .route("/signin", web::post().to(auth_handlers::signin_handler)),
      )
      .service(
        web::resource("/addresses")
          .route(web::post().to(address_handlers::create_address_handler))
          .route(web::get().to(address_handlers::list_addresses_handler)),
      )
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::place_order_handler))
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("/{id}", web::get().to(order_handlers::get_order_handler))
          .route("/{id}/status", web::put().to(order_handlers::update_order_status_handler)),
      )
      .service(
        web::scope("/restaurants")
          .route("/register", web::post().to(restaurant_handlers::register_restaurant_handler))
          .route("", web::get().to(restaurant_handlers::list_restaurants_handler))
          .route("/{id}/menu", web::get().to(restaurant_handlers::restaurant_menu_handler)),
      )
      .service(
        web::scope("/restaurant")
          .route("/menu", web::post().to(restaurant_handlers::create_menu_item_handler))
          .route("/menu", web::get().to(restaurant_handlers::list_own_menu_handler))
          .route("/menu/{item_id}", web::put().to(restaurant_handlers::update_menu_item_handler))
          .route("/orders", web::get().to(restaurant_handlers::restaurant_orders_handler)),
      )
      .route("/partners/register", web::post().to(partner_handlers::register_partner_handler))
      .route("/partner/orders", web::get().to(partner_handlers::partner_orders_handler))
      .service(
        web::scope("/admin")
          .route("/restaurants", web::get().to(admin_handlers::list_restaurants_handler))
          .route("/restaurants/{id}/approval", web::put().to(admin_handlers::restaurant_approval_handler))
          .route("/partners", web::get().to(admin_handlers::list_partners_handler))
          .route("/partners/{id}/approval", web::put().to(admin_handlers::partner_approval_handler))
          .route("/orders/{id}/assign", web::put().to(admin_handlers::assign_partner_handler)),
      ),
  );
}
