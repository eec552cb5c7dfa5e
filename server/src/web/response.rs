// server/src/web/response.rs

//! The `{status, message, data}` success envelope. Errors use the same shape
//! without `data` (see `AppError`'s `ResponseError` impl).

use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<'a, T: Serialize> {
  pub status: bool,
  pub message: &'a str,
  pub data: T,
}

pub fn ok<T: Serialize>(message: &str, data: T) -> HttpResponse {
  HttpResponse::Ok().json(Envelope {
    status: true,
    message,
    data,
  })
}

pub fn created<T: Serialize>(message: &str, data: T) -> HttpResponse {
  HttpResponse::Created().json(Envelope {
    status: true,
    message,
    data,
  })
}
