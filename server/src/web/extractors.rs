// server/src/web/extractors.rs

use crate::errors::AppError;
use crate::models::user::Role;
use crate::state::AppState;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

/// Identity taken from a valid `Authorization: Bearer <token>` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
  pub user_id: i64,
  pub role: Role,
}

impl AuthenticatedUser {
  /// Fails with Forbidden unless the caller holds one of `roles`.
  pub fn require_any(&self, roles: &[Role]) -> Result<(), AppError> {
    if roles.contains(&self.role) {
      Ok(())
    } else {
      warn!(user_id = self.user_id, role = %self.role, "Role not permitted for this route.");
      Err(AppError::Forbidden("You are not allowed to perform this action.".to_string()))
    }
  }

  pub fn require(&self, role: Role) -> Result<(), AppError> {
    self.require_any(&[role])
  }

  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;

  let token = req
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or_else(|| AppError::Auth("Authentication required.".to_string()))?;

  let claims = state.tokens.verify(token)?;
  Ok(AuthenticatedUser {
    user_id: claims.user_id()?,
    role: claims.role,
  })
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(authenticate(req))
  }
}
