// server/src/services/auth_service.rs

//! Password hashing and bearer-token issuance.

use crate::errors::AppError;
use crate::models::user::Role;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

/// Hashes a plain-text password with Argon2 and a fresh random salt.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| {
      error!(error = %e, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing failed: {}", e))
    })
}

/// Checks `provided_password` against a stored Argon2 hash.
///
/// Returns `Ok(false)` on a mismatch; an unparsable stored hash is an internal error.
#[instrument(name = "auth_service::verify_password", skip_all, err(Display))]
pub fn verify_password(stored_hash: &str, provided_password: &str) -> Result<bool, AppError> {
  if provided_password.is_empty() {
    return Ok(false);
  }
  let parsed = PasswordHash::new(stored_hash).map_err(|e| {
    error!(error = %e, "Stored password hash could not be parsed.");
    AppError::Internal(format!("Invalid stored password hash: {}", e))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password mismatch.");
      Ok(false)
    }
    Err(e) => {
      error!(error = %e, "Argon2 verification failed.");
      Err(AppError::Internal(format!("Password verification failed: {}", e)))
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
  /// User id, as a decimal string.
  pub sub: String,
  pub role: Role,
  pub iat: i64,
  pub exp: i64,
}

impl Claims {
  pub fn user_id(&self) -> Result<i64, AppError> {
    self
      .sub
      .parse()
      .map_err(|_| AppError::Auth("Invalid or expired token.".to_string()))
  }
}

/// Issues and verifies HS256 bearer tokens.
pub struct TokenService {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl_seconds: i64,
}

impl TokenService {
  pub fn new(secret: &str, ttl_seconds: i64) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      ttl_seconds,
    }
  }

  pub fn ttl_seconds(&self) -> i64 {
    self.ttl_seconds
  }

  #[instrument(name = "token_service::issue", skip(self), err(Display))]
  pub fn issue(&self, user_id: i64, role: Role) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
      sub: user_id.to_string(),
      role,
      iat: now,
      exp: now + self.ttl_seconds,
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
      error!(error = %e, "Failed to sign token.");
      AppError::Internal(format!("Token signing failed: {}", e))
    })
  }

  pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    decode::<Claims>(token, &self.decoding, &validation)
      .map(|data| data.claims)
      .map_err(|e| {
        warn!(error = %e, "Rejected bearer token.");
        AppError::Auth("Invalid or expired token.".to_string())
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hashed_password_verifies_and_rejects_others() {
    let hash = hash_password("correct horse").unwrap();
    assert_ne!(hash, "correct horse");
    assert!(verify_password(&hash, "correct horse").unwrap());
    assert!(!verify_password(&hash, "battery staple").unwrap());
    assert!(!verify_password(&hash, "").unwrap());
  }

  #[test]
  fn empty_password_cannot_be_hashed() {
    assert!(matches!(hash_password(""), Err(AppError::Validation(_))));
  }

  #[test]
  fn garbage_stored_hash_is_internal_error() {
    assert!(matches!(verify_password("not-a-hash", "whatever"), Err(AppError::Internal(_))));
  }

  #[test]
  fn issued_token_carries_identity_and_role() {
    let tokens = TokenService::new("test-secret", 3600);
    let token = tokens.issue(42, Role::Restaurant).unwrap();
    let claims = tokens.verify(&token).unwrap();
    assert_eq!(claims.user_id().unwrap(), 42);
    assert_eq!(claims.role, Role::Restaurant);
    assert_eq!(claims.exp - claims.iat, 3600);
  }

  #[test]
  fn token_signed_with_another_secret_is_rejected() {
    let token = TokenService::new("one", 3600).issue(1, Role::Customer).unwrap();
    assert!(matches!(TokenService::new("two", 3600).verify(&token), Err(AppError::Auth(_))));
  }

  #[test]
  fn expired_token_is_rejected() {
    let tokens = TokenService::new("secret", -10);
    let token = tokens.issue(1, Role::Admin).unwrap();
    assert!(matches!(tokens.verify(&token), Err(AppError::Auth(_))));
  }
}
