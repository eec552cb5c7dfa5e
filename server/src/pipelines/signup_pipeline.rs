// server/src/pipelines/signup_pipeline.rs

//! Account creation for customers, restaurant owners and delivery partners.
//! The user row and its restaurant or partner profile are written in one transaction.

use crate::errors::AppError;
use crate::models::restaurant::ApprovalStatus;
use crate::models::user::User;
use crate::pipelines::contexts::{SignupCtxData, SignupKind};
use crate::services::auth_service;
use flow::{Control, Flow, FlowCtx};
use tracing::{event, info, warn, Level};

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn build_signup_flow() -> Flow<SignupCtxData, AppError> {
  let mut signup_p = Flow::<SignupCtxData, AppError>::new(&[
    ("validate_signup_input", false),
    ("check_existing_user", false),
    ("hash_password", false),
    ("create_account", false),
  ]);

  signup_p.on("validate_signup_input", |ctx: FlowCtx<SignupCtxData>| async move {
    let guard = ctx.read();
    validate_signup(&guard.name, &guard.email, &guard.password, &guard.kind)?;
    Ok::<_, AppError>(Control::Continue)
  });

  signup_p.on("check_existing_user", |ctx: FlowCtx<SignupCtxData>| async move {
    let (email, db_pool) = {
      let guard = ctx.read();
      (guard.email.clone(), guard.db_pool.clone())
    };

    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
      .bind(&email)
      .fetch_one(&db_pool)
      .await?;
    if exists {
      warn!("Signup attempted with an email that is already registered.");
      return Err(AppError::Conflict("An account with this email already exists.".to_string()));
    }
    Ok::<_, AppError>(Control::Continue)
  });

  signup_p.on("hash_password", |ctx: FlowCtx<SignupCtxData>| async move {
    let password = ctx.read().password.clone();
    let hash = auth_service::hash_password(&password)?;
    ctx.write().password_hash = Some(hash);
    Ok::<_, AppError>(Control::Continue)
  });

  signup_p.on("create_account", |ctx: FlowCtx<SignupCtxData>| async move {
    let (db_pool, kind, name, email, phone, password_hash) = {
      let guard = ctx.read();
      let hash = guard
        .password_hash
        .clone()
        .ok_or_else(|| AppError::Internal("Password was not hashed.".to_string()))?;
      (
        guard.db_pool.clone(),
        guard.kind.clone(),
        guard.name.clone(),
        guard.email.clone(),
        guard.phone.clone(),
        hash,
      )
    };

    let mut tx = db_pool.begin().await?;
    let user = sqlx::query_as::<_, User>(
      "INSERT INTO users (name, email, phone, password_hash, role) VALUES ($1, $2, $3, $4, $5) \
       RETURNING id, name, email, phone, password_hash, role, created_at",
    )
    .bind(&name)
    .bind(&email)
    .bind(&phone)
    .bind(&password_hash)
    .bind(kind.role().as_str())
    .fetch_one(&mut *tx)
    .await
    .map_err(conflict_on_duplicate)?;

    let profile_id = match &kind {
      SignupKind::Customer => None,
      SignupKind::Restaurant {
        restaurant_name,
        address,
        cuisine,
      } => Some(
        sqlx::query_scalar::<_, i64>(
          "INSERT INTO restaurants (owner_id, name, address, phone, cuisine, status) \
           VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(user.id)
        .bind(restaurant_name)
        .bind(address)
        .bind(&phone)
        .bind(cuisine)
        .bind(ApprovalStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?,
      ),
      SignupKind::Partner {
        vehicle_type,
        license_number,
      } => Some(
        sqlx::query_scalar::<_, i64>(
          "INSERT INTO delivery_partners (user_id, vehicle_type, license_number, status) \
           VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(user.id)
        .bind(vehicle_type)
        .bind(license_number)
        .bind(ApprovalStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?,
      ),
    };
    tx.commit().await?;

    info!(user_id = user.id, role = %user.role, profile_id = ?profile_id, "Account created.");
    let mut guard = ctx.write();
    guard.created_user = Some(user);
    guard.profile_id = profile_id;
    Ok::<_, AppError>(Control::Continue)
  });

  signup_p
}

fn validate_signup(name: &str, email: &str, password: &str, kind: &SignupKind) -> Result<(), AppError> {
  event!(Level::DEBUG, role = %kind.role(), "Validating signup input.");
  if name.trim().is_empty() {
    return Err(AppError::Validation("Name is required.".to_string()));
  }
  if email.is_empty() || !email.contains('@') {
    return Err(AppError::Validation("Valid email is required.".to_string()));
  }
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(AppError::Validation(format!(
      "Password must be at least {} characters long.",
      MIN_PASSWORD_LEN
    )));
  }
  match kind {
    SignupKind::Customer => {}
    SignupKind::Restaurant {
      restaurant_name, address, ..
    } => {
      if restaurant_name.trim().is_empty() || address.trim().is_empty() {
        return Err(AppError::Validation(
          "Restaurant name and address are required.".to_string(),
        ));
      }
    }
    SignupKind::Partner {
      vehicle_type,
      license_number,
    } => {
      if vehicle_type.trim().is_empty() || license_number.trim().is_empty() {
        return Err(AppError::Validation(
          "Vehicle type and license number are required.".to_string(),
        ));
      }
    }
  }
  Ok(())
}

/// Maps a unique violation (a concurrent signup with the same email) to a Conflict.
fn conflict_on_duplicate(e: sqlx::Error) -> AppError {
  match &e {
    sqlx::Error::Database(db) if db.is_unique_violation() => {
      AppError::Conflict("An account with this email already exists.".to_string())
    }
    _ => AppError::Sqlx(e),
  }
}
