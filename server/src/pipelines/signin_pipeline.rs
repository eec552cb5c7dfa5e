// server/src/pipelines/signin_pipeline.rs

use crate::errors::AppError;
use crate::models::user::{Role, User};
use crate::pipelines::contexts::SigninCtxData;
use crate::services::auth_service;
use flow::{Control, Flow, FlowCtx};
use tracing::{event, warn, Level};

const BAD_CREDENTIALS: &str = "Invalid email or password.";

pub fn build_signin_flow() -> Flow<SigninCtxData, AppError> {
  let mut signin_p = Flow::<SigninCtxData, AppError>::new(&[
    ("validate_signin_input", false),
    ("fetch_user_by_email", false),
    ("verify_password", false),
    ("issue_token", false),
  ]);

  signin_p.on("validate_signin_input", |ctx: FlowCtx<SigninCtxData>| async move {
    let (email, password_is_empty) = {
      let guard = ctx.read();
      (guard.email.clone(), guard.password.is_empty())
    };

    if email.is_empty() || !email.contains('@') {
      warn!("Invalid email format provided for sign-in.");
      return Err(AppError::Validation("Valid email is required.".to_string()));
    }
    if password_is_empty {
      return Err(AppError::Validation("Password is required.".to_string()));
    }
    Ok::<_, AppError>(Control::Continue)
  });

  signin_p.on("fetch_user_by_email", |ctx: FlowCtx<SigninCtxData>| async move {
    let (email, db_pool) = {
      let guard = ctx.read();
      (guard.email.clone(), guard.db_pool.clone())
    };

    let user = sqlx::query_as::<_, User>(
      "SELECT id, name, email, phone, password_hash, role, created_at FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(&db_pool)
    .await?;

    match user {
      Some(user) => {
        event!(Level::DEBUG, user_id = user.id, "User found for sign-in.");
        ctx.write().user = Some(user);
        Ok::<_, AppError>(Control::Continue)
      }
      None => {
        warn!("Sign-in attempt for unknown email.");
        Err(AppError::Auth(BAD_CREDENTIALS.to_string()))
      }
    }
  });

  signin_p.on("verify_password", |ctx: FlowCtx<SigninCtxData>| async move {
    let (stored_hash, password, user_id) = {
      let guard = ctx.read();
      let user = guard
        .user
        .as_ref()
        .ok_or_else(|| AppError::Internal("User missing before password check.".to_string()))?;
      (user.password_hash.clone(), guard.password.clone(), user.id)
    };

    if auth_service::verify_password(&stored_hash, &password)? {
      Ok::<_, AppError>(Control::Continue)
    } else {
      warn!(user_id, "Password mismatch on sign-in.");
      Err(AppError::Auth(BAD_CREDENTIALS.to_string()))
    }
  });

  signin_p.on("issue_token", |ctx: FlowCtx<SigninCtxData>| async move {
    let (tokens, user_id, role) = {
      let guard = ctx.read();
      let user = guard
        .user
        .as_ref()
        .ok_or_else(|| AppError::Internal("User missing before token issue.".to_string()))?;
      (guard.tokens.clone(), user.id, user.role.parse::<Role>()?)
    };

    let token = tokens.issue(user_id, role)?;
    event!(Level::INFO, user_id, role = %role, "Signed in.");
    ctx.write().token = Some(token);
    Ok::<_, AppError>(Control::Continue)
  });

  signin_p
}
