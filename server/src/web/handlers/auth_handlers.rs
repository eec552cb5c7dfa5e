// server/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::User;
use crate::pipelines::contexts::{SigninCtxData, SignupCtxData, SignupKind};
use crate::state::AppState;
use crate::web::response;
use flow::{FlowCtx, Outcome};

#[derive(Deserialize, Debug)]
pub struct SignupRequestPayload {
  pub name: String,
  pub email: String,
  pub phone: Option<String>,
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct SigninRequestPayload {
  pub email: String,
  pub password: String,
}

/// Runs the signup flow and returns the new user plus the id of any profile row created with it.
pub(crate) async fn run_signup(state: &AppState, data: SignupCtxData) -> Result<(User, Option<i64>), AppError> {
  let ctx = FlowCtx::new(data);
  match state.flows.run(ctx.clone()).await? {
    Outcome::Completed => {}
    Outcome::Halted => {
      warn!("Signup flow halted before completion.");
      return Err(AppError::Internal("Signup process was halted by an internal step.".to_string()));
    }
  }
  let mut guard = ctx.write();
  let user = guard
    .created_user
    .take()
    .ok_or_else(|| AppError::Internal("Signup completed without creating a user.".to_string()))?;
  Ok((user, guard.profile_id))
}

#[instrument(name = "handler::signup", skip(app_state, req_payload))]
pub async fn signup_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SignupRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let data = SignupCtxData::new(
    app_state.db_pool.clone(),
    SignupKind::Customer,
    payload.name,
    payload.email,
    payload.phone,
    payload.password,
  );
  let (user, _) = run_signup(&app_state, data).await?;
  info!(user_id = user.id, "Customer signed up.");
  Ok(response::created("Account created successfully.", user))
}

#[instrument(name = "handler::signin", skip(app_state, req_payload))]
pub async fn signin_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SigninRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx = FlowCtx::new(SigninCtxData::new(
    app_state.db_pool.clone(),
    app_state.tokens.clone(),
    payload.email,
    payload.password,
  ));

  if app_state.flows.run(ctx.clone()).await? == Outcome::Halted {
    return Err(AppError::Auth("Authentication process was unexpectedly halted.".to_string()));
  }

  let mut guard = ctx.write();
  let token = guard
    .token
    .take()
    .ok_or_else(|| AppError::Internal("Sign-in completed without a token.".to_string()))?;
  let user = guard
    .user
    .take()
    .ok_or_else(|| AppError::Internal("Sign-in completed without a user.".to_string()))?;
  info!(user_id = user.id, "Sign-in successful.");

  Ok(response::ok(
    "Signin successful.",
    json!({
      "token": token,
      "token_type": "Bearer",
      "expires_in": app_state.tokens.ttl_seconds(),
      "user": user,
    }),
  ))
}
