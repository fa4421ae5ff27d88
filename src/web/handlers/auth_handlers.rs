// src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize; // For request payloads
use serde_json::json; // For JSON responses
use tracing::{info, instrument, warn};

use crate::errors::AppError; // Your application specific error
use crate::services::auth_service::{self, CredentialRepository};
use crate::state::AppState;

// --- Request DTOs ---
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestPayload {
  pub username: String,
  pub password: String,
}

// --- Handler Implementations ---

#[instrument(
    name = "handler::login",
    skip(app_state, req_payload),
    fields(username = %req_payload.username)
)]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  if req_payload.username.trim().is_empty() || req_payload.password.trim().is_empty() {
    return Err(AppError::Validation("Missing username/password".to_string()));
  }

  // Same 401 for an unknown username and a wrong password.
  let record = app_state
    .credentials
    .find_by_username(&req_payload.username)
    .ok_or_else(|| {
      warn!("Login attempt for unknown username.");
      AppError::Auth("Invalid credentials".to_string())
    })?;

  let password_ok = auth_service::verify_password(&record.password_hash, &req_payload.password)?;
  if !password_ok {
    warn!("Login attempt with a wrong password.");
    return Err(AppError::Auth("Invalid credentials".to_string()));
  }

  let issued = app_state.tokens.issue(&record.username, &record.role)?;
  info!("Login successful; credential issued.");

  Ok(HttpResponse::Ok().json(json!({
      "token": issued.token,
      "issuedAt": issued.issued_at,
      "expiresAt": issued.expires_at,
      "issuer": app_state.tokens.issuer(),
      "audience": app_state.tokens.audience(),
      "role": record.role,
  })))
}
