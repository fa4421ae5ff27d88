// src/web/extractors.rs

//! Request extractors shared by the handlers.

use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

/// The verified identity of the caller, extracted from the
/// `Authorization: Bearer <token>` header. Extraction resolves immediately,
/// so an unauthenticated mutation is rejected before its body is read.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub subject: String,
  pub role: String,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError; // Use the app's error type
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    ready(extract_identity(req))
  }
}

fn extract_identity(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("Application state is not configured".to_string()))?;

  let header = req
    .headers()
    .get(actix_web::http::header::AUTHORIZATION)
    .and_then(|value| value.to_str().ok())
    .ok_or_else(|| {
      warn!("AuthenticatedUser extractor: Missing Authorization header on a protected route.");
      AppError::Auth("Missing bearer credential".to_string())
    })?;

  let token = header
    .strip_prefix("Bearer ")
    .ok_or_else(|| AppError::Auth("Authorization header is not a bearer credential".to_string()))?;

  let identity = state.tokens.verify(token)?;
  Ok(AuthenticatedUser {
    subject: identity.subject,
    role: identity.role,
  })
}
