// src/config.rs

use crate::errors::{AppError, Result}; // Use AppError specific Result
use crate::workflow::StatusPolicy;
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)] // Clone is useful if parts of config are passed around
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  // Optional: without it the in-memory store is used.
  pub database_url: Option<String>,

  // External product catalog, the source of truth for stock and pricing.
  pub catalog_base_url: String,
  pub catalog_timeout: Duration,

  // Bearer credential parameters, shared with the rest of the storefront.
  pub jwt_secret: String,
  pub jwt_issuer: String,
  pub jwt_audience: String,
  pub jwt_expire_minutes: i64,

  // Which status transitions UpdateStatus accepts.
  pub status_policy: StatusPolicy,

  // Fixed demo login record.
  pub demo_username: String,
  pub demo_password: String,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = env::var("DATABASE_URL").ok();

    let catalog_base_url = get_env("CATALOG_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8081".to_string());
    let catalog_timeout_secs = get_env("CATALOG_TIMEOUT_SECS")
      .unwrap_or_else(|_| "5".to_string())
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid CATALOG_TIMEOUT_SECS: {}", e)))?;

    let jwt_secret = get_env("JWT_SECRET")?;
    let jwt_issuer = get_env("JWT_ISSUER").unwrap_or_else(|_| "storefront-auth".to_string());
    let jwt_audience = get_env("JWT_AUDIENCE").unwrap_or_else(|_| "storefront".to_string());
    let jwt_expire_minutes = get_env("JWT_EXPIRE_MINUTES")
      .unwrap_or_else(|_| "60".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid JWT_EXPIRE_MINUTES: {}", e)))?;

    let status_policy = get_env("STATUS_TRANSITION_POLICY")
      .unwrap_or_else(|_| "permissive".to_string())
      .parse::<StatusPolicy>()?;

    let demo_username = get_env("DEMO_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let demo_password = get_env("DEMO_PASSWORD").unwrap_or_else(|_| "admin".to_string());

    tracing::info!("Application configuration loaded successfully.");
    // Avoid logging secrets in production directly, or use redacted logging.

    Ok(Self {
      server_host,
      server_port,
      database_url,
      catalog_base_url,
      catalog_timeout: Duration::from_secs(catalog_timeout_secs),
      jwt_secret,
      jwt_issuer,
      jwt_audience,
      jwt_expire_minutes,
      status_policy,
      demo_username,
      demo_password,
    })
  }
}
