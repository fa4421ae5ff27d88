// src/main.rs

use order_service::config::AppConfig;
use order_service::services::auth_service::{CredentialRepository, InMemoryCredentialRepository};
use order_service::services::catalog_client::{CatalogClient, HttpCatalogClient};
use order_service::services::token_service::TokenService;
use order_service::state::AppState;
use order_service::store::{InMemoryOrderStore, OrderStore, PgOrderStore};
use order_service::web::configure_app_routes;
use order_service::workflow::OrderWorkflow;

use actix_web::{web as actix_data, App, HttpServer}; // Renamed web to actix_data
use sqlx::PgPool;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing

// Main function
#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // Initialize tracing subscriber for logging
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO) // Default level
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  tracing::info!("Starting order service...");

  // Load application configuration
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg), // Arc the config for sharing
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      panic!("Configuration error: {}", e);
    }
  };

  // Order store: Postgres when DATABASE_URL is configured, otherwise the
  // in-memory store (throwaway data, enough for the demo flow).
  let store: Arc<dyn OrderStore> = match &app_config.database_url {
    Some(url) => {
      let db_pool = match PgPool::connect(url).await {
        Ok(pool) => {
          tracing::info!("Successfully connected to the order database.");
          pool
        }
        Err(e) => {
          tracing::error!(error = %e, "Failed to connect to the database.");
          panic!("Database connection error: {}", e);
        }
      };
      Arc::new(PgOrderStore::new(db_pool))
    }
    None => {
      tracing::info!("DATABASE_URL not set; using the in-memory order store.");
      Arc::new(InMemoryOrderStore::new())
    }
  };

  // Catalog client for per-line stock and price checks at order creation.
  let catalog: Arc<dyn CatalogClient> =
    match HttpCatalogClient::new(&app_config.catalog_base_url, app_config.catalog_timeout) {
      Ok(client) => Arc::new(client),
      Err(e) => {
        tracing::error!(error = %e, "Failed to build the catalog HTTP client.");
        panic!("Catalog client error: {}", e);
      }
    };

  // Credential issuance/verification. The demo login record is hashed once
  // at startup and injected; the verifier holds no global state.
  let tokens = Arc::new(TokenService::new(
    &app_config.jwt_secret,
    &app_config.jwt_issuer,
    &app_config.jwt_audience,
    app_config.jwt_expire_minutes,
  ));
  let credentials: Arc<dyn CredentialRepository> = match InMemoryCredentialRepository::with_user(
    &app_config.demo_username,
    &app_config.demo_password,
    "Admin",
  ) {
    Ok(repo) => Arc::new(repo),
    Err(e) => {
      tracing::error!(error = %e, "Failed to prepare the demo credential record.");
      panic!("Credential setup error: {}", e);
    }
  };

  let workflow = Arc::new(OrderWorkflow::new(
    store.clone(),
    catalog.clone(),
    app_config.status_policy,
  ));

  // Create AppState
  let app_state = AppState {
    store,
    catalog,
    workflow,
    tokens,
    credentials,
    config: app_config.clone(),
  };

  // Configure and Start Actix Web Server
  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
