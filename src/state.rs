// src/state.rs
use crate::config::AppConfig;
use crate::services::auth_service::CredentialRepository;
use crate::services::catalog_client::CatalogClient;
use crate::services::token_service::TokenService;
use crate::store::OrderStore;
use crate::workflow::OrderWorkflow;
use std::sync::Arc;

// Collaborators are trait objects so tests can substitute fixtures.
#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn OrderStore>,
  pub catalog: Arc<dyn CatalogClient>,
  pub workflow: Arc<OrderWorkflow>,
  pub tokens: Arc<TokenService>,
  pub credentials: Arc<dyn CredentialRepository>,
  pub config: Arc<AppConfig>, // Share loaded config
}
