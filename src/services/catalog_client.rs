// src/services/catalog_client.rs

//! Read-only client to the external product catalog, the single source of
//! truth for stock and pricing at order-creation time. No caching: every
//! order line triggers one fresh lookup.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::{instrument, warn};

use crate::errors::{AppError, Result};

/// Product state as reported by the catalog at lookup time. Name and price
/// are captured into order lines as a snapshot; later catalog changes do
/// not affect persisted orders.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSnapshot {
  pub id: i64,
  pub name: String,
  pub description: Option<String>,
  pub price: Decimal,
  pub quantity: i32,
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
  /// Fetch a single product by id. `Ok(None)` is a well-formed not-found
  /// answer from the catalog; transport failures and unexpected responses
  /// surface as `AppError::Upstream`.
  async fn fetch_product(&self, product_id: i64) -> Result<Option<ProductSnapshot>>;
}

pub struct HttpCatalogClient {
  http: reqwest::Client,
  base_url: String,
}

impl HttpCatalogClient {
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
    // The client-level timeout makes every lookup fail closed rather than
    // hang an order-creation call.
    let http = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| AppError::Config(format!("Failed to build catalog HTTP client: {}", e)))?;

    Ok(Self {
      http,
      base_url: base_url.trim_end_matches('/').to_string(),
    })
  }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
  #[instrument(name = "catalog::fetch_product", skip(self))]
  async fn fetch_product(&self, product_id: i64) -> Result<Option<ProductSnapshot>> {
    let url = format!("{}/products/{}", self.base_url, product_id);

    let response = self.http.get(&url).send().await.map_err(|e| {
      warn!(error = %e, "Catalog request failed");
      AppError::Upstream(format!("Catalog request for product {} failed: {}", product_id, e))
    })?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !response.status().is_success() {
      return Err(AppError::Upstream(format!(
        "Catalog returned {} for product {}",
        response.status(),
        product_id
      )));
    }

    let snapshot = response
      .json::<ProductSnapshot>()
      .await
      .map_err(|e| AppError::Upstream(format!("Catalog returned an unreadable product payload: {}", e)))?;

    Ok(Some(snapshot))
  }
}
