// src/workflow/mod.rs

//! The order workflow engine: validates proposed orders against live catalog
//! snapshots, constructs persisted aggregates, and governs status
//! transitions. One module per workflow, mirroring the web surface.

use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::AppError;
use crate::services::catalog_client::CatalogClient;
use crate::store::OrderStore;

pub mod items;
pub mod orders;

/// Governs which transitions `update_status` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
  /// Any status is reachable from any other (original behavior).
  Permissive,
  /// `pending` may move to `completed` or `cancelled`; terminal states are
  /// immutable. Same-status writes stay no-ops.
  Strict,
}

impl FromStr for StatusPolicy {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "permissive" => Ok(StatusPolicy::Permissive),
      "strict" => Ok(StatusPolicy::Strict),
      other => Err(AppError::Config(format!(
        "Unknown STATUS_TRANSITION_POLICY '{}', expected 'permissive' or 'strict'",
        other
      ))),
    }
  }
}

/// A requested order line as submitted by the caller. Name and price are
/// optional; blanks and non-positive prices are backfilled from the catalog
/// snapshot.
#[derive(Debug, Clone)]
pub struct OrderLineRequest {
  pub product_id: i64,
  pub product_name: Option<String>,
  pub quantity: i32,
  pub unit_price: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct CreateOrderRequest {
  pub customer_name: String,
  pub customer_email: String,
  pub items: Vec<OrderLineRequest>,
}

/// A standalone line bound to an existing order.
#[derive(Debug, Clone)]
pub struct CreateItemRequest {
  pub order_id: i64,
  pub product_id: i64,
  pub product_name: Option<String>,
  pub quantity: i32,
  pub unit_price: Decimal,
}

#[derive(Debug, Clone)]
pub struct UpdateItemRequest {
  pub id: i64,
  pub product_id: i64,
  pub product_name: Option<String>,
  pub quantity: i32,
  pub unit_price: Decimal,
}

pub struct OrderWorkflow {
  store: Arc<dyn OrderStore>,
  catalog: Arc<dyn CatalogClient>,
  status_policy: StatusPolicy,
}

impl OrderWorkflow {
  pub fn new(store: Arc<dyn OrderStore>, catalog: Arc<dyn CatalogClient>, status_policy: StatusPolicy) -> Self {
    Self {
      store,
      catalog,
      status_policy,
    }
  }
}
