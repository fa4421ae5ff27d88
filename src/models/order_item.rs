// src/models/order_item.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// One purchased line within an order. `product_name` and `unit_price` are a
/// snapshot captured at creation; later catalog changes do not affect them.
/// `total_price` is derived by the store, never caller-supplied.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
  pub id: i64,
  pub order_id: i64,
  pub product_id: i64,
  pub product_name: String,
  pub quantity: i32,
  pub unit_price: Decimal,
  pub total_price: Decimal,
  pub created_at: DateTime<Utc>,
  pub updated_at: Option<DateTime<Utc>>,
}
