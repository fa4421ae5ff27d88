// src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use std::str::FromStr; // Renamed Type to SqlxType to avoid conflict

use crate::errors::AppError;
use crate::models::order_item::OrderItem;

// Matches the order_status_enum type in schema.sql.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Completed,
  Cancelled,
}

impl OrderStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Completed => "completed",
      OrderStatus::Cancelled => "cancelled",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// Status strings arrive in mixed case from clients; compare
// case-insensitively and normalize to the lowercase stored form.
impl FromStr for OrderStatus {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pending" => Ok(OrderStatus::Pending),
      "completed" => Ok(OrderStatus::Completed),
      "cancelled" => Ok(OrderStatus::Cancelled),
      _ => Err(AppError::Validation("Invalid status".to_string())),
    }
  }
}

/// One customer purchase together with its owned line items. `total_amount`
/// is derived by the store from the items and never set by callers.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: i64,
  pub customer_name: String,
  pub customer_email: String,
  pub status: OrderStatus,
  pub total_amount: Decimal,
  pub created_at: DateTime<Utc>,
  pub updated_at: Option<DateTime<Utc>>,
  #[sqlx(skip)]
  pub items: Vec<OrderItem>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_parses_case_insensitively() {
    assert_eq!("Completed".parse::<OrderStatus>().unwrap(), OrderStatus::Completed);
    assert_eq!(" cancelled ".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
    assert_eq!("PENDING".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
  }

  #[test]
  fn unknown_status_is_rejected() {
    assert!(matches!(
      "shipped".parse::<OrderStatus>(),
      Err(AppError::Validation(_))
    ));
  }

  #[test]
  fn status_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&OrderStatus::Completed).unwrap(), "\"completed\"");
  }
}
