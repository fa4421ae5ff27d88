// src/store/mod.rs

//! Persistence for orders and their line items. The store assigns
//! identifiers, maintains the derived `total_price`/`total_amount` fields on
//! every mutating write, and cascades deletes from an order to its items.
//! Callers never supply derived values.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::Result;
use crate::models::{Order, OrderItem, OrderStatus};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryOrderStore;
pub use postgres::PgOrderStore;

/// A validated order ready to be committed as one atomic unit.
#[derive(Debug, Clone)]
pub struct NewOrder {
  pub customer_name: String,
  pub customer_email: String,
  pub status: OrderStatus,
  pub items: Vec<NewOrderItem>,
}

/// A validated line, either part of a `NewOrder` or appended to an existing
/// order.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
  pub product_id: i64,
  pub product_name: String,
  pub quantity: i32,
  pub unit_price: Decimal,
}

/// Replacement values for an existing line item.
#[derive(Debug, Clone)]
pub struct ItemPatch {
  pub product_id: i64,
  pub product_name: String,
  pub quantity: i32,
  pub unit_price: Decimal,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn list_orders(&self) -> Result<Vec<Order>>;

  async fn get_order(&self, order_id: i64) -> Result<Option<Order>>;

  /// Commit a new order with all of its items. Readers never observe a
  /// partially inserted aggregate.
  async fn insert_order(&self, draft: NewOrder) -> Result<Order>;

  /// Returns the updated order, or `None` when no such order exists.
  async fn update_status(&self, order_id: i64, status: OrderStatus) -> Result<Option<Order>>;

  /// Removes the order and all of its items. Returns `false` when absent.
  async fn delete_order(&self, order_id: i64) -> Result<bool>;

  /// Newest first, matching the original listing order.
  async fn list_items(&self) -> Result<Vec<OrderItem>>;

  async fn get_item(&self, item_id: i64) -> Result<Option<OrderItem>>;

  /// Returns `None` when the owning order does not exist. The owning
  /// order's `total_amount` and `updated_at` are refreshed in the same
  /// commit.
  async fn insert_item(&self, order_id: i64, draft: NewOrderItem) -> Result<Option<OrderItem>>;

  /// Returns `None` when the item does not exist.
  async fn update_item(&self, item_id: i64, patch: ItemPatch) -> Result<Option<OrderItem>>;

  /// Returns `false` when the item does not exist.
  async fn delete_item(&self, item_id: i64) -> Result<bool>;
}

// Derived line total.
pub(crate) fn line_total(quantity: i32, unit_price: Decimal) -> Decimal {
  Decimal::from(quantity) * unit_price
}

// Derived order total across items.
pub(crate) fn order_total(items: &[OrderItem]) -> Decimal {
  items.iter().fold(Decimal::ZERO, |acc, item| acc + item.total_price)
}
