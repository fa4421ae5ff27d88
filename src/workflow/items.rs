// src/workflow/items.rs

//! Item-level workflows on existing orders. These edits skip the catalog
//! stock check and the minimum-item rule enforced at order creation; the
//! original service treats them as manual corrections.

use rust_decimal::Decimal;
use tracing::{info, instrument};

use super::{CreateItemRequest, OrderWorkflow, UpdateItemRequest};
use crate::errors::{AppError, Result};
use crate::models::OrderItem;
use crate::store::{ItemPatch, NewOrderItem, OrderStore};

impl OrderWorkflow {
  #[instrument(
    name = "workflow::add_item",
    skip(self, request),
    fields(order_id = request.order_id, product_id = request.product_id)
  )]
  pub async fn add_item(&self, request: CreateItemRequest) -> Result<OrderItem> {
    if request.order_id <= 0 {
      return Err(AppError::Validation("OrderId is required".to_string()));
    }
    if request.product_id <= 0 {
      return Err(AppError::Validation("ProductId is required".to_string()));
    }
    validate_item_bounds(request.quantity, request.unit_price)?;

    let inserted = self
      .store
      .insert_item(
        request.order_id,
        NewOrderItem {
          product_id: request.product_id,
          product_name: request.product_name.unwrap_or_default(),
          quantity: request.quantity,
          unit_price: request.unit_price,
        },
      )
      .await?
      .ok_or_else(|| AppError::Validation(format!("Order {} not found", request.order_id)))?;

    info!(item_id = inserted.id, order_id = inserted.order_id, "Order item created");
    Ok(inserted)
  }

  /// The path identifier must match the payload identifier; everything else
  /// mirrors item creation, with the owning order's total refreshed in the
  /// same commit.
  #[instrument(
    name = "workflow::update_item",
    skip(self, request),
    fields(item_id = path_id, payload_id = request.id)
  )]
  pub async fn update_item(&self, path_id: i64, request: UpdateItemRequest) -> Result<OrderItem> {
    if path_id != request.id {
      return Err(AppError::IdMismatch("Id mismatch".to_string()));
    }
    validate_item_bounds(request.quantity, request.unit_price)?;

    let updated = self
      .store
      .update_item(
        path_id,
        ItemPatch {
          product_id: request.product_id,
          product_name: request.product_name.unwrap_or_default(),
          quantity: request.quantity,
          unit_price: request.unit_price,
        },
      )
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Order item {} not found", path_id)))?;

    info!(item_id = updated.id, order_id = updated.order_id, "Order item updated");
    Ok(updated)
  }

  #[instrument(name = "workflow::remove_item", skip(self), fields(item_id = %item_id))]
  pub async fn remove_item(&self, item_id: i64) -> Result<()> {
    let removed = self.store.delete_item(item_id).await?;
    if !removed {
      return Err(AppError::NotFound(format!("Order item {} not found", item_id)));
    }
    info!(item_id, "Order item deleted");
    Ok(())
  }
}

fn validate_item_bounds(quantity: i32, unit_price: Decimal) -> Result<()> {
  if quantity <= 0 {
    return Err(AppError::Validation("Quantity must be > 0".to_string()));
  }
  if unit_price < Decimal::ZERO {
    return Err(AppError::Validation("UnitPrice must be >= 0".to_string()));
  }
  Ok(())
}
