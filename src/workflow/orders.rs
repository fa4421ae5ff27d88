// src/workflow/orders.rs

//! Order-level workflows: creation against live catalog snapshots, status
//! transitions, deletion.

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use super::{CreateOrderRequest, OrderWorkflow, StatusPolicy};
use crate::errors::{AppError, Result};
use crate::models::{Order, OrderStatus};
use crate::services::catalog_client::CatalogClient;
use crate::store::{NewOrder, NewOrderItem, OrderStore};

impl OrderWorkflow {
  /// Validates every requested line against a fresh catalog snapshot, then
  /// commits the aggregate as one unit. Nothing is persisted until all
  /// lines pass; a failure on line k aborts before line k+1. The interval
  /// between the stock check and the commit is unguarded, so a concurrent
  /// purchase can still oversell the same stock (accepted, not masked).
  #[instrument(
    name = "workflow::create_order",
    skip(self, request),
    fields(customer = %request.customer_name, lines = request.items.len())
  )]
  pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order> {
    if request.items.is_empty() {
      return Err(AppError::Validation("Order must have at least 1 item".to_string()));
    }
    if request.customer_name.trim().is_empty() {
      return Err(AppError::Validation("Customer name is required".to_string()));
    }
    if request.customer_email.trim().is_empty() {
      return Err(AppError::Validation("Customer email is required".to_string()));
    }

    // One fresh lookup per line, serially and in input order, so the
    // quantity/price checks see the freshest observable snapshot.
    let mut lines = Vec::with_capacity(request.items.len());
    for line in &request.items {
      if line.quantity <= 0 {
        return Err(AppError::Validation(format!(
          "Quantity must be > 0 for product {}",
          line.product_id
        )));
      }

      let snapshot = self
        .catalog
        .fetch_product(line.product_id)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Product {} not found", line.product_id)))?;

      if snapshot.quantity < line.quantity {
        warn!(
          product_id = line.product_id,
          requested = line.quantity,
          available = snapshot.quantity,
          "Insufficient stock"
        );
        return Err(AppError::Validation(format!(
          "Insufficient stock for product {}",
          line.product_id
        )));
      }

      // Caller-supplied name/price win when present; blanks and
      // non-positive prices fall back to the snapshot.
      let product_name = match &line.product_name {
        Some(name) if !name.trim().is_empty() => name.clone(),
        _ => snapshot.name.clone(),
      };
      let unit_price = match line.unit_price {
        Some(price) if price > Decimal::ZERO => price,
        _ => snapshot.price,
      };

      lines.push(NewOrderItem {
        product_id: line.product_id,
        product_name,
        quantity: line.quantity,
        unit_price,
      });
    }

    let order = self
      .store
      .insert_order(NewOrder {
        customer_name: request.customer_name.clone(),
        customer_email: request.customer_email.clone(),
        status: OrderStatus::Pending,
        items: lines,
      })
      .await?;

    info!(order_id = order.id, total = %order.total_amount, "Order created");
    Ok(order)
  }

  /// Applies a status transition after normalizing the requested value to
  /// its lowercase stored form.
  #[instrument(name = "workflow::update_status", skip(self), fields(order_id = %order_id))]
  pub async fn update_status(&self, order_id: i64, requested_status: &str) -> Result<Order> {
    let current = self
      .store
      .get_order(order_id)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))?;

    let new_status = requested_status.parse::<OrderStatus>()?;

    if self.status_policy == StatusPolicy::Strict && !transition_allowed(current.status, new_status) {
      return Err(AppError::Validation(format!(
        "Status transition {} -> {} is not allowed",
        current.status, new_status
      )));
    }

    let updated = self
      .store
      .update_status(order_id, new_status)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))?;

    info!(order_id, status = %updated.status, "Order status updated");
    Ok(updated)
  }

  #[instrument(name = "workflow::delete_order", skip(self), fields(order_id = %order_id))]
  pub async fn delete_order(&self, order_id: i64) -> Result<()> {
    let removed = self.store.delete_order(order_id).await?;
    if !removed {
      return Err(AppError::NotFound(format!("Order {} not found", order_id)));
    }
    info!(order_id, "Order deleted together with its items");
    Ok(())
  }
}

// Strict-policy transition check; same-status writes stay allowed.
fn transition_allowed(from: OrderStatus, to: OrderStatus) -> bool {
  from == to || from == OrderStatus::Pending
}
