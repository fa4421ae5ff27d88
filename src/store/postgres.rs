// src/store/postgres.rs

//! Postgres-backed order store using runtime queries (no compile-time
//! database). Each mutating call runs in one transaction so a multi-item
//! creation is visible all-or-nothing; schema.sql declares the tables and
//! the `ON DELETE CASCADE` from orders to their items.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::collections::HashMap;

use super::{line_total, order_total, ItemPatch, NewOrder, NewOrderItem, OrderStore};
use crate::errors::Result;
use crate::models::{Order, OrderItem, OrderStatus};

const ORDER_COLUMNS: &str = "id, customer_name, customer_email, status, total_amount, created_at, updated_at";
const ITEM_COLUMNS: &str =
  "id, order_id, product_id, product_name, quantity, unit_price, total_price, created_at, updated_at";

pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

// Refresh the owning order's derived total and updated_at after any item
// mutation, inside the caller's transaction.
async fn refresh_order_total(tx: &mut Transaction<'_, Postgres>, order_id: i64, now: DateTime<Utc>) -> Result<()> {
  sqlx::query(
    "UPDATE orders \
     SET total_amount = (SELECT COALESCE(SUM(total_price), 0) FROM order_items WHERE order_id = $1), \
         updated_at = $2 \
     WHERE id = $1",
  )
  .bind(order_id)
  .bind(now)
  .execute(&mut **tx)
  .await?;
  Ok(())
}

#[async_trait]
impl OrderStore for PgOrderStore {
  async fn list_orders(&self) -> Result<Vec<Order>> {
    let order_sql = format!("SELECT {} FROM orders ORDER BY id", ORDER_COLUMNS);
    let mut orders: Vec<Order> = sqlx::query_as::<_, Order>(&order_sql).fetch_all(&self.pool).await?;

    let item_sql = format!("SELECT {} FROM order_items ORDER BY id", ITEM_COLUMNS);
    let items: Vec<OrderItem> = sqlx::query_as::<_, OrderItem>(&item_sql).fetch_all(&self.pool).await?;

    let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for item in items {
      by_order.entry(item.order_id).or_default().push(item);
    }
    for order in &mut orders {
      order.items = by_order.remove(&order.id).unwrap_or_default();
    }
    Ok(orders)
  }

  async fn get_order(&self, order_id: i64) -> Result<Option<Order>> {
    let order_sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
    let order = sqlx::query_as::<_, Order>(&order_sql)
      .bind(order_id)
      .fetch_optional(&self.pool)
      .await?;

    let mut order = match order {
      Some(order) => order,
      None => return Ok(None),
    };

    let item_sql = format!("SELECT {} FROM order_items WHERE order_id = $1 ORDER BY id", ITEM_COLUMNS);
    order.items = sqlx::query_as::<_, OrderItem>(&item_sql)
      .bind(order_id)
      .fetch_all(&self.pool)
      .await?;
    Ok(Some(order))
  }

  async fn insert_order(&self, draft: NewOrder) -> Result<Order> {
    let now = Utc::now();
    let mut tx = self.pool.begin().await?;

    let order_row = sqlx::query(
      "INSERT INTO orders (customer_name, customer_email, status, total_amount, created_at, updated_at) \
       VALUES ($1, $2, $3, 0, $4, $4) RETURNING id",
    )
    .bind(&draft.customer_name)
    .bind(&draft.customer_email)
    .bind(draft.status)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;
    let order_id: i64 = order_row.get("id");

    let mut items = Vec::with_capacity(draft.items.len());
    for line in &draft.items {
      let total_price = line_total(line.quantity, line.unit_price);
      let item_row = sqlx::query(
        "INSERT INTO order_items (order_id, product_id, product_name, quantity, unit_price, total_price, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $7) RETURNING id",
      )
      .bind(order_id)
      .bind(line.product_id)
      .bind(&line.product_name)
      .bind(line.quantity)
      .bind(line.unit_price)
      .bind(total_price)
      .bind(now)
      .fetch_one(&mut *tx)
      .await?;

      items.push(OrderItem {
        id: item_row.get("id"),
        order_id,
        product_id: line.product_id,
        product_name: line.product_name.clone(),
        quantity: line.quantity,
        unit_price: line.unit_price,
        total_price,
        created_at: now,
        updated_at: Some(now),
      });
    }

    let total_amount = order_total(&items);
    sqlx::query("UPDATE orders SET total_amount = $2 WHERE id = $1")
      .bind(order_id)
      .bind(total_amount)
      .execute(&mut *tx)
      .await?;

    tx.commit().await?;

    Ok(Order {
      id: order_id,
      customer_name: draft.customer_name,
      customer_email: draft.customer_email,
      status: draft.status,
      total_amount,
      created_at: now,
      updated_at: Some(now),
      items,
    })
  }

  async fn update_status(&self, order_id: i64, status: OrderStatus) -> Result<Option<Order>> {
    let updated = sqlx::query("UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1")
      .bind(order_id)
      .bind(status)
      .bind(Utc::now())
      .execute(&self.pool)
      .await?;

    if updated.rows_affected() == 0 {
      return Ok(None);
    }
    self.get_order(order_id).await
  }

  async fn delete_order(&self, order_id: i64) -> Result<bool> {
    // order_items rows go with the order via ON DELETE CASCADE.
    let deleted = sqlx::query("DELETE FROM orders WHERE id = $1")
      .bind(order_id)
      .execute(&self.pool)
      .await?;
    Ok(deleted.rows_affected() > 0)
  }

  async fn list_items(&self) -> Result<Vec<OrderItem>> {
    let item_sql = format!("SELECT {} FROM order_items ORDER BY id DESC", ITEM_COLUMNS);
    Ok(sqlx::query_as::<_, OrderItem>(&item_sql).fetch_all(&self.pool).await?)
  }

  async fn get_item(&self, item_id: i64) -> Result<Option<OrderItem>> {
    let item_sql = format!("SELECT {} FROM order_items WHERE id = $1", ITEM_COLUMNS);
    Ok(
      sqlx::query_as::<_, OrderItem>(&item_sql)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn insert_item(&self, order_id: i64, draft: NewOrderItem) -> Result<Option<OrderItem>> {
    let now = Utc::now();
    let mut tx = self.pool.begin().await?;

    let owner = sqlx::query("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
      .bind(order_id)
      .fetch_optional(&mut *tx)
      .await?;
    if owner.is_none() {
      return Ok(None); // Dropping the transaction rolls it back
    }

    let total_price = line_total(draft.quantity, draft.unit_price);
    let item_row = sqlx::query(
      "INSERT INTO order_items (order_id, product_id, product_name, quantity, unit_price, total_price, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $7) RETURNING id",
    )
    .bind(order_id)
    .bind(draft.product_id)
    .bind(&draft.product_name)
    .bind(draft.quantity)
    .bind(draft.unit_price)
    .bind(total_price)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    refresh_order_total(&mut tx, order_id, now).await?;
    tx.commit().await?;

    Ok(Some(OrderItem {
      id: item_row.get("id"),
      order_id,
      product_id: draft.product_id,
      product_name: draft.product_name,
      quantity: draft.quantity,
      unit_price: draft.unit_price,
      total_price,
      created_at: now,
      updated_at: Some(now),
    }))
  }

  async fn update_item(&self, item_id: i64, patch: ItemPatch) -> Result<Option<OrderItem>> {
    let now = Utc::now();
    let mut tx = self.pool.begin().await?;

    let item_sql = format!("SELECT {} FROM order_items WHERE id = $1 FOR UPDATE", ITEM_COLUMNS);
    let existing = sqlx::query_as::<_, OrderItem>(&item_sql)
      .bind(item_id)
      .fetch_optional(&mut *tx)
      .await?;
    let existing = match existing {
      Some(item) => item,
      None => return Ok(None),
    };

    let total_price = line_total(patch.quantity, patch.unit_price);
    sqlx::query(
      "UPDATE order_items \
       SET product_id = $2, product_name = $3, quantity = $4, unit_price = $5, total_price = $6, updated_at = $7 \
       WHERE id = $1",
    )
    .bind(item_id)
    .bind(patch.product_id)
    .bind(&patch.product_name)
    .bind(patch.quantity)
    .bind(patch.unit_price)
    .bind(total_price)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    refresh_order_total(&mut tx, existing.order_id, now).await?;
    tx.commit().await?;

    Ok(Some(OrderItem {
      id: item_id,
      order_id: existing.order_id,
      product_id: patch.product_id,
      product_name: patch.product_name,
      quantity: patch.quantity,
      unit_price: patch.unit_price,
      total_price,
      created_at: existing.created_at,
      updated_at: Some(now),
    }))
  }

  async fn delete_item(&self, item_id: i64) -> Result<bool> {
    let now = Utc::now();
    let mut tx = self.pool.begin().await?;

    let owner = sqlx::query("SELECT order_id FROM order_items WHERE id = $1")
      .bind(item_id)
      .fetch_optional(&mut *tx)
      .await?;
    let order_id: i64 = match owner {
      Some(row) => row.get("order_id"),
      None => return Ok(false),
    };

    sqlx::query("DELETE FROM order_items WHERE id = $1")
      .bind(item_id)
      .execute(&mut *tx)
      .await?;

    refresh_order_total(&mut tx, order_id, now).await?;
    tx.commit().await?;
    Ok(true)
  }
}
