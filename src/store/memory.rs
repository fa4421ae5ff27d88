// src/store/memory.rs

//! HashMap-backed order store for tests and database-less runs. One write
//! lock scope per mutating call keeps aggregate commits all-or-nothing.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{line_total, order_total, ItemPatch, NewOrder, NewOrderItem, OrderStore};
use crate::errors::Result;
use crate::models::{Order, OrderItem, OrderStatus};

struct Inner {
  orders: HashMap<i64, Order>,
  // item id -> owning order id, for item lookups without scanning
  item_index: HashMap<i64, i64>,
  next_order_id: i64,
  next_item_id: i64,
}

pub struct InMemoryOrderStore {
  inner: RwLock<Inner>,
}

impl Default for InMemoryOrderStore {
  fn default() -> Self {
    Self::new()
  }
}

impl InMemoryOrderStore {
  pub fn new() -> Self {
    Self {
      inner: RwLock::new(Inner {
        orders: HashMap::new(),
        item_index: HashMap::new(),
        next_order_id: 1,
        next_item_id: 1,
      }),
    }
  }
}

impl Inner {
  fn alloc_order_id(&mut self) -> i64 {
    let id = self.next_order_id;
    self.next_order_id += 1;
    id
  }

  fn alloc_item_id(&mut self) -> i64 {
    let id = self.next_item_id;
    self.next_item_id += 1;
    id
  }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
  async fn list_orders(&self) -> Result<Vec<Order>> {
    let inner = self.inner.read();
    let mut orders: Vec<Order> = inner.orders.values().cloned().collect();
    orders.sort_by_key(|o| o.id);
    Ok(orders)
  }

  async fn get_order(&self, order_id: i64) -> Result<Option<Order>> {
    Ok(self.inner.read().orders.get(&order_id).cloned())
  }

  async fn insert_order(&self, draft: NewOrder) -> Result<Order> {
    let mut inner = self.inner.write();
    let now = Utc::now();
    let order_id = inner.alloc_order_id();

    let mut items = Vec::with_capacity(draft.items.len());
    for line in draft.items {
      let item_id = inner.alloc_item_id();
      inner.item_index.insert(item_id, order_id);
      items.push(OrderItem {
        id: item_id,
        order_id,
        total_price: line_total(line.quantity, line.unit_price),
        product_id: line.product_id,
        product_name: line.product_name,
        quantity: line.quantity,
        unit_price: line.unit_price,
        created_at: now,
        updated_at: Some(now),
      });
    }

    let order = Order {
      id: order_id,
      customer_name: draft.customer_name,
      customer_email: draft.customer_email,
      status: draft.status,
      total_amount: order_total(&items),
      created_at: now,
      updated_at: Some(now),
      items,
    };
    inner.orders.insert(order_id, order.clone());
    Ok(order)
  }

  async fn update_status(&self, order_id: i64, status: OrderStatus) -> Result<Option<Order>> {
    let mut inner = self.inner.write();
    match inner.orders.get_mut(&order_id) {
      Some(order) => {
        order.status = status;
        order.updated_at = Some(Utc::now());
        Ok(Some(order.clone()))
      }
      None => Ok(None),
    }
  }

  async fn delete_order(&self, order_id: i64) -> Result<bool> {
    let mut inner = self.inner.write();
    match inner.orders.remove(&order_id) {
      Some(order) => {
        for item in &order.items {
          inner.item_index.remove(&item.id);
        }
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn list_items(&self) -> Result<Vec<OrderItem>> {
    let inner = self.inner.read();
    let mut items: Vec<OrderItem> = inner
      .orders
      .values()
      .flat_map(|order| order.items.iter().cloned())
      .collect();
    items.sort_by_key(|i| std::cmp::Reverse(i.id));
    Ok(items)
  }

  async fn get_item(&self, item_id: i64) -> Result<Option<OrderItem>> {
    let inner = self.inner.read();
    let order_id = match inner.item_index.get(&item_id) {
      Some(id) => *id,
      None => return Ok(None),
    };
    Ok(
      inner
        .orders
        .get(&order_id)
        .and_then(|order| order.items.iter().find(|i| i.id == item_id).cloned()),
    )
  }

  async fn insert_item(&self, order_id: i64, draft: NewOrderItem) -> Result<Option<OrderItem>> {
    let mut inner = self.inner.write();
    if !inner.orders.contains_key(&order_id) {
      return Ok(None);
    }
    let now = Utc::now();
    let item_id = inner.alloc_item_id();
    inner.item_index.insert(item_id, order_id);

    let item = OrderItem {
      id: item_id,
      order_id,
      total_price: line_total(draft.quantity, draft.unit_price),
      product_id: draft.product_id,
      product_name: draft.product_name,
      quantity: draft.quantity,
      unit_price: draft.unit_price,
      created_at: now,
      updated_at: Some(now),
    };

    let order = inner
      .orders
      .get_mut(&order_id)
      .expect("order existence checked above");
    order.items.push(item.clone());
    order.total_amount = order_total(&order.items);
    order.updated_at = Some(now);
    Ok(Some(item))
  }

  async fn update_item(&self, item_id: i64, patch: ItemPatch) -> Result<Option<OrderItem>> {
    let mut inner = self.inner.write();
    let order_id = match inner.item_index.get(&item_id) {
      Some(id) => *id,
      None => return Ok(None),
    };
    let now = Utc::now();
    let order = match inner.orders.get_mut(&order_id) {
      Some(order) => order,
      None => return Ok(None),
    };

    let updated = {
      let item = match order.items.iter_mut().find(|i| i.id == item_id) {
        Some(item) => item,
        None => return Ok(None),
      };
      item.total_price = line_total(patch.quantity, patch.unit_price);
      item.product_id = patch.product_id;
      item.product_name = patch.product_name;
      item.quantity = patch.quantity;
      item.unit_price = patch.unit_price;
      item.updated_at = Some(now);
      item.clone()
    };

    order.total_amount = order_total(&order.items);
    order.updated_at = Some(now);
    Ok(Some(updated))
  }

  async fn delete_item(&self, item_id: i64) -> Result<bool> {
    let mut inner = self.inner.write();
    let order_id = match inner.item_index.remove(&item_id) {
      Some(id) => id,
      None => return Ok(false),
    };
    let order = match inner.orders.get_mut(&order_id) {
      Some(order) => order,
      None => return Ok(false),
    };
    order.items.retain(|i| i.id != item_id);
    order.total_amount = order_total(&order.items);
    order.updated_at = Some(Utc::now());
    Ok(true)
  }
}
