// src/web/handlers/order_item_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::store::OrderStore;
use crate::web::extractors::AuthenticatedUser;
use crate::workflow::{CreateItemRequest, UpdateItemRequest};

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemCreatePayload {
  pub order_id: i64,
  pub product_id: i64,
  pub product_name: Option<String>,
  pub quantity: i32,
  #[serde(default)]
  pub unit_price: Decimal,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemUpdatePayload {
  pub id: i64,
  pub product_id: i64,
  pub product_name: Option<String>,
  pub quantity: i32,
  #[serde(default)]
  pub unit_price: Decimal,
}

// --- Handler Implementations ---

#[instrument(name = "handler::list_order_items", skip(app_state))]
pub async fn list_items_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let items = app_state.store.list_items().await?;
  Ok(HttpResponse::Ok().json(items))
}

#[instrument(name = "handler::get_order_item", skip(app_state, path), fields(item_id = %path.as_ref()))]
pub async fn get_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let item_id = path.into_inner();
  let item = app_state
    .store
    .get_item(item_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order item {} not found", item_id)))?;
  Ok(HttpResponse::Ok().json(item))
}

#[instrument(
    name = "handler::create_order_item",
    skip(app_state, req_payload, auth_user),
    fields(subject = %auth_user.subject)
)]
pub async fn create_item_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<OrderItemCreatePayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let item = app_state
    .workflow
    .add_item(CreateItemRequest {
      order_id: payload.order_id,
      product_id: payload.product_id,
      product_name: payload.product_name,
      quantity: payload.quantity,
      unit_price: payload.unit_price,
    })
    .await?;

  info!(item_id = item.id, order_id = item.order_id, "Order item created");
  Ok(
    HttpResponse::Created()
      .insert_header(("Location", format!("/order_items/{}", item.id)))
      .json(item),
  )
}

#[instrument(
    name = "handler::update_order_item",
    skip(app_state, req_payload, auth_user, path),
    fields(item_id = %path.as_ref(), subject = %auth_user.subject)
)]
pub async fn update_item_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<i64>,
  req_payload: web::Json<OrderItemUpdatePayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  app_state
    .workflow
    .update_item(
      path.into_inner(),
      UpdateItemRequest {
        id: payload.id,
        product_id: payload.product_id,
        product_name: payload.product_name,
        quantity: payload.quantity,
        unit_price: payload.unit_price,
      },
    )
    .await?;
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(
    name = "handler::delete_order_item",
    skip(app_state, auth_user, path),
    fields(item_id = %path.as_ref(), subject = %auth_user.subject)
)]
pub async fn delete_item_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  app_state.workflow.remove_item(path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}
