// src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::store::OrderStore;
use crate::web::extractors::AuthenticatedUser;
use crate::workflow::{CreateOrderRequest, OrderLineRequest};

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItemPayload {
  pub product_id: i64,
  pub product_name: Option<String>,
  pub quantity: i32,
  pub unit_price: Option<Decimal>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
  pub customer_name: String,
  pub customer_email: String,
  #[serde(default)]
  pub items: Vec<CreateOrderItemPayload>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateOrderStatusPayload {
  pub status: String, // pending | completed | cancelled
}

// --- Handler Implementations ---

#[instrument(name = "handler::list_orders", skip(app_state))]
pub async fn list_orders_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let orders = app_state.store.list_orders().await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::get_order", skip(app_state, path), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let order = app_state
    .store
    .get_order(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(
    name = "handler::create_order",
    skip(app_state, req_payload, auth_user),
    fields(subject = %auth_user.subject)
)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser, // Extracted authenticated identity
  req_payload: web::Json<CreateOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let request = CreateOrderRequest {
    customer_name: payload.customer_name,
    customer_email: payload.customer_email,
    items: payload
      .items
      .into_iter()
      .map(|item| OrderLineRequest {
        product_id: item.product_id,
        product_name: item.product_name,
        quantity: item.quantity,
        unit_price: item.unit_price,
      })
      .collect(),
  };

  let order = app_state.workflow.create_order(request).await?;
  info!(order_id = order.id, subject = %auth_user.subject, "Order created");

  Ok(
    HttpResponse::Created()
      .insert_header(("Location", format!("/orders/{}", order.id)))
      .json(order),
  )
}

#[instrument(
    name = "handler::update_order_status",
    skip(app_state, req_payload, auth_user, path),
    fields(order_id = %path.as_ref(), subject = %auth_user.subject)
)]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<i64>,
  req_payload: web::Json<UpdateOrderStatusPayload>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  app_state.workflow.update_status(order_id, &req_payload.status).await?;
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(
    name = "handler::delete_order",
    skip(app_state, auth_user, path),
    fields(order_id = %path.as_ref(), subject = %auth_user.subject)
)]
pub async fn delete_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  app_state.workflow.delete_order(path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}
