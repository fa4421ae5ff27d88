// tests/api.rs

//! End-to-end tests driving the assembled actix application with the
//! in-memory store and a fixture catalog standing in for the external
//! product service.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use order_service::config::AppConfig;
use order_service::errors::Result as AppResult;
use order_service::services::auth_service::{CredentialRepository, InMemoryCredentialRepository};
use order_service::services::catalog_client::{CatalogClient, ProductSnapshot};
use order_service::services::token_service::TokenService;
use order_service::state::AppState;
use order_service::store::{InMemoryOrderStore, OrderStore};
use order_service::web::configure_app_routes;
use order_service::workflow::{OrderWorkflow, StatusPolicy};

// --- Fixtures ---

fn dec(s: &str) -> Decimal {
  s.parse().unwrap()
}

struct FixtureCatalog {
  products: HashMap<i64, ProductSnapshot>,
}

#[async_trait]
impl CatalogClient for FixtureCatalog {
  async fn fetch_product(&self, product_id: i64) -> AppResult<Option<ProductSnapshot>> {
    Ok(self.products.get(&product_id).cloned())
  }
}

// Catalog: product 1 = Widget at 10.00 (5 in stock), product 2 = Gadget at
// 4.50 (3 in stock).
fn fixture_catalog() -> Arc<FixtureCatalog> {
  let mut products = HashMap::new();
  products.insert(
    1,
    ProductSnapshot {
      id: 1,
      name: "Widget".to_string(),
      description: None,
      price: dec("10.00"),
      quantity: 5,
    },
  );
  products.insert(
    2,
    ProductSnapshot {
      id: 2,
      name: "Gadget".to_string(),
      description: Some("A gadget".to_string()),
      price: dec("4.50"),
      quantity: 3,
    },
  );
  Arc::new(FixtureCatalog { products })
}

fn test_config(status_policy: StatusPolicy) -> Arc<AppConfig> {
  Arc::new(AppConfig {
    server_host: "127.0.0.1".to_string(),
    server_port: 0,
    database_url: None,
    catalog_base_url: "http://127.0.0.1:0".to_string(),
    catalog_timeout: Duration::from_secs(1),
    jwt_secret: "integration-test-secret".to_string(),
    jwt_issuer: "storefront-auth".to_string(),
    jwt_audience: "storefront".to_string(),
    jwt_expire_minutes: 60,
    status_policy,
    demo_username: "admin".to_string(),
    demo_password: "admin".to_string(),
  })
}

fn test_state(status_policy: StatusPolicy) -> AppState {
  let config = test_config(status_policy);
  let store: Arc<dyn OrderStore> = Arc::new(InMemoryOrderStore::new());
  let catalog: Arc<dyn CatalogClient> = fixture_catalog();
  let workflow = Arc::new(OrderWorkflow::new(store.clone(), catalog.clone(), config.status_policy));
  let tokens = Arc::new(TokenService::new(
    &config.jwt_secret,
    &config.jwt_issuer,
    &config.jwt_audience,
    config.jwt_expire_minutes,
  ));
  let credentials: Arc<dyn CredentialRepository> =
    Arc::new(InMemoryCredentialRepository::with_user(&config.demo_username, &config.demo_password, "Admin").unwrap());

  AppState {
    store,
    catalog,
    workflow,
    tokens,
    credentials,
    config,
  }
}

async fn spawn_app(
  state: &AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
  test::init_service(
    App::new()
      .app_data(web::Data::new(state.clone()))
      .configure(configure_app_routes),
  )
  .await
}

fn bearer(state: &AppState) -> (&'static str, String) {
  let issued = state.tokens.issue("admin", "Admin").unwrap();
  ("Authorization", format!("Bearer {}", issued.token))
}

fn widget_order_body() -> Value {
  json!({
    "customerName": "Ada Lovelace",
    "customerEmail": "ada@example.com",
    "items": [{ "productId": 1, "quantity": 2 }]
  })
}

async fn create_widget_order<S, B>(app: &S, state: &AppState) -> Value
where
  S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
  B: MessageBody,
{
  let resp = test::call_service(
    app,
    test::TestRequest::post()
      .uri("/orders")
      .insert_header(bearer(state))
      .set_json(widget_order_body())
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 201);
  test::read_body_json(resp).await
}

// --- Tests ---

#[actix_web::test]
async fn health_endpoint_is_open() {
  let state = test_state(StatusPolicy::Permissive);
  let app = spawn_app(&state).await;

  let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
  assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn login_issues_a_usable_credential() {
  let state = test_state(StatusPolicy::Permissive);
  let app = spawn_app(&state).await;

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/auth/login")
      .set_json(json!({ "username": "admin", "password": "admin" }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 200);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["role"], "Admin");
  assert_eq!(body["issuer"], "storefront-auth");
  let token = body["token"].as_str().unwrap().to_string();

  // The issued token authorizes a mutation.
  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/orders")
      .insert_header(("Authorization", format!("Bearer {}", token)))
      .set_json(widget_order_body())
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 201);
}

#[actix_web::test]
async fn login_with_wrong_password_is_unauthorized() {
  let state = test_state(StatusPolicy::Permissive);
  let app = spawn_app(&state).await;

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/auth/login")
      .set_json(json!({ "username": "admin", "password": "nope" }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn unauthenticated_create_is_rejected_before_validation() {
  let state = test_state(StatusPolicy::Permissive);
  let app = spawn_app(&state).await;

  // The body would fail validation (empty items), but the missing
  // credential must win.
  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/orders")
      .set_json(json!({ "customerName": "", "customerEmail": "", "items": [] }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 401);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/orders").to_request()).await;
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body.as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn tampered_credential_is_rejected() {
  let state = test_state(StatusPolicy::Permissive);
  let app = spawn_app(&state).await;

  let mut token = state.tokens.issue("admin", "Admin").unwrap().token;
  token.push('A');
  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/orders")
      .insert_header(("Authorization", format!("Bearer {}", token)))
      .set_json(widget_order_body())
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn create_order_returns_derived_fields_and_location() {
  let state = test_state(StatusPolicy::Permissive);
  let app = spawn_app(&state).await;

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/orders")
      .insert_header(bearer(&state))
      .set_json(widget_order_body())
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 201);
  let location = resp.headers().get("Location").unwrap().to_str().unwrap().to_string();

  let body: Value = test::read_body_json(resp).await;
  assert_eq!(location, format!("/orders/{}", body["id"]));
  assert_eq!(body["status"], "pending");
  assert_eq!(body["totalAmount"].as_f64().unwrap(), 20.0);
  let item = &body["items"][0];
  assert_eq!(item["productName"], "Widget");
  assert_eq!(item["unitPrice"].as_f64().unwrap(), 10.0);
  assert_eq!(item["totalPrice"].as_f64().unwrap(), 20.0);
  assert!(body["createdAt"].is_string());
  assert!(body["updatedAt"].is_string());

  // The persisted view matches the creation response.
  let resp = test::call_service(
    &app,
    test::TestRequest::get().uri(&location).to_request(),
  )
  .await;
  assert_eq!(resp.status(), 200);
  let fetched: Value = test::read_body_json(resp).await;
  assert_eq!(fetched["totalAmount"], body["totalAmount"]);
}

#[actix_web::test]
async fn insufficient_stock_fails_and_persists_nothing() {
  let state = test_state(StatusPolicy::Permissive);
  let app = spawn_app(&state).await;

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/orders")
      .insert_header(bearer(&state))
      .set_json(json!({
        "customerName": "Ada Lovelace",
        "customerEmail": "ada@example.com",
        "items": [
          { "productId": 2, "quantity": 1 },
          { "productId": 1, "quantity": 10 }
        ]
      }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 400);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Insufficient stock for product 1");

  let resp = test::call_service(&app, test::TestRequest::get().uri("/orders").to_request()).await;
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body.as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn unknown_product_fails_with_validation_error() {
  let state = test_state(StatusPolicy::Permissive);
  let app = spawn_app(&state).await;

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/orders")
      .insert_header(bearer(&state))
      .set_json(json!({
        "customerName": "Ada Lovelace",
        "customerEmail": "ada@example.com",
        "items": [{ "productId": 99, "quantity": 1 }]
      }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 400);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Product 99 not found");
}

#[actix_web::test]
async fn empty_order_fails_with_validation_error() {
  let state = test_state(StatusPolicy::Permissive);
  let app = spawn_app(&state).await;

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/orders")
      .insert_header(bearer(&state))
      .set_json(json!({
        "customerName": "Ada Lovelace",
        "customerEmail": "ada@example.com",
        "items": []
      }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn status_update_normalizes_and_validates() {
  let state = test_state(StatusPolicy::Permissive);
  let app = spawn_app(&state).await;
  let order = create_widget_order(&app, &state).await;
  let uri = format!("/orders/{}", order["id"]);

  // Mixed case is accepted and stored lowercase.
  let resp = test::call_service(
    &app,
    test::TestRequest::put()
      .uri(&uri)
      .insert_header(bearer(&state))
      .set_json(json!({ "status": "Completed" }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 204);

  let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["status"], "completed");

  // Values outside the enum are rejected and leave the status unchanged.
  let resp = test::call_service(
    &app,
    test::TestRequest::put()
      .uri(&uri)
      .insert_header(bearer(&state))
      .set_json(json!({ "status": "shipped" }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 400);

  let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["status"], "completed");
}

#[actix_web::test]
async fn status_update_on_missing_order_is_404() {
  let state = test_state(StatusPolicy::Permissive);
  let app = spawn_app(&state).await;

  let resp = test::call_service(
    &app,
    test::TestRequest::put()
      .uri("/orders/42")
      .insert_header(bearer(&state))
      .set_json(json!({ "status": "completed" }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn strict_policy_rejects_leaving_terminal_state() {
  let state = test_state(StatusPolicy::Strict);
  let app = spawn_app(&state).await;
  let order = create_widget_order(&app, &state).await;
  let uri = format!("/orders/{}", order["id"]);

  let resp = test::call_service(
    &app,
    test::TestRequest::put()
      .uri(&uri)
      .insert_header(bearer(&state))
      .set_json(json!({ "status": "cancelled" }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 204);

  let resp = test::call_service(
    &app,
    test::TestRequest::put()
      .uri(&uri)
      .insert_header(bearer(&state))
      .set_json(json!({ "status": "pending" }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn delete_order_cascades_to_items() {
  let state = test_state(StatusPolicy::Permissive);
  let app = spawn_app(&state).await;
  let order = create_widget_order(&app, &state).await;
  let order_uri = format!("/orders/{}", order["id"]);
  let item_uri = format!("/order_items/{}", order["items"][0]["id"]);

  // The item is retrievable while its order lives.
  let resp = test::call_service(&app, test::TestRequest::get().uri(&item_uri).to_request()).await;
  assert_eq!(resp.status(), 200);

  let resp = test::call_service(
    &app,
    test::TestRequest::delete()
      .uri(&order_uri)
      .insert_header(bearer(&state))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 204);

  let resp = test::call_service(&app, test::TestRequest::get().uri(&order_uri).to_request()).await;
  assert_eq!(resp.status(), 404);
  let resp = test::call_service(&app, test::TestRequest::get().uri(&item_uri).to_request()).await;
  assert_eq!(resp.status(), 404);

  let resp = test::call_service(
    &app,
    test::TestRequest::delete()
      .uri(&order_uri)
      .insert_header(bearer(&state))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn item_level_mutations_keep_totals_consistent() {
  let state = test_state(StatusPolicy::Permissive);
  let app = spawn_app(&state).await;
  let order = create_widget_order(&app, &state).await; // total 20.00
  let order_id = order["id"].as_i64().unwrap();
  let order_uri = format!("/orders/{}", order_id);

  // Append a line to the existing order.
  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/order_items")
      .insert_header(bearer(&state))
      .set_json(json!({
        "orderId": order_id,
        "productId": 2,
        "productName": "Gadget",
        "quantity": 2,
        "unitPrice": 4.5
      }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 201);
  let item: Value = test::read_body_json(resp).await;
  assert_eq!(item["totalPrice"].as_f64().unwrap(), 9.0);
  let item_id = item["id"].as_i64().unwrap();
  let item_uri = format!("/order_items/{}", item_id);

  let resp = test::call_service(&app, test::TestRequest::get().uri(&order_uri).to_request()).await;
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["totalAmount"].as_f64().unwrap(), 29.0);

  // Path/payload id disagreement is rejected.
  let resp = test::call_service(
    &app,
    test::TestRequest::put()
      .uri(&item_uri)
      .insert_header(bearer(&state))
      .set_json(json!({
        "id": item_id + 1,
        "productId": 2,
        "quantity": 1,
        "unitPrice": 4.5
      }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 400);

  // A real update recomputes the derived totals.
  let resp = test::call_service(
    &app,
    test::TestRequest::put()
      .uri(&item_uri)
      .insert_header(bearer(&state))
      .set_json(json!({
        "id": item_id,
        "productId": 2,
        "productName": "Gadget",
        "quantity": 3,
        "unitPrice": 4.5
      }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 204);

  let resp = test::call_service(&app, test::TestRequest::get().uri(&order_uri).to_request()).await;
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["totalAmount"].as_f64().unwrap(), 33.5);

  // Removing the line restores the original total.
  let resp = test::call_service(
    &app,
    test::TestRequest::delete()
      .uri(&item_uri)
      .insert_header(bearer(&state))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 204);

  let resp = test::call_service(&app, test::TestRequest::get().uri(&order_uri).to_request()).await;
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["totalAmount"].as_f64().unwrap(), 20.0);
}

#[actix_web::test]
async fn item_create_requires_existing_order() {
  let state = test_state(StatusPolicy::Permissive);
  let app = spawn_app(&state).await;

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/order_items")
      .insert_header(bearer(&state))
      .set_json(json!({
        "orderId": 42,
        "productId": 1,
        "quantity": 1,
        "unitPrice": 1.0
      }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), 400);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Order 42 not found");
}
