// src/web/routes.rs

use actix_web::web;

// In a real deployment this might also check catalog reachability; for now
// it only proves the process is serving.
async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// This function is called in `main.rs` (and the integration tests) to
// configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    // Health Check Route
    .route("/health", web::get().to(health_check_handler))
    // Credential issuance
    .service(
      web::scope("/auth").route(
        "/login",
        web::post().to(crate::web::handlers::auth_handlers::login_handler),
      ),
    )
    // Order Routes (reads are open; mutations require a bearer credential)
    .service(
      web::scope("/orders")
        .route("", web::get().to(crate::web::handlers::order_handlers::list_orders_handler))
        .route(
          "",
          web::post().to(crate::web::handlers::order_handlers::create_order_handler),
        )
        .route(
          "/{order_id}",
          web::get().to(crate::web::handlers::order_handlers::get_order_handler),
        )
        .route(
          "/{order_id}",
          web::put().to(crate::web::handlers::order_handlers::update_order_status_handler),
        )
        .route(
          "/{order_id}",
          web::delete().to(crate::web::handlers::order_handlers::delete_order_handler),
        ),
    )
    // Order Item Routes
    .service(
      web::scope("/order_items")
        .route(
          "",
          web::get().to(crate::web::handlers::order_item_handlers::list_items_handler),
        )
        .route(
          "",
          web::post().to(crate::web::handlers::order_item_handlers::create_item_handler),
        )
        .route(
          "/{item_id}",
          web::get().to(crate::web::handlers::order_item_handlers::get_item_handler),
        )
        .route(
          "/{item_id}",
          web::put().to(crate::web::handlers::order_item_handlers::update_item_handler),
        )
        .route(
          "/{item_id}",
          web::delete().to(crate::web::handlers::order_item_handlers::delete_item_handler),
        ),
    );
}
