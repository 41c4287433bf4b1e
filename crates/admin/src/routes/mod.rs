//! HTTP routes for the admin API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Health check
//!
//! # Customers
//! GET    /customers             - Derived customer listing (paginated)
//! GET    /customers/analytics   - Fleet-wide customer analytics
//! GET    /customers/{email}     - One derived customer with order history
//! POST   /customers             - Create a persisted customer record
//! PUT    /customers/{id}        - Update a persisted customer record
//! DELETE /customers/{id}        - Soft-delete a persisted customer record
//!
//! # Dashboard
//! GET  /dashboard/stats         - Overview, recent orders, stock, segments
//! GET  /dashboard/insights      - Month-over-month growth
//!
//! # Stock
//! GET  /stock/status            - Stock status bands for all products
//! PUT  /stock/bulk-update       - Batch quantity updates
//! ```

pub mod customers;
pub mod dashboard;
pub mod stock;

use axum::{
    Json, Router,
    routing::{get, put},
};
use serde_json::json;

use crate::state::AppState;

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Build the full admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/customers", get(customers::list).post(customers::create))
        .route("/customers/analytics", get(customers::analytics))
        // GET takes an email, PUT/DELETE take a record id; one capture
        // serves both because the surfaces never share an identifier.
        .route(
            "/customers/{key}",
            get(customers::get)
                .put(customers::update)
                .delete(customers::delete),
        )
        .route("/dashboard/stats", get(dashboard::stats))
        .route("/dashboard/insights", get(dashboard::insights))
        .route("/stock/status", get(stock::status))
        .route("/stock/bulk-update", put(stock::bulk_update))
}
