//! Integration tests for the Encore admin API.
//!
//! Tests drive the real router in-process with `tower::ServiceExt::oneshot`
//! over the in-memory store, so no database or running server is required:
//!
//! ```bash
//! cargo test -p encore-integration-tests
//! ```
//!
//! The helpers here build a seeded [`TestApp`] and decode JSON responses;
//! the scenarios live under `tests/`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use encore_admin::config::AdminConfig;
use encore_admin::db::InMemoryStore;
use encore_admin::models::{BuyerInfo, Order, OrderItem, Product};
use encore_admin::routes;
use encore_admin::state::AppState;
use encore_core::{Email, OrderId, OrderStatus, PaymentStatus, ProductId};

/// Response body size cap for tests.
const BODY_LIMIT: usize = 1024 * 1024;

/// The admin router wired to a seeded in-memory store.
pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    router: Router,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build an app with default configuration and an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(AdminConfig::default())
    }

    /// Build an app with custom configuration.
    #[must_use]
    pub fn with_config(config: AdminConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let state = AppState::new(
            config,
            store.clone(),
            store.clone(),
            store.clone(),
        );
        let router = routes::routes().with_state(state);
        Self { store, router }
    }

    /// Send a request and decode the JSON response.
    ///
    /// # Panics
    ///
    /// Panics when the request cannot be built or the response body is not
    /// JSON; both are test failures, not conditions to handle.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                builder.body(Body::from(json.to_string()))
            }
            None => builder.body(Body::empty()),
        }
        .expect("request should build");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .expect("body should be readable");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body should be JSON")
        };

        (status, json)
    }

    /// GET a path.
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None).await
    }
}

/// Build a settled order for one identified buyer.
#[must_use]
pub fn settled_order(email: &str, name: &str, total: i64, created_at: DateTime<Utc>) -> Order {
    order(
        Some(email),
        name,
        total,
        PaymentStatus::Succeeded,
        created_at,
    )
}

/// Build an order with full control over identity and payment status.
///
/// # Panics
///
/// Panics when `email` is not a valid address; fixtures use literals.
#[must_use]
pub fn order(
    email: Option<&str>,
    name: &str,
    total: i64,
    payment_status: PaymentStatus,
    created_at: DateTime<Utc>,
) -> Order {
    let total = Decimal::from(total);
    Order {
        id: OrderId::generate(),
        order_number: format!("ENC-{}", created_at.timestamp_micros()),
        buyer: BuyerInfo {
            name: name.to_string(),
            email: email.map(|e| Email::parse(e).expect("valid fixture email")),
            phone: "0400000000".to_string(),
            address: None,
        },
        subtotal: total,
        shipping_cost: Decimal::ZERO,
        total,
        payment_status,
        status: OrderStatus::Confirmed,
        items: vec![OrderItem {
            product_id: ProductId::generate(),
            name: "General Admission".to_string(),
            quantity: 1,
            price: total,
        }],
        created_at,
        completed_at: None,
    }
}

/// Build an active product.
#[must_use]
pub fn product(name: &str, sku: Option<&str>, quantity: i64, price: i64) -> Product {
    let now = Utc::now();
    Product {
        id: ProductId::generate(),
        name: name.to_string(),
        sku: sku.map(str::to_string),
        quantity,
        price: Decimal::from(price),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

/// Decode a decimal that the API serialized as a JSON string.
///
/// # Panics
///
/// Panics when the value is not a string-encoded decimal.
#[must_use]
pub fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("decimal fields serialize as strings")
        .parse()
        .expect("valid decimal string")
}
