//! Storage layer for the admin backend.
//!
//! # Tables
//!
//! - `orders` - Order documents (read-only for this service)
//! - `customers` - Persisted customer records (soft-deleted, never dropped)
//! - `products` - Products with quantity on hand
//!
//! # Design
//!
//! All access goes through the [`OrderStore`], [`CustomerStore`], and
//! [`ProductStore`] traits so the aggregation services are isolated from the
//! storage technology. Production uses the `Pg*` implementations in this
//! module; tests inject [`memory::InMemoryStore`].
//!
//! Migrations live in `crates/admin/migrations/` and are applied with
//! `sqlx migrate run` against the admin database.

pub mod customers;
pub mod memory;
pub mod orders;
pub mod products;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use encore_core::{CustomerId, Email, ProductId};

use crate::models::{Customer, CustomerUpdate, Order, Product};

pub use customers::PgCustomerStore;
pub use memory::InMemoryStore;
pub use orders::PgOrderStore;
pub use products::PgProductStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Read access to order documents.
///
/// Every method is restricted to settled orders (payment status in
/// {succeeded, completed}); unsettled orders are invisible to this service.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// All settled orders, most recent first.
    async fn list_settled(&self) -> Result<Vec<Order>, RepositoryError>;

    /// Settled orders whose buyer email matches exactly.
    async fn list_settled_for_email(&self, email: &Email)
    -> Result<Vec<Order>, RepositoryError>;

    /// Settled orders created in `[start, end)`.
    async fn list_settled_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepositoryError>;

    /// The `limit` most recently created settled orders.
    async fn recent_settled(&self, limit: u32) -> Result<Vec<Order>, RepositoryError>;
}

/// Persisted customer records. All reads filter soft-deleted rows.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Insert a new record.
    async fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError>;

    /// Apply a partial update to an active record. Returns the updated
    /// record, or `None` when no active record has that id.
    async fn update_active(
        &self,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> Result<Option<Customer>, RepositoryError>;

    /// Mark an active record deleted. Returns false when no active record
    /// has that id. The row is never removed.
    async fn soft_delete(
        &self,
        id: CustomerId,
        deleted_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;

    /// Count of active records.
    async fn count_active(&self) -> Result<u64, RepositoryError>;
}

/// Product records, read for stock insights and written by bulk updates.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All active products, most recently created first.
    async fn list_active(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Count of active products.
    async fn count_active(&self) -> Result<u64, RepositoryError>;

    /// Active products with `0 < quantity < threshold`, up to `limit`.
    async fn low_stock(&self, threshold: i64, limit: u32)
    -> Result<Vec<Product>, RepositoryError>;

    /// Set the quantity on hand for an active product. Returns the updated
    /// product, or `None` when no active product has that id.
    async fn set_quantity(
        &self,
        id: ProductId,
        quantity: i64,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
