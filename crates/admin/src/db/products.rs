//! `PostgreSQL` product store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use encore_core::ProductId;

use super::{ProductStore, RepositoryError};
use crate::models::Product;

const PRODUCT_COLUMNS: &str = "id, name, sku, quantity, price, created_at, updated_at, deleted_at";

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    sku: Option<String>,
    quantity: i64,
    price: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            sku: row.sku,
            quantity: row.quantity,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

/// Product store backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    /// Create a new product store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list_active(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE deleted_at IS NULL ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_active(&self) -> Result<u64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count.try_into().unwrap_or_default())
    }

    async fn low_stock(
        &self,
        threshold: i64,
        limit: u32,
    ) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE deleted_at IS NULL AND quantity > 0 AND quantity < $1 \
             ORDER BY quantity ASC LIMIT $2"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(threshold)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn set_quantity(
        &self,
        id: ProductId,
        quantity: i64,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            "UPDATE products SET quantity = $2, updated_at = $3 \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(quantity)
            .bind(updated_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }
}
