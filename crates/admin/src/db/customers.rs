//! `PostgreSQL` customer record store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use encore_core::{Address, CustomerId, Email};

use super::{CustomerStore, RepositoryError};
use crate::models::{Customer, CustomerUpdate};

const CUSTOMER_COLUMNS: &str =
    "id, first_name, last_name, email, phone, address, created_at, deleted_at";

/// Internal row type for `PostgreSQL` customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: CustomerId,
    first_name: String,
    last_name: String,
    email: Email,
    phone: String,
    address: serde_json::Value,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let address: Address = serde_json::from_value(row.address).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid customer address in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            address,
            created_at: row.created_at,
            deleted_at: row.deleted_at,
        })
    }
}

/// Customer record store backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    /// Create a new customer store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let address = serde_json::to_value(&customer.address).map_err(|e| {
            RepositoryError::DataCorruption(format!("unserializable address: {e}"))
        })?;

        let sql = format!(
            "INSERT INTO customers \
             (id, first_name, last_name, email, phone, address, created_at, deleted_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NULL) \
             RETURNING {CUSTOMER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(customer.id)
            .bind(&customer.first_name)
            .bind(&customer.last_name)
            .bind(&customer.email)
            .bind(&customer.phone)
            .bind(address)
            .bind(customer.created_at)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn update_active(
        &self,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> Result<Option<Customer>, RepositoryError> {
        let address = update
            .address
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("unserializable address: {e}"))
            })?;

        // COALESCE keeps the stored value wherever the update is None.
        let sql = format!(
            "UPDATE customers SET \
                first_name = COALESCE($2, first_name), \
                last_name = COALESCE($3, last_name), \
                email = COALESCE($4, email), \
                phone = COALESCE($5, phone), \
                address = COALESCE($6, address) \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {CUSTOMER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(id)
            .bind(update.first_name)
            .bind(update.last_name)
            .bind(update.email)
            .bind(update.phone)
            .bind(address)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn soft_delete(
        &self,
        id: CustomerId,
        deleted_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE customers SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_active(&self) -> Result<u64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count.try_into().unwrap_or_default())
    }
}
