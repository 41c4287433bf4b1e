//! `PostgreSQL` order store.
//!
//! Buyer address and line items are stored as JSONB snapshots; the row is
//! decoded into the domain [`Order`] via `TryFrom`, surfacing malformed
//! JSON as `DataCorruption` rather than panicking.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use encore_core::{Address, Email, OrderId, OrderStatus, PaymentStatus};

use super::{OrderStore, RepositoryError};
use crate::models::{BuyerInfo, Order, OrderItem};

/// Columns shared by every order query.
const ORDER_COLUMNS: &str = "id, order_number, buyer_name, buyer_email, buyer_phone, \
     buyer_address, subtotal, shipping_cost, total, payment_status, order_status, \
     items, created_at, completed_at";

/// Settled-set predicate, inlined because the set is a fixed constant.
const SETTLED: &str = "payment_status IN ('succeeded', 'completed')";

/// Internal row type for `PostgreSQL` order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    buyer_name: String,
    buyer_email: Option<String>,
    buyer_phone: Option<String>,
    buyer_address: Option<serde_json::Value>,
    subtotal: Decimal,
    shipping_cost: Decimal,
    total: Decimal,
    payment_status: PaymentStatus,
    order_status: OrderStatus,
    items: serde_json::Value,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        // Empty email strings carry no identity; treat them like NULL.
        let email = match row.buyer_email.as_deref() {
            None | Some("") => None,
            Some(s) => Some(Email::parse(s).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid buyer email in database: {e}"))
            })?),
        };

        let address: Option<Address> = row
            .buyer_address
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid buyer address in database: {e}"))
            })?;

        let items: Vec<OrderItem> = serde_json::from_value(row.items).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order items in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            order_number: row.order_number,
            buyer: BuyerInfo {
                name: row.buyer_name,
                email,
                phone: row.buyer_phone.unwrap_or_default(),
                address,
            },
            subtotal: row.subtotal,
            shipping_cost: row.shipping_cost,
            total: row.total,
            payment_status: row.payment_status,
            status: row.order_status,
            items,
            created_at: row.created_at,
            completed_at: row.completed_at,
        })
    }
}

/// Order store backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Create a new order store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn list_settled(&self) -> Result<Vec<Order>, RepositoryError> {
        let sql =
            format!("SELECT {ORDER_COLUMNS} FROM orders WHERE {SETTLED} ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_settled_for_email(
        &self,
        email: &Email,
    ) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE {SETTLED} AND buyer_email = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(email.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_settled_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE {SETTLED} AND created_at >= $1 AND created_at < $2 \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn recent_settled(&self, limit: u32) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE {SETTLED} ORDER BY created_at DESC LIMIT $1"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
