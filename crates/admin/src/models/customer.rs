//! Customer models.
//!
//! The platform carries two disjoint notions of "customer":
//!
//! - [`Customer`]: a persisted record created through the customer CRUD
//!   endpoints, with validated address fields and soft deletion.
//! - [`CustomerAggregate`]: derived per request by grouping settled orders
//!   by buyer email. Never persisted, never written back.
//!
//! The two are deliberately not reconciled; analytics and listings read
//! only the derived aggregates, the CRUD endpoints read only the records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use encore_core::{Address, CustomerId, Email};

use super::order::Order;

/// A persisted customer record with soft deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
    pub address: Address,
    pub created_at: DateTime<Utc>,
    /// Soft-delete marker: `None` means active. Deleted records stay in the
    /// store and are filtered out of every read.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// Whether the record is visible to reads.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Validated input for creating a customer record.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
    pub address: Address,
}

/// Partial update for a customer record. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct CustomerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<String>,
    /// When present, already validated; country has been re-stamped to AU.
    pub address: Option<Address>,
}

/// A customer reconstructed from that identity's settled orders.
///
/// Exists only for the duration of a single query. Totals are deterministic
/// for a fixed order snapshot; the representative contact fields are the
/// first encountered in grouping order and are best-effort only.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerAggregate {
    /// Identity key: the buyer email exactly as stored.
    pub email: Email,
    pub name: String,
    pub phone: String,
    pub address: Option<Address>,
    pub total_orders: u32,
    /// Sum of `total` across this identity's settled orders.
    pub total_spent: Decimal,
    pub first_order_date: DateTime<Utc>,
    pub last_order_date: DateTime<Utc>,
    /// Member orders, most recent first.
    pub orders: Vec<Order>,
}

impl CustomerAggregate {
    /// Display name with the list-endpoint fallback for empty names.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unknown Customer"
        } else {
            &self.name
        }
    }
}
