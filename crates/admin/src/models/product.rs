//! Product records, read for stock insights and written by bulk updates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use encore_core::{ProductId, StockStatus};

/// A sellable product with quantity on hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub sku: Option<String>,
    pub quantity: i64,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker: `None` means active.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Whether the record is visible to reads.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Stock level band for dashboards.
    #[must_use]
    pub const fn stock_status(&self) -> StockStatus {
        StockStatus::from_quantity(self.quantity)
    }

    /// SKU with fallback to an uppercased name prefix.
    #[must_use]
    pub fn display_sku(&self) -> String {
        self.sku.clone().unwrap_or_else(|| {
            self.name
                .chars()
                .take(6)
                .collect::<String>()
                .to_uppercase()
        })
    }
}
