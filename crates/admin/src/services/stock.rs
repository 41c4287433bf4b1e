//! Stock overview and bulk quantity updates.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use encore_core::{ProductId, StockStatus};

use super::bounded;
use crate::db::ProductStore;
use crate::error::AppError;
use crate::models::Product;

/// One product in the stock overview, with its status band.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockStatusEntry {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub quantity: i64,
    pub price: Decimal,
    pub status: StockStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for StockStatusEntry {
    fn from(product: Product) -> Self {
        Self {
            sku: product.display_sku(),
            status: product.stock_status(),
            id: product.id,
            name: product.name,
            quantity: product.quantity,
            price: product.price,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// One requested quantity change, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdateRequest {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// What happened to a single item of a bulk update.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// The new quantity was written.
    #[serde(rename_all = "camelCase")]
    Applied {
        product_name: String,
        new_quantity: i64,
    },
    /// The item never reached the store.
    SkippedInvalid { reason: String },
    /// The store rejected the item; later items still proceed.
    Failed { reason: String },
}

/// Per-item report row; `product_id` echoes the request verbatim.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub product_id: String,
    #[serde(flatten)]
    pub outcome: UpdateOutcome,
}

/// Full bulk-update report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateReport {
    pub results: Vec<UpdateResult>,
    /// Count of applied items.
    pub updated: u64,
}

/// Stock management service.
pub struct StockService {
    products: Arc<dyn ProductStore>,
    query_timeout: Duration,
}

impl StockService {
    /// Create a stock service over the given store.
    #[must_use]
    pub fn new(products: Arc<dyn ProductStore>, query_timeout: Duration) -> Self {
        Self {
            products,
            query_timeout,
        }
    }

    /// Status bands for every active product, newest first.
    pub async fn status(&self) -> Result<Vec<StockStatusEntry>, AppError> {
        let products = bounded(
            self.query_timeout,
            "stock status",
            self.products.list_active(),
        )
        .await?;

        Ok(products.into_iter().map(Into::into).collect())
    }

    /// Apply a batch of quantity updates, one outcome per item.
    ///
    /// Items are processed in request order and independently: an invalid
    /// or failing item never blocks the rest, and nothing is rolled back.
    pub async fn bulk_update(
        &self,
        updates: Vec<StockUpdateRequest>,
    ) -> Result<BulkUpdateReport, AppError> {
        let mut results = Vec::with_capacity(updates.len());
        let mut updated = 0_u64;

        for update in updates {
            let raw_id = update.product_id.clone().unwrap_or_default();
            let outcome = self.apply_one(update).await;
            if matches!(outcome, UpdateOutcome::Applied { .. }) {
                updated += 1;
            }
            results.push(UpdateResult {
                product_id: raw_id,
                outcome,
            });
        }

        Ok(BulkUpdateReport { results, updated })
    }

    async fn apply_one(&self, update: StockUpdateRequest) -> UpdateOutcome {
        let id: ProductId = match update.product_id.as_deref() {
            None | Some("") => {
                return UpdateOutcome::SkippedInvalid {
                    reason: "missing productId".to_string(),
                };
            }
            Some(raw) => match raw.parse() {
                Ok(id) => id,
                Err(_) => {
                    return UpdateOutcome::SkippedInvalid {
                        reason: "invalid productId".to_string(),
                    };
                }
            },
        };

        let quantity = match update.quantity {
            Some(q) if q >= 0 => q,
            Some(_) => {
                return UpdateOutcome::SkippedInvalid {
                    reason: "quantity must not be negative".to_string(),
                };
            }
            None => {
                return UpdateOutcome::SkippedInvalid {
                    reason: "missing quantity".to_string(),
                };
            }
        };

        let write = bounded(
            self.query_timeout,
            "stock update",
            self.products.set_quantity(id, quantity, Utc::now()),
        )
        .await;

        match write {
            Ok(Some(product)) => UpdateOutcome::Applied {
                product_name: product.name,
                new_quantity: quantity,
            },
            Ok(None) => UpdateOutcome::Failed {
                reason: "product not found".to_string(),
            },
            Err(e) => UpdateOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }
}
