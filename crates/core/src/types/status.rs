//! Status enums for orders and stock.

use serde::{Deserialize, Serialize};

/// Payment status of an order.
///
/// Only settled orders (see [`PaymentStatus::is_settled`]) contribute to
/// customer aggregates, analytics, and dashboard revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Succeeded,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Whether this status is in the settled set.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Succeeded | Self::Completed)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        };
        write!(f, "{s}")
    }
}

/// Order fulfillment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

/// Stock level band for a product, derived from its quantity on hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    Low,
    Medium,
    Healthy,
}

impl StockStatus {
    /// Band boundaries: 0 is out of stock, 1-20 low, 21-40 medium.
    #[must_use]
    pub const fn from_quantity(quantity: i64) -> Self {
        if quantity <= 0 {
            Self::OutOfStock
        } else if quantity <= 20 {
            Self::Low
        } else if quantity <= 40 {
            Self::Medium
        } else {
            Self::Healthy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settled_set() {
        assert!(PaymentStatus::Succeeded.is_settled());
        assert!(PaymentStatus::Completed.is_settled());
        assert!(!PaymentStatus::Pending.is_settled());
        assert!(!PaymentStatus::Failed.is_settled());
        assert!(!PaymentStatus::Refunded.is_settled());
    }

    #[test]
    fn test_payment_status_serde_names() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Succeeded).ok(),
            Some("\"succeeded\"".to_string())
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Completed).ok(),
            Some("\"completed\"".to_string())
        );
    }

    #[test]
    fn test_stock_status_bands() {
        assert_eq!(StockStatus::from_quantity(0), StockStatus::OutOfStock);
        assert_eq!(StockStatus::from_quantity(1), StockStatus::Low);
        assert_eq!(StockStatus::from_quantity(20), StockStatus::Low);
        assert_eq!(StockStatus::from_quantity(21), StockStatus::Medium);
        assert_eq!(StockStatus::from_quantity(40), StockStatus::Medium);
        assert_eq!(StockStatus::from_quantity(41), StockStatus::Healthy);
    }
}
