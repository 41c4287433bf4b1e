//! Order records.
//!
//! Orders are owned by the order store and are immutable once settled; the
//! admin backend reads them to derive customer aggregates and dashboard
//! metrics, and never writes them. Buyer contact details are a denormalized
//! snapshot taken at checkout, not a reference to a customer record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use encore_core::{Address, Email, OrderId, OrderStatus, PaymentStatus, ProductId};

/// Snapshot of buyer contact details captured at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerInfo {
    pub name: String,
    /// Orders without a buyer email carry no identity key and are excluded
    /// from customer aggregation.
    pub email: Option<Email>,
    #[serde(default)]
    pub phone: String,
    pub address: Option<Address>,
}

/// A purchased line item. Read-only snapshot; never re-priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    /// Unit price at time of purchase.
    pub price: Decimal,
}

/// An order document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Human-readable order number (unique, roughly monotonic).
    pub order_number: String,
    pub buyer: BuyerInfo,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    /// subtotal + shipping; no tax field by design.
    pub total: Decimal,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Whether this order counts toward customer analytics: payment settled
    /// and buyer identified by email.
    #[must_use]
    pub fn counts_toward_analytics(&self) -> bool {
        self.payment_status.is_settled() && self.buyer.email.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(payment_status: PaymentStatus, email: Option<&str>) -> Order {
        Order {
            id: OrderId::generate(),
            order_number: "ENC-1001".to_string(),
            buyer: BuyerInfo {
                name: "Jane Smith".to_string(),
                email: email.map(|e| Email::parse(e).unwrap()),
                phone: String::new(),
                address: None,
            },
            subtotal: Decimal::from(90),
            shipping_cost: Decimal::from(10),
            total: Decimal::from(100),
            payment_status,
            status: OrderStatus::Confirmed,
            items: vec![],
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn test_counts_toward_analytics() {
        assert!(order(PaymentStatus::Succeeded, Some("a@x.com")).counts_toward_analytics());
        assert!(order(PaymentStatus::Completed, Some("a@x.com")).counts_toward_analytics());
        assert!(!order(PaymentStatus::Pending, Some("a@x.com")).counts_toward_analytics());
        assert!(!order(PaymentStatus::Succeeded, None).counts_toward_analytics());
    }

    #[test]
    fn test_serde_shape() {
        let order = order(PaymentStatus::Succeeded, Some("a@x.com"));
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["orderNumber"], "ENC-1001");
        assert_eq!(json["paymentStatus"], "succeeded");
        assert!(json["buyer"]["email"].is_string());
    }
}
