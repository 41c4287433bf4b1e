//! Dashboard statistics and month-over-month business insights.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use encore_core::{average_order_value, growth_percent, Email, OrderId, PaymentStatus, ProductId, SegmentRules};

use super::customers::{aggregate_orders, SegmentBreakdown};
use super::{bounded, month_start, previous_month_start};
use crate::db::{CustomerStore, OrderStore, ProductStore};
use crate::error::AppError;
use crate::models::Order;

/// How many recent orders the dashboard shows.
const RECENT_ORDERS: u32 = 5;
/// How many low-stock products the dashboard lists.
const LOW_STOCK_LIMIT: u32 = 5;

/// Headline counts and revenue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_products: u64,
    /// Active persisted customer records, not derived identities.
    pub total_customers: u64,
    pub total_orders: u64,
    pub total_revenue: Decimal,
    pub average_order_value: Decimal,
}

/// One row of the recent-orders feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentOrder {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub total: Decimal,
    pub status: PaymentStatus,
    pub date: DateTime<Utc>,
    pub items: u64,
}

impl From<Order> for RecentOrder {
    fn from(order: Order) -> Self {
        let customer_name = if order.buyer.name.is_empty() {
            "Unknown".to_string()
        } else {
            order.buyer.name
        };
        Self {
            id: order.id,
            customer_name,
            customer_email: order
                .buyer
                .email
                .map(Email::into_inner)
                .unwrap_or_default(),
            total: order.total,
            status: order.payment_status,
            date: order.created_at,
            items: order.items.len() as u64,
        }
    }
}

/// A product flagged for restocking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockProduct {
    pub id: ProductId,
    pub name: String,
    pub quantity: i64,
    pub sku: String,
}

/// Low-stock summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockInsights {
    pub low_stock_count: u64,
    pub low_stock_products: Vec<LowStockProduct>,
}

/// Placeholder trend block kept for dashboard clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub low_stock_alert: bool,
    pub revenue_growth: &'static str,
    pub order_trend: &'static str,
}

/// Everything the dashboard renders, in one payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub overview: Overview,
    pub recent_orders: Vec<RecentOrder>,
    pub stock_insights: StockInsights,
    pub customers_by_type: SegmentBreakdown,
    pub performance: Performance,
}

/// One calendar month of settled-order activity.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MonthlyStats {
    pub revenue: Decimal,
    pub orders: u64,
    /// Distinct identified buyers within the window.
    pub customers: u64,
}

/// Month-over-month growth percentages.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GrowthStats {
    pub revenue: Decimal,
    pub orders: Decimal,
    pub customers: Decimal,
}

/// Current vs previous calendar month, with growth.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInsights {
    pub this_month: MonthlyStats,
    pub last_month: MonthlyStats,
    pub growth: GrowthStats,
}

fn summarize_month(orders: &[Order]) -> MonthlyStats {
    let mut revenue = Decimal::ZERO;
    let mut buyers: HashSet<&Email> = HashSet::new();
    for order in orders {
        revenue += order.total;
        if let Some(email) = &order.buyer.email {
            buyers.insert(email);
        }
    }
    MonthlyStats {
        revenue,
        orders: orders.len() as u64,
        customers: buyers.len() as u64,
    }
}

/// Dashboard read-model service.
pub struct DashboardService {
    orders: Arc<dyn OrderStore>,
    customers: Arc<dyn CustomerStore>,
    products: Arc<dyn ProductStore>,
    rules: SegmentRules,
    low_stock_threshold: i64,
    query_timeout: Duration,
}

impl DashboardService {
    /// Create a dashboard service over the given stores.
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrderStore>,
        customers: Arc<dyn CustomerStore>,
        products: Arc<dyn ProductStore>,
        rules: SegmentRules,
        low_stock_threshold: i64,
        query_timeout: Duration,
    ) -> Self {
        Self {
            orders,
            customers,
            products,
            rules,
            low_stock_threshold,
            query_timeout,
        }
    }

    /// Assemble the full dashboard payload.
    pub async fn stats(&self) -> Result<DashboardStats, AppError> {
        let timeout = self.query_timeout;
        let (total_products, total_customers, settled, recent, low_stock) = tokio::try_join!(
            bounded(timeout, "product count", self.products.count_active()),
            bounded(timeout, "customer count", self.customers.count_active()),
            bounded(timeout, "settled orders", self.orders.list_settled()),
            bounded(
                timeout,
                "recent orders",
                self.orders.recent_settled(RECENT_ORDERS),
            ),
            bounded(
                timeout,
                "low stock",
                self.products.low_stock(self.low_stock_threshold, LOW_STOCK_LIMIT),
            ),
        )?;

        let total_orders = settled.len() as u64;
        let total_revenue: Decimal = settled.iter().map(|o| o.total).sum();

        let mut customers_by_type = SegmentBreakdown::default();
        for aggregate in aggregate_orders(settled) {
            customers_by_type
                .record(self.rules.classify(aggregate.total_spent, aggregate.total_orders));
        }

        let low_stock_products: Vec<LowStockProduct> = low_stock
            .into_iter()
            .map(|p| LowStockProduct {
                sku: p.display_sku(),
                id: p.id,
                name: p.name,
                quantity: p.quantity,
            })
            .collect();

        Ok(DashboardStats {
            overview: Overview {
                total_products,
                total_customers,
                total_orders,
                total_revenue,
                average_order_value: average_order_value(total_revenue, total_orders),
            },
            recent_orders: recent.into_iter().map(Into::into).collect(),
            performance: Performance {
                low_stock_alert: !low_stock_products.is_empty(),
                revenue_growth: "N/A",
                order_trend: "N/A",
            },
            stock_insights: StockInsights {
                low_stock_count: low_stock_products.len() as u64,
                low_stock_products,
            },
            customers_by_type,
        })
    }

    /// Compare the current calendar month against the previous one.
    ///
    /// The previous month is the half-open window up to the first instant
    /// of the current month, so a month boundary never lands an order in
    /// both windows.
    pub async fn insights(&self) -> Result<BusinessInsights, AppError> {
        let now = Utc::now();
        let this_start = month_start(now);
        let last_start = previous_month_start(now);
        let timeout = self.query_timeout;

        let (this_orders, last_orders) = tokio::try_join!(
            bounded(
                timeout,
                "current month orders",
                self.orders.list_settled_between(this_start, now),
            ),
            bounded(
                timeout,
                "previous month orders",
                self.orders.list_settled_between(last_start, this_start),
            ),
        )?;

        let this_month = summarize_month(&this_orders);
        let last_month = summarize_month(&last_orders);

        Ok(BusinessInsights {
            growth: GrowthStats {
                revenue: growth_percent(this_month.revenue, last_month.revenue),
                orders: growth_percent(
                    Decimal::from(this_month.orders),
                    Decimal::from(last_month.orders),
                ),
                customers: growth_percent(
                    Decimal::from(this_month.customers),
                    Decimal::from(last_month.customers),
                ),
            },
            this_month,
            last_month,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use encore_core::{OrderStatus, PaymentStatus};

    use crate::db::InMemoryStore;
    use crate::models::{BuyerInfo, Order, Product};

    fn order(email: &str, total: i64, created_at: DateTime<Utc>) -> Order {
        Order {
            id: OrderId::generate(),
            order_number: format!("ENC-{}", created_at.timestamp_micros()),
            buyer: BuyerInfo {
                name: "Dana Fox".to_string(),
                email: Some(Email::parse(email).unwrap()),
                phone: String::new(),
                address: None,
            },
            subtotal: Decimal::from(total),
            shipping_cost: Decimal::ZERO,
            total: Decimal::from(total),
            payment_status: PaymentStatus::Succeeded,
            status: OrderStatus::Confirmed,
            items: Vec::new(),
            created_at,
            completed_at: None,
        }
    }

    fn product(name: &str, quantity: i64) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::generate(),
            name: name.to_string(),
            sku: None,
            quantity,
            price: Decimal::from(25),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn service(store: Arc<InMemoryStore>) -> DashboardService {
        DashboardService::new(
            store.clone(),
            store.clone(),
            store,
            SegmentRules::default(),
            10,
            Duration::from_secs(10),
        )
    }

    #[tokio::test]
    async fn test_stats_overview_and_breakdown() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        store.push_order(order("vip@example.com", 600, now - ChronoDuration::days(3)));
        store.push_order(order("new@example.com", 40, now - ChronoDuration::days(2)));
        store.push_product(product("Tour Hoodie", 4));
        store.push_product(product("Poster", 200));

        let stats = service(store).stats().await.unwrap();

        assert_eq!(stats.overview.total_products, 2);
        // No persisted records were created, only derived identities.
        assert_eq!(stats.overview.total_customers, 0);
        assert_eq!(stats.overview.total_orders, 2);
        assert_eq!(stats.overview.total_revenue, Decimal::from(640));
        assert_eq!(stats.overview.average_order_value, Decimal::from(320));

        assert_eq!(stats.customers_by_type.vip, 1);
        assert_eq!(stats.customers_by_type.new, 1);

        assert_eq!(stats.stock_insights.low_stock_count, 1);
        assert_eq!(stats.stock_insights.low_stock_products[0].sku, "TOUR H");
        assert!(stats.performance.low_stock_alert);
    }

    #[tokio::test]
    async fn test_stats_recent_orders_capped_and_sorted() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        for i in 0..7 {
            store.push_order(order(
                "buyer@example.com",
                10 + i,
                now - ChronoDuration::hours(i),
            ));
        }

        let stats = service(store).stats().await.unwrap();
        assert_eq!(stats.recent_orders.len(), 5);
        // Most recent first: the i=0 order carries total 10.
        assert_eq!(stats.recent_orders[0].total, Decimal::from(10));
        assert_eq!(stats.recent_orders[4].total, Decimal::from(14));
    }

    #[tokio::test]
    async fn test_insights_growth() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        let this_start = month_start(now);
        let last_start = previous_month_start(now);

        // Last month: 100 revenue, one buyer. This month: 150, two buyers.
        store.push_order(order(
            "a@example.com",
            100,
            last_start + ChronoDuration::hours(5),
        ));
        store.push_order(order("a@example.com", 90, this_start));
        store.push_order(order("b@example.com", 60, now));

        let insights = service(store).insights().await.unwrap();
        assert_eq!(insights.last_month.revenue, Decimal::from(100));
        assert_eq!(insights.last_month.orders, 1);
        assert_eq!(insights.last_month.customers, 1);
        assert_eq!(insights.this_month.revenue, Decimal::from(150));
        assert_eq!(insights.this_month.orders, 2);
        assert_eq!(insights.this_month.customers, 2);
        assert_eq!(insights.growth.revenue, Decimal::from(50));
        assert_eq!(insights.growth.orders, Decimal::from(100));
        assert_eq!(insights.growth.customers, Decimal::from(100));
    }

    #[tokio::test]
    async fn test_insights_growth_from_empty_previous_month() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        store.push_order(order("a@example.com", 120, month_start(now)));

        let insights = service(store).insights().await.unwrap();
        assert_eq!(insights.last_month.revenue, Decimal::ZERO);
        assert_eq!(insights.growth.revenue, Decimal::from(100));
        assert_eq!(insights.growth.orders, Decimal::from(100));
    }

    #[tokio::test]
    async fn test_insights_empty_store_is_all_zero() {
        let store = Arc::new(InMemoryStore::new());
        let insights = service(store).insights().await.unwrap();
        assert_eq!(insights.growth.revenue, Decimal::ZERO);
        assert_eq!(insights.growth.orders, Decimal::ZERO);
        assert_eq!(insights.growth.customers, Decimal::ZERO);
    }
}
