//! Customer directory: derived aggregates, segmentation, analytics, and
//! the persisted-record CRUD.
//!
//! The directory never stores aggregates. Every listing and analytics call
//! re-derives them from the current settled-order snapshot, so a customer's
//! segment can change between two calls whenever new orders settle.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use encore_core::{average_order_value, Email, Segment, SegmentRules};

use super::{bounded, month_start, previous_month_start};
use crate::db::{CustomerStore, OrderStore};
use crate::error::AppError;
use crate::models::{Customer, CustomerAggregate, CustomerUpdate, NewCustomer, Order};

/// Group settled, identified orders into per-identity aggregates.
///
/// The identity key is the buyer email exactly as stored; differently-cased
/// addresses form distinct customers. Orders without an email (or not
/// settled) are dropped. The result is sorted by last order date, most
/// recent first, and each aggregate's member orders keep that order too.
#[must_use]
pub fn aggregate_orders(orders: Vec<Order>) -> Vec<CustomerAggregate> {
    let mut index: HashMap<Email, usize> = HashMap::new();
    let mut aggregates: Vec<CustomerAggregate> = Vec::new();

    for order in orders {
        if !order.counts_toward_analytics() {
            continue;
        }
        let Some(email) = order.buyer.email.clone() else {
            continue;
        };

        match index.get(&email).and_then(|&i| aggregates.get_mut(i)) {
            Some(aggregate) => {
                aggregate.total_orders += 1;
                aggregate.total_spent += order.total;
                aggregate.first_order_date = aggregate.first_order_date.min(order.created_at);
                aggregate.last_order_date = aggregate.last_order_date.max(order.created_at);
                aggregate.orders.push(order);
            }
            None => {
                index.insert(email.clone(), aggregates.len());
                aggregates.push(CustomerAggregate {
                    email,
                    name: order.buyer.name.clone(),
                    phone: order.buyer.phone.clone(),
                    address: order.buyer.address.clone(),
                    total_orders: 1,
                    total_spent: order.total,
                    first_order_date: order.created_at,
                    last_order_date: order.created_at,
                    orders: vec![order],
                });
            }
        }
    }

    for aggregate in &mut aggregates {
        aggregate
            .orders
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
    aggregates.sort_by(|a, b| b.last_order_date.cmp(&a.last_order_date));
    aggregates
}

/// Listing parameters, after query-string parsing.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// 1-based page number; values below 1 are clamped to 1.
    pub page: u32,
    /// Page size; values below 1 are clamped to 1.
    pub limit: u32,
    /// Case-insensitive substring matched against name or email.
    pub search: Option<String>,
    /// Exact segment filter.
    pub segment: Option<Segment>,
}

/// One classified aggregate in a listing.
#[derive(Debug, Clone)]
pub struct CustomerSummary {
    pub aggregate: CustomerAggregate,
    pub segment: Segment,
}

/// A page of the customer listing.
#[derive(Debug, Clone)]
pub struct CustomerPage {
    pub customers: Vec<CustomerSummary>,
    /// Size of the filtered set, before pagination.
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

/// A single customer's aggregate with its derived metrics.
#[derive(Debug, Clone)]
pub struct CustomerDetail {
    pub aggregate: CustomerAggregate,
    pub segment: Segment,
    pub average_order_value: Decimal,
}

/// Customer counts per segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SegmentBreakdown {
    pub vip: u64,
    pub loyal: u64,
    pub regular: u64,
    pub new: u64,
}

impl SegmentBreakdown {
    /// Tally one customer.
    pub const fn record(&mut self, segment: Segment) {
        match segment {
            Segment::Vip => self.vip += 1,
            Segment::Loyal => self.loyal += 1,
            Segment::Regular => self.regular += 1,
            Segment::New => self.new += 1,
        }
    }
}

/// Fleet-wide customer analytics.
#[derive(Debug, Clone)]
pub struct CustomerAnalytics {
    pub total_customers: u64,
    /// Customers whose first settled order falls in the current month.
    pub new_customers_this_month: u64,
    /// Customers whose first settled order falls in the previous month.
    pub new_customers_last_month: u64,
    pub total_revenue: Decimal,
    pub total_orders: u64,
    pub average_order_value: Decimal,
    pub by_segment: SegmentBreakdown,
}

/// Customer directory service.
pub struct CustomerDirectory {
    orders: Arc<dyn OrderStore>,
    customers: Arc<dyn CustomerStore>,
    rules: SegmentRules,
    query_timeout: Duration,
}

impl CustomerDirectory {
    /// Create a directory over the given stores.
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrderStore>,
        customers: Arc<dyn CustomerStore>,
        rules: SegmentRules,
        query_timeout: Duration,
    ) -> Self {
        Self {
            orders,
            customers,
            rules,
            query_timeout,
        }
    }

    fn classify(&self, aggregate: &CustomerAggregate) -> Segment {
        self.rules
            .classify(aggregate.total_spent, aggregate.total_orders)
    }

    /// List derived customers: sort by recency, filter, then paginate.
    ///
    /// Filters compose conjunctively, and pagination applies to the
    /// filtered set, so `total` and `total_pages` describe what matched.
    pub async fn list(&self, query: ListQuery) -> Result<CustomerPage, AppError> {
        let orders = bounded(
            self.query_timeout,
            "customer listing",
            self.orders.list_settled(),
        )
        .await?;

        let page = query.page.max(1);
        let limit = query.limit.max(1);
        let needle = query
            .search
            .as_deref()
            .map(str::to_lowercase)
            .filter(|s| !s.is_empty());

        let filtered: Vec<CustomerSummary> = aggregate_orders(orders)
            .into_iter()
            .map(|aggregate| {
                let segment = self.classify(&aggregate);
                CustomerSummary { aggregate, segment }
            })
            .filter(|summary| query.segment.is_none_or(|s| s == summary.segment))
            .filter(|summary| {
                needle.as_deref().is_none_or(|needle| {
                    summary.aggregate.name.to_lowercase().contains(needle)
                        || summary.aggregate.email.contains_ignore_case(needle)
                })
            })
            .collect();

        let total = filtered.len() as u64;
        let total_pages = total.div_ceil(u64::from(limit)).try_into().unwrap_or(u32::MAX);
        let customers = filtered
            .into_iter()
            .skip((page as usize - 1) * limit as usize)
            .take(limit as usize)
            .collect();

        Ok(CustomerPage {
            customers,
            total,
            page,
            limit,
            total_pages,
        })
    }

    /// Look up one derived customer by exact email.
    pub async fn get(&self, email: &Email) -> Result<CustomerDetail, AppError> {
        let orders = bounded(
            self.query_timeout,
            "customer lookup",
            self.orders.list_settled_for_email(email),
        )
        .await?;

        let aggregate = aggregate_orders(orders)
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

        let segment = self.classify(&aggregate);
        let average_order_value =
            average_order_value(aggregate.total_spent, u64::from(aggregate.total_orders));

        Ok(CustomerDetail {
            aggregate,
            segment,
            average_order_value,
        })
    }

    /// Fleet-wide analytics over the full settled-order snapshot.
    pub async fn analytics(&self) -> Result<CustomerAnalytics, AppError> {
        let orders = bounded(
            self.query_timeout,
            "customer analytics",
            self.orders.list_settled(),
        )
        .await?;

        let now = Utc::now();
        let this_month = month_start(now);
        let last_month = previous_month_start(now);

        let mut total_revenue = Decimal::ZERO;
        let mut total_orders: u64 = 0;
        let mut new_this_month: u64 = 0;
        let mut new_last_month: u64 = 0;
        let mut by_segment = SegmentBreakdown::default();

        let aggregates = aggregate_orders(orders);
        for aggregate in &aggregates {
            total_revenue += aggregate.total_spent;
            total_orders += u64::from(aggregate.total_orders);
            if aggregate.first_order_date >= this_month {
                new_this_month += 1;
            } else if aggregate.first_order_date >= last_month {
                new_last_month += 1;
            }
            by_segment.record(self.classify(aggregate));
        }

        Ok(CustomerAnalytics {
            total_customers: aggregates.len() as u64,
            new_customers_this_month: new_this_month,
            new_customers_last_month: new_last_month,
            total_revenue,
            total_orders,
            average_order_value: average_order_value(total_revenue, total_orders),
            by_segment,
        })
    }

    /// Create a persisted customer record.
    pub async fn create_record(&self, new: NewCustomer) -> Result<Customer, AppError> {
        let customer = Customer {
            id: encore_core::CustomerId::generate(),
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            address: new.address,
            created_at: Utc::now(),
            deleted_at: None,
        };

        bounded(
            self.query_timeout,
            "customer create",
            self.customers.insert(customer),
        )
        .await
    }

    /// Partially update an active record. 404 when the id is unknown or
    /// the record is soft-deleted.
    pub async fn update_record(
        &self,
        id: encore_core::CustomerId,
        update: CustomerUpdate,
    ) -> Result<Customer, AppError> {
        bounded(
            self.query_timeout,
            "customer update",
            self.customers.update_active(id, update),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))
    }

    /// Soft-delete an active record. Idempotent only in the weak sense:
    /// the second delete of the same id is a 404.
    pub async fn delete_record(&self, id: encore_core::CustomerId) -> Result<(), AppError> {
        let deleted = bounded(
            self.query_timeout,
            "customer delete",
            self.customers.soft_delete(id, Utc::now()),
        )
        .await?;

        if deleted {
            Ok(())
        } else {
            Err(AppError::NotFound("Customer".to_string()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
    use encore_core::{OrderId, OrderStatus, PaymentStatus};

    use crate::db::InMemoryStore;
    use crate::models::{BuyerInfo, Order};

    fn order(
        email: Option<&str>,
        total: i64,
        payment_status: PaymentStatus,
        created_at: DateTime<Utc>,
    ) -> Order {
        Order {
            id: OrderId::generate(),
            order_number: format!("ENC-{}", created_at.timestamp()),
            buyer: BuyerInfo {
                name: "Alex Smith".to_string(),
                email: email.map(|e| Email::parse(e).unwrap()),
                phone: String::new(),
                address: None,
            },
            subtotal: Decimal::from(total),
            shipping_cost: Decimal::ZERO,
            total: Decimal::from(total),
            payment_status,
            status: OrderStatus::Confirmed,
            items: Vec::new(),
            created_at,
            completed_at: None,
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    fn directory(store: Arc<InMemoryStore>) -> CustomerDirectory {
        CustomerDirectory::new(
            store.clone(),
            store,
            SegmentRules::default(),
            Duration::from_secs(10),
        )
    }

    #[test]
    fn test_aggregation_groups_by_exact_email() {
        let orders = vec![
            order(Some("a@example.com"), 100, PaymentStatus::Succeeded, at(1, 9)),
            order(Some("A@example.com"), 100, PaymentStatus::Succeeded, at(2, 9)),
            order(Some("a@example.com"), 50, PaymentStatus::Completed, at(3, 9)),
        ];

        let aggregates = aggregate_orders(orders);
        assert_eq!(aggregates.len(), 2);

        let lower = aggregates
            .iter()
            .find(|a| a.email.as_str() == "a@example.com")
            .unwrap();
        assert_eq!(lower.total_orders, 2);
        assert_eq!(lower.total_spent, Decimal::from(150));
        assert_eq!(lower.first_order_date, at(1, 9));
        assert_eq!(lower.last_order_date, at(3, 9));
    }

    #[test]
    fn test_aggregation_excludes_unsettled_and_anonymous() {
        let orders = vec![
            order(Some("a@example.com"), 100, PaymentStatus::Pending, at(1, 9)),
            order(Some("a@example.com"), 100, PaymentStatus::Failed, at(2, 9)),
            order(Some("a@example.com"), 100, PaymentStatus::Refunded, at(3, 9)),
            order(None, 100, PaymentStatus::Succeeded, at(4, 9)),
        ];

        assert!(aggregate_orders(orders).is_empty());
    }

    #[test]
    fn test_aggregation_sorts_by_recency() {
        let orders = vec![
            order(Some("old@example.com"), 10, PaymentStatus::Succeeded, at(1, 9)),
            order(Some("new@example.com"), 10, PaymentStatus::Succeeded, at(5, 9)),
            order(Some("mid@example.com"), 10, PaymentStatus::Succeeded, at(3, 9)),
        ];

        let emails: Vec<String> = aggregate_orders(orders)
            .into_iter()
            .map(|a| a.email.to_string())
            .collect();
        assert_eq!(
            emails,
            ["new@example.com", "mid@example.com", "old@example.com"]
        );
    }

    #[test]
    fn test_member_orders_most_recent_first() {
        let orders = vec![
            order(Some("a@example.com"), 10, PaymentStatus::Succeeded, at(1, 9)),
            order(Some("a@example.com"), 20, PaymentStatus::Succeeded, at(8, 9)),
            order(Some("a@example.com"), 30, PaymentStatus::Succeeded, at(4, 9)),
        ];

        let aggregates = aggregate_orders(orders);
        let dates: Vec<DateTime<Utc>> =
            aggregates[0].orders.iter().map(|o| o.created_at).collect();
        assert_eq!(dates, [at(8, 9), at(4, 9), at(1, 9)]);
    }

    #[tokio::test]
    async fn test_list_paginates_filtered_set() {
        let store = Arc::new(InMemoryStore::new());
        for i in 0..25 {
            store.push_order(order(
                Some(&format!("buyer{i:02}@example.com")),
                10,
                PaymentStatus::Succeeded,
                at(1, 0) + ChronoDuration::hours(i64::from(i)),
            ));
        }

        let page = directory(store)
            .list(ListQuery {
                page: 2,
                limit: 10,
                ..ListQuery::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.customers.len(), 10);
        // Most recent first: page 2 holds items 11..=20 of 25.
        assert_eq!(
            page.customers[0].aggregate.email.as_str(),
            "buyer14@example.com"
        );
        assert_eq!(
            page.customers[9].aggregate.email.as_str(),
            "buyer05@example.com"
        );
    }

    #[tokio::test]
    async fn test_list_filters_compose_conjunctively() {
        let store = Arc::new(InMemoryStore::new());
        // VIP matching the search.
        let mut vip = order(
            Some("smith@example.com"),
            600,
            PaymentStatus::Succeeded,
            at(1, 9),
        );
        vip.buyer.name = "Jordan Smith".to_string();
        store.push_order(vip);
        // VIP not matching the search.
        let mut other_vip = order(
            Some("lee@example.com"),
            700,
            PaymentStatus::Succeeded,
            at(2, 9),
        );
        other_vip.buyer.name = "Casey Lee".to_string();
        store.push_order(other_vip);
        // Matching the search but not VIP.
        let mut new = order(
            Some("smithers@example.com"),
            20,
            PaymentStatus::Succeeded,
            at(3, 9),
        );
        new.buyer.name = "Waylon Smithers".to_string();
        store.push_order(new);

        let page = directory(store)
            .list(ListQuery {
                page: 1,
                limit: 10,
                search: Some("smith".to_string()),
                segment: Some(Segment::Vip),
            })
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(
            page.customers[0].aggregate.email.as_str(),
            "smith@example.com"
        );
    }

    #[tokio::test]
    async fn test_get_classifies_across_orders() {
        let store = Arc::new(InMemoryStore::new());
        let email = Email::parse("vip@example.com").unwrap();
        store.push_order(order(
            Some("vip@example.com"),
            300,
            PaymentStatus::Succeeded,
            at(1, 9),
        ));
        store.push_order(order(
            Some("vip@example.com"),
            250,
            PaymentStatus::Completed,
            at(2, 9),
        ));

        let detail = directory(store).get(&email).await.unwrap();
        assert_eq!(detail.segment, Segment::Vip);
        assert_eq!(detail.aggregate.total_spent, Decimal::from(550));
        assert_eq!(detail.average_order_value, Decimal::from(275));
    }

    #[tokio::test]
    async fn test_get_unknown_email_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let email = Email::parse("ghost@example.com").unwrap();

        let result = directory(store).get(&email).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_single_order_customer_is_new() {
        let store = Arc::new(InMemoryStore::new());
        store.push_order(order(
            Some("once@example.com"),
            10,
            PaymentStatus::Succeeded,
            at(1, 9),
        ));

        let email = Email::parse("once@example.com").unwrap();
        let detail = directory(store).get(&email).await.unwrap();
        assert_eq!(detail.segment, Segment::New);
    }

    #[tokio::test]
    async fn test_analytics_totals_and_breakdown() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        // One VIP established before this month, one brand-new customer now.
        store.push_order(order(
            Some("vip@example.com"),
            600,
            PaymentStatus::Succeeded,
            now - ChronoDuration::days(90),
        ));
        store.push_order(order(
            Some("fresh@example.com"),
            40,
            PaymentStatus::Succeeded,
            now,
        ));

        let analytics = directory(store).analytics().await.unwrap();
        assert_eq!(analytics.total_customers, 2);
        assert_eq!(analytics.new_customers_this_month, 1);
        assert_eq!(analytics.total_revenue, Decimal::from(640));
        assert_eq!(analytics.total_orders, 2);
        assert_eq!(analytics.average_order_value, Decimal::from(320));
        assert_eq!(analytics.by_segment.vip, 1);
        assert_eq!(analytics.by_segment.new, 1);
        assert_eq!(analytics.by_segment.loyal + analytics.by_segment.regular, 0);
    }

    #[tokio::test]
    async fn test_record_lifecycle() {
        let store = Arc::new(InMemoryStore::new());
        let directory = directory(store.clone());

        let created = directory
            .create_record(NewCustomer {
                first_name: "Robin".to_string(),
                last_name: "Nguyen".to_string(),
                email: Email::parse("robin@example.com").unwrap(),
                phone: "0400000000".to_string(),
                address: encore_core::Address::parse("1 Flinders St", "Melbourne", "VIC", "3000")
                    .unwrap(),
            })
            .await
            .unwrap();
        assert!(created.is_active());

        let updated = directory
            .update_record(
                created.id,
                CustomerUpdate {
                    phone: Some("0411111111".to_string()),
                    ..CustomerUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.phone, "0411111111");
        assert_eq!(updated.first_name, "Robin");

        directory.delete_record(created.id).await.unwrap();
        // A second delete and a post-delete update both miss.
        assert!(matches!(
            directory.delete_record(created.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            directory
                .update_record(created.id, CustomerUpdate::default())
                .await,
            Err(AppError::NotFound(_))
        ));
    }
}
