//! Shared application state.
//!
//! Cheap to clone: one `Arc` around the config and the services, handed to
//! every handler through axum's `State` extractor.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::db::{CustomerStore, OrderStore, PgCustomerStore, PgOrderStore, PgProductStore, ProductStore};
use crate::services::{CustomerDirectory, DashboardService, StockService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    customers: CustomerDirectory,
    dashboard: DashboardService,
    stock: StockService,
}

impl AppState {
    /// Build state over arbitrary stores. Tests use this with the
    /// in-memory store.
    #[must_use]
    pub fn new(
        config: AdminConfig,
        orders: Arc<dyn OrderStore>,
        customers: Arc<dyn CustomerStore>,
        products: Arc<dyn ProductStore>,
    ) -> Self {
        let customers_service = CustomerDirectory::new(
            Arc::clone(&orders),
            Arc::clone(&customers),
            config.segment_rules.clone(),
            config.query_timeout,
        );
        let dashboard = DashboardService::new(
            Arc::clone(&orders),
            customers,
            Arc::clone(&products),
            config.segment_rules.clone(),
            config.low_stock_threshold,
            config.query_timeout,
        );
        let stock = StockService::new(products, config.query_timeout);

        Self {
            inner: Arc::new(Inner {
                customers: customers_service,
                dashboard,
                stock,
            }),
        }
    }

    /// Build state over `PostgreSQL` stores sharing one pool.
    #[must_use]
    pub fn with_postgres(config: AdminConfig, pool: PgPool) -> Self {
        Self::new(
            config,
            Arc::new(PgOrderStore::new(pool.clone())),
            Arc::new(PgCustomerStore::new(pool.clone())),
            Arc::new(PgProductStore::new(pool)),
        )
    }

    /// Customer directory service.
    #[must_use]
    pub fn customers(&self) -> &CustomerDirectory {
        &self.inner.customers
    }

    /// Dashboard service.
    #[must_use]
    pub fn dashboard(&self) -> &DashboardService {
        &self.inner.dashboard
    }

    /// Stock service.
    #[must_use]
    pub fn stock(&self) -> &StockService {
        &self.inner.stock
    }
}
