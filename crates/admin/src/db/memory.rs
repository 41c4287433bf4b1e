//! In-memory store implementing every repository trait.
//!
//! Used by unit and integration tests in place of `PostgreSQL`. Behavior
//! mirrors the `Pg*` stores: settled-only order reads, soft-delete
//! filtering, and most-recent-first ordering.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use encore_core::{CustomerId, Email, ProductId};

use super::{CustomerStore, OrderStore, ProductStore, RepositoryError};
use crate::models::{Customer, CustomerUpdate, Order, Product};

/// Shared in-memory backing store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    orders: RwLock<Vec<Order>>,
    customers: RwLock<HashMap<CustomerId, Customer>>,
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an order.
    pub fn push_order(&self, order: Order) {
        self.orders.write().expect("lock poisoned").push(order);
    }

    /// Seed a product.
    pub fn push_product(&self, product: Product) {
        self.products
            .write()
            .expect("lock poisoned")
            .insert(product.id, product);
    }

    fn settled_sorted(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|o| o.payment_status.is_settled())
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn list_settled(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.settled_sorted())
    }

    async fn list_settled_for_email(
        &self,
        email: &Email,
    ) -> Result<Vec<Order>, RepositoryError> {
        Ok(self
            .settled_sorted()
            .into_iter()
            .filter(|o| o.buyer.email.as_ref() == Some(email))
            .collect())
    }

    async fn list_settled_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepositoryError> {
        Ok(self
            .settled_sorted()
            .into_iter()
            .filter(|o| o.created_at >= start && o.created_at < end)
            .collect())
    }

    async fn recent_settled(&self, limit: u32) -> Result<Vec<Order>, RepositoryError> {
        Ok(self
            .settled_sorted()
            .into_iter()
            .take(limit as usize)
            .collect())
    }
}

#[async_trait]
impl CustomerStore for InMemoryStore {
    async fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        self.customers
            .write()
            .expect("lock poisoned")
            .insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn update_active(
        &self,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> Result<Option<Customer>, RepositoryError> {
        let mut customers = self.customers.write().expect("lock poisoned");
        let Some(customer) = customers.get_mut(&id).filter(|c| c.is_active()) else {
            return Ok(None);
        };

        if let Some(first_name) = update.first_name {
            customer.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            customer.last_name = last_name;
        }
        if let Some(email) = update.email {
            customer.email = email;
        }
        if let Some(phone) = update.phone {
            customer.phone = phone;
        }
        if let Some(address) = update.address {
            customer.address = address;
        }

        Ok(Some(customer.clone()))
    }

    async fn soft_delete(
        &self,
        id: CustomerId,
        deleted_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut customers = self.customers.write().expect("lock poisoned");
        match customers.get_mut(&id).filter(|c| c.is_active()) {
            Some(customer) => {
                customer.deleted_at = Some(deleted_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_active(&self) -> Result<u64, RepositoryError> {
        Ok(self
            .customers
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|c| c.is_active())
            .count() as u64)
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn list_active(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|p| p.is_active())
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn count_active(&self) -> Result<u64, RepositoryError> {
        Ok(self
            .products
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|p| p.is_active())
            .count() as u64)
    }

    async fn low_stock(
        &self,
        threshold: i64,
        limit: u32,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|p| p.is_active() && p.quantity > 0 && p.quantity < threshold)
            .cloned()
            .collect();
        products.sort_by_key(|p| p.quantity);
        products.truncate(limit as usize);
        Ok(products)
    }

    async fn set_quantity(
        &self,
        id: ProductId,
        quantity: i64,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut products = self.products.write().expect("lock poisoned");
        match products.get_mut(&id).filter(|p| p.is_active()) {
            Some(product) => {
                product.quantity = quantity;
                product.updated_at = updated_at;
                Ok(Some(product.clone()))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use encore_core::Address;

    fn customer(email: &str) -> Customer {
        Customer {
            id: CustomerId::generate(),
            first_name: "Robin".to_string(),
            last_name: "Nguyen".to_string(),
            email: Email::parse(email).unwrap(),
            phone: "0400000000".to_string(),
            address: Address::parse("1 Flinders St", "Melbourne", "VIC", "3000").unwrap(),
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_soft_delete_hides_record_from_reads() {
        let store = InMemoryStore::new();
        let record = store.insert(customer("robin@example.com")).await.unwrap();

        // count_active exists on both record traits; name the customer one.
        assert_eq!(CustomerStore::count_active(&store).await.unwrap(), 1);

        assert!(store.soft_delete(record.id, Utc::now()).await.unwrap());
        assert_eq!(CustomerStore::count_active(&store).await.unwrap(), 0);

        // The second delete finds nothing to mark.
        assert!(!store.soft_delete(record.id, Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_active_merges_partial_fields() {
        let store = InMemoryStore::new();
        let record = store.insert(customer("robin@example.com")).await.unwrap();

        let updated = store
            .update_active(
                record.id,
                CustomerUpdate {
                    phone: Some("0411111111".to_string()),
                    ..CustomerUpdate::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.phone, "0411111111");
        assert_eq!(updated.first_name, "Robin");
        assert_eq!(updated.email.as_str(), "robin@example.com");
    }
}
