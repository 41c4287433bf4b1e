//! Domain models for the admin backend.

pub mod customer;
pub mod order;
pub mod product;

pub use customer::{Customer, CustomerAggregate, CustomerUpdate, NewCustomer};
pub use order::{BuyerInfo, Order, OrderItem};
pub use product::Product;
