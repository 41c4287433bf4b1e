//! Encore admin API library.
//!
//! Administrative backend for the Encore ticketing platform: customer
//! aggregation and segmentation derived from settled orders, dashboard
//! statistics, business insights, and stock management.
//!
//! The binary in `main.rs` wires this up against `PostgreSQL`; tests drive
//! the same router against an in-memory store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
