//! Encore Core - Shared types library.
//!
//! This crate provides common types used across all Encore components:
//! - `admin` - Administrative REST backend (customers, stock, dashboard)
//! - `integration-tests` - End-to-end API tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP handling. This keeps it lightweight and allows
//! it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, addresses, statuses,
//!   customer segments, and monetary rounding rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
