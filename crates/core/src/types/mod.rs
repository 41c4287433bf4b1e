//! Core types for Encore.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod email;
pub mod id;
pub mod money;
pub mod segment;
pub mod status;

pub use address::{Address, AddressError, PostalCode, StateCode};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{average_order_value, growth_percent, round2};
pub use segment::{Segment, SegmentRules};
pub use status::*;
