//! Data models for the customer table.
//!
//! This module re-exports all model types used throughout the crate.

pub mod customer;
pub mod field;

// Re-export commonly used types
pub use customer::{CustomerColumn, CustomerFields, CustomerId, CustomerRecord, NewCustomer};
pub use field::{DATETIME_FORMAT, FieldValue};
