//! Customer DB Library
//!
//! Data-access layer for the OpenCart customer table over MySQL: create,
//! read by id or email, update, update status and delete.

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::{ConnectionArgs, PoolOptions};
pub use db::CustomerStore;
pub use error::{DbError, DbResult};
pub use models::{CustomerColumn, CustomerFields, CustomerId, CustomerRecord, NewCustomer};
