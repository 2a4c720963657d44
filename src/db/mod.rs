//! Database access layer.
//!
//! - Connection pool construction
//! - Parameter binding
//! - Statement text
//! - Row decoding
//! - The customer store itself

pub mod params;
pub mod pool;
pub mod statements;
pub mod store;
pub mod types;

pub use pool::{connect, server_version};
pub use store::CustomerStore;
pub use types::{RowToJson, row_to_record};
