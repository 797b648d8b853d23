//! Core abstractions shared by every layer of the repository engine.
//!
//! - [`schema`]: column descriptors, logical types and table schemas
//! - [`identifier`]: identifier validation and quoting
//! - [`value`]: dynamically typed values and attribute maps
//! - [`traits`]: the [`Dialect`] strategy and statement/query types
//!
//! # Architecture
//!
//! The core module is database-agnostic. Driver modules (`drivers/mysql`)
//! implement [`Dialect`] and own the connection handling, so DDL and
//! statement generation can be tested without a server.

pub mod identifier;
pub mod schema;
pub mod traits;
pub mod value;

// Re-export commonly used types for convenience
pub use schema::{ColumnDescriptor, LogicalType, TableSchema};
pub use traits::{Comparison, Dialect, Filter, JsonRepository, Query, SortOrder, Statement};
pub use value::{AttributeMap, Value};
