//! # schema-repo
//!
//! Schema-driven repositories over MySQL.
//!
//! A table is declared once as a [`TableSchema`]: ordered columns with a
//! logical type, nullability, defaults, keys and indexes. From that
//! declaration the library:
//!
//! - **Provisions** the table (`CREATE TABLE IF NOT EXISTS`, drop-and-recreate)
//! - **Runs CRUD/search** with every value bound as a statement parameter
//! - **Speaks JSON** with camelCase keys on the wire
//! - **Maps records** to and from attribute maps for typed access
//!
//! Built-in schemas for employees, activity logs and recommendations live in
//! [`schemas`]; [`SyncRepository`] and [`SyncTypedRepository`] wrap everything
//! for callers without an async runtime.
//!
//! ## Example
//!
//! ```rust,no_run
//! use schema_repo::{Config, Repository, RepositoryKind, Value};
//!
//! #[tokio::main]
//! async fn main() -> schema_repo::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let repo = Repository::new(
//!         RepositoryKind::Employees.schema(),
//!         &config.database.connection_string()?,
//!     )?;
//!     repo.ensure_table().await?;
//!     repo.add_json(&[r#"{"uuid":"u1","userId":"alice","name":"Alice","department":"Ops"}"#]).await?;
//!     for row in repo.read_json(&[Value::from("u1")]).await? {
//!         println!("{row}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod blocking;
pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod marshal;
pub mod repository;
pub mod schemas;
pub mod typemap;
pub mod wire;

// Re-exports for convenient access
pub use blocking::{SyncRepository, SyncTypedRepository};
pub use config::{Config, DatabaseConfig};
pub use crate::core::schema::{ColumnDescriptor, LogicalType, TableSchema};
pub use crate::core::traits::{JsonRepository, Query, SortOrder};
pub use crate::core::value::{AttributeMap, Value};
pub use error::{RepoError, Result};
pub use marshal::Record;
pub use repository::{Repository, TypedRepository};
pub use schemas::RepositoryKind;
