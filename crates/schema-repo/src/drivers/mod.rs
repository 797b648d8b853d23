//! Database driver implementations.
//!
//! - [`mysql`]: MySQL dialect, connection gateway and value conversions
//!
//! # Architecture
//!
//! Each driver module implements [`Dialect`] for its SQL syntax and owns the
//! connection handling for its engine. [`DialectImpl`] gives static dispatch
//! over the available dialects, selected by name.

pub mod mysql;

pub use mysql::{Gateway, MysqlDialect};

use crate::core::schema::TableSchema;
use crate::core::traits::{Dialect, Query, Statement};
use crate::core::value::{AttributeMap, Value};
use crate::error::{RepoError, Result};

/// Enum-based static dispatch for dialects.
#[derive(Debug, Clone)]
pub enum DialectImpl {
    Mysql(MysqlDialect),
}

impl Dialect for DialectImpl {
    fn name(&self) -> &str {
        match self {
            DialectImpl::Mysql(d) => d.name(),
        }
    }

    fn quote_ident(&self, name: &str) -> Result<String> {
        match self {
            DialectImpl::Mysql(d) => d.quote_ident(name),
        }
    }

    fn create_table(&self, schema: &TableSchema) -> Result<String> {
        match self {
            DialectImpl::Mysql(d) => d.create_table(schema),
        }
    }

    fn drop_table(&self, table: &str) -> Result<String> {
        match self {
            DialectImpl::Mysql(d) => d.drop_table(table),
        }
    }

    fn table_exists(&self, table: &str) -> Statement {
        match self {
            DialectImpl::Mysql(d) => d.table_exists(table),
        }
    }

    fn table_comment(&self, table: &str) -> Statement {
        match self {
            DialectImpl::Mysql(d) => d.table_comment(table),
        }
    }

    fn insert(&self, schema: &TableSchema, row: &AttributeMap) -> Result<Statement> {
        match self {
            DialectImpl::Mysql(d) => d.insert(schema, row),
        }
    }

    fn select_by_keys(&self, schema: &TableSchema, keys: &[Value]) -> Result<Statement> {
        match self {
            DialectImpl::Mysql(d) => d.select_by_keys(schema, keys),
        }
    }

    fn update_by_key(
        &self,
        schema: &TableSchema,
        key: &Value,
        attrs: &AttributeMap,
    ) -> Result<Option<Statement>> {
        match self {
            DialectImpl::Mysql(d) => d.update_by_key(schema, key, attrs),
        }
    }

    fn delete_by_keys(&self, schema: &TableSchema, keys: &[Value]) -> Result<Statement> {
        match self {
            DialectImpl::Mysql(d) => d.delete_by_keys(schema, keys),
        }
    }

    fn select_where(&self, schema: &TableSchema, query: &Query) -> Result<Statement> {
        match self {
            DialectImpl::Mysql(d) => d.select_where(schema, query),
        }
    }
}

impl DialectImpl {
    /// Create a dialect implementation from a database type string.
    ///
    /// # Errors
    ///
    /// Returns an error if the database type is not recognized.
    pub fn from_db_type(db_type: &str) -> Result<Self> {
        match db_type.to_lowercase().as_str() {
            "mysql" => Ok(DialectImpl::Mysql(MysqlDialect::new())),
            other => Err(RepoError::Config(format!(
                "Unknown database type: '{}'. Supported types: mysql",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_impl_from_db_type() {
        let mysql = DialectImpl::from_db_type("MySQL").unwrap();
        assert_eq!(mysql.name(), "mysql");
        assert!(DialectImpl::from_db_type("postgres").is_err());
    }

    #[test]
    fn test_dialect_impl_dispatch() {
        let dialect = DialectImpl::Mysql(MysqlDialect::new());
        assert_eq!(dialect.quote_ident("table").unwrap(), "`table`");
        assert_eq!(
            dialect.drop_table("Notes").unwrap(),
            "DROP TABLE IF EXISTS `Notes`;"
        );
        assert!(dialect.quote_ident("bad name").is_err());
    }
}
