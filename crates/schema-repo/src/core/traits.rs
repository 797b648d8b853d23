//! Statement building abstractions.
//!
//! - [`Dialect`]: SQL syntax strategy, turning schemas and attribute maps
//!   into parameterized [`Statement`]s
//! - [`Query`]: filter/order options for multi-condition selects
//! - [`JsonRepository`]: the row protocol on the JSON wire format
//!
//! Dialects never touch a connection; everything they produce can be
//! inspected in unit tests.

use async_trait::async_trait;

use crate::error::Result;

use super::schema::TableSchema;
use super::value::{AttributeMap, Value};

/// SQL text plus positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Statement without parameters.
    pub fn text(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }
}

/// Comparison used by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    AtLeast,
    AtMost,
}

impl Comparison {
    pub fn operator(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::AtLeast => ">=",
            Comparison::AtMost => "<=",
        }
    }
}

/// Single-column condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub comparison: Comparison,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Conjunction of filters with optional ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, SortOrder)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, Comparison::Eq, value)
    }

    pub fn at_least(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, Comparison::AtLeast, value)
    }

    pub fn at_most(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, Comparison::AtMost, value)
    }

    pub fn order_by(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.order_by = Some((column.into(), order));
        self
    }

    fn filter(
        mut self,
        column: impl Into<String>,
        comparison: Comparison,
        value: impl Into<Value>,
    ) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            comparison,
            value: value.into(),
        });
        self
    }
}

/// SQL syntax strategy for one database engine.
///
/// Identifiers are validated and quoted by the dialect; values always travel
/// as statement parameters.
pub trait Dialect: Send + Sync {
    /// Dialect name (e.g. "mysql").
    fn name(&self) -> &str;

    /// Validate and quote an identifier.
    fn quote_ident(&self, name: &str) -> Result<String>;

    /// `CREATE TABLE IF NOT EXISTS` for a resolved schema.
    fn create_table(&self, schema: &TableSchema) -> Result<String>;

    /// `DROP TABLE IF EXISTS`.
    fn drop_table(&self, table: &str) -> Result<String>;

    /// Existence probe scoped to the current database.
    fn table_exists(&self, table: &str) -> Statement;

    /// Lookup of the table comment carrying the schema version.
    fn table_comment(&self, table: &str) -> Statement;

    /// `INSERT` of one row.
    fn insert(&self, schema: &TableSchema, row: &AttributeMap) -> Result<Statement>;

    /// `SELECT *` for a set of key values.
    fn select_by_keys(&self, schema: &TableSchema, keys: &[Value]) -> Result<Statement>;

    /// `UPDATE` of one row by key; `None` when nothing is settable.
    fn update_by_key(
        &self,
        schema: &TableSchema,
        key: &Value,
        attrs: &AttributeMap,
    ) -> Result<Option<Statement>>;

    /// `DELETE` for a set of key values.
    fn delete_by_keys(&self, schema: &TableSchema, keys: &[Value]) -> Result<Statement>;

    /// `SELECT *` with a conjunction of filters.
    ///
    /// Column names are validated as identifiers but not checked against the
    /// schema; the store reports unknown columns.
    fn select_where(&self, schema: &TableSchema, query: &Query) -> Result<Statement>;
}

/// Row protocol over one table, exchanging rows as JSON objects.
///
/// Each call acquires and releases its own connection.
#[async_trait]
pub trait JsonRepository: Send + Sync {
    /// Name of the bound table.
    fn table_name(&self) -> &str;

    async fn ensure_table(&self) -> Result<()>;

    async fn reset_table(&self) -> Result<()>;

    async fn table_exists(&self) -> Result<bool>;

    /// Insert all rows atomically; `false` on an affected-row mismatch.
    async fn add_json(&self, rows: &[String]) -> Result<bool>;

    async fn read_json(&self, ids: &[Value]) -> Result<Vec<String>>;

    async fn update_json(&self, id: &Value, json: &str) -> Result<bool>;

    async fn delete(&self, ids: &[Value]) -> Result<bool>;

    async fn search_json(&self, column: &str, value: Value) -> Result<Vec<String>>;

    /// First column of the first row as text, or an empty string.
    async fn execute_raw(&self, sql: &str) -> Result<String>;
}
