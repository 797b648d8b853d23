//! Schema-bound repository.
//!
//! A [`Repository`] binds one resolved [`TableSchema`] to a MySQL store and
//! runs the CRUD/search protocol against it. Every operation opens its own
//! connection through the [`Gateway`] and closes it before returning, so a
//! repository can be shared behind an `Arc` by any number of tasks.
//!
//! Identifiers are validated and quoted; every value travels as a statement
//! parameter.

mod typed;

pub use typed::TypedRepository;

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Conn, Row, TxOpts};
use tracing::{debug, info, warn};

use crate::core::schema::TableSchema;
use crate::core::traits::{Dialect, JsonRepository, Query, Statement};
use crate::core::value::{AttributeMap, Value};
use crate::drivers::mysql::row::{from_mysql, row_to_attributes, to_params};
use crate::drivers::mysql::{Gateway, MysqlDialect};
use crate::drivers::DialectImpl;
use crate::error::{RepoError, Result};
use crate::wire::{encode_rows, WireCodec};

/// CRUD/search protocol over one table.
#[derive(Debug, Clone)]
pub struct Repository {
    schema: TableSchema,
    dialect: DialectImpl,
    gateway: Gateway,
    codec: WireCodec,
}

impl Repository {
    /// Bind a schema to a store.
    ///
    /// The schema is validated and resolved (primary-key inference) here;
    /// the connection string is validated but no connection is opened.
    pub fn new(schema: TableSchema, connection_string: &str) -> Result<Self> {
        let schema = schema.resolve()?;
        let gateway = Gateway::new(connection_string)?;
        let codec = WireCodec::new(&schema)?;
        Ok(Self {
            schema,
            dialect: DialectImpl::Mysql(MysqlDialect::new()),
            gateway,
            codec,
        })
    }

    /// The resolved schema.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Replace the connection string; invalid strings are rejected.
    pub fn set_connection_string(&mut self, connection_string: &str) -> Result<()> {
        self.gateway.set_connection_string(connection_string)
    }

    /// The `CREATE TABLE` statement [`ensure_table`](Self::ensure_table) runs.
    pub fn create_table_sql(&self) -> Result<String> {
        self.dialect.create_table(&self.schema)
    }

    /// Wire codec for this schema.
    pub fn codec(&self) -> &WireCodec {
        &self.codec
    }

    // =========================================================================
    // Table provisioning
    // =========================================================================

    /// Create the table if it does not exist.
    ///
    /// An existing table is left untouched; a differing stored schema
    /// version is logged.
    pub async fn ensure_table(&self) -> Result<()> {
        let ddl = self.create_table_sql()?;
        let mut conn = self.gateway.connect("creating table").await?;
        let result = conn.query_drop(&ddl).await;
        Gateway::release(conn).await;
        result?;
        info!(
            "Ensured table {} (schema v{})",
            self.schema.name, self.schema.version
        );

        if let Some(stored) = self.stored_schema_version().await? {
            if stored != self.schema.version {
                warn!(
                    "Table {} was created with schema v{}, repository uses v{}",
                    self.schema.name, stored, self.schema.version
                );
            }
        }
        Ok(())
    }

    /// Drop and recreate the table. Destroys all rows.
    pub async fn reset_table(&self) -> Result<()> {
        let drop = self.dialect.drop_table(&self.schema.name)?;
        let ddl = self.create_table_sql()?;

        let mut conn = self.gateway.connect("resetting table").await?;
        let result = async {
            conn.query_drop(&drop).await?;
            conn.query_drop(&ddl).await
        }
        .await;
        Gateway::release(conn).await;
        result?;

        warn!(
            "Reset table {} (schema v{}), existing rows dropped",
            self.schema.name, self.schema.version
        );
        Ok(())
    }

    /// Whether the table exists in the connection's database.
    pub async fn table_exists(&self) -> Result<bool> {
        let stmt = self.dialect.table_exists(&self.schema.name);
        Ok(self
            .first_value(&stmt, "checking table existence")
            .await?
            .is_some())
    }

    /// Schema version recorded when the table was created.
    ///
    /// `None` when the table does not exist or was not created by this
    /// engine.
    pub async fn stored_schema_version(&self) -> Result<Option<u32>> {
        let stmt = self.dialect.table_comment(&self.schema.name);
        let comment = self.first_value(&stmt, "reading table comment").await?;
        Ok(comment
            .as_ref()
            .and_then(Value::as_str)
            .and_then(MysqlDialect::parse_version_comment))
    }

    // =========================================================================
    // CRUD/search protocol
    // =========================================================================

    /// Insert rows in one transaction.
    ///
    /// Commits only if the summed affected-row count equals the number of
    /// rows; otherwise rolls back and returns `false`. Store errors roll
    /// back and are returned.
    pub async fn add(&self, rows: &[AttributeMap]) -> Result<bool> {
        if rows.is_empty() {
            return Ok(true);
        }
        let statements = rows
            .iter()
            .map(|row| self.dialect.insert(&self.schema, row))
            .collect::<Result<Vec<_>>>()?;

        let mut conn = self.gateway.connect("adding rows").await?;
        let result = self.insert_all(&mut conn, &statements).await;
        Gateway::release(conn).await;
        result
    }

    async fn insert_all(&self, conn: &mut Conn, statements: &[Statement]) -> Result<bool> {
        let mut tx = conn.start_transaction(TxOpts::default()).await?;

        let mut affected = 0u64;
        for stmt in statements {
            debug!("{}: {}", self.schema.name, stmt.sql);
            if let Err(e) = tx.exec_drop(stmt.sql.as_str(), to_params(&stmt.params)).await {
                if let Err(rollback) = tx.rollback().await {
                    warn!("Rollback on {} failed: {}", self.schema.name, rollback);
                }
                return Err(e.into());
            }
            affected += tx.affected_rows();
        }

        let expected = statements.len() as u64;
        if affected != expected {
            warn!(
                "Insert into {} affected {} rows, expected {}; rolling back",
                self.schema.name, affected, expected
            );
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        debug!("Added {} rows to {}", expected, self.schema.name);
        Ok(true)
    }

    /// Rows whose primary key is one of `ids`.
    pub async fn read(&self, ids: &[Value]) -> Result<Vec<AttributeMap>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let stmt = self.dialect.select_by_keys(&self.schema, ids)?;
        self.query_rows(&stmt, "reading rows").await
    }

    /// Set the given columns on the row with key `id`.
    ///
    /// The key, auto-increment columns and nulls for NOT NULL columns are
    /// skipped. Returns `false` when nothing is settable or no row matched.
    pub async fn update(&self, id: &Value, attrs: &AttributeMap) -> Result<bool> {
        let Some(stmt) = self.dialect.update_by_key(&self.schema, id, attrs)? else {
            debug!("Update on {} has no settable columns", self.schema.name);
            return Ok(false);
        };
        let affected = self.execute(&stmt, "updating row").await?;
        Ok(affected == 1)
    }

    /// Delete the rows whose key is one of `ids`.
    ///
    /// Succeeds iff the number of deleted rows equals the number of ids
    /// given; a repeated id deletes once and makes the call return `false`.
    pub async fn delete(&self, ids: &[Value]) -> Result<bool> {
        if ids.is_empty() {
            return Ok(true);
        }
        let stmt = self.dialect.delete_by_keys(&self.schema, ids)?;
        let affected = self.execute(&stmt, "deleting rows").await?;
        if affected != ids.len() as u64 {
            debug!(
                "Delete on {} removed {} rows for {} ids",
                self.schema.name,
                affected,
                ids.len()
            );
            return Ok(false);
        }
        Ok(true)
    }

    /// Rows where `column = value`.
    ///
    /// `column` must be a valid identifier; a column the table lacks is
    /// reported by the store.
    pub async fn search(&self, column: &str, value: impl Into<Value>) -> Result<Vec<AttributeMap>> {
        self.find(&Query::new().eq(column, value)).await
    }

    /// Rows matching every filter of `query`.
    pub async fn find(&self, query: &Query) -> Result<Vec<AttributeMap>> {
        let stmt = self.dialect.select_where(&self.schema, query)?;
        self.query_rows(&stmt, "searching rows").await
    }

    /// Run arbitrary SQL and return the first column of the first row.
    ///
    /// Statements without a result set return an empty string. The text is
    /// sent as is: this is an escape hatch for trusted callers.
    pub async fn execute_raw(&self, sql: &str) -> Result<String> {
        if sql.trim().is_empty() {
            return Err(RepoError::Config("Empty SQL statement".into()));
        }
        let mut conn = self.gateway.connect("executing raw statement").await?;
        debug!("Raw statement on {}: {}", self.schema.name, sql);
        let result: std::result::Result<Option<Row>, _> = conn.query_first(sql).await;
        Gateway::release(conn).await;

        Ok(result?
            .and_then(|row| row.as_ref(0).map(from_mysql))
            .map(|v| v.to_string())
            .unwrap_or_default())
    }

    // =========================================================================
    // JSON wire variants
    // =========================================================================

    /// [`add`](Self::add) for JSON objects.
    pub async fn add_json<S: AsRef<str>>(&self, rows: &[S]) -> Result<bool> {
        let rows = self.codec.decode_rows(&self.schema, rows)?;
        self.add(&rows).await
    }

    /// [`read`](Self::read) returning one JSON object per row.
    pub async fn read_json(&self, ids: &[Value]) -> Result<Vec<String>> {
        encode_rows(&self.read(ids).await?)
    }

    /// [`update`](Self::update) from a JSON object.
    pub async fn update_json(&self, id: &Value, json: &str) -> Result<bool> {
        let attrs = self.codec.decode_row(&self.schema, json)?;
        self.update(id, &attrs).await
    }

    /// [`search`](Self::search) returning one JSON object per row.
    pub async fn search_json(&self, column: &str, value: impl Into<Value>) -> Result<Vec<String>> {
        encode_rows(&self.search(column, value).await?)
    }

    /// [`find`](Self::find) returning one JSON object per row.
    pub async fn find_json(&self, query: &Query) -> Result<Vec<String>> {
        encode_rows(&self.find(query).await?)
    }

    // =========================================================================
    // Statement execution
    // =========================================================================

    async fn query_rows(&self, stmt: &Statement, context: &str) -> Result<Vec<AttributeMap>> {
        let mut conn = self.gateway.connect(context).await?;
        debug!("{}: {}", self.schema.name, stmt.sql);
        let result: std::result::Result<Vec<Row>, _> =
            conn.exec(stmt.sql.as_str(), to_params(&stmt.params)).await;
        Gateway::release(conn).await;

        Ok(result?
            .iter()
            .map(|row| row_to_attributes(row, &self.schema))
            .collect())
    }

    async fn execute(&self, stmt: &Statement, context: &str) -> Result<u64> {
        let mut conn = self.gateway.connect(context).await?;
        debug!("{}: {}", self.schema.name, stmt.sql);
        let result = conn
            .exec_drop(stmt.sql.as_str(), to_params(&stmt.params))
            .await
            .map(|_| conn.affected_rows());
        Gateway::release(conn).await;
        Ok(result?)
    }

    async fn first_value(&self, stmt: &Statement, context: &str) -> Result<Option<Value>> {
        let mut conn = self.gateway.connect(context).await?;
        let result: std::result::Result<Option<Row>, _> = conn
            .exec_first(stmt.sql.as_str(), to_params(&stmt.params))
            .await;
        Gateway::release(conn).await;

        Ok(result?.map(|row| row.as_ref(0).map(from_mysql).unwrap_or_default()))
    }
}

#[async_trait]
impl JsonRepository for Repository {
    fn table_name(&self) -> &str {
        &self.schema.name
    }

    async fn ensure_table(&self) -> Result<()> {
        Repository::ensure_table(self).await
    }

    async fn reset_table(&self) -> Result<()> {
        Repository::reset_table(self).await
    }

    async fn table_exists(&self) -> Result<bool> {
        Repository::table_exists(self).await
    }

    async fn add_json(&self, rows: &[String]) -> Result<bool> {
        Repository::add_json(self, rows).await
    }

    async fn read_json(&self, ids: &[Value]) -> Result<Vec<String>> {
        Repository::read_json(self, ids).await
    }

    async fn update_json(&self, id: &Value, json: &str) -> Result<bool> {
        Repository::update_json(self, id, json).await
    }

    async fn delete(&self, ids: &[Value]) -> Result<bool> {
        Repository::delete(self, ids).await
    }

    async fn search_json(&self, column: &str, value: Value) -> Result<Vec<String>> {
        Repository::search_json(self, column, value).await
    }

    async fn execute_raw(&self, sql: &str) -> Result<String> {
        Repository::execute_raw(self, sql).await
    }
}
