//! MySQL SQL dialect (Strategy pattern).
//!
//! Provides MySQL-specific DDL synthesis, identifier quoting and
//! parameterized row statements.

use crate::core::identifier::{escape_literal, quote_mysql};
use crate::core::schema::{ColumnDescriptor, LogicalType, TableSchema};
use crate::core::traits::{Dialect, Query, SortOrder, Statement};
use crate::core::value::{AttributeMap, Value};
use crate::error::{RepoError, Result};
use crate::marshal::coerce::coerce_to_column;
use crate::typemap::to_sql_type;

/// Prefix of the table comment carrying the schema version.
pub const SCHEMA_VERSION_PREFIX: &str = "schema v";

/// MySQL dialect implementation.
///
/// Compatible with MySQL 5.7+ and 8.0+.
#[derive(Debug, Clone, Default)]
pub struct MysqlDialect;

impl MysqlDialect {
    pub fn new() -> Self {
        Self
    }

    /// Render one column line of `CREATE TABLE`.
    pub fn column_definition(&self, col: &ColumnDescriptor) -> Result<String> {
        let mut def = format!("{} {}", self.quote_ident(&col.name)?, to_sql_type(col));

        def.push_str(if col.is_nullable { " NULL" } else { " NOT NULL" });

        if col.is_generated() {
            def.push_str(" AUTO_INCREMENT");
        }

        if let Some(default) = col.default_value.as_deref().filter(|d| !d.trim().is_empty()) {
            def.push_str(&default_clause(col.logical_type, default));
        }

        if let Some(comment) = col.comment.as_deref().filter(|c| !c.is_empty()) {
            def.push_str(&format!(" COMMENT '{}'", escape_literal(comment)));
        }

        Ok(def)
    }

    /// Parse the schema version out of a table comment.
    pub fn parse_version_comment(comment: &str) -> Option<u32> {
        comment
            .trim()
            .strip_prefix(SCHEMA_VERSION_PREFIX)
            .and_then(|v| v.trim().parse().ok())
    }

    fn bind(schema: &TableSchema, column: &str, value: &Value) -> Value {
        match schema.column(column) {
            Some(col) => coerce_to_column(col.logical_type, value),
            None => value.clone(),
        }
    }

    fn key_list(&self, schema: &TableSchema, keys: &[Value]) -> Result<(String, Vec<Value>)> {
        let key = schema.key_column()?;
        if keys.is_empty() {
            return Err(RepoError::Config(format!(
                "No key values given for table {}",
                schema.name
            )));
        }
        let placeholders = vec!["?"; keys.len()].join(", ");
        let params = keys
            .iter()
            .map(|k| coerce_to_column(key.logical_type, k))
            .collect();
        Ok((
            format!("{} IN ({})", self.quote_ident(&key.name)?, placeholders),
            params,
        ))
    }

    fn check_columns(schema: &TableSchema, attrs: &AttributeMap) -> Result<()> {
        match attrs.keys().find(|k| schema.column(k).is_none()) {
            Some(unknown) => Err(RepoError::unknown_column(&schema.name, unknown)),
            None => Ok(()),
        }
    }
}

/// `DEFAULT` clause, splitting `X ON UPDATE Y` for timestamp columns.
fn default_clause(logical_type: LogicalType, default: &str) -> String {
    const ON_UPDATE: &str = " on update ";

    let default = default.trim();
    if logical_type == LogicalType::DateTime {
        if let Some(pos) = default.to_ascii_lowercase().find(ON_UPDATE) {
            let initial = default[..pos].trim();
            let on_update = default[pos + ON_UPDATE.len()..].trim();
            if !initial.is_empty() && !on_update.is_empty() {
                return format!(" DEFAULT {} ON UPDATE {}", initial, on_update);
            }
        }
    }
    format!(" DEFAULT {}", default)
}

impl Dialect for MysqlDialect {
    fn name(&self) -> &str {
        "mysql"
    }

    fn quote_ident(&self, name: &str) -> Result<String> {
        quote_mysql(name)
    }

    fn create_table(&self, schema: &TableSchema) -> Result<String> {
        let table = self.quote_ident(&schema.name)?;

        let mut lines = Vec::with_capacity(schema.columns.len() + 1);
        for col in &schema.columns {
            lines.push(format!("    {}", self.column_definition(col)?));
        }

        let pk = schema
            .primary_key()
            .iter()
            .map(|c| self.quote_ident(&c.name))
            .collect::<Result<Vec<_>>>()?;
        if !pk.is_empty() {
            lines.push(format!("    PRIMARY KEY ({})", pk.join(", ")));
        }

        for (index, col) in schema.secondary_indexes() {
            let kind = if col.is_unique { "UNIQUE KEY" } else { "KEY" };
            lines.push(format!(
                "    {} {} ({})",
                kind,
                self.quote_ident(&index)?,
                self.quote_ident(&col.name)?
            ));
        }

        Ok(format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n) CHARACTER SET utf8mb4 COMMENT='{}{}';",
            table,
            lines.join(",\n"),
            SCHEMA_VERSION_PREFIX,
            schema.version
        ))
    }

    fn drop_table(&self, table: &str) -> Result<String> {
        Ok(format!("DROP TABLE IF EXISTS {};", self.quote_ident(table)?))
    }

    fn table_exists(&self, table: &str) -> Statement {
        Statement::new(
            "SELECT 1 FROM INFORMATION_SCHEMA.TABLES \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? LIMIT 1",
            vec![Value::from(table)],
        )
    }

    fn table_comment(&self, table: &str) -> Statement {
        Statement::new(
            "SELECT TABLE_COMMENT FROM INFORMATION_SCHEMA.TABLES \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? LIMIT 1",
            vec![Value::from(table)],
        )
    }

    fn insert(&self, schema: &TableSchema, row: &AttributeMap) -> Result<Statement> {
        Self::check_columns(schema, row)?;

        let mut columns = Vec::new();
        let mut params = Vec::new();
        for col in schema.columns.iter().filter(|c| !c.is_generated()) {
            if let Some(value) = row.get(&col.name) {
                columns.push(self.quote_ident(&col.name)?);
                params.push(coerce_to_column(col.logical_type, value));
            }
        }

        let placeholders = vec!["?"; columns.len()].join(", ");
        Ok(Statement::new(
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.quote_ident(&schema.name)?,
                columns.join(", "),
                placeholders
            ),
            params,
        ))
    }

    fn select_by_keys(&self, schema: &TableSchema, keys: &[Value]) -> Result<Statement> {
        let (condition, params) = self.key_list(schema, keys)?;
        Ok(Statement::new(
            format!(
                "SELECT * FROM {} WHERE {}",
                self.quote_ident(&schema.name)?,
                condition
            ),
            params,
        ))
    }

    fn update_by_key(
        &self,
        schema: &TableSchema,
        key: &Value,
        attrs: &AttributeMap,
    ) -> Result<Option<Statement>> {
        Self::check_columns(schema, attrs)?;
        let key_col = schema.key_column()?;

        let mut assignments = Vec::new();
        let mut params = Vec::new();
        for col in &schema.columns {
            if col.is_primary_key || col.is_generated() {
                continue;
            }
            let Some(value) = attrs.get(&col.name) else {
                continue;
            };
            // A null for a NOT NULL column means "leave unchanged"
            if value.is_null() && !col.is_nullable {
                continue;
            }
            assignments.push(format!("{} = ?", self.quote_ident(&col.name)?));
            params.push(coerce_to_column(col.logical_type, value));
        }

        if assignments.is_empty() {
            return Ok(None);
        }

        params.push(coerce_to_column(key_col.logical_type, key));
        Ok(Some(Statement::new(
            format!(
                "UPDATE {} SET {} WHERE {} = ?",
                self.quote_ident(&schema.name)?,
                assignments.join(", "),
                self.quote_ident(&key_col.name)?
            ),
            params,
        )))
    }

    fn delete_by_keys(&self, schema: &TableSchema, keys: &[Value]) -> Result<Statement> {
        let (condition, params) = self.key_list(schema, keys)?;
        Ok(Statement::new(
            format!(
                "DELETE FROM {} WHERE {}",
                self.quote_ident(&schema.name)?,
                condition
            ),
            params,
        ))
    }

    fn select_where(&self, schema: &TableSchema, query: &Query) -> Result<Statement> {
        let mut sql = format!("SELECT * FROM {}", self.quote_ident(&schema.name)?);

        let mut conditions = Vec::with_capacity(query.filters.len());
        let mut params = Vec::with_capacity(query.filters.len());
        for filter in &query.filters {
            conditions.push(format!(
                "{} {} ?",
                self.quote_ident(&filter.column)?,
                filter.comparison.operator()
            ));
            params.push(Self::bind(schema, &filter.column, &filter.value));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if let Some((column, order)) = &query.order_by {
            let direction = match order {
                SortOrder::Ascending => "ASC",
                SortOrder::Descending => "DESC",
            };
            sql.push_str(&format!(
                " ORDER BY {} {}",
                self.quote_ident(column)?,
                direction
            ));
        }

        Ok(Statement::new(sql, params))
    }
}
