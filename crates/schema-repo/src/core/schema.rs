//! Column and table schema types.
//!
//! A [`TableSchema`] is the declarative description a repository is built
//! from. It is validated and resolved (primary-key inference) once, when the
//! repository is constructed, and is immutable afterwards.

use serde::{Deserialize, Serialize};

use crate::core::identifier::{index_name, validate_identifier};
use crate::error::{RepoError, Result};

/// Name of the surrogate key prepended to schemas without any key candidate.
pub const SURROGATE_KEY_COLUMN: &str = "Id";

/// Column name promoted to primary key when no column is flagged primary.
pub const UUID_KEY_COLUMN: &str = "UUID";

/// Prefix of `UNIQUE KEY` names.
pub const UNIQUE_KEY_PREFIX: &str = "UK";

/// Prefix of plain `KEY` names.
pub const INDEX_PREFIX: &str = "IDX";

/// Logical column type, independent of the SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalType {
    String,
    Int32,
    Int64,
    Boolean,
    DateTime,
    Decimal,
    Guid,
    Text,
    Json,
}

impl LogicalType {
    /// Numeric types are the only ones allowed to carry `AUTO_INCREMENT`.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            LogicalType::Int32 | LogicalType::Int64 | LogicalType::Decimal
        )
    }

    /// Types whose values travel as text.
    pub fn is_textual(self) -> bool {
        matches!(
            self,
            LogicalType::String | LogicalType::Guid | LogicalType::Text | LogicalType::Json
        )
    }
}

/// Definition of a single table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name, a plain SQL identifier.
    pub name: String,

    /// Logical type, mapped to SQL by [`crate::typemap::to_sql_type`].
    pub logical_type: LogicalType,

    /// Length for `String` columns (default 255).
    #[serde(default)]
    pub length: Option<u32>,

    #[serde(default)]
    pub is_primary_key: bool,

    #[serde(default = "default_true")]
    pub is_nullable: bool,

    #[serde(default)]
    pub auto_increment: bool,

    /// Raw SQL literal, emitted verbatim after `DEFAULT`.
    #[serde(default)]
    pub default_value: Option<String>,

    #[serde(default)]
    pub is_unique: bool,

    #[serde(default)]
    pub is_indexed: bool,

    #[serde(default)]
    pub comment: Option<String>,
}

impl ColumnDescriptor {
    /// Create a nullable column with no constraints.
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical_type,
            length: None,
            is_primary_key: false,
            is_nullable: true,
            auto_increment: false,
            default_value: None,
            is_unique: false,
            is_indexed: false,
            comment: None,
        }
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Flag as primary key. Primary keys are never nullable.
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.is_nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn default_value(mut self, literal: impl Into<String>) -> Self {
        self.default_value = Some(literal.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.is_indexed = true;
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Whether the store generates this column's value on insert.
    pub fn is_generated(&self) -> bool {
        self.auto_increment && self.is_primary_key && self.logical_type.is_numeric()
    }
}

/// Ordered, versioned set of columns for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name.
    pub name: String,

    /// Schema version of this column set.
    ///
    /// Different revisions of the same record type are distinct versions,
    /// recorded in the table comment when the table is created.
    pub version: u32,

    /// Column definitions in DDL order.
    pub columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, version: u32, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            name: name.into(),
            version,
            columns,
        }
    }

    /// Check table and column names and reject empty or duplicated column sets.
    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.name)?;
        if self.columns.is_empty() {
            return Err(RepoError::EmptySchema(self.name.clone()));
        }

        for (i, col) in self.columns.iter().enumerate() {
            validate_identifier(&col.name)?;
            // MySQL column names are case-insensitive
            if self.columns[..i]
                .iter()
                .any(|c| c.name.eq_ignore_ascii_case(&col.name))
            {
                return Err(RepoError::Config(format!(
                    "Duplicate column {} in table {}",
                    col.name, self.name
                )));
            }
        }

        Ok(())
    }

    /// Validate and apply primary-key inference.
    ///
    /// - With any column flagged primary the schema is kept as is (primary
    ///   columns are forced non-nullable).
    /// - Otherwise a column named `UUID` (any case) becomes the key.
    /// - Otherwise an auto-increment `Id BIGINT` key is prepended.
    ///
    /// Resolving an already resolved schema returns it unchanged.
    pub fn resolve(&self) -> Result<TableSchema> {
        let resolved = self.infer_key()?;
        // Index names only exist once the key is known
        for (name, _) in resolved.secondary_indexes() {
            validate_identifier(&name)?;
        }
        Ok(resolved)
    }

    fn infer_key(&self) -> Result<TableSchema> {
        self.validate()?;

        let mut resolved = self.clone();
        if resolved.columns.iter().any(|c| c.is_primary_key) {
            for col in resolved.columns.iter_mut().filter(|c| c.is_primary_key) {
                col.is_nullable = false;
            }
            return Ok(resolved);
        }

        if let Some(uuid) = resolved
            .columns
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(UUID_KEY_COLUMN))
        {
            uuid.is_primary_key = true;
            uuid.is_nullable = false;
            return Ok(resolved);
        }

        if resolved.column_ignore_case(SURROGATE_KEY_COLUMN).is_some() {
            return Err(RepoError::Config(format!(
                "Table {} has no primary key and already uses the surrogate key name {}",
                self.name, SURROGATE_KEY_COLUMN
            )));
        }

        resolved.columns.insert(
            0,
            ColumnDescriptor::new(SURROGATE_KEY_COLUMN, LogicalType::Int64)
                .primary_key()
                .auto_increment(),
        );
        Ok(resolved)
    }

    /// Secondary indexes in DDL order, as `(index name, column)`.
    ///
    /// Key columns get none; `unique` wins over `indexed`.
    pub fn secondary_indexes(&self) -> Vec<(String, &ColumnDescriptor)> {
        self.columns
            .iter()
            .filter(|c| !c.is_primary_key)
            .filter_map(|c| {
                let prefix = if c.is_unique {
                    UNIQUE_KEY_PREFIX
                } else if c.is_indexed {
                    INDEX_PREFIX
                } else {
                    return None;
                };
                Some((index_name(prefix, &self.name, &c.name), c))
            })
            .collect()
    }

    /// Look up a column by exact name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn column_ignore_case(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Primary-key columns in DDL order.
    pub fn primary_key(&self) -> Vec<&ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_primary_key).collect()
    }

    /// The single key column used by read/update/delete.
    pub fn key_column(&self) -> Result<&ColumnDescriptor> {
        match self.primary_key().as_slice() {
            [key] => Ok(key),
            [] => Err(RepoError::Config(format!(
                "Table {} has no primary key - resolve the schema first",
                self.name
            ))),
            _ => Err(RepoError::CompositeKey(self.name.clone())),
        }
    }

    /// Column names in DDL order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

fn default_true() -> bool {
    true
}
