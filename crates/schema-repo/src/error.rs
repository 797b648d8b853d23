//! Error types for the repository engine.

use thiserror::Error;

/// Main error type for repository operations.
#[derive(Error, Debug)]
pub enum RepoError {
    /// Configuration or caller error (bad connection string, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Table or column name that is not a plain SQL identifier
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Schema without any column definitions
    #[error("Table {0} has no column definitions")]
    EmptySchema(String),

    /// Attribute that does not belong to the table schema
    #[error("Column {column} is not part of table {table}")]
    UnknownColumn { table: String, column: String },

    /// Key-based operation on a table with a composite primary key
    #[error("Table {0} has a composite primary key - key operations need a single key column")]
    CompositeKey(String),

    /// Record field table does not fit the table schema
    #[error("Record shape {record} does not match table {table}: {message}")]
    ShapeMismatch {
        record: String,
        table: String,
        message: String,
    },

    /// Connection could not be established
    #[error("Cannot establish connection: {message}\n  Context: {context}")]
    Connection { message: String, context: String },

    /// Statement failed inside the store (constraint violation, unknown column, bad SQL)
    #[error("Store error: {0}")]
    Store(#[from] mysql_async::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RepoError {
    /// Create a Connection error with context about where it occurred
    pub fn connection(message: impl ToString, context: impl Into<String>) -> Self {
        RepoError::Connection {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create an UnknownColumn error
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        RepoError::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Create a ShapeMismatch error
    pub fn shape_mismatch(
        record: impl Into<String>,
        table: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RepoError::ShapeMismatch {
            record: record.into(),
            table: table.into(),
            message: message.into(),
        }
    }

    /// Whether retrying the same call later can succeed.
    ///
    /// Only connection failures qualify; caller and store errors are final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RepoError::Connection { .. })
    }

    /// Server error code for store errors (e.g. 1054 for an unknown column).
    pub fn store_code(&self) -> Option<u16> {
        match self {
            RepoError::Store(mysql_async::Error::Server(e)) => Some(e.code),
            _ => None,
        }
    }

    /// Process exit code used by the command-line tool.
    pub fn exit_code(&self) -> u8 {
        match self {
            RepoError::Config(_)
            | RepoError::InvalidIdentifier(_)
            | RepoError::EmptySchema(_)
            | RepoError::UnknownColumn { .. }
            | RepoError::CompositeKey(_)
            | RepoError::ShapeMismatch { .. }
            | RepoError::Yaml(_) => 1,
            RepoError::Connection { .. } => 2,
            RepoError::Store(_) => 3,
            RepoError::Json(_) => 4,
            RepoError::Io(_) => 7,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, RepoError>;
