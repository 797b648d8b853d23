//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// MySQL store configuration.
    pub database: DatabaseConfig,

    /// Logging defaults for the command-line tool.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// MySQL store configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database host.
    pub host: String,

    /// Database port (default: 3306).
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Database (schema) name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password. Never written back out.
    #[serde(skip_serializing, default)]
    pub password: String,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Logging defaults, overridable from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Output format: "text" or "json" (default: "text").
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Level: error, warn, info, debug, trace (default: "info").
    #[serde(default = "default_verbosity")]
    pub verbosity: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            verbosity: default_verbosity(),
        }
    }
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_verbosity() -> String {
    "info".to_string()
}
