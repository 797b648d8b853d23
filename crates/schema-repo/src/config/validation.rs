//! Configuration validation.

use super::Config;
use crate::error::{RepoError, Result};

const LOG_FORMATS: &[&str] = &["text", "json"];
const LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let db = &config.database;
    if db.host.is_empty() {
        return Err(RepoError::Config("database.host is required".into()));
    }
    if db.database.is_empty() {
        return Err(RepoError::Config("database.database is required".into()));
    }
    if db.user.is_empty() {
        return Err(RepoError::Config("database.user is required".into()));
    }
    if db.password.is_empty() {
        return Err(RepoError::Config("database.password is required".into()));
    }
    if db.port == 0 {
        return Err(RepoError::Config("database.port must be at least 1".into()));
    }

    let format = config.logging.format.to_lowercase();
    if !LOG_FORMATS.contains(&format.as_str()) {
        return Err(RepoError::Config(format!(
            "logging.format must be 'text' or 'json', got '{}'",
            config.logging.format
        )));
    }
    let level = config.logging.verbosity.to_lowercase();
    if !LEVELS.contains(&level.as_str()) {
        return Err(RepoError::Config(format!(
            "logging.verbosity must be one of {}, got '{}'",
            LEVELS.join(", "),
            config.logging.verbosity
        )));
    }

    Ok(())
}
