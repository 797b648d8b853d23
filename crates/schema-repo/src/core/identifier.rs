//! Identifier validation and quoting.
//!
//! Table and column names cannot be bound as statement parameters, so every
//! identifier that ends up in generated SQL goes through this module first.
//! Only plain identifiers (`^[A-Za-z_][A-Za-z0-9_]*$`) are accepted; that
//! rules out quoting tricks entirely, and quoting with backticks is still
//! applied so reserved words (`Name`, `Online`, ...) stay usable.

use crate::error::{RepoError, Result};

/// MySQL limit for table and column names.
const MAX_IDENTIFIER_LENGTH: usize = 64;

/// Check whether `name` is a plain SQL identifier.
///
/// ```
/// use schema_repo::core::identifier::is_valid_identifier;
///
/// assert!(is_valid_identifier("a_1"));
/// assert!(is_valid_identifier("_x"));
/// assert!(!is_valid_identifier("1abc"));
/// assert!(!is_valid_identifier("a-b"));
/// ```
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= MAX_IDENTIFIER_LENGTH && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate an identifier, returning a caller error for anything else.
pub fn validate_identifier(name: &str) -> Result<()> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(RepoError::InvalidIdentifier(name.to_string()))
    }
}

/// Quote a MySQL identifier using backticks.
///
/// Validates the identifier before quoting.
pub fn quote_mysql(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("`{}`", name.replace('`', "``")))
}

/// Name of the secondary index on `column`: `<prefix>_<table>_<column>`.
///
/// The result is not validated; long table and column names can push it
/// past the identifier limit.
pub fn index_name(prefix: &str, table: &str, column: &str) -> String {
    format!("{}_{}_{}", prefix, table, column)
}

/// Escape a string for use inside a single-quoted SQL literal.
///
/// Only used for DDL text (comments) where parameters are not available.
pub fn escape_literal(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(is_valid_identifier("a_1"));
        assert!(is_valid_identifier("_x"));
        assert!(is_valid_identifier("UUID"));
        assert!(is_valid_identifier("user_id"));
        assert!(is_valid_identifier("CreatedAt"));
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("1abc"));
        assert!(!is_valid_identifier("a-b"));
        assert!(!is_valid_identifier("column with spaces"));
        assert!(!is_valid_identifier("name`; DROP TABLE x"));
        assert!(!is_valid_identifier("日本語"));
        assert!(!is_valid_identifier("table\0name"));
    }

    #[test]
    fn test_length_limit() {
        assert!(is_valid_identifier(&"a".repeat(MAX_IDENTIFIER_LENGTH)));
        assert!(!is_valid_identifier(&"a".repeat(MAX_IDENTIFIER_LENGTH + 1)));
    }

    #[test]
    fn test_index_name() {
        assert_eq!(index_name("UK", "People", "Email"), "UK_People_Email");
        let long = index_name("IDX", &"t".repeat(40), &"c".repeat(30));
        assert!(is_valid_identifier(&"t".repeat(40)));
        assert!(!is_valid_identifier(&long));
    }

    #[test]
    fn test_validate_identifier_error() {
        let err = validate_identifier("a-b").unwrap_err();
        assert!(matches!(err, RepoError::InvalidIdentifier(ref n) if n == "a-b"));
    }

    #[test]
    fn test_quote_mysql() {
        assert_eq!(quote_mysql("users").unwrap(), "`users`");
        assert_eq!(quote_mysql("Name").unwrap(), "`Name`");
        assert!(quote_mysql("Robert`); DROP TABLE Students;--").is_err());
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("it's"), "it''s");
        assert_eq!(escape_literal(r"a\b"), r"a\\b");
        assert_eq!(escape_literal("plain"), "plain");
    }
}
