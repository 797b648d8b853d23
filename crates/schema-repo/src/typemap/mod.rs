//! Type mapping from logical column types to MySQL.

use crate::core::schema::{ColumnDescriptor, LogicalType};

/// Default length for `String` columns without an explicit length.
pub const DEFAULT_STRING_LENGTH: u32 = 255;

/// Map a column descriptor to its MySQL column type.
pub fn to_sql_type(col: &ColumnDescriptor) -> String {
    match col.logical_type {
        LogicalType::String => {
            format!("VARCHAR({})", col.length.unwrap_or(DEFAULT_STRING_LENGTH))
        }
        LogicalType::Int32 => "INT".to_string(),
        LogicalType::Int64 => "BIGINT".to_string(),
        LogicalType::Boolean => "TINYINT(1)".to_string(),
        LogicalType::DateTime => "DATETIME".to_string(),
        LogicalType::Decimal => "DECIMAL(18,6)".to_string(),
        LogicalType::Guid => "CHAR(36)".to_string(),
        LogicalType::Text => "TEXT".to_string(),
        LogicalType::Json => "JSON".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql(ty: LogicalType) -> String {
        to_sql_type(&ColumnDescriptor::new("c", ty))
    }

    #[test]
    fn test_type_table() {
        assert_eq!(sql(LogicalType::String), "VARCHAR(255)");
        assert_eq!(sql(LogicalType::Int32), "INT");
        assert_eq!(sql(LogicalType::Int64), "BIGINT");
        assert_eq!(sql(LogicalType::Boolean), "TINYINT(1)");
        assert_eq!(sql(LogicalType::DateTime), "DATETIME");
        assert_eq!(sql(LogicalType::Decimal), "DECIMAL(18,6)");
        assert_eq!(sql(LogicalType::Guid), "CHAR(36)");
        assert_eq!(sql(LogicalType::Text), "TEXT");
        assert_eq!(sql(LogicalType::Json), "JSON");
    }

    #[test]
    fn test_string_length() {
        let col = ColumnDescriptor::new("name", LogicalType::String).length(50);
        assert_eq!(to_sql_type(&col), "VARCHAR(50)");
    }

    #[test]
    fn test_length_only_affects_strings() {
        let col = ColumnDescriptor::new("n", LogicalType::Int32).length(11);
        assert_eq!(to_sql_type(&col), "INT");
    }
}
