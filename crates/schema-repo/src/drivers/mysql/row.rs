//! Conversions between [`Value`] and `mysql_async` values and rows.

use chrono::{Datelike, NaiveDate, Timelike};
use mysql_async::Row;

use crate::core::schema::TableSchema;
use crate::core::value::{AttributeMap, Value};
use crate::marshal::coerce::coerce_to_column;

/// Convert a statement parameter.
///
/// Timestamps are bound with second precision; decimals travel as text so
/// the server does the rounding.
pub fn to_mysql(value: &Value) -> mysql_async::Value {
    match value {
        Value::Null => mysql_async::Value::NULL,
        Value::Bool(b) => mysql_async::Value::Int(i64::from(*b)),
        Value::Int(i) => mysql_async::Value::Int(*i),
        Value::Float(f) => mysql_async::Value::Double(*f),
        Value::Decimal(d) => mysql_async::Value::Bytes(d.to_string().into_bytes()),
        Value::Text(s) => mysql_async::Value::Bytes(s.as_bytes().to_vec()),
        Value::DateTime(dt) => mysql_async::Value::Date(
            u16::try_from(dt.year()).unwrap_or(0),
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            0,
        ),
    }
}

/// Convert a list of statement parameters.
pub fn to_params(values: &[Value]) -> mysql_async::Params {
    if values.is_empty() {
        mysql_async::Params::Empty
    } else {
        mysql_async::Params::Positional(values.iter().map(to_mysql).collect())
    }
}

/// Convert a value read from the server.
pub fn from_mysql(value: &mysql_async::Value) -> Value {
    match value {
        mysql_async::Value::NULL => Value::Null,
        mysql_async::Value::Bytes(b) => Value::Text(String::from_utf8_lossy(b).into_owned()),
        mysql_async::Value::Int(i) => Value::Int(*i),
        mysql_async::Value::UInt(u) => match i64::try_from(*u) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Decimal((*u).into()),
        },
        mysql_async::Value::Float(f) => Value::Float(f64::from(*f)),
        mysql_async::Value::Double(f) => Value::Float(*f),
        mysql_async::Value::Date(y, m, d, h, mi, s, us) => {
            NaiveDate::from_ymd_opt(i32::from(*y), u32::from(*m), u32::from(*d))
                .and_then(|date| {
                    date.and_hms_micro_opt(u32::from(*h), u32::from(*mi), u32::from(*s), *us)
                })
                .map(Value::DateTime)
                // Zero dates (0000-00-00) have no calendar representation
                .unwrap_or(Value::Null)
        }
        mysql_async::Value::Time(neg, days, h, mi, s, _) => {
            let hours = days * 24 + u32::from(*h);
            Value::Text(format!(
                "{}{:02}:{:02}:{:02}",
                if *neg { "-" } else { "" },
                hours,
                mi,
                s
            ))
        }
    }
}

/// Decode a result row into an attribute map.
///
/// Columns known to the schema are normalized to their logical type;
/// other result columns keep their raw conversion.
pub fn row_to_attributes(row: &Row, schema: &TableSchema) -> AttributeMap {
    let mut attrs = AttributeMap::new();
    for (idx, column) in row.columns_ref().iter().enumerate() {
        let name = column.name_str().into_owned();
        let raw = row.as_ref(idx).map(from_mysql).unwrap_or_default();
        let value = match schema.column(&name) {
            Some(col) => coerce_to_column(col.logical_type, &raw),
            None => raw,
        };
        attrs.insert(name, value);
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    #[test]
    fn test_to_mysql_scalars() {
        assert_eq!(to_mysql(&Value::Null), mysql_async::Value::NULL);
        assert_eq!(to_mysql(&Value::Bool(true)), mysql_async::Value::Int(1));
        assert_eq!(
            to_mysql(&Value::from("abc")),
            mysql_async::Value::Bytes(b"abc".to_vec())
        );
        assert_eq!(
            to_mysql(&Value::Decimal(Decimal::from_str("12.5").unwrap())),
            mysql_async::Value::Bytes(b"12.5".to_vec())
        );
    }

    #[test]
    fn test_timestamp_bound_at_second_precision() {
        let value = Value::DateTime(ts("2024-03-01 08:30:15.750"));
        assert_eq!(
            to_mysql(&value),
            mysql_async::Value::Date(2024, 3, 1, 8, 30, 15, 0)
        );
    }

    #[test]
    fn test_from_mysql_date() {
        assert_eq!(
            from_mysql(&mysql_async::Value::Date(2024, 3, 1, 8, 30, 15, 0)),
            Value::DateTime(ts("2024-03-01 08:30:15"))
        );
        assert_eq!(
            from_mysql(&mysql_async::Value::Date(0, 0, 0, 0, 0, 0, 0)),
            Value::Null
        );
    }

    #[test]
    fn test_from_mysql_numbers_and_text() {
        assert_eq!(from_mysql(&mysql_async::Value::Int(-3)), Value::Int(-3));
        assert_eq!(from_mysql(&mysql_async::Value::UInt(7)), Value::Int(7));
        assert!(matches!(
            from_mysql(&mysql_async::Value::UInt(u64::MAX)),
            Value::Decimal(_)
        ));
        assert_eq!(
            from_mysql(&mysql_async::Value::Bytes(b"hello".to_vec())),
            Value::from("hello")
        );
        assert_eq!(
            from_mysql(&mysql_async::Value::Time(false, 1, 2, 3, 4, 0)),
            Value::from("26:03:04")
        );
    }

    #[test]
    fn test_params_empty() {
        assert_eq!(to_params(&[]), mysql_async::Params::Empty);
        assert!(matches!(
            to_params(&[Value::Int(1)]),
            mysql_async::Params::Positional(v) if v.len() == 1
        ));
    }
}
