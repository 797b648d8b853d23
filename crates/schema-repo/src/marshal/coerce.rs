//! Value coercion.
//!
//! Coercion never fails: a value that cannot be converted falls back to the
//! target type's zero value. Order of attempts for every target:
//!
//! 1. pass-through when the value already has the target kind
//! 2. dedicated string parsers (`"true"`/`"1"` for booleans, several
//!    timestamp layouts, decimal text, case-insensitive enum names)
//! 3. numeric cross-conversions
//! 4. zero value

use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::schema::LogicalType;
use crate::core::value::{parse_timestamp, Value, TIMESTAMP_FORMAT};

/// Conversion from a dynamically typed [`Value`].
pub trait FromValue: Sized {
    /// Value used when the attribute is absent, null or unconvertible.
    fn zero() -> Self;

    /// Convert, returning `None` when the value does not fit.
    fn from_value(value: &Value) -> Option<Self>;

    /// Convert with zero-value fallback.
    fn coerce(value: Option<&Value>) -> Self {
        value.and_then(Self::from_value).unwrap_or_else(Self::zero)
    }
}

impl FromValue for String {
    fn zero() -> Self {
        String::new()
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Text(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::DateTime(dt) => Some(dt.format(TIMESTAMP_FORMAT).to_string()),
            other => Some(other.to_string()),
        }
    }
}

impl FromValue for i64 {
    fn zero() -> Self {
        0
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Float(f) if f.is_finite() => {
                let rounded = f.round();
                (rounded >= i64::MIN as f64 && rounded <= i64::MAX as f64).then_some(rounded as i64)
            }
            Value::Decimal(d) => d.round().to_i64(),
            Value::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| Decimal::from_str(s).ok().and_then(|d| d.round().to_i64()))
            }
            _ => None,
        }
    }
}

impl FromValue for i32 {
    fn zero() -> Self {
        0
    }

    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|i| i32::try_from(i).ok())
    }
}

impl FromValue for bool {
    fn zero() -> Self {
        false
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Int(i) => Some(*i != 0),
            Value::Float(f) => Some(*f != 0.0),
            Value::Decimal(d) => Some(!d.is_zero()),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn zero() -> Self {
        0.0
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::Decimal(d) => d.to_f64(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

impl FromValue for f32 {
    fn zero() -> Self {
        0.0
    }

    fn from_value(value: &Value) -> Option<Self> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl FromValue for Decimal {
    fn zero() -> Self {
        Decimal::ZERO
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Decimal(d) => Some(*d),
            Value::Int(i) => Some(Decimal::from(*i)),
            Value::Float(f) => Decimal::try_from(*f).ok(),
            Value::Bool(b) => Some(Decimal::from(i64::from(*b))),
            Value::Text(s) => {
                let s = s.trim();
                Decimal::from_str(s)
                    .or_else(|_| Decimal::from_scientific(s))
                    .ok()
            }
            _ => None,
        }
    }
}

impl FromValue for NaiveDateTime {
    fn zero() -> Self {
        NaiveDateTime::default()
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::DateTime(dt) => Some(*dt),
            Value::Text(s) => parse_timestamp(s),
            _ => None,
        }
    }
}

impl FromValue for Uuid {
    fn zero() -> Self {
        Uuid::nil()
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) => Uuid::parse_str(s.trim()).ok(),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn zero() -> Self {
        None
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Enum whose variants are stored by name.
///
/// Names match case-insensitively on the way in; an integer selects the
/// variant at that position.
pub trait NamedVariant: Sized + Copy + PartialEq + Default + 'static {
    const VARIANTS: &'static [(&'static str, Self)];

    fn name(self) -> &'static str {
        Self::VARIANTS
            .iter()
            .find(|(_, v)| *v == self)
            .map(|(n, _)| *n)
            .unwrap_or("")
    }

    fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::VARIANTS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| *v)
    }

    fn from_variant_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) => Self::from_name(s),
            Value::Int(i) => usize::try_from(*i)
                .ok()
                .and_then(|i| Self::VARIANTS.get(i))
                .map(|(_, v)| *v),
            _ => None,
        }
    }
}

/// Normalize a value to the kind a column of `logical_type` stores.
///
/// Values that cannot be normalized are returned unchanged so the store can
/// report them.
pub fn coerce_to_column(logical_type: LogicalType, value: &Value) -> Value {
    if value.is_null() {
        return Value::Null;
    }

    let converted = match logical_type {
        LogicalType::Boolean => bool::from_value(value).map(Value::Bool),
        LogicalType::Int32 | LogicalType::Int64 => i64::from_value(value).map(Value::Int),
        LogicalType::Decimal => Decimal::from_value(value).map(Value::Decimal),
        LogicalType::DateTime => NaiveDateTime::from_value(value).map(Value::DateTime),
        LogicalType::String | LogicalType::Guid | LogicalType::Text => {
            String::from_value(value).map(Value::Text)
        }
        LogicalType::Json => match value {
            Value::Text(_) => None,
            Value::DateTime(dt) => Some(Value::Text(format!("\"{}\"", dt.format(TIMESTAMP_FORMAT)))),
            Value::Bool(b) => Some(Value::Text(b.to_string())),
            other => Some(Value::Text(other.to_string())),
        },
    };

    converted.unwrap_or_else(|| value.clone())
}
