//! Generic record marshalling.
//!
//! A [`Record`] declares an explicit field table (name and logical type in
//! declaration order) and converts itself to and from an [`AttributeMap`]
//! through an [`AttributeWriter`] / [`AttributeReader`]. Reading never fails
//! on bad data: see [`coerce`] for the conversion rules.

pub mod coerce;

pub use coerce::{coerce_to_column, FromValue, NamedVariant};

use crate::core::schema::{LogicalType, TableSchema};
use crate::core::value::{AttributeMap, Value};
use crate::error::{RepoError, Result};

/// One declared field of a record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub logical_type: LogicalType,
}

impl Field {
    pub const fn new(name: &'static str, logical_type: LogicalType) -> Self {
        Self { name, logical_type }
    }
}

/// Strongly typed record stored as one table row.
pub trait Record: Sized + Send + Sync + 'static {
    /// Shape name used in diagnostics.
    const NAME: &'static str;

    /// Declared fields in declaration order.
    const FIELDS: &'static [Field];

    /// Project every declared field under its name.
    fn to_attributes(&self) -> AttributeMap;

    /// Build a record from a reader over an attribute map.
    fn from_attributes(reader: &AttributeReader<'_>) -> Self;
}

/// Convert a record to an attribute map; `None` stays `None`.
pub fn to_attribute_map<T: Record>(record: Option<&T>) -> Option<AttributeMap> {
    record.map(Record::to_attributes)
}

/// Convert an attribute map to a record; `None` stays `None`.
///
/// Fails only when the record type declares no fields.
pub fn from_attribute_map<T: Record>(map: Option<&AttributeMap>) -> Result<Option<T>> {
    if T::FIELDS.is_empty() {
        return Err(RepoError::shape_mismatch(
            T::NAME,
            "-",
            "record declares no fields",
        ));
    }
    Ok(map.map(|m| T::from_attributes(&AttributeReader::new(m))))
}

/// Check a record's field table against a table schema.
///
/// Every declared field must name a schema column of a compatible type.
pub fn check_shape<T: Record>(schema: &TableSchema) -> Result<()> {
    if T::FIELDS.is_empty() {
        return Err(RepoError::shape_mismatch(
            T::NAME,
            &schema.name,
            "record declares no fields",
        ));
    }

    for field in T::FIELDS {
        let Some(col) = schema.column(field.name) else {
            return Err(RepoError::shape_mismatch(
                T::NAME,
                &schema.name,
                format!("field {} has no matching column", field.name),
            ));
        };
        let compatible = col.logical_type == field.logical_type
            || (col.logical_type.is_textual() && field.logical_type.is_textual());
        if !compatible {
            return Err(RepoError::shape_mismatch(
                T::NAME,
                &schema.name,
                format!(
                    "field {} is {:?} but column is {:?}",
                    field.name, field.logical_type, col.logical_type
                ),
            ));
        }
    }

    Ok(())
}

/// Typed, lenient access to an attribute map.
#[derive(Debug, Clone, Copy)]
pub struct AttributeReader<'a> {
    map: &'a AttributeMap,
}

impl<'a> AttributeReader<'a> {
    pub fn new(map: &'a AttributeMap) -> Self {
        Self { map }
    }

    pub fn raw(&self, name: &str) -> Option<&'a Value> {
        self.map.get(name)
    }

    /// Coerced value, or the type's zero value.
    pub fn get<T: FromValue>(&self, name: &str) -> T {
        T::coerce(self.map.get(name))
    }

    /// Coerced value; `default` when the attribute is absent.
    pub fn get_or<T: FromValue>(&self, name: &str, default: T) -> T {
        match self.map.get(name) {
            Some(value) => T::coerce(Some(value)),
            None => default,
        }
    }

    /// Enum by case-insensitive variant name, or the enum's default.
    pub fn get_enum<E: NamedVariant>(&self, name: &str) -> E {
        self.map
            .get(name)
            .and_then(E::from_variant_value)
            .unwrap_or_default()
    }
}

/// Builder for a record's attribute map.
#[derive(Debug, Default)]
pub struct AttributeWriter {
    map: AttributeMap,
}

impl AttributeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.map.insert(name.to_string(), value.into());
        self
    }

    /// Put `value` if present; an absent attribute lets the store apply the
    /// column default on insert.
    pub fn put_some<V: Into<Value>>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.put(name, v),
            None => self,
        }
    }

    pub fn put_enum<E: NamedVariant>(self, name: &str, value: E) -> Self {
        self.put(name, value.name())
    }

    pub fn finish(self) -> AttributeMap {
        self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::ColumnDescriptor;
    use chrono::NaiveDateTime;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    enum Level {
        #[default]
        Junior,
        Senior,
    }

    impl NamedVariant for Level {
        const VARIANTS: &'static [(&'static str, Self)] =
            &[("Junior", Level::Junior), ("Senior", Level::Senior)];
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Badge {
        code: String,
        level: Level,
        active: bool,
        score: i32,
        weight: Decimal,
        issued: NaiveDateTime,
        note: Option<String>,
    }

    impl Record for Badge {
        const NAME: &'static str = "Badge";
        const FIELDS: &'static [Field] = &[
            Field::new("Code", LogicalType::String),
            Field::new("Level", LogicalType::String),
            Field::new("Active", LogicalType::Boolean),
            Field::new("Score", LogicalType::Int32),
            Field::new("Weight", LogicalType::Decimal),
            Field::new("Issued", LogicalType::DateTime),
            Field::new("Note", LogicalType::Text),
        ];

        fn to_attributes(&self) -> AttributeMap {
            AttributeWriter::new()
                .put("Code", &self.code)
                .put_enum("Level", self.level)
                .put("Active", self.active)
                .put("Score", self.score)
                .put("Weight", self.weight)
                .put("Issued", self.issued)
                .put("Note", self.note.clone())
                .finish()
        }

        fn from_attributes(reader: &AttributeReader<'_>) -> Self {
            Self {
                code: reader.get("Code"),
                level: reader.get_enum("Level"),
                active: reader.get("Active"),
                score: reader.get_or("Score", 10),
                weight: reader.get("Weight"),
                issued: reader.get("Issued"),
                note: reader.get("Note"),
            }
        }
    }

    struct Shapeless;

    impl Record for Shapeless {
        const NAME: &'static str = "Shapeless";
        const FIELDS: &'static [Field] = &[];

        fn to_attributes(&self) -> AttributeMap {
            AttributeMap::new()
        }

        fn from_attributes(_: &AttributeReader<'_>) -> Self {
            Shapeless
        }
    }

    fn badge() -> Badge {
        Badge {
            code: "B-1".into(),
            level: Level::Senior,
            active: true,
            score: 7,
            weight: Decimal::from_str("1.25").unwrap(),
            issued: NaiveDateTime::parse_from_str("2024-02-03 04:05:06", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            note: None,
        }
    }

    fn badge_schema() -> TableSchema {
        TableSchema::new(
            "Badges",
            1,
            vec![
                ColumnDescriptor::new("Code", LogicalType::String).primary_key(),
                ColumnDescriptor::new("Level", LogicalType::String),
                ColumnDescriptor::new("Active", LogicalType::Boolean),
                ColumnDescriptor::new("Score", LogicalType::Int32),
                ColumnDescriptor::new("Weight", LogicalType::Decimal),
                ColumnDescriptor::new("Issued", LogicalType::DateTime),
                ColumnDescriptor::new("Note", LogicalType::Text),
            ],
        )
    }

    #[test]
    fn test_round_trip() {
        let original = badge();
        let map = to_attribute_map(Some(&original)).unwrap();
        let back: Badge = from_attribute_map(Some(&map)).unwrap().unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_none_passes_through() {
        assert!(to_attribute_map::<Badge>(None).is_none());
        assert!(from_attribute_map::<Badge>(None).unwrap().is_none());
    }

    #[test]
    fn test_lenient_reading() {
        let mut map = AttributeMap::new();
        map.insert("Code".into(), Value::Int(12));
        map.insert("Level".into(), Value::from("SENIOR"));
        map.insert("Active".into(), Value::from("1"));
        map.insert("Weight".into(), Value::from("garbage"));
        map.insert("Issued".into(), Value::from("2024-02-03T04:05:06"));

        let badge: Badge = from_attribute_map(Some(&map)).unwrap().unwrap();
        assert_eq!(badge.code, "12");
        assert_eq!(badge.level, Level::Senior);
        assert!(badge.active);
        // Absent field falls back to its declared default
        assert_eq!(badge.score, 10);
        assert_eq!(badge.weight, Decimal::ZERO);
        assert_eq!(badge.issued, self::badge().issued);
        assert_eq!(badge.note, None);
    }

    #[test]
    fn test_unknown_enum_name_is_default() {
        let mut map = AttributeMap::new();
        map.insert("Level".into(), Value::from("Principal"));
        let badge: Badge = from_attribute_map(Some(&map)).unwrap().unwrap();
        assert_eq!(badge.level, Level::Junior);
    }

    #[test]
    fn test_shapeless_record_rejected() {
        assert!(matches!(
            from_attribute_map::<Shapeless>(Some(&AttributeMap::new())),
            Err(RepoError::ShapeMismatch { .. })
        ));
        assert!(check_shape::<Shapeless>(&badge_schema()).is_err());
    }

    #[test]
    fn test_check_shape() {
        assert!(check_shape::<Badge>(&badge_schema()).is_ok());

        let mut missing = badge_schema();
        missing.columns.retain(|c| c.name != "Note");
        assert!(matches!(
            check_shape::<Badge>(&missing),
            Err(RepoError::ShapeMismatch { .. })
        ));

        let mut retyped = badge_schema();
        retyped.columns[3].logical_type = LogicalType::DateTime;
        assert!(check_shape::<Badge>(&retyped).is_err());
    }
}
