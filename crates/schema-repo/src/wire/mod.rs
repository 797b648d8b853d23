//! JSON wire format.
//!
//! One JSON object per row, no envelope. Keys are the camelCase form of the
//! column names (`UUID` → `uuid`, `UserId` → `userId`, `user_id` →
//! `userId`). Timestamps travel as `yyyy-MM-ddTHH:mm:ss`, decimals as
//! strings so no precision is lost.

use std::collections::HashMap;

use serde_json::{Map, Number};

use crate::core::schema::TableSchema;
use crate::core::value::{AttributeMap, Value, WIRE_TIMESTAMP_FORMAT};
use crate::error::{RepoError, Result};
use crate::marshal::coerce::coerce_to_column;

/// camelCase form of a column name.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for segment in name.split('_').filter(|s| !s.is_empty()) {
        if out.is_empty() {
            out.push_str(&lower_leading(segment));
        } else {
            let mut chars = segment.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    if out.is_empty() {
        name.to_string()
    } else {
        out
    }
}

/// Lower the leading uppercase run, keeping the capital that starts the next
/// word (`UUIDValue` → `uuidValue`).
fn lower_leading(segment: &str) -> String {
    let chars: Vec<char> = segment.chars().collect();
    let mut out = String::with_capacity(segment.len());
    for (i, c) in chars.iter().enumerate() {
        let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
        if !c.is_uppercase() || (i > 0 && next_is_lower) {
            out.extend(&chars[i..]);
            return out;
        }
        out.extend(c.to_lowercase());
    }
    out
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number(Number::from(*i)),
        Value::Float(f) => Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Decimal(d) => serde_json::Value::String(d.to_string()),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::DateTime(dt) => {
            serde_json::Value::String(dt.format(WIRE_TIMESTAMP_FORMAT).to_string())
        }
    }
}

fn from_json(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::Text(s.clone()),
        // Nested documents are stored as JSON text
        other => Value::Text(other.to_string()),
    }
}

/// Encode one attribute map as a JSON object string.
///
/// Two attributes with the same camelCase key are rejected rather than
/// letting one overwrite the other.
pub fn encode_row(row: &AttributeMap) -> Result<String> {
    let mut object = Map::with_capacity(row.len());
    for (name, value) in row {
        let key = camel_case(name);
        if object.contains_key(&key) {
            return Err(RepoError::Config(format!(
                "Attribute {} collides with another attribute on wire key {}",
                name, key
            )));
        }
        object.insert(key, to_json(value));
    }
    Ok(serde_json::to_string(&object)?)
}

/// Encode rows, one JSON object string each.
pub fn encode_rows(rows: &[AttributeMap]) -> Result<Vec<String>> {
    rows.iter().map(encode_row).collect()
}

/// Maps wire keys back to the columns of one schema.
#[derive(Debug, Clone)]
pub struct WireCodec {
    keys: HashMap<String, usize>,
}

impl WireCodec {
    /// Build the key map for `schema`.
    ///
    /// Columns whose names share a camelCase form (`UserId`, `user_id`)
    /// cannot both travel on the wire and are a caller error.
    pub fn new(schema: &TableSchema) -> Result<Self> {
        let mut keys = HashMap::with_capacity(schema.columns.len() * 2);
        for (idx, col) in schema.columns.iter().enumerate() {
            let key = camel_case(&col.name);
            if let Some(prev) = keys.insert(key.clone(), idx) {
                return Err(RepoError::Config(format!(
                    "Columns {} and {} of table {} share the wire key {}",
                    schema.columns[prev].name, col.name, schema.name, key
                )));
            }
        }
        // Exact names win over a colliding camelCase form
        for (idx, col) in schema.columns.iter().enumerate() {
            keys.insert(col.name.clone(), idx);
        }
        Ok(Self { keys })
    }

    /// Decode one JSON object into an attribute map keyed by column name.
    ///
    /// Values are normalized to their column's logical type. Unknown keys
    /// are a caller error.
    pub fn decode_row(&self, schema: &TableSchema, json: &str) -> Result<AttributeMap> {
        let parsed: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Object(object) = parsed else {
            return Err(RepoError::Config(format!(
                "Expected a JSON object for a {} row",
                schema.name
            )));
        };

        let mut row = AttributeMap::new();
        for (key, value) in &object {
            let col = self
                .keys
                .get(key)
                .and_then(|idx| schema.columns.get(*idx))
                .ok_or_else(|| RepoError::unknown_column(&schema.name, key))?;
            row.insert(
                col.name.clone(),
                coerce_to_column(col.logical_type, &from_json(value)),
            );
        }
        Ok(row)
    }

    /// Decode each JSON object.
    pub fn decode_rows<S: AsRef<str>>(
        &self,
        schema: &TableSchema,
        rows: &[S],
    ) -> Result<Vec<AttributeMap>> {
        rows.iter()
            .map(|r| self.decode_row(schema, r.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{ColumnDescriptor, LogicalType};
    use chrono::NaiveDateTime;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn schema() -> TableSchema {
        TableSchema::new(
            "Logs",
            1,
            vec![
                ColumnDescriptor::new("UUID", LogicalType::Guid).primary_key(),
                ColumnDescriptor::new("user_id", LogicalType::String),
                ColumnDescriptor::new("IsPushed", LogicalType::Boolean),
                ColumnDescriptor::new("StartTime", LogicalType::DateTime),
                ColumnDescriptor::new("Amount", LogicalType::Decimal),
                ColumnDescriptor::new("DetailInformation", LogicalType::Json),
            ],
        )
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("UUID"), "uuid");
        assert_eq!(camel_case("UserId"), "userId");
        assert_eq!(camel_case("user_id"), "userId");
        assert_eq!(camel_case("UserUUID"), "userUUID");
        assert_eq!(camel_case("IsPushed"), "isPushed");
        assert_eq!(camel_case("name"), "name");
        assert_eq!(camel_case("created_at"), "createdAt");
        assert_eq!(camel_case("UUIDValue"), "uuidValue");
        assert_eq!(camel_case("Id"), "id");
        assert_eq!(camel_case("_"), "_");
    }

    #[test]
    fn test_encode_row() {
        let mut row = AttributeMap::new();
        row.insert("UUID".into(), Value::from("u1"));
        row.insert("user_id".into(), Value::Null);
        row.insert("IsPushed".into(), Value::Bool(true));
        row.insert(
            "StartTime".into(),
            Value::DateTime(
                NaiveDateTime::parse_from_str("2024-03-01 08:30:00", "%Y-%m-%d %H:%M:%S").unwrap(),
            ),
        );
        row.insert(
            "Amount".into(),
            Value::Decimal(Decimal::from_str("12.500000").unwrap()),
        );

        let json: serde_json::Value = serde_json::from_str(&encode_row(&row).unwrap()).unwrap();
        assert_eq!(json["uuid"], "u1");
        assert!(json["userId"].is_null());
        assert_eq!(json["isPushed"], true);
        assert_eq!(json["startTime"], "2024-03-01T08:30:00");
        assert_eq!(json["amount"], "12.500000");
        // Absent columns are omitted
        assert!(json.get("detailInformation").is_none());
    }

    #[test]
    fn test_decode_row_maps_keys_and_types() {
        let schema = schema();
        let codec = WireCodec::new(&schema).unwrap();
        let row = codec
            .decode_row(
                &schema,
                r#"{"uuid":"u1","userId":"alice","IsPushed":"true",
                    "startTime":"2024-03-01T08:30:00","amount":"1.5",
                    "detailInformation":{"page":"home"}}"#,
            )
            .unwrap();

        assert_eq!(row["UUID"], Value::from("u1"));
        assert_eq!(row["user_id"], Value::from("alice"));
        assert_eq!(row["IsPushed"], Value::Bool(true));
        assert!(matches!(row["StartTime"], Value::DateTime(_)));
        assert_eq!(row["Amount"], Value::Decimal(Decimal::from_str("1.5").unwrap()));
        assert_eq!(row["DetailInformation"], Value::from(r#"{"page":"home"}"#));
    }

    #[test]
    fn test_decode_unknown_key() {
        let schema = schema();
        let codec = WireCodec::new(&schema).unwrap();
        assert!(matches!(
            codec.decode_row(&schema, r#"{"uuid":"u1","bogus":1}"#),
            Err(RepoError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        let schema = schema();
        let codec = WireCodec::new(&schema).unwrap();
        assert!(matches!(
            codec.decode_row(&schema, "[1,2]"),
            Err(RepoError::Config(_))
        ));
        assert!(matches!(
            codec.decode_row(&schema, "{not json"),
            Err(RepoError::Json(_))
        ));
    }

    #[test]
    fn test_encode_then_decode_preserves_row() {
        let schema = schema();
        let codec = WireCodec::new(&schema).unwrap();
        let mut row = AttributeMap::new();
        row.insert("UUID".into(), Value::from("u2"));
        row.insert("IsPushed".into(), Value::Bool(false));
        row.insert("user_id".into(), Value::from("bob"));

        let json = encode_row(&row).unwrap();
        assert_eq!(codec.decode_row(&schema, &json).unwrap(), row);
    }

    #[test]
    fn test_colliding_wire_keys_are_rejected() {
        let schema = TableSchema::new(
            "Mixed",
            1,
            vec![
                ColumnDescriptor::new("UserId", LogicalType::String),
                ColumnDescriptor::new("user_id", LogicalType::String),
            ],
        );
        assert!(matches!(
            WireCodec::new(&schema),
            Err(RepoError::Config(msg)) if msg.contains("userId")
        ));

        let mut row = AttributeMap::new();
        row.insert("UserId".into(), Value::from("a"));
        row.insert("user_id".into(), Value::from("b"));
        assert!(matches!(encode_row(&row), Err(RepoError::Config(_))));
    }
}
