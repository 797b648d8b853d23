//! Employee records.
//!
//! Two schema revisions exist: v1 with snake_case column names and v2 with
//! PascalCase names plus an `Online` flag. [`EmployeeRecord`] maps v2.

use chrono::NaiveDateTime;

use crate::blocking::SyncTypedRepository;
use crate::core::schema::{ColumnDescriptor, LogicalType, TableSchema};
use crate::core::value::{AttributeMap, Value};
use crate::error::Result;
use crate::marshal::{AttributeReader, AttributeWriter, Field, Record};
use crate::repository::TypedRepository;

pub const TABLE_NAME: &str = "Employees";

/// snake_case revision.
pub fn schema_v1() -> TableSchema {
    TableSchema::new(
        TABLE_NAME,
        1,
        vec![
            ColumnDescriptor::new("UUID", LogicalType::String)
                .length(36)
                .primary_key()
                .comment("Employee UUID, primary key"),
            ColumnDescriptor::new("user_id", LogicalType::String)
                .length(36)
                .not_null()
                .comment("User ID"),
            ColumnDescriptor::new("name", LogicalType::String)
                .length(50)
                .not_null()
                .comment("Employee name"),
            ColumnDescriptor::new("department", LogicalType::String)
                .length(50)
                .not_null()
                .comment("Department"),
            ColumnDescriptor::new("workstation_id", LogicalType::String)
                .length(20)
                .comment("Workstation number"),
            ColumnDescriptor::new("preference", LogicalType::Text)
                .comment("Health preferences (JSON)"),
            ColumnDescriptor::new("created_at", LogicalType::DateTime)
                .not_null()
                .default_value("CURRENT_TIMESTAMP")
                .comment("Created at"),
            ColumnDescriptor::new("updated_at", LogicalType::DateTime)
                .not_null()
                .default_value("CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP")
                .comment("Updated at"),
        ],
    )
}

/// PascalCase revision with online state.
pub fn schema_v2() -> TableSchema {
    TableSchema::new(
        TABLE_NAME,
        2,
        vec![
            ColumnDescriptor::new("UUID", LogicalType::String)
                .length(36)
                .primary_key()
                .comment("Employee UUID, primary key"),
            ColumnDescriptor::new("UserId", LogicalType::String)
                .length(36)
                .not_null()
                .indexed()
                .comment("User ID"),
            ColumnDescriptor::new("Name", LogicalType::String)
                .length(50)
                .not_null()
                .comment("Employee name"),
            ColumnDescriptor::new("Department", LogicalType::String)
                .length(50)
                .not_null()
                .indexed()
                .comment("Department"),
            ColumnDescriptor::new("WorkstationId", LogicalType::String)
                .length(20)
                .comment("Workstation number"),
            ColumnDescriptor::new("Preference", LogicalType::Text)
                .comment("Health preferences (JSON)"),
            ColumnDescriptor::new("Online", LogicalType::Boolean)
                .not_null()
                .default_value("0")
                .indexed()
                .comment("Whether the employee is online"),
            ColumnDescriptor::new("CreatedAt", LogicalType::DateTime)
                .not_null()
                .default_value("CURRENT_TIMESTAMP")
                .comment("Created at"),
            ColumnDescriptor::new("UpdatedAt", LogicalType::DateTime)
                .not_null()
                .default_value("CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP")
                .comment("Updated at"),
        ],
    )
}

/// Current revision.
pub fn schema() -> TableSchema {
    schema_v2()
}

/// One employee (schema v2).
///
/// Timestamps left `None` are filled in by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRecord {
    pub uuid: String,
    pub user_id: String,
    pub name: String,
    pub department: String,
    pub workstation_id: Option<String>,
    pub preference: Option<String>,
    pub online: bool,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Record for EmployeeRecord {
    const NAME: &'static str = "EmployeeRecord";
    const FIELDS: &'static [Field] = &[
        Field::new("UUID", LogicalType::String),
        Field::new("UserId", LogicalType::String),
        Field::new("Name", LogicalType::String),
        Field::new("Department", LogicalType::String),
        Field::new("WorkstationId", LogicalType::String),
        Field::new("Preference", LogicalType::Text),
        Field::new("Online", LogicalType::Boolean),
        Field::new("CreatedAt", LogicalType::DateTime),
        Field::new("UpdatedAt", LogicalType::DateTime),
    ];

    fn to_attributes(&self) -> AttributeMap {
        AttributeWriter::new()
            .put("UUID", &self.uuid)
            .put("UserId", &self.user_id)
            .put("Name", &self.name)
            .put("Department", &self.department)
            .put("WorkstationId", self.workstation_id.clone())
            .put("Preference", self.preference.clone())
            .put("Online", self.online)
            .put_some("CreatedAt", self.created_at)
            .put_some("UpdatedAt", self.updated_at)
            .finish()
    }

    fn from_attributes(reader: &AttributeReader<'_>) -> Self {
        Self {
            uuid: reader.get("UUID"),
            user_id: reader.get("UserId"),
            name: reader.get("Name"),
            department: reader.get("Department"),
            workstation_id: reader.get("WorkstationId"),
            preference: reader.get("Preference"),
            online: reader.get("Online"),
            created_at: reader.get("CreatedAt"),
            updated_at: reader.get("UpdatedAt"),
        }
    }
}

pub type EmployeesRepository = TypedRepository<EmployeeRecord>;

impl TypedRepository<EmployeeRecord> {
    /// Repository over the current employees schema.
    pub fn open(connection_string: &str) -> Result<Self> {
        Self::new(schema(), connection_string)
    }

    pub async fn employees_by_user_id(&self, user_id: &str) -> Result<Vec<EmployeeRecord>> {
        self.search_records("UserId", user_id).await
    }

    pub async fn employees_by_department(&self, department: &str) -> Result<Vec<EmployeeRecord>> {
        self.search_records("Department", department).await
    }

    pub async fn online_employees(&self) -> Result<Vec<EmployeeRecord>> {
        self.search_records("Online", Value::Bool(true)).await
    }

    pub async fn offline_employees(&self) -> Result<Vec<EmployeeRecord>> {
        self.search_records("Online", Value::Bool(false)).await
    }
}

pub type EmployeesSyncRepository = SyncTypedRepository<EmployeeRecord>;

impl SyncTypedRepository<EmployeeRecord> {
    pub fn open(connection_string: &str) -> Result<Self> {
        Self::new(schema(), connection_string)
    }

    pub fn employees_by_user_id(&self, user_id: &str) -> Result<Vec<EmployeeRecord>> {
        self.run(self.typed().employees_by_user_id(user_id))
    }

    pub fn employees_by_department(&self, department: &str) -> Result<Vec<EmployeeRecord>> {
        self.run(self.typed().employees_by_department(department))
    }

    pub fn online_employees(&self) -> Result<Vec<EmployeeRecord>> {
        self.run(self.typed().online_employees())
    }

    pub fn offline_employees(&self) -> Result<Vec<EmployeeRecord>> {
        self.run(self.typed().offline_employees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::MysqlDialect;
    use crate::core::traits::Dialect;
    use crate::marshal::{check_shape, from_attribute_map, to_attribute_map};

    fn alice() -> EmployeeRecord {
        EmployeeRecord {
            uuid: "u1".into(),
            user_id: "alice".into(),
            name: "Alice".into(),
            department: "R&D".into(),
            workstation_id: Some("A-12".into()),
            preference: None,
            online: true,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_record_matches_v2_only() {
        assert!(check_shape::<EmployeeRecord>(&schema_v2()).is_ok());
        assert!(check_shape::<EmployeeRecord>(&schema_v1()).is_err());
    }

    #[test]
    fn test_round_trip() {
        let map = to_attribute_map(Some(&alice())).unwrap();
        assert!(!map.contains_key("CreatedAt"));
        assert_eq!(map["Preference"], Value::Null);
        let back: EmployeeRecord = from_attribute_map(Some(&map)).unwrap().unwrap();
        assert_eq!(back, alice());
    }

    #[test]
    fn test_v1_ddl() {
        let ddl = MysqlDialect::new()
            .create_table(&schema_v1().resolve().unwrap())
            .unwrap();
        assert!(ddl.contains("`UUID` VARCHAR(36) NOT NULL"));
        assert!(ddl.contains(
            "`updated_at` DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP"
        ));
        assert!(ddl.contains("COMMENT='schema v1'"));
    }

    #[test]
    fn test_v2_ddl() {
        let ddl = MysqlDialect::new()
            .create_table(&schema_v2().resolve().unwrap())
            .unwrap();
        assert!(ddl.contains("`Online` TINYINT(1) NOT NULL DEFAULT 0"));
        assert!(ddl.contains("KEY `IDX_Employees_Department` (`Department`)"));
        assert!(ddl.contains("PRIMARY KEY (`UUID`)"));
        assert!(ddl.contains("COMMENT='schema v2'"));
    }

    mod record_properties {
        use super::*;
        use crate::wire::{encode_row, WireCodec};
        use chrono::{Duration, NaiveDate};
        use proptest::prelude::*;

        /// Whole seconds between 2000 and 2100; the wire carries no fractions.
        fn arb_timestamp() -> impl Strategy<Value = NaiveDateTime> {
            (0i64..3_155_760_000).prop_map(|secs| {
                NaiveDate::from_ymd_opt(2000, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    + Duration::seconds(secs)
            })
        }

        fn arb_employee() -> impl Strategy<Value = EmployeeRecord> {
            (
                "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
                "[a-z][a-z0-9_]{0,35}",
                "\\PC{1,50}",
                "\\PC{1,50}",
                prop::option::of("[A-Z]-[0-9]{1,4}"),
                prop::option::of("\\PC{1,80}"),
                any::<bool>(),
                prop::option::of(arb_timestamp()),
                prop::option::of(arb_timestamp()),
            )
                .prop_map(
                    |(uuid, user_id, name, department, workstation_id, preference, online, created_at, updated_at)| {
                        EmployeeRecord {
                            uuid,
                            user_id,
                            name,
                            department,
                            workstation_id,
                            preference,
                            online,
                            created_at,
                            updated_at,
                        }
                    },
                )
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            #[test]
            fn prop_record_round_trips_through_attributes(record in arb_employee()) {
                let map = to_attribute_map(Some(&record)).unwrap();
                let back: EmployeeRecord = from_attribute_map(Some(&map)).unwrap().unwrap();
                prop_assert_eq!(back, record);
            }

            #[test]
            fn prop_record_round_trips_through_wire(record in arb_employee()) {
                let schema = schema().resolve().unwrap();
                let codec = WireCodec::new(&schema).unwrap();

                let json = encode_row(&record.to_attributes()).unwrap();
                let map = codec.decode_row(&schema, &json).unwrap();
                let back: EmployeeRecord = from_attribute_map(Some(&map)).unwrap().unwrap();
                prop_assert_eq!(back, record);
            }
        }
    }
}
