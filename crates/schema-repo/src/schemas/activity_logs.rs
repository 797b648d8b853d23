//! Employee activity logs.

use chrono::NaiveDateTime;

use crate::blocking::SyncTypedRepository;
use crate::core::schema::{ColumnDescriptor, LogicalType, TableSchema};
use crate::core::traits::{Query, SortOrder};
use crate::core::value::AttributeMap;
use crate::error::Result;
use crate::marshal::{AttributeReader, AttributeWriter, Field, Record};
use crate::repository::TypedRepository;

pub const TABLE_NAME: &str = "ActivityLogs";

pub fn schema() -> TableSchema {
    TableSchema::new(
        TABLE_NAME,
        1,
        vec![
            ColumnDescriptor::new("UUID", LogicalType::Guid)
                .primary_key()
                .unique()
                .comment("Log entry UUID, primary key"),
            ColumnDescriptor::new("UserId", LogicalType::String)
                .length(50)
                .not_null()
                .indexed()
                .comment("Employee user ID"),
            ColumnDescriptor::new("UserUUID", LogicalType::Guid)
                .not_null()
                .indexed()
                .comment("Employee UUID"),
            ColumnDescriptor::new("ActivityType", LogicalType::String)
                .length(20)
                .not_null()
                .indexed()
                .comment("Activity type"),
            ColumnDescriptor::new("DetailInformation", LogicalType::Json)
                .comment("Activity details (JSON)"),
            ColumnDescriptor::new("StartTime", LogicalType::DateTime)
                .not_null()
                .indexed()
                .comment("Activity start"),
            ColumnDescriptor::new("EndTime", LogicalType::DateTime)
                .not_null()
                .comment("Activity end"),
            ColumnDescriptor::new("Duration", LogicalType::Int32)
                .not_null()
                .default_value("0")
                .comment("Duration in seconds"),
            ColumnDescriptor::new("CreatedAt", LogicalType::DateTime)
                .not_null()
                .default_value("CURRENT_TIMESTAMP")
                .indexed()
                .comment("Created at"),
        ],
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityLogRecord {
    pub uuid: String,
    pub user_id: String,
    pub user_uuid: String,
    pub activity_type: String,
    /// JSON document text.
    pub detail_information: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Seconds.
    pub duration: i32,
    pub created_at: Option<NaiveDateTime>,
}

impl Record for ActivityLogRecord {
    const NAME: &'static str = "ActivityLogRecord";
    const FIELDS: &'static [Field] = &[
        Field::new("UUID", LogicalType::Guid),
        Field::new("UserId", LogicalType::String),
        Field::new("UserUUID", LogicalType::Guid),
        Field::new("ActivityType", LogicalType::String),
        Field::new("DetailInformation", LogicalType::Json),
        Field::new("StartTime", LogicalType::DateTime),
        Field::new("EndTime", LogicalType::DateTime),
        Field::new("Duration", LogicalType::Int32),
        Field::new("CreatedAt", LogicalType::DateTime),
    ];

    fn to_attributes(&self) -> AttributeMap {
        AttributeWriter::new()
            .put("UUID", &self.uuid)
            .put("UserId", &self.user_id)
            .put("UserUUID", &self.user_uuid)
            .put("ActivityType", &self.activity_type)
            .put("DetailInformation", self.detail_information.clone())
            .put("StartTime", self.start_time)
            .put("EndTime", self.end_time)
            .put("Duration", self.duration)
            .put_some("CreatedAt", self.created_at)
            .finish()
    }

    fn from_attributes(reader: &AttributeReader<'_>) -> Self {
        Self {
            uuid: reader.get("UUID"),
            user_id: reader.get("UserId"),
            user_uuid: reader.get("UserUUID"),
            activity_type: reader.get("ActivityType"),
            detail_information: reader.get("DetailInformation"),
            start_time: reader.get("StartTime"),
            end_time: reader.get("EndTime"),
            duration: reader.get("Duration"),
            created_at: reader.get("CreatedAt"),
        }
    }
}

pub type ActivityLogsRepository = TypedRepository<ActivityLogRecord>;

impl TypedRepository<ActivityLogRecord> {
    pub fn open(connection_string: &str) -> Result<Self> {
        Self::new(schema(), connection_string)
    }

    pub async fn logs_by_user_id(&self, user_id: &str) -> Result<Vec<ActivityLogRecord>> {
        self.search_records("UserId", user_id).await
    }

    pub async fn logs_by_type(&self, activity_type: &str) -> Result<Vec<ActivityLogRecord>> {
        self.search_records("ActivityType", activity_type).await
    }

    /// Activities of one user that started at or after `start` and ended at
    /// or before `end`, oldest first.
    pub async fn logs_in_range(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<ActivityLogRecord>> {
        self.find_records(&range_query(user_id, start, end)).await
    }
}

pub type ActivityLogsSyncRepository = SyncTypedRepository<ActivityLogRecord>;

impl SyncTypedRepository<ActivityLogRecord> {
    pub fn open(connection_string: &str) -> Result<Self> {
        Self::new(schema(), connection_string)
    }

    pub fn logs_by_user_id(&self, user_id: &str) -> Result<Vec<ActivityLogRecord>> {
        self.run(self.typed().logs_by_user_id(user_id))
    }

    pub fn logs_by_type(&self, activity_type: &str) -> Result<Vec<ActivityLogRecord>> {
        self.run(self.typed().logs_by_type(activity_type))
    }

    pub fn logs_in_range(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<ActivityLogRecord>> {
        self.run(self.typed().logs_in_range(user_id, start, end))
    }
}

fn range_query(user_id: &str, start: NaiveDateTime, end: NaiveDateTime) -> Query {
    Query::new()
        .eq("UserId", user_id)
        .at_least("StartTime", start)
        .at_most("EndTime", end)
        .order_by("StartTime", SortOrder::Ascending)
}
