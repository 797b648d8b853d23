//! Health recommendations pushed to employees.

use chrono::NaiveDateTime;
use tracing::warn;

use crate::blocking::SyncTypedRepository;
use crate::core::schema::{ColumnDescriptor, LogicalType, TableSchema};
use crate::core::traits::{Query, SortOrder};
use crate::core::value::{AttributeMap, Value};
use crate::error::Result;
use crate::marshal::{AttributeReader, AttributeWriter, Field, Record};
use crate::repository::TypedRepository;

/// Table name as deployed.
pub const TABLE_NAME: &str = "Recommandation";

pub fn schema() -> TableSchema {
    TableSchema::new(
        TABLE_NAME,
        1,
        vec![
            ColumnDescriptor::new("UUID", LogicalType::Guid)
                .primary_key()
                .unique()
                .comment("Recommendation UUID, primary key"),
            ColumnDescriptor::new("UserId", LogicalType::String)
                .length(50)
                .not_null()
                .indexed()
                .comment("User ID"),
            ColumnDescriptor::new("UserUUID", LogicalType::Guid)
                .not_null()
                .indexed()
                .comment("User UUID"),
            ColumnDescriptor::new("CreateTime", LogicalType::DateTime)
                .not_null()
                .default_value("CURRENT_TIMESTAMP")
                .indexed()
                .comment("Created at"),
            ColumnDescriptor::new("IsPushed", LogicalType::Boolean)
                .not_null()
                .default_value("0")
                .indexed()
                .comment("Whether the recommendation was pushed"),
            ColumnDescriptor::new("Content", LogicalType::Text)
                .not_null()
                .comment("Recommendation text"),
        ],
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRecord {
    pub uuid: String,
    pub user_id: String,
    pub user_uuid: String,
    pub create_time: Option<NaiveDateTime>,
    pub is_pushed: bool,
    pub content: String,
}

impl Record for RecommendationRecord {
    const NAME: &'static str = "RecommendationRecord";
    const FIELDS: &'static [Field] = &[
        Field::new("UUID", LogicalType::Guid),
        Field::new("UserId", LogicalType::String),
        Field::new("UserUUID", LogicalType::Guid),
        Field::new("CreateTime", LogicalType::DateTime),
        Field::new("IsPushed", LogicalType::Boolean),
        Field::new("Content", LogicalType::Text),
    ];

    fn to_attributes(&self) -> AttributeMap {
        AttributeWriter::new()
            .put("UUID", &self.uuid)
            .put("UserId", &self.user_id)
            .put("UserUUID", &self.user_uuid)
            .put_some("CreateTime", self.create_time)
            .put("IsPushed", self.is_pushed)
            .put("Content", &self.content)
            .finish()
    }

    fn from_attributes(reader: &AttributeReader<'_>) -> Self {
        Self {
            uuid: reader.get("UUID"),
            user_id: reader.get("UserId"),
            user_uuid: reader.get("UserUUID"),
            create_time: reader.get("CreateTime"),
            is_pushed: reader.get("IsPushed"),
            content: reader.get("Content"),
        }
    }
}

pub type RecommendationsRepository = TypedRepository<RecommendationRecord>;

impl TypedRepository<RecommendationRecord> {
    pub fn open(connection_string: &str) -> Result<Self> {
        Self::new(schema(), connection_string)
    }

    pub async fn recommendations_by_user_id(
        &self,
        user_id: &str,
    ) -> Result<Vec<RecommendationRecord>> {
        self.search_records("UserId", user_id).await
    }

    pub async fn recommendations_by_user_uuid(
        &self,
        user_uuid: &str,
    ) -> Result<Vec<RecommendationRecord>> {
        self.search_records("UserUUID", user_uuid).await
    }

    pub async fn pushed_recommendations(&self) -> Result<Vec<RecommendationRecord>> {
        self.search_records("IsPushed", Value::Bool(true)).await
    }

    pub async fn unpushed_recommendations(&self) -> Result<Vec<RecommendationRecord>> {
        self.search_records("IsPushed", Value::Bool(false)).await
    }

    /// Recommendations for one user created within `[start, end]`, newest
    /// first.
    pub async fn recommendations_in_range(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<RecommendationRecord>> {
        self.find_records(&range_query(user_id, start, end)).await
    }

    /// Flag one recommendation as delivered.
    pub async fn mark_pushed(&self, uuid: &str) -> Result<bool> {
        self.repository()
            .update(&Value::from(uuid), &pushed_flag())
            .await
    }

    /// Flag every recommendation in `uuids` as delivered.
    ///
    /// Each update is attempted even after one fails; the result is `true`
    /// only if all of them updated their row.
    pub async fn mark_all_pushed<S: AsRef<str>>(&self, uuids: &[S]) -> Result<bool> {
        let mut all = true;
        for uuid in uuids {
            let uuid = uuid.as_ref();
            match self.mark_pushed(uuid).await {
                Ok(true) => {}
                Ok(false) => all = false,
                Err(e) => {
                    warn!("Marking recommendation {} as pushed failed: {}", uuid, e);
                    all = false;
                }
            }
        }
        Ok(all)
    }
}

pub type RecommendationsSyncRepository = SyncTypedRepository<RecommendationRecord>;

impl SyncTypedRepository<RecommendationRecord> {
    pub fn open(connection_string: &str) -> Result<Self> {
        Self::new(schema(), connection_string)
    }

    pub fn recommendations_by_user_id(&self, user_id: &str) -> Result<Vec<RecommendationRecord>> {
        self.run(self.typed().recommendations_by_user_id(user_id))
    }

    pub fn recommendations_by_user_uuid(
        &self,
        user_uuid: &str,
    ) -> Result<Vec<RecommendationRecord>> {
        self.run(self.typed().recommendations_by_user_uuid(user_uuid))
    }

    pub fn pushed_recommendations(&self) -> Result<Vec<RecommendationRecord>> {
        self.run(self.typed().pushed_recommendations())
    }

    pub fn unpushed_recommendations(&self) -> Result<Vec<RecommendationRecord>> {
        self.run(self.typed().unpushed_recommendations())
    }

    pub fn recommendations_in_range(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<RecommendationRecord>> {
        self.run(self.typed().recommendations_in_range(user_id, start, end))
    }

    pub fn mark_pushed(&self, uuid: &str) -> Result<bool> {
        self.run(self.typed().mark_pushed(uuid))
    }

    pub fn mark_all_pushed<S: AsRef<str>>(&self, uuids: &[S]) -> Result<bool> {
        self.run(self.typed().mark_all_pushed(uuids))
    }
}

fn pushed_flag() -> AttributeMap {
    AttributeMap::from([("IsPushed".to_string(), Value::Bool(true))])
}

fn range_query(user_id: &str, start: NaiveDateTime, end: NaiveDateTime) -> Query {
    Query::new()
        .eq("UserId", user_id)
        .at_least("CreateTime", start)
        .at_most("CreateTime", end)
        .order_by("CreateTime", SortOrder::Descending)
}
