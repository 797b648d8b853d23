//! Record-typed view over a [`Repository`].

use std::marker::PhantomData;

use crate::core::schema::TableSchema;
use crate::core::traits::Query;
use crate::core::value::Value;
use crate::error::{RepoError, Result};
use crate::marshal::{check_shape, from_attribute_map, Record};

use super::Repository;

/// Repository whose rows are records of type `T`.
///
/// The record's field table is checked against the schema on construction.
/// Reads go through the JSON wire format, then attribute maps, then records.
#[derive(Debug, Clone)]
pub struct TypedRepository<T: Record> {
    inner: Repository,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> TypedRepository<T> {
    pub fn new(schema: TableSchema, connection_string: &str) -> Result<Self> {
        Self::from_repository(Repository::new(schema, connection_string)?)
    }

    /// Wrap an existing repository, checking the record shape.
    pub fn from_repository(inner: Repository) -> Result<Self> {
        check_shape::<T>(inner.schema())?;
        Ok(Self {
            inner,
            _record: PhantomData,
        })
    }

    /// The untyped repository.
    pub fn repository(&self) -> &Repository {
        &self.inner
    }

    pub async fn ensure_table(&self) -> Result<()> {
        self.inner.ensure_table().await
    }

    pub async fn reset_table(&self) -> Result<()> {
        self.inner.reset_table().await
    }

    pub async fn add_records(&self, records: &[T]) -> Result<bool> {
        let rows: Vec<_> = records.iter().map(Record::to_attributes).collect();
        self.inner.add(&rows).await
    }

    pub async fn read_records(&self, ids: &[Value]) -> Result<Vec<T>> {
        let json = self.inner.read_json(ids).await?;
        self.decode(&json)
    }

    /// Update the stored row with the record's key to the record's values.
    pub async fn update_record(&self, record: &T) -> Result<bool> {
        let key = self.inner.schema().key_column()?;
        let attrs = record.to_attributes();
        let id = attrs
            .get(&key.name)
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or_else(|| {
                RepoError::Config(format!(
                    "{} has no value for key column {}",
                    T::NAME,
                    key.name
                ))
            })?;
        self.inner.update(&id, &attrs).await
    }

    pub async fn delete(&self, ids: &[Value]) -> Result<bool> {
        self.inner.delete(ids).await
    }

    pub async fn search_records(&self, column: &str, value: impl Into<Value>) -> Result<Vec<T>> {
        let json = self.inner.search_json(column, value).await?;
        self.decode(&json)
    }

    pub async fn find_records(&self, query: &Query) -> Result<Vec<T>> {
        let json = self.inner.find_json(query).await?;
        self.decode(&json)
    }

    fn decode(&self, json: &[String]) -> Result<Vec<T>> {
        let schema = self.inner.schema();
        let rows = self.inner.codec().decode_rows(schema, json)?;
        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(record) = from_attribute_map::<T>(Some(row))? {
                records.push(record);
            }
        }
        Ok(records)
    }
}
