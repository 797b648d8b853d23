//! Blocking facade for callers without an async runtime.
//!
//! [`SyncRepository`] and [`SyncTypedRepository`] own a single-threaded
//! Tokio runtime and block the calling thread on each protocol operation.
//! Rows cross the boundary as JSON and are decoded back to attribute maps
//! (or records), the same path the async JSON variants take.
//!
//! Calling them from inside an async runtime would deadlock the runtime's
//! worker, so that is reported as a configuration error instead. Dropping
//! them there is fine: the owned runtime is shut down in the background.

mod typed;

pub use typed::SyncTypedRepository;

use std::future::Future;

use tokio::runtime::{Builder, Handle, Runtime};

use crate::core::schema::TableSchema;
use crate::core::traits::Query;
use crate::core::value::{AttributeMap, Value};
use crate::error::{RepoError, Result};
use crate::repository::Repository;
use crate::schemas::RepositoryKind;

/// Runtime owned by a blocking repository.
pub(crate) struct BlockingRuntime {
    // Only taken in Drop
    runtime: Option<Runtime>,
}

impl BlockingRuntime {
    pub(crate) fn new() -> Result<Self> {
        ensure_outside_runtime()?;
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            runtime: Some(runtime),
        })
    }

    pub(crate) fn block_on<F: Future>(&self, future: F) -> Result<F::Output> {
        ensure_outside_runtime()?;
        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| RepoError::Config("Blocking runtime already shut down".into()))?;
        Ok(runtime.block_on(future))
    }
}

impl Drop for BlockingRuntime {
    fn drop(&mut self) {
        // A plain Runtime drop panics inside another runtime's context
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Blocking wrapper over a [`Repository`].
pub struct SyncRepository {
    runtime: BlockingRuntime,
    inner: Repository,
}

impl SyncRepository {
    pub fn new(schema: TableSchema, connection_string: &str) -> Result<Self> {
        Self::from_repository(Repository::new(schema, connection_string)?)
    }

    /// Repository for a built-in record kind.
    pub fn for_kind(kind: RepositoryKind, connection_string: &str) -> Result<Self> {
        Self::new(kind.schema(), connection_string)
    }

    pub fn from_repository(inner: Repository) -> Result<Self> {
        Ok(Self {
            runtime: BlockingRuntime::new()?,
            inner,
        })
    }

    pub fn repository(&self) -> &Repository {
        &self.inner
    }

    pub fn table_name(&self) -> &str {
        &self.inner.schema().name
    }

    pub fn set_connection_string(&mut self, connection_string: &str) -> Result<()> {
        self.inner.set_connection_string(connection_string)
    }

    pub fn ensure_table(&self) -> Result<()> {
        self.runtime.block_on(self.inner.ensure_table())?
    }

    pub fn reset_table(&self) -> Result<()> {
        self.runtime.block_on(self.inner.reset_table())?
    }

    pub fn table_exists(&self) -> Result<bool> {
        self.runtime.block_on(self.inner.table_exists())?
    }

    pub fn stored_schema_version(&self) -> Result<Option<u32>> {
        self.runtime.block_on(self.inner.stored_schema_version())?
    }

    pub fn add(&self, rows: &[AttributeMap]) -> Result<bool> {
        self.runtime.block_on(self.inner.add(rows))?
    }

    pub fn add_json<S: AsRef<str>>(&self, rows: &[S]) -> Result<bool> {
        self.runtime.block_on(self.inner.add_json(rows))?
    }

    pub fn read(&self, ids: &[Value]) -> Result<Vec<AttributeMap>> {
        let json = self.runtime.block_on(self.inner.read_json(ids))??;
        self.decode(&json)
    }

    pub fn update(&self, id: &Value, attrs: &AttributeMap) -> Result<bool> {
        self.runtime.block_on(self.inner.update(id, attrs))?
    }

    pub fn delete(&self, ids: &[Value]) -> Result<bool> {
        self.runtime.block_on(self.inner.delete(ids))?
    }

    pub fn search(&self, column: &str, value: impl Into<Value>) -> Result<Vec<AttributeMap>> {
        let json = self.runtime.block_on(self.inner.search_json(column, value))??;
        self.decode(&json)
    }

    pub fn find(&self, query: &Query) -> Result<Vec<AttributeMap>> {
        let json = self.runtime.block_on(self.inner.find_json(query))??;
        self.decode(&json)
    }

    pub fn execute_raw(&self, sql: &str) -> Result<String> {
        self.runtime.block_on(self.inner.execute_raw(sql))?
    }

    fn decode(&self, json: &[String]) -> Result<Vec<AttributeMap>> {
        self.inner.codec().decode_rows(self.inner.schema(), json)
    }
}

impl std::fmt::Debug for SyncRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncRepository")
            .field("inner", &self.inner)
            .finish()
    }
}

fn ensure_outside_runtime() -> Result<()> {
    if Handle::try_current().is_ok() {
        return Err(RepoError::Config(
            "Blocking repositories cannot be used from within an async runtime; use Repository instead"
                .into(),
        ));
    }
    Ok(())
}
