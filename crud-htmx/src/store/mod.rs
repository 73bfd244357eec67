//! Record storage
//!
//! Controllers talk to storage through the [`ModelStore`] trait, which works
//! on schema-shaped JSON records so a single store instance can back any
//! number of models. [`MemoryStore`] covers tests and demos; [`PgStore`]
//! (behind the `postgres` feature) persists to PostgreSQL.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::CrudError;
use crate::schema::ModelSchema;

mod memory;
#[cfg(feature = "postgres")]
mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;

/// Default page size for list queries
pub const DEFAULT_LIMIT: u32 = 100;

/// Upper bound on requested page size
pub const MAX_LIMIT: u32 = 1000;

const fn default_page() -> u32 {
    1
}

const fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Query-string arguments of list requests
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchArgs {
    /// Substring filter over text fields
    pub search: Option<String>,
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u32,
    /// Page size, clamped to [`MAX_LIMIT`]
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for SearchArgs {
    fn default() -> Self {
        Self {
            search: None,
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl SearchArgs {
    /// Effective page size after clamping
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit.clamp(1, MAX_LIMIT)
    }

    /// Row offset of the requested page
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.limit())
    }

    /// The search term, if non-empty
    #[must_use]
    pub fn term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }
}

/// Storage backend for schema-shaped JSON records
///
/// Records are JSON objects whose keys are the schema's field names plus
/// `id`. [`save`](ModelStore::save) inserts when the record carries no id and
/// updates otherwise, returning the record's id either way.
#[async_trait]
pub trait ModelStore: Send + Sync + 'static {
    /// List records matching the search arguments, ordered by id
    async fn list(
        &self,
        schema: &ModelSchema,
        args: &SearchArgs,
    ) -> Result<Vec<Value>, CrudError>;

    /// Fetch one record by id
    async fn find(&self, schema: &ModelSchema, id: i64) -> Result<Option<Value>, CrudError>;

    /// Insert or update a record, returning its id
    async fn save(&self, schema: &ModelSchema, record: Value) -> Result<i64, CrudError>;

    /// Delete a record by id; deleting a missing record is not an error
    async fn delete(&self, schema: &ModelSchema, id: i64) -> Result<(), CrudError>;
}
