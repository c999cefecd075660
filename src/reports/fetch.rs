//! Record fetching
//!
//! The engine depends only on [`RecordFetcher`]; [`SqliteRecordStore`] is the
//! shipped implementation over the clinic database.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::{DispenseRequest, Profile};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Record query task failed: {0}")]
    Task(String),

    #[error("Record source unavailable: {0}")]
    Unavailable(String),
}

/// Source of the raw records a report is built from
#[async_trait]
pub trait RecordFetcher: Send + Sync {
    /// Requests whose visit date lies in the closed interval `[start, end]`
    async fn fetch_dispense_requests(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<DispenseRequest>, FetchError>;

    /// Every profile, unfiltered
    async fn fetch_all_profiles(&self) -> Result<Vec<Profile>, FetchError>;
}

/// Record fetcher backed by the SQLite connection pool.
///
/// Queries run on the blocking pool so both fetches of a load can proceed
/// at the same time without stalling the runtime.
#[derive(Clone)]
pub struct SqliteRecordStore {
    database: Database,
}

impl SqliteRecordStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    async fn query<T, F>(&self, f: F) -> Result<T, FetchError>
    where
        T: Send + 'static,
        F: FnOnce(&rusqlite::Connection) -> crate::db::DbResult<T> + Send + 'static,
    {
        let database = self.database.clone();
        tokio::task::spawn_blocking(move || database.with_conn(f))
            .await
            .map_err(|e| FetchError::Task(e.to_string()))?
            .map_err(FetchError::from)
    }
}

#[async_trait]
impl RecordFetcher for SqliteRecordStore {
    async fn fetch_dispense_requests(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<DispenseRequest>, FetchError> {
        self.query(move |conn| DispenseRequest::list_by_visit_range(conn, &start, &end))
            .await
    }

    async fn fetch_all_profiles(&self) -> Result<Vec<Profile>, FetchError> {
        self.query(Profile::list_all).await
    }
}
