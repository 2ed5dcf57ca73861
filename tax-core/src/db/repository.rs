use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::StoredIncomeData;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Seed '{0}' is already in use")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Key-value storage of income histories under short seed phrases.
#[async_trait]
pub trait IncomeHistoryRepository: Send + Sync {
    /// Stores `record` under `record.seed`.
    ///
    /// Fails with [`RepositoryError::Conflict`] when the seed is taken,
    /// including by an expired record that has not been purged yet.
    async fn insert(
        &self,
        record: &StoredIncomeData,
    ) -> Result<(), RepositoryError>;

    /// Fetches the record saved under `seed`.
    ///
    /// Records whose `expires_at` is at or before `now` are reported as
    /// [`RepositoryError::NotFound`].
    async fn get(
        &self,
        seed: &str,
        now: DateTime<Utc>,
    ) -> Result<StoredIncomeData, RepositoryError>;

    /// Deletes every record expired at `now`, returning how many went.
    async fn purge_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<u64, RepositoryError>;
}
