//! Saving and loading income histories under generated seed phrases.

use chrono::{Duration, SubsecRound, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::db::repository::{IncomeHistoryRepository, RepositoryError};
use crate::db::seed::{generate_seed, is_valid_seed};
use crate::models::{SavedIncomeData, StoredIncomeData};

/// How long a saved history stays retrievable unless configured otherwise.
pub const DEFAULT_RETENTION_DAYS: i64 = 365;

const MAX_SEED_ATTEMPTS: usize = 8;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("'{0}' is not a valid seed (expected three lowercase words joined by hyphens)")]
    InvalidSeed(String),

    #[error("no saved income history for '{0}'")]
    NotFound(String),

    #[error("no unused seed found after {0} attempts")]
    SeedsExhausted(usize),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// `save(history) -> seed` / `load(seed) -> history` on top of an
/// [`IncomeHistoryRepository`], with expiry.
pub struct IncomeHistoryStore {
    repo: Box<dyn IncomeHistoryRepository>,
    retention: Duration,
    generate: fn() -> String,
}

impl IncomeHistoryStore {
    pub fn new(repo: Box<dyn IncomeHistoryRepository>) -> Self {
        Self {
            repo,
            retention: Duration::days(DEFAULT_RETENTION_DAYS),
            generate: generate_seed,
        }
    }

    pub fn with_retention(
        mut self,
        retention: Duration,
    ) -> Self {
        self.retention = retention;
        self
    }

    /// Replaces the seed generator, e.g. with a deterministic one.
    pub fn with_seed_generator(
        mut self,
        generate: fn() -> String,
    ) -> Self {
        self.generate = generate;
        self
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Stores `data` under a fresh seed and returns the stored record.
    ///
    /// A seed already in use is replaced by a newly generated one, up to a
    /// fixed number of attempts.
    pub async fn save(
        &self,
        data: &SavedIncomeData,
    ) -> Result<StoredIncomeData, StoreError> {
        let created_at = Utc::now().trunc_subsecs(0);
        let expires_at = created_at + self.retention;

        for attempt in 1..=MAX_SEED_ATTEMPTS {
            let record = StoredIncomeData {
                seed: (self.generate)(),
                data: data.clone(),
                created_at,
                expires_at,
            };

            match self.repo.insert(&record).await {
                Ok(()) => {
                    info!(
                        seed = %record.seed,
                        years = data.income.len(),
                        %expires_at,
                        "income history saved"
                    );
                    return Ok(record);
                }
                Err(RepositoryError::Conflict(seed)) => {
                    debug!(%seed, attempt, "seed already in use, generating another");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StoreError::SeedsExhausted(MAX_SEED_ATTEMPTS))
    }

    /// Loads the unexpired history saved under `seed`.
    pub async fn load(
        &self,
        seed: &str,
    ) -> Result<StoredIncomeData, StoreError> {
        let seed = seed.trim();
        if !is_valid_seed(seed) {
            return Err(StoreError::InvalidSeed(seed.to_string()));
        }

        match self.repo.get(seed, Utc::now()).await {
            Ok(record) => Ok(record),
            Err(RepositoryError::NotFound) => Err(StoreError::NotFound(seed.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes every expired record.
    pub async fn purge_expired(&self) -> Result<u64, StoreError> {
        let removed = self.repo.purge_expired(Utc::now()).await?;
        info!(removed, "expired income histories purged");
        Ok(removed)
    }
}
