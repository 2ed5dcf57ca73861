use std::str::FromStr;

use async_trait::async_trait;
use lifetax_core::IncomeHistoryRepository;
use lifetax_core::db::repository::RepositoryError;
use lifetax_core::db::{DbConfig, RepositoryFactory};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::repository::SqliteRepository;

const MEMORY: &str = ":memory:";

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`lifetax_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use lifetax_core::db::RepositoryRegistry;
/// use lifetax_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string`.
    ///
    /// Accepted connection-string values:
    /// * A bare file path, e.g. `"lifetax.db"`. The file is created if it
    ///   does not exist.
    /// * `":memory:"`, an ephemeral in-memory database held by a single
    ///   connection for the lifetime of the repository.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn IncomeHistoryRepository>, RepositoryError> {
        let connected = if config.connection_string == MEMORY {
            let options = SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| RepositoryError::Configuration(e.to_string()))?;
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            let options = SqliteConnectOptions::new()
                .filename(&config.connection_string)
                .create_if_missing(true);
            SqlitePoolOptions::new().connect_with(options).await
        };
        let pool = connected.map_err(|e| RepositoryError::Connection(e.to_string()))?;

        let repo = SqliteRepository::new_with_pool(pool).await;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        info!(database = %config.connection_string, "sqlite repository ready");
        Ok(Box::new(repo))
    }
}
