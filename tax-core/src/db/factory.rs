use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::repository::{IncomeHistoryRepository, RepositoryError};

/// Backend-agnostic connection configuration.
///
/// `backend` must match the [`RepositoryFactory::backend_name`] of a
/// registered factory. `connection_string` is handed to that factory
/// unchanged; its meaning is backend-specific.
///
/// | backend    | connection_string examples          |
/// |------------|-------------------------------------|
/// | `sqlite`   | `lifetax.db`, `:memory:`            |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: "lifetax.db".to_string(),
        }
    }
}

/// One implementation per storage backend, registered with a
/// [`RepositoryRegistry`] at startup.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Open (or create) the store and return a ready-to-use repository.
    /// Implementations may run migrations here.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn IncomeHistoryRepository>, RepositoryError>;
}

/// [`RepositoryFactory`] instances keyed by backend name.
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory, replacing any with the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch to the factory that matches `config.backend`.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] when no factory is registered
    ///   under that name.
    /// * Any error the chosen factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn IncomeHistoryRepository>, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// tests
// ─────────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use crate::models::StoredIncomeData;

    use super::{
        DbConfig, IncomeHistoryRepository, RepositoryError, RepositoryFactory, RepositoryRegistry,
    };

    // The tests only check routing; the repository is never used.
    struct StubRepository;

    #[async_trait]
    impl IncomeHistoryRepository for StubRepository {
        async fn insert(
            &self,
            _record: &StoredIncomeData,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn get(
            &self,
            _seed: &str,
            _now: DateTime<Utc>,
        ) -> Result<StoredIncomeData, RepositoryError> {
            unimplemented!()
        }
        async fn purge_expired(
            &self,
            _now: DateTime<Utc>,
        ) -> Result<u64, RepositoryError> {
            unimplemented!()
        }
    }

    struct RecordingFactory {
        name: &'static str,
        called: Arc<AtomicBool>,
    }

    #[async_trait]
    impl RepositoryFactory for RecordingFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }

        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn IncomeHistoryRepository>, RepositoryError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(Box::new(StubRepository))
        }
    }

    fn config(backend: &str) -> DbConfig {
        DbConfig {
            backend: backend.to_string(),
            connection_string: ":memory:".to_string(),
        }
    }

    #[test]
    fn default_config_is_sqlite() {
        assert_eq!(DbConfig::default().backend, "sqlite");
    }

    #[test]
    fn available_backends_sorted() {
        let mut registry = RepositoryRegistry::new();
        for name in ["zeta", "alpha"] {
            registry.register(Box::new(RecordingFactory {
                name,
                called: Arc::new(AtomicBool::new(false)),
            }));
        }

        assert_eq!(registry.available_backends(), vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn create_routes_to_matching_factory() {
        let called = Arc::new(AtomicBool::new(false));
        let mut registry = RepositoryRegistry::new();
        registry.register(Box::new(RecordingFactory {
            name: "sqlite",
            called: called.clone(),
        }));

        let result = registry.create(&config("sqlite")).await;

        assert!(result.is_ok());
        assert!(called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn create_unknown_backend_is_configuration_error() {
        let registry = RepositoryRegistry::new();

        let result = registry.create(&config("postgres")).await;

        match result {
            Err(RepositoryError::Configuration(msg)) => assert!(msg.contains("postgres")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }
}
