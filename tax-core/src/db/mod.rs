pub mod factory;
pub mod repository;
pub mod seed;
pub mod store;

pub use factory::{DbConfig, RepositoryFactory, RepositoryRegistry};
pub use seed::{generate_seed, is_valid_seed};
pub use store::DEFAULT_RETENTION_DAYS;
