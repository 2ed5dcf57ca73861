pub mod calculations;
pub mod db;
pub mod models;

pub use calculations::{
    CalculationError, LifetimeTaxCalculator, SurtaxError, SurtaxSchedule, SurtaxThresholds,
};
pub use db::repository::{IncomeHistoryRepository, RepositoryError};
pub use db::store::{IncomeHistoryStore, StoreError};
pub use models::*;
