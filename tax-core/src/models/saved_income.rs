use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{IncomeHistory, Jurisdiction};

/// An income history together with the province it was entered for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedIncomeData {
    pub jurisdiction: Jurisdiction,
    pub income: IncomeHistory,
}

/// A saved income history as held by a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredIncomeData {
    pub seed: String,
    pub data: SavedIncomeData,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl StoredIncomeData {
    pub fn is_expired_at(
        &self,
        now: DateTime<Utc>,
    ) -> bool {
        self.expires_at <= now
    }
}
