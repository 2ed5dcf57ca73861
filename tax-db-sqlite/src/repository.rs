use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lifetax_core::{
    IncomeHistory, IncomeHistoryRepository, Jurisdiction, RepositoryError, SavedIncomeData,
    StoredIncomeData,
};
use sqlx::{Row, sqlite::SqlitePool};
use tracing::debug;

use crate::decimal::get_decimal;

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }
}

fn database_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid timestamp: {}", secs)))
}

#[async_trait]
impl IncomeHistoryRepository for SqliteRepository {
    async fn insert(
        &self,
        record: &StoredIncomeData,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        sqlx::query(
            "INSERT INTO saved_income_data (seed, jurisdiction, created_at, expires_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&record.seed)
        .bind(record.data.jurisdiction.as_str())
        .bind(record.created_at.timestamp())
        .bind(record.expires_at.timestamp())
        .execute(&mut *tx)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => RepositoryError::Conflict(record.seed.clone()),
            _ => database_error(e),
        })?;

        for (year, income) in record.data.income.iter() {
            sqlx::query("INSERT INTO saved_income_year (seed, year, income) VALUES (?, ?, ?)")
                .bind(&record.seed)
                .bind(year)
                .bind(income.to_string())
                .execute(&mut *tx)
                .await
                .map_err(database_error)?;
        }

        tx.commit().await.map_err(database_error)?;

        debug!(
            seed = %record.seed,
            years = record.data.income.len(),
            "income history inserted"
        );
        Ok(())
    }

    async fn get(
        &self,
        seed: &str,
        now: DateTime<Utc>,
    ) -> Result<StoredIncomeData, RepositoryError> {
        let row = sqlx::query(
            "SELECT seed, jurisdiction, created_at, expires_at
             FROM saved_income_data
             WHERE seed = ? AND expires_at > ?",
        )
        .bind(seed)
        .bind(now.timestamp())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?
        .ok_or(RepositoryError::NotFound)?;

        let code: String = row.try_get("jurisdiction").map_err(database_error)?;
        let jurisdiction = Jurisdiction::parse(&code).ok_or_else(|| {
            RepositoryError::Database(format!("Invalid jurisdiction code: {}", code))
        })?;

        let year_rows = sqlx::query(
            "SELECT year, income FROM saved_income_year WHERE seed = ? ORDER BY year",
        )
        .bind(seed)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        let mut income = IncomeHistory::new();
        for year_row in &year_rows {
            let year: i32 = year_row.try_get("year").map_err(database_error)?;
            income.insert(year, get_decimal(year_row, "income")?);
        }

        Ok(StoredIncomeData {
            seed: row.try_get("seed").map_err(database_error)?,
            data: SavedIncomeData {
                jurisdiction,
                income,
            },
            created_at: timestamp(row.try_get("created_at").map_err(database_error)?)?,
            expires_at: timestamp(row.try_get("expires_at").map_err(database_error)?)?,
        })
    }

    async fn purge_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        sqlx::query(
            "DELETE FROM saved_income_year
             WHERE seed IN (SELECT seed FROM saved_income_data WHERE expires_at <= ?)",
        )
        .bind(now.timestamp())
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        let result = sqlx::query("DELETE FROM saved_income_data WHERE expires_at <= ?")
            .bind(now.timestamp())
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;

        tx.commit().await.map_err(database_error)?;

        Ok(result.rows_affected())
    }
}
