//! SQLite-based run history store

use crate::core::RunStatus;
use crate::persistence::{PersistenceBackend, RunSummary};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

const SELECT_COLUMNS: &str = "id, lease_name, status, calculated_at, term_months, \
    initial_liability, rou_asset, total_interest, total_payments, error";

/// SQLite run store
pub struct SqliteRunStore {
    pool: SqlitePool,
}

impl SqliteRunStore {
    /// Open (or create) a store at `db_path`; `:memory:` gives a private database
    pub async fn new(db_path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path))
            .context("Invalid database path")?
            .create_if_missing(true);

        // A single connection keeps `:memory:` databases shared across queries
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.init().await?;
        debug!("Opened run history at {}", db_path);

        Ok(store)
    }

    /// Default database location under the platform data directory
    pub fn default_path() -> PathBuf {
        let data_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        data_dir.join("leasebook").join("runs.db")
    }

    /// Open the store at a path, creating parent directories
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create history directory {}", parent.display())
                })?;
            }
        }
        let path_str = path
            .to_str()
            .with_context(|| format!("Database path is not valid UTF-8: {}", path.display()))?;
        Self::new(path_str).await
    }

    /// Create store with default path
    pub async fn with_default_path() -> Result<Self> {
        Self::open(&Self::default_path()).await
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                id TEXT PRIMARY KEY,
                lease_name TEXT NOT NULL,
                status TEXT NOT NULL,
                calculated_at TEXT NOT NULL,
                term_months INTEGER NOT NULL DEFAULT 0,
                initial_liability REAL NOT NULL DEFAULT 0.0,
                rou_asset REAL NOT NULL DEFAULT 0.0,
                total_interest REAL NOT NULL DEFAULT 0.0,
                total_payments REAL NOT NULL DEFAULT 0.0,
                error TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_lease_name ON runs(lease_name);
            CREATE INDEX IF NOT EXISTS idx_calculated_at ON runs(calculated_at);
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to initialise run history schema")?;

        Ok(())
    }

    /// Convert DateTime<Utc> to NaiveDateTime for SQLite
    fn to_naive(dt: DateTime<Utc>) -> NaiveDateTime {
        dt.naive_utc()
    }

    /// Convert NaiveDateTime to DateTime<Utc>
    fn from_naive(dt: NaiveDateTime) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(dt, Utc)
    }

    fn from_row(row: &SqliteRow) -> Result<RunSummary> {
        let status: String = row.get("status");
        Ok(RunSummary {
            run_id: Uuid::parse_str(&row.get::<String, _>("id"))?,
            lease_name: row.get("lease_name"),
            status: RunStatus::from_str(&status).unwrap_or(RunStatus::Failed),
            calculated_at: Self::from_naive(row.get("calculated_at")),
            term_months: row.get::<i64, _>("term_months") as u32,
            initial_liability: row.get("initial_liability"),
            rou_asset: row.get("rou_asset"),
            total_interest: row.get("total_interest"),
            total_payments: row.get("total_payments"),
            error: row.get("error"),
        })
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for SqliteRunStore {
    async fn save_run(&self, run: &RunSummary) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO runs
            (id, lease_name, status, calculated_at, term_months, initial_liability, rou_asset, total_interest, total_payments, error)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(run.run_id.to_string())
        .bind(&run.lease_name)
        .bind(run.status.to_string())
        .bind(Self::to_naive(run.calculated_at))
        .bind(run.term_months as i64)
        .bind(run.initial_liability)
        .bind(run.rou_asset)
        .bind(run.total_interest)
        .bind(run.total_payments)
        .bind(&run.error)
        .execute(&self.pool)
        .await
        .context("Failed to save run")?;

        Ok(())
    }

    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>> {
        let row = sqlx::query(&format!("SELECT {} FROM runs WHERE id = ?1", SELECT_COLUMNS))
            .bind(run_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load run")?;

        row.as_ref().map(Self::from_row).transpose()
    }

    async fn list_runs(&self, lease_name: &str) -> Result<Vec<RunSummary>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM runs WHERE lease_name = ?1 ORDER BY calculated_at DESC",
            SELECT_COLUMNS
        ))
        .bind(lease_name)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list runs")?;

        rows.iter().map(Self::from_row).collect()
    }

    async fn list_leases(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT lease_name
            FROM runs
            ORDER BY lease_name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list leases")?;

        Ok(rows.iter().map(|row| row.get("lease_name")).collect())
    }
}
