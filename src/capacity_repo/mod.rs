// SQLite storage for the capacity fleet. Fleet inventory and raw samples live
// here; the aggregate tables live in capacity_repo::aggregates.

pub mod aggregates;

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::instrument;

use crate::models::{DatabaseRef, DatabaseSizeSample, Instance, InstanceSizeSample};

pub struct CapacityRepo {
    pool: SqlitePool,
}

impl CapacityRepo {
    pub async fn connect(path: &str, max_pool_size: u32) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS instances (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                active INTEGER NOT NULL DEFAULT 1
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Inventory rows arrive from the collector and may precede or outlive
        // the instances row; no foreign key here.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS monitored_databases (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                instance_id INTEGER NOT NULL,
                instance_name TEXT NOT NULL,
                database_name TEXT NOT NULL,
                UNIQUE(instance_id, database_name)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS instance_measurements (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                instance_id INTEGER NOT NULL,
                collected_on TEXT NOT NULL,
                total_size_mb REAL NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_instance_measurements_range
             ON instance_measurements(instance_id, collected_on)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS database_measurements (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                instance_id INTEGER NOT NULL,
                database_name TEXT NOT NULL,
                collected_on TEXT NOT NULL,
                total_size_mb REAL NOT NULL,
                data_file_mb REAL,
                log_file_mb REAL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_database_measurements_range
             ON database_measurements(instance_id, database_name, collected_on)",
        )
        .execute(&self.pool)
        .await?;

        aggregates::ensure_aggregate_tables(&self.pool).await?;

        Ok(())
    }

    // -- fleet inventory ----------------------------------------------------

    pub async fn register_instance(&self, name: &str) -> anyhow::Result<i64> {
        let r = sqlx::query("INSERT INTO instances (name, active) VALUES ($1, 1)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(r.last_insert_rowid())
    }

    pub async fn set_instance_active(&self, instance_id: i64, active: bool) -> anyhow::Result<()> {
        sqlx::query("UPDATE instances SET active = $1 WHERE id = $2")
            .bind(active as i64)
            .bind(instance_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_instance(&self, instance_id: i64) -> anyhow::Result<Option<Instance>> {
        let row = sqlx::query("SELECT id, name, active FROM instances WHERE id = $1")
            .bind(instance_id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(Instance {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            active: row.try_get::<i64, _>("active")? != 0,
        }))
    }

    /// Active instances in id order; the instance-granularity enumeration.
    #[instrument(skip(self), fields(repo = "capacity", operation = "list_active_instances"))]
    pub async fn list_active_instances(&self) -> anyhow::Result<Vec<Instance>> {
        let rows = sqlx::query("SELECT id, name FROM instances WHERE active = 1 ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(Instance {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                active: true,
            });
        }
        Ok(out)
    }

    pub async fn monitor_database(
        &self,
        instance_id: i64,
        instance_name: &str,
        database_name: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO monitored_databases (instance_id, instance_name, database_name)
             VALUES ($1, $2, $3)",
        )
        .bind(instance_id)
        .bind(instance_name)
        .bind(database_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Monitored (instance, database) pairs; the database-granularity enumeration.
    #[instrument(skip(self), fields(repo = "capacity", operation = "list_monitored_databases"))]
    pub async fn list_monitored_databases(&self) -> anyhow::Result<Vec<DatabaseRef>> {
        let rows = sqlx::query(
            "SELECT instance_id, instance_name, database_name
             FROM monitored_databases ORDER BY instance_id, database_name",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(DatabaseRef {
                instance_id: row.try_get("instance_id")?,
                instance_name: row.try_get("instance_name")?,
                database_name: row.try_get("database_name")?,
            });
        }
        Ok(out)
    }

    // -- raw samples (collector write path + engine reads) ------------------

    pub async fn record_instance_sample(&self, sample: &InstanceSizeSample) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO instance_measurements (instance_id, collected_on, total_size_mb)
             VALUES ($1, $2, $3)",
        )
        .bind(sample.instance_id)
        .bind(sample.collected_on)
        .bind(sample.total_size_mb)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn record_database_sample(&self, sample: &DatabaseSizeSample) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO database_measurements
             (instance_id, database_name, collected_on, total_size_mb, data_file_mb, log_file_mb)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(sample.instance_id)
        .bind(&sample.database_name)
        .bind(sample.collected_on)
        .bind(sample.total_size_mb)
        .bind(sample.data_file_mb)
        .bind(sample.log_file_mb)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Instance samples in [start, end], ascending by collection date.
    #[instrument(skip(self), fields(repo = "capacity", operation = "get_instance_samples"))]
    pub async fn get_instance_samples(
        &self,
        instance_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<InstanceSizeSample>> {
        let rows = sqlx::query(
            "SELECT instance_id, collected_on, total_size_mb FROM instance_measurements
             WHERE instance_id = $1 AND collected_on >= $2 AND collected_on <= $3
             ORDER BY collected_on ASC",
        )
        .bind(instance_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(InstanceSizeSample {
                instance_id: row.try_get("instance_id")?,
                collected_on: row.try_get("collected_on")?,
                total_size_mb: row.try_get("total_size_mb")?,
            });
        }
        Ok(out)
    }

    /// Database samples in [start, end], ascending by collection date.
    #[instrument(skip(self), fields(repo = "capacity", operation = "get_database_samples"))]
    pub async fn get_database_samples(
        &self,
        instance_id: i64,
        database_name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<DatabaseSizeSample>> {
        let rows = sqlx::query(
            "SELECT instance_id, database_name, collected_on, total_size_mb, data_file_mb, log_file_mb
             FROM database_measurements
             WHERE instance_id = $1 AND database_name = $2
               AND collected_on >= $3 AND collected_on <= $4
             ORDER BY collected_on ASC",
        )
        .bind(instance_id)
        .bind(database_name)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(DatabaseSizeSample {
                instance_id: row.try_get("instance_id")?,
                database_name: row.try_get("database_name")?,
                collected_on: row.try_get("collected_on")?,
                total_size_mb: row.try_get("total_size_mb")?,
                data_file_mb: row.try_get("data_file_mb")?,
                log_file_mb: row.try_get("log_file_mb")?,
            });
        }
        Ok(out)
    }

    /// Removes a decommissioned instance from the fleet. Aggregate rows keep a
    /// foreign key to instances, so removal fails while any still reference it.
    pub async fn remove_instance(&self, instance_id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM instances WHERE id = $1")
            .bind(instance_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
