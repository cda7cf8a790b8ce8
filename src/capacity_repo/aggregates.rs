// Aggregate tables: one row per (entity key, period type, period start),
// upserted in place. Readiness DDL is stateless and rerun before every write.

use chrono::{NaiveDate, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use tracing::instrument;

use super::CapacityRepo;
use crate::models::{DatabaseCapacityAggregate, InstanceCapacityAggregate};
use crate::period::PeriodType;

/// Creates the aggregate tables and unique natural-key indexes if not present.
/// Idempotent and cheap when already satisfied; callers invoke it
/// unconditionally before writing.
pub async fn ensure_aggregate_tables(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS instance_capacity_aggregates (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            instance_id INTEGER NOT NULL REFERENCES instances(id),
            period_type TEXT NOT NULL,
            period_start TEXT NOT NULL,
            period_end TEXT NOT NULL,
            avg_size_mb REAL NOT NULL,
            max_size_mb REAL NOT NULL,
            min_size_mb REAL NOT NULL,
            sample_count INTEGER NOT NULL,
            size_change_mb REAL NOT NULL,
            size_change_percent REAL NOT NULL,
            growth_rate REAL NOT NULL,
            trend_direction TEXT NOT NULL,
            computed_at TEXT NOT NULL,
            UNIQUE(instance_id, period_type, period_start)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS database_capacity_aggregates (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            instance_id INTEGER NOT NULL REFERENCES instances(id),
            database_name TEXT NOT NULL,
            period_type TEXT NOT NULL,
            period_start TEXT NOT NULL,
            period_end TEXT NOT NULL,
            avg_size_mb REAL NOT NULL,
            max_size_mb REAL NOT NULL,
            min_size_mb REAL NOT NULL,
            sample_count INTEGER NOT NULL,
            avg_data_file_mb REAL,
            max_data_file_mb REAL,
            min_data_file_mb REAL,
            avg_log_file_mb REAL,
            max_log_file_mb REAL,
            min_log_file_mb REAL,
            size_change_mb REAL NOT NULL,
            size_change_percent REAL NOT NULL,
            growth_rate REAL NOT NULL,
            computed_at TEXT NOT NULL,
            UNIQUE(instance_id, database_name, period_type, period_start)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_instance_aggregates_period
         ON instance_capacity_aggregates(period_type, period_start)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_database_aggregates_period
         ON database_capacity_aggregates(period_type, period_start)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

impl CapacityRepo {
    /// Upserts one instance aggregate by natural key inside its own
    /// transaction. Reruns overwrite the existing row; no duplicates.
    #[instrument(
        skip(self, agg),
        fields(repo = "capacity", operation = "upsert_instance_aggregate",
               instance_id = agg.instance_id, period_type = %agg.period_type)
    )]
    pub async fn upsert_instance_aggregate(
        &self,
        agg: &InstanceCapacityAggregate,
    ) -> anyhow::Result<()> {
        ensure_aggregate_tables(self.pool()).await?;

        let mut tx = self.pool().begin().await?;
        sqlx::query(
            r#"
            INSERT INTO instance_capacity_aggregates
            (instance_id, period_type, period_start, period_end,
             avg_size_mb, max_size_mb, min_size_mb, sample_count,
             size_change_mb, size_change_percent, growth_rate, trend_direction, computed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT(instance_id, period_type, period_start) DO UPDATE SET
                period_end = excluded.period_end,
                avg_size_mb = excluded.avg_size_mb,
                max_size_mb = excluded.max_size_mb,
                min_size_mb = excluded.min_size_mb,
                sample_count = excluded.sample_count,
                size_change_mb = excluded.size_change_mb,
                size_change_percent = excluded.size_change_percent,
                growth_rate = excluded.growth_rate,
                trend_direction = excluded.trend_direction,
                computed_at = excluded.computed_at
            "#,
        )
        .bind(agg.instance_id)
        .bind(agg.period_type.as_str())
        .bind(agg.period_start)
        .bind(agg.period_end)
        .bind(agg.avg_size_mb)
        .bind(agg.max_size_mb)
        .bind(agg.min_size_mb)
        .bind(agg.sample_count)
        .bind(agg.size_change_mb)
        .bind(agg.size_change_percent)
        .bind(agg.growth_rate)
        .bind(agg.trend_direction.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Upserts one database aggregate by natural key inside its own transaction.
    #[instrument(
        skip(self, agg),
        fields(repo = "capacity", operation = "upsert_database_aggregate",
               instance_id = agg.instance_id, database = %agg.database_name,
               period_type = %agg.period_type)
    )]
    pub async fn upsert_database_aggregate(
        &self,
        agg: &DatabaseCapacityAggregate,
    ) -> anyhow::Result<()> {
        ensure_aggregate_tables(self.pool()).await?;

        let mut tx = self.pool().begin().await?;
        sqlx::query(
            r#"
            INSERT INTO database_capacity_aggregates
            (instance_id, database_name, period_type, period_start, period_end,
             avg_size_mb, max_size_mb, min_size_mb, sample_count,
             avg_data_file_mb, max_data_file_mb, min_data_file_mb,
             avg_log_file_mb, max_log_file_mb, min_log_file_mb,
             size_change_mb, size_change_percent, growth_rate, computed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            ON CONFLICT(instance_id, database_name, period_type, period_start) DO UPDATE SET
                period_end = excluded.period_end,
                avg_size_mb = excluded.avg_size_mb,
                max_size_mb = excluded.max_size_mb,
                min_size_mb = excluded.min_size_mb,
                sample_count = excluded.sample_count,
                avg_data_file_mb = excluded.avg_data_file_mb,
                max_data_file_mb = excluded.max_data_file_mb,
                min_data_file_mb = excluded.min_data_file_mb,
                avg_log_file_mb = excluded.avg_log_file_mb,
                max_log_file_mb = excluded.max_log_file_mb,
                min_log_file_mb = excluded.min_log_file_mb,
                size_change_mb = excluded.size_change_mb,
                size_change_percent = excluded.size_change_percent,
                growth_rate = excluded.growth_rate,
                computed_at = excluded.computed_at
            "#,
        )
        .bind(agg.instance_id)
        .bind(&agg.database_name)
        .bind(agg.period_type.as_str())
        .bind(agg.period_start)
        .bind(agg.period_end)
        .bind(agg.avg_size_mb)
        .bind(agg.max_size_mb)
        .bind(agg.min_size_mb)
        .bind(agg.sample_count)
        .bind(agg.avg_data_file_mb)
        .bind(agg.max_data_file_mb)
        .bind(agg.min_data_file_mb)
        .bind(agg.avg_log_file_mb)
        .bind(agg.max_log_file_mb)
        .bind(agg.min_log_file_mb)
        .bind(agg.size_change_mb)
        .bind(agg.size_change_percent)
        .bind(agg.growth_rate)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Aggregate lookup by natural key.
    pub async fn get_instance_aggregate(
        &self,
        instance_id: i64,
        period_type: PeriodType,
        period_start: NaiveDate,
    ) -> anyhow::Result<Option<InstanceCapacityAggregate>> {
        let row = sqlx::query(
            "SELECT * FROM instance_capacity_aggregates
             WHERE instance_id = $1 AND period_type = $2 AND period_start = $3",
        )
        .bind(instance_id)
        .bind(period_type.as_str())
        .bind(period_start)
        .fetch_optional(self.pool())
        .await?;
        row.map(|r| parse_instance_aggregate_row(&r)).transpose()
    }

    /// Aggregate lookup by natural key.
    pub async fn get_database_aggregate(
        &self,
        instance_id: i64,
        database_name: &str,
        period_type: PeriodType,
        period_start: NaiveDate,
    ) -> anyhow::Result<Option<DatabaseCapacityAggregate>> {
        let row = sqlx::query(
            "SELECT * FROM database_capacity_aggregates
             WHERE instance_id = $1 AND database_name = $2
               AND period_type = $3 AND period_start = $4",
        )
        .bind(instance_id)
        .bind(database_name)
        .bind(period_type.as_str())
        .bind(period_start)
        .fetch_optional(self.pool())
        .await?;
        row.map(|r| parse_database_aggregate_row(&r)).transpose()
    }

    pub async fn count_instance_aggregates(&self, instance_id: i64) -> anyhow::Result<i64> {
        let n = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM instance_capacity_aggregates WHERE instance_id = $1",
        )
        .bind(instance_id)
        .fetch_one(self.pool())
        .await?;
        Ok(n)
    }

    pub async fn count_database_aggregates(
        &self,
        instance_id: i64,
        database_name: &str,
    ) -> anyhow::Result<i64> {
        let n = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM database_capacity_aggregates
             WHERE instance_id = $1 AND database_name = $2",
        )
        .bind(instance_id)
        .bind(database_name)
        .fetch_one(self.pool())
        .await?;
        Ok(n)
    }
}

fn parse_period_type(row: &SqliteRow) -> anyhow::Result<PeriodType> {
    let raw: String = row.try_get("period_type")?;
    raw.parse()
        .map_err(|e| anyhow::anyhow!("stored period_type: {}", e))
}

fn parse_instance_aggregate_row(row: &SqliteRow) -> anyhow::Result<InstanceCapacityAggregate> {
    let trend_raw: String = row.try_get("trend_direction")?;
    Ok(InstanceCapacityAggregate {
        instance_id: row.try_get("instance_id")?,
        period_type: parse_period_type(row)?,
        period_start: row.try_get("period_start")?,
        period_end: row.try_get("period_end")?,
        avg_size_mb: row.try_get("avg_size_mb")?,
        max_size_mb: row.try_get("max_size_mb")?,
        min_size_mb: row.try_get("min_size_mb")?,
        sample_count: row.try_get("sample_count")?,
        size_change_mb: row.try_get("size_change_mb")?,
        size_change_percent: row.try_get("size_change_percent")?,
        growth_rate: row.try_get("growth_rate")?,
        trend_direction: trend_raw
            .parse()
            .map_err(|e| anyhow::anyhow!("stored trend_direction: {}", e))?,
    })
}

fn parse_database_aggregate_row(row: &SqliteRow) -> anyhow::Result<DatabaseCapacityAggregate> {
    Ok(DatabaseCapacityAggregate {
        instance_id: row.try_get("instance_id")?,
        database_name: row.try_get("database_name")?,
        period_type: parse_period_type(row)?,
        period_start: row.try_get("period_start")?,
        period_end: row.try_get("period_end")?,
        avg_size_mb: row.try_get("avg_size_mb")?,
        max_size_mb: row.try_get("max_size_mb")?,
        min_size_mb: row.try_get("min_size_mb")?,
        sample_count: row.try_get("sample_count")?,
        avg_data_file_mb: row.try_get("avg_data_file_mb")?,
        max_data_file_mb: row.try_get("max_data_file_mb")?,
        min_data_file_mb: row.try_get("min_data_file_mb")?,
        avg_log_file_mb: row.try_get("avg_log_file_mb")?,
        max_log_file_mb: row.try_get("max_log_file_mb")?,
        min_log_file_mb: row.try_get("min_log_file_mb")?,
        size_change_mb: row.try_get("size_change_mb")?,
        size_change_percent: row.try_get("size_change_percent")?,
        growth_rate: row.try_get("growth_rate")?,
    })
}
