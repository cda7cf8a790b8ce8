// Database-granularity runner: one aggregate row per monitored
// (instance, database) pair per window. Sub-metrics (data-file and log-file
// sizes) are summarized independently over the samples that report them.

use std::sync::Arc;

use tracing::warn;

use super::hooks::{self, EntityProgress, ProgressHooks};
use super::stats::{self, ChangeStats, MetricSummary};
use super::summary::{EntitySummary, RunStatus, RunSummary, RunTally};
use crate::capacity_repo::CapacityRepo;
use crate::error::AggregationError;
use crate::models::{DatabaseCapacityAggregate, DatabaseRef, DatabaseSizeSample};
use crate::period::{PeriodBucket, PeriodCalculator, PeriodType};

pub struct DatabaseAggregationRunner {
    repo: Arc<CapacityRepo>,
    calendar: PeriodCalculator,
}

impl DatabaseAggregationRunner {
    pub fn new(repo: Arc<CapacityRepo>, calendar: PeriodCalculator) -> Self {
        Self { repo, calendar }
    }

    /// Aggregates every monitored database for one window, isolating failures
    /// per entity. Only a failure to enumerate the fleet propagates.
    pub async fn aggregate_period(
        &self,
        period_type: PeriodType,
        bucket: &PeriodBucket,
        hooks: &dyn ProgressHooks,
    ) -> Result<RunSummary, AggregationError> {
        let databases = self.repo.list_monitored_databases().await?;

        let mut tally = RunTally::default();
        for db in &databases {
            let label = db.label();
            hooks::fire(hooks.on_start(&label), "on_start", &label);

            let outcome = self.process_database(db, period_type, bucket).await;
            let progress = EntityProgress::from(&outcome);
            match outcome.status {
                RunStatus::Failed => {
                    hooks::fire(hooks.on_error(&label, &progress), "on_error", &label)
                }
                _ => hooks::fire(hooks.on_complete(&label, &progress), "on_complete", &label),
            }
            tally.record(&outcome);
        }

        Ok(tally.finish(&format!("database {period_type} {bucket}")))
    }

    /// Single-entity recompute for one window.
    pub async fn aggregate_entity_period(
        &self,
        db: &DatabaseRef,
        period_type: PeriodType,
        bucket: &PeriodBucket,
    ) -> EntitySummary {
        self.process_database(db, period_type, bucket).await
    }

    async fn process_database(
        &self,
        db: &DatabaseRef,
        period_type: PeriodType,
        bucket: &PeriodBucket,
    ) -> EntitySummary {
        let label = db.label();
        match self.try_process(db, period_type, bucket).await {
            Ok(Some(sample_count)) => EntitySummary::completed(&label, sample_count as u32),
            Ok(None) => EntitySummary::skipped(&label),
            Err(e) => {
                warn!(
                    error = %e,
                    instance = %db.instance_name,
                    database = %db.database_name,
                    period_type = %period_type,
                    window = %bucket,
                    "database aggregation failed"
                );
                EntitySummary::failed(&label, format!("{label}: {e:#}"))
            }
        }
    }

    /// Returns Ok(None) when the window holds no samples (skip; nothing written).
    async fn try_process(
        &self,
        db: &DatabaseRef,
        period_type: PeriodType,
        bucket: &PeriodBucket,
    ) -> anyhow::Result<Option<i64>> {
        let samples = self
            .repo
            .get_database_samples(db.instance_id, &db.database_name, bucket.start, bucket.end)
            .await?;
        let sizes: Vec<f64> = samples.iter().map(|s| s.total_size_mb).collect();
        let Some(summary) = stats::summarize(&sizes) else {
            return Ok(None);
        };

        // Sub-metrics over whichever samples report them; missing rows never
        // block the primary metric.
        let data_files = sub_metric(&samples, |s| s.data_file_mb);
        let log_files = sub_metric(&samples, |s| s.log_file_mb);

        let change = self
            .previous_window_change(db, period_type, bucket, summary.avg)
            .await;

        let agg = DatabaseCapacityAggregate {
            instance_id: db.instance_id,
            database_name: db.database_name.clone(),
            period_type,
            period_start: bucket.start,
            period_end: bucket.end,
            avg_size_mb: summary.avg,
            max_size_mb: summary.max,
            min_size_mb: summary.min,
            sample_count: summary.count,
            avg_data_file_mb: data_files.as_ref().map(|s| s.avg),
            max_data_file_mb: data_files.as_ref().map(|s| s.max),
            min_data_file_mb: data_files.as_ref().map(|s| s.min),
            avg_log_file_mb: log_files.as_ref().map(|s| s.avg),
            max_log_file_mb: log_files.as_ref().map(|s| s.max),
            min_log_file_mb: log_files.as_ref().map(|s| s.min),
            size_change_mb: change.change_mb,
            size_change_percent: change.change_percent,
            growth_rate: change.growth_rate,
        };
        self.repo.upsert_database_aggregate(&agg).await?;
        Ok(Some(summary.count))
    }

    async fn previous_window_change(
        &self,
        db: &DatabaseRef,
        period_type: PeriodType,
        bucket: &PeriodBucket,
        current_avg: f64,
    ) -> ChangeStats {
        let prev = self.calendar.previous_period(period_type, bucket);
        match self
            .repo
            .get_database_samples(db.instance_id, &db.database_name, prev.start, prev.end)
            .await
        {
            Ok(rows) if rows.is_empty() => ChangeStats::ZERO,
            Ok(rows) => {
                let sizes: Vec<f64> = rows.iter().map(|s| s.total_size_mb).collect();
                stats::change_stats(current_avg, Some(stats::mean(&sizes)))
            }
            Err(e) => {
                warn!(
                    error = %e,
                    instance = %db.instance_name,
                    database = %db.database_name,
                    period_type = %period_type,
                    window = %prev,
                    "previous-period lookup failed; zero-filling change stats"
                );
                ChangeStats::ZERO
            }
        }
    }
}

fn sub_metric(
    samples: &[DatabaseSizeSample],
    pick: impl Fn(&DatabaseSizeSample) -> Option<f64>,
) -> Option<MetricSummary> {
    let values: Vec<f64> = samples.iter().filter_map(pick).collect();
    stats::summarize(&values)
}
