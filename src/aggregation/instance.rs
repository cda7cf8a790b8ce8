// Instance-granularity runner: one aggregate row per active instance per
// window. Entities are processed sequentially; a failure stays inside its
// entity and the run continues.

use std::sync::Arc;

use tracing::warn;

use super::hooks::{self, EntityProgress, ProgressHooks};
use super::stats::{self, ChangeStats};
use super::summary::{EntitySummary, RunStatus, RunSummary, RunTally};
use crate::capacity_repo::CapacityRepo;
use crate::error::AggregationError;
use crate::models::{Instance, InstanceCapacityAggregate};
use crate::period::{PeriodBucket, PeriodCalculator, PeriodType};

pub struct InstanceAggregationRunner {
    repo: Arc<CapacityRepo>,
    calendar: PeriodCalculator,
}

impl InstanceAggregationRunner {
    pub fn new(repo: Arc<CapacityRepo>, calendar: PeriodCalculator) -> Self {
        Self { repo, calendar }
    }

    /// Aggregates every active instance for one window. Per-entity failures
    /// are recorded and the run continues; only a failure to enumerate the
    /// fleet propagates.
    pub async fn aggregate_period(
        &self,
        period_type: PeriodType,
        bucket: &PeriodBucket,
        hooks: &dyn ProgressHooks,
    ) -> Result<RunSummary, AggregationError> {
        let instances = self.repo.list_active_instances().await?;

        let mut tally = RunTally::default();
        for instance in &instances {
            hooks::fire(hooks.on_start(&instance.name), "on_start", &instance.name);

            let outcome = self.process_instance(instance, period_type, bucket).await;
            let progress = EntityProgress::from(&outcome);
            match outcome.status {
                RunStatus::Failed => hooks::fire(
                    hooks.on_error(&instance.name, &progress),
                    "on_error",
                    &instance.name,
                ),
                _ => hooks::fire(
                    hooks.on_complete(&instance.name, &progress),
                    "on_complete",
                    &instance.name,
                ),
            }
            tally.record(&outcome);
        }

        Ok(tally.finish(&format!("instance {period_type} {bucket}")))
    }

    /// Single-entity recompute for one window, used right after new data
    /// arrives for an instance.
    pub async fn aggregate_entity_period(
        &self,
        instance: &Instance,
        period_type: PeriodType,
        bucket: &PeriodBucket,
    ) -> EntitySummary {
        self.process_instance(instance, period_type, bucket).await
    }

    async fn process_instance(
        &self,
        instance: &Instance,
        period_type: PeriodType,
        bucket: &PeriodBucket,
    ) -> EntitySummary {
        match self.try_process(instance, period_type, bucket).await {
            Ok(Some(sample_count)) => EntitySummary::completed(&instance.name, sample_count as u32),
            Ok(None) => EntitySummary::skipped(&instance.name),
            Err(e) => {
                warn!(
                    error = %e,
                    instance = %instance.name,
                    period_type = %period_type,
                    window = %bucket,
                    "instance aggregation failed"
                );
                EntitySummary::failed(&instance.name, format!("{}: {e:#}", instance.name))
            }
        }
    }

    /// Returns Ok(None) when the window holds no samples (skip; nothing written).
    async fn try_process(
        &self,
        instance: &Instance,
        period_type: PeriodType,
        bucket: &PeriodBucket,
    ) -> anyhow::Result<Option<i64>> {
        let samples = self
            .repo
            .get_instance_samples(instance.id, bucket.start, bucket.end)
            .await?;
        let sizes: Vec<f64> = samples.iter().map(|s| s.total_size_mb).collect();
        let Some(summary) = stats::summarize(&sizes) else {
            return Ok(None);
        };

        let change = self
            .previous_window_change(instance, period_type, bucket, summary.avg)
            .await;

        let agg = InstanceCapacityAggregate {
            instance_id: instance.id,
            period_type,
            period_start: bucket.start,
            period_end: bucket.end,
            avg_size_mb: summary.avg,
            max_size_mb: summary.max,
            min_size_mb: summary.min,
            sample_count: summary.count,
            size_change_mb: change.change_mb,
            size_change_percent: change.change_percent,
            growth_rate: change.growth_rate,
            trend_direction: stats::trend_direction(change.change_percent),
        };
        self.repo.upsert_instance_aggregate(&agg).await?;
        Ok(Some(summary.count))
    }

    /// Change stats against the previous window's raw samples. A lookup
    /// failure zero-fills rather than failing the entity.
    async fn previous_window_change(
        &self,
        instance: &Instance,
        period_type: PeriodType,
        bucket: &PeriodBucket,
        current_avg: f64,
    ) -> ChangeStats {
        let prev = self.calendar.previous_period(period_type, bucket);
        match self
            .repo
            .get_instance_samples(instance.id, prev.start, prev.end)
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
                    instance = %instance.name,
                    period_type = %period_type,
                    window = %prev,
                    "previous-period lookup failed; zero-filling change stats"
                );
                ChangeStats::ZERO
            }
        }
    }
}
