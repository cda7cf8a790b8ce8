// Capacity aggregation engine: runners per granularity plus the orchestrator
// that picks windows, sequences runners, and merges outcomes.

pub mod database;
pub mod hooks;
pub mod instance;
pub mod stats;
pub mod summary;

use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

pub use database::DatabaseAggregationRunner;
pub use hooks::{EntityProgress, LogHooks, NoopHooks, ProgressHooks};
pub use instance::InstanceAggregationRunner;
pub use summary::{EntitySummary, RunStatus, RunSummary};

use crate::capacity_repo::CapacityRepo;
use crate::error::AggregationError;
use crate::period::{PeriodBucket, PeriodCalculator, PeriodType};
use summary::RunTally;

/// Which runner(s) an ad hoc recompute targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationScope {
    Instance,
    Database,
    All,
}

impl FromStr for AggregationScope {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instance" => Ok(AggregationScope::Instance),
            "database" => Ok(AggregationScope::Database),
            "all" => Ok(AggregationScope::All),
            other => Err(AggregationError::validation(format!(
                "unsupported scope '{other}' (expected instance, database or all)"
            ))),
        }
    }
}

pub struct AggregationService {
    repo: Arc<CapacityRepo>,
    calendar: PeriodCalculator,
    instance_runner: InstanceAggregationRunner,
    database_runner: DatabaseAggregationRunner,
}

impl AggregationService {
    pub fn new(repo: Arc<CapacityRepo>, calendar: PeriodCalculator) -> Self {
        let instance_runner = InstanceAggregationRunner::new(repo.clone(), calendar.clone());
        let database_runner = DatabaseAggregationRunner::new(repo.clone(), calendar.clone());
        Self {
            repo,
            calendar,
            instance_runner,
            database_runner,
        }
    }

    /// Window rule for fleet-wide and per-entity runs: daily targets the
    /// current (in-progress) day so it refreshes as samples arrive; slower
    /// cadences target the last completed window so partial rollups are never
    /// published.
    fn fleet_bucket(&self, period_type: PeriodType) -> PeriodBucket {
        match period_type {
            PeriodType::Daily => self.calendar.current_period(period_type),
            _ => self.calendar.last_period(period_type),
        }
    }

    /// Fleet-wide run of one granularity across both runners.
    pub async fn aggregate_fleet(
        &self,
        period_type: &str,
        hooks: &dyn ProgressHooks,
    ) -> Result<RunSummary, AggregationError> {
        let period_type: PeriodType = period_type.parse()?;
        let bucket = self.fleet_bucket(period_type);
        info!(period_type = %period_type, window = %bucket, "fleet aggregation");

        let databases = self
            .database_runner
            .aggregate_period(period_type, &bucket, hooks)
            .await?;
        let instances = self
            .instance_runner
            .aggregate_period(period_type, &bucket, hooks)
            .await?;

        Ok(RunSummary::merge(
            &format!("fleet {period_type} {bucket}"),
            [databases, instances],
        ))
    }

    /// Recomputes one instance across the requested granularities (default:
    /// all four) and merges the outcomes. Request validation happens before
    /// any entity is touched.
    pub async fn calculate_instance_aggregations(
        &self,
        instance_id: i64,
        periods: Option<&[String]>,
    ) -> Result<RunSummary, AggregationError> {
        let period_types: Vec<PeriodType> = match periods {
            Some(requested) => requested
                .iter()
                .map(|p| p.parse())
                .collect::<Result<_, _>>()?,
            None => PeriodType::ALL.to_vec(),
        };

        let instance = self
            .repo
            .get_instance(instance_id)
            .await?
            .ok_or_else(|| AggregationError::not_found(format!("instance {instance_id}")))?;

        let mut tally = RunTally::default();
        for period_type in period_types {
            let bucket = self.fleet_bucket(period_type);
            let outcome = self
                .instance_runner
                .aggregate_entity_period(&instance, period_type, &bucket)
                .await;
            tally.record(&outcome);
        }
        Ok(tally.finish(&format!("instance {}", instance.name)))
    }

    /// Ad hoc recompute of the current window for one granularity, scoped to
    /// one or both runners.
    pub async fn aggregate_current_period(
        &self,
        period_type: &str,
        scope: &str,
        hooks: &dyn ProgressHooks,
    ) -> Result<RunSummary, AggregationError> {
        let period_type: PeriodType = period_type.parse()?;
        let scope: AggregationScope = scope.parse()?;
        let bucket = self.calendar.current_period(period_type);
        info!(period_type = %period_type, window = %bucket, scope = ?scope, "current-period aggregation");

        let mut parts = Vec::new();
        if matches!(scope, AggregationScope::Database | AggregationScope::All) {
            parts.push(
                self.database_runner
                    .aggregate_period(period_type, &bucket, hooks)
                    .await?,
            );
        }
        if matches!(scope, AggregationScope::Instance | AggregationScope::All) {
            parts.push(
                self.instance_runner
                    .aggregate_period(period_type, &bucket, hooks)
                    .await?,
            );
        }
        Ok(RunSummary::merge(
            &format!("current {period_type} {bucket}"),
            parts,
        ))
    }
}
