// One-time backfill: run one aggregation pass over every granularity at
// startup so a restarted service converges without waiting for the next tick.

use std::sync::Arc;

use tracing::info;

use crate::aggregation::{AggregationService, NoopHooks};
use crate::period::PeriodType;

/// Runs one fleet-wide pass per granularity (daily current window, slower
/// cadences last completed window).
pub async fn run_backfill(service: Arc<AggregationService>) -> anyhow::Result<()> {
    for period_type in PeriodType::ALL {
        let summary = service
            .aggregate_fleet(period_type.as_str(), &NoopHooks)
            .await?;
        info!(
            period_type = %period_type,
            status = %summary.status,
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            "backfill pass"
        );
    }
    info!("backfill complete");
    Ok(())
}
