// Background scheduler: refresh today's daily aggregates on a fixed interval;
// run the weekly/monthly/quarterly rollup pass on a configurable schedule
// (cron expression or fixed interval).

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::aggregation::{AggregationService, LogHooks};

const ROLLUP_PERIODS: [&str; 3] = ["weekly", "monthly", "quarterly"];

/// Config for the aggregation worker.
#[derive(Debug, Clone)]
pub struct AggregationWorkerConfig {
    pub daily_interval_secs: u64,
    /// Optional cron expression for the rollup pass (e.g. "0 2 * * *" = 02:00 daily). Uses local time.
    pub rollup_schedule: Option<String>,
    /// Run the rollup pass every N seconds when rollup_schedule is not set.
    pub rollup_interval_secs: u64,
}

/// Spawns the aggregation worker. Returns a join handle.
pub fn spawn(
    service: Arc<AggregationService>,
    config: AggregationWorkerConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        run(service, config).await;
    })
}

#[instrument(skip(service), fields(daily_interval_secs = config.daily_interval_secs))]
async fn run(service: Arc<AggregationService>, config: AggregationWorkerConfig) {
    let mut daily_interval = tokio::time::interval(Duration::from_secs(config.daily_interval_secs));
    daily_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let (rollup_tx, mut rollup_rx) = tokio::sync::mpsc::channel::<()>(1);
    tokio::spawn(rollup_scheduler(config.clone(), rollup_tx));

    loop {
        tokio::select! {
            _ = daily_interval.tick() => {
                match service.aggregate_fleet("daily", &LogHooks).await {
                    Ok(summary) => info!(
                        status = %summary.status,
                        processed = summary.processed,
                        skipped = summary.skipped,
                        failed = summary.failed,
                        "daily refresh"
                    ),
                    Err(e) => warn!(error = %e, "daily aggregation tick failed"),
                }
            }
            _ = rollup_rx.recv() => {
                run_rollup_pass(&service).await;
            }
        }
    }
}

/// Sends a message on `tx` at each rollup time (cron or fixed interval). Uses local time for cron.
async fn rollup_scheduler(config: AggregationWorkerConfig, tx: tokio::sync::mpsc::Sender<()>) {
    if let Some(ref cron_str) = config.rollup_schedule {
        let Ok(schedule) = cron::Schedule::from_str(cron_str) else {
            warn!(cron = %cron_str, "invalid rollup_schedule; rollup pass will not run");
            return;
        };
        loop {
            let now = chrono::Local::now();
            let next = schedule.after(&now).next();
            if let Some(next) = next {
                let delay = (next - now).to_std().unwrap_or(Duration::from_secs(1));
                tokio::time::sleep(delay).await;
                if tx.send(()).await.is_err() {
                    break;
                }
            } else {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
        }
    } else {
        let interval = Duration::from_secs(config.rollup_interval_secs);
        loop {
            tokio::time::sleep(interval).await;
            if tx.send(()).await.is_err() {
                break;
            }
        }
    }
}

/// Runs one weekly + monthly + quarterly pass. Used by the worker loop.
pub async fn run_rollup_pass(service: &AggregationService) {
    for period_type in ROLLUP_PERIODS {
        match service.aggregate_fleet(period_type, &LogHooks).await {
            Ok(summary) => info!(
                period_type,
                status = %summary.status,
                processed = summary.processed,
                skipped = summary.skipped,
                failed = summary.failed,
                "rollup pass"
            ),
            Err(e) => warn!(error = %e, period_type, "rollup pass failed"),
        }
    }
}
