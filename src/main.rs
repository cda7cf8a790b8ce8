use anyhow::Result;
use fleetcap::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let repo = Arc::new(
        capacity_repo::CapacityRepo::connect(
            &app_config.database.path,
            app_config.database.max_pool_size,
        )
        .await?,
    );
    repo.init().await?;

    let service = Arc::new(aggregation::AggregationService::new(
        repo,
        period::PeriodCalculator::new(),
    ));

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        database = %app_config.database.path,
        "fleetcap starting"
    );

    if app_config.aggregation.backfill_on_start
        && let Err(e) = backfill::run_backfill(service.clone()).await
    {
        tracing::warn!(error = %e, "startup backfill failed");
    }

    let worker_handle = aggregation_worker::spawn(
        service,
        aggregation_worker::AggregationWorkerConfig {
            daily_interval_secs: app_config.aggregation.daily_interval_secs,
            rollup_schedule: app_config.aggregation.rollup_schedule.clone(),
            rollup_interval_secs: app_config.aggregation.rollup_interval_secs,
        },
    );

    shutdown_signal().await;
    tracing::info!("Received shutdown signal");
    worker_handle.abort();

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
