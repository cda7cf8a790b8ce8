use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub aggregation: AggregationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    /// How often to refresh today's daily aggregates.
    pub daily_interval_secs: u64,
    /// Optional cron expression for the weekly/monthly/quarterly pass
    /// (e.g. "0 2 * * *" = 02:00 daily). Uses local time.
    #[serde(default)]
    pub rollup_schedule: Option<String>,
    /// Run the rollup pass every N seconds when rollup_schedule is not set.
    pub rollup_interval_secs: u64,
    /// Run one pass over every granularity at startup.
    #[serde(default = "default_backfill_on_start")]
    pub backfill_on_start: bool,
}

fn default_backfill_on_start() -> bool {
    true
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            self.aggregation.daily_interval_secs > 0,
            "aggregation.daily_interval_secs must be > 0, got {}",
            self.aggregation.daily_interval_secs
        );
        anyhow::ensure!(
            self.aggregation.rollup_interval_secs > 0,
            "aggregation.rollup_interval_secs must be > 0, got {}",
            self.aggregation.rollup_interval_secs
        );
        if let Some(schedule) = &self.aggregation.rollup_schedule {
            anyhow::ensure!(
                !schedule.trim().is_empty(),
                "aggregation.rollup_schedule must be non-empty when set"
            );
        }
        Ok(())
    }
}
