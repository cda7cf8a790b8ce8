// Aggregate records: one row per (entity key, period type, period start).
// Overwritten in place on rerun; never appended.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::period::PeriodType;

/// Coarse period-over-period growth label. Computed at instance granularity
/// only; database-level aggregates carry no trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Growing,
    Shrinking,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Growing => "growing",
            TrendDirection::Shrinking => "shrinking",
            TrendDirection::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "growing" => Ok(TrendDirection::Growing),
            "shrinking" => Ok(TrendDirection::Shrinking),
            "stable" => Ok(TrendDirection::Stable),
            other => Err(format!("unknown trend direction '{other}'")),
        }
    }
}

/// Instance-granularity aggregate. Natural key: (instance_id, period_type, period_start).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceCapacityAggregate {
    pub instance_id: i64,
    pub period_type: PeriodType,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub avg_size_mb: f64,
    pub max_size_mb: f64,
    pub min_size_mb: f64,
    pub sample_count: i64,
    pub size_change_mb: f64,
    pub size_change_percent: f64,
    pub growth_rate: f64,
    pub trend_direction: TrendDirection,
}

/// Database-granularity aggregate. Natural key:
/// (instance_id, database_name, period_type, period_start).
/// Sub-metric summaries are None when no sample in the window reported them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseCapacityAggregate {
    pub instance_id: i64,
    pub database_name: String,
    pub period_type: PeriodType,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub avg_size_mb: f64,
    pub max_size_mb: f64,
    pub min_size_mb: f64,
    pub sample_count: i64,
    pub avg_data_file_mb: Option<f64>,
    pub max_data_file_mb: Option<f64>,
    pub min_data_file_mb: Option<f64>,
    pub avg_log_file_mb: Option<f64>,
    pub max_log_file_mb: Option<f64>,
    pub min_log_file_mb: Option<f64>,
    pub size_change_mb: f64,
    pub size_change_percent: f64,
    pub growth_rate: f64,
}
