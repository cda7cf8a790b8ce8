// Pure summary and change statistics. No I/O here; the runners feed in
// sample values and previous-period averages.

use crate::models::TrendDirection;

/// Percent change beyond which a period is labeled growing/shrinking.
const TREND_THRESHOLD_PERCENT: f64 = 5.0;

/// Avg/max/min/count over one metric within one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSummary {
    pub avg: f64,
    pub max: f64,
    pub min: f64,
    pub count: i64,
}

/// Summarizes one metric. Returns None for an empty slice; a window with no
/// samples is skipped, never written as zeros.
pub fn summarize(values: &[f64]) -> Option<MetricSummary> {
    if values.is_empty() {
        return None;
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    Some(MetricSummary {
        avg: mean(values),
        max,
        min,
        count: values.len() as i64,
    })
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / (values.len() as f64)
}

/// Period-over-period deltas of the primary metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeStats {
    pub change_mb: f64,
    pub change_percent: f64,
    pub growth_rate: f64,
}

impl ChangeStats {
    /// Zero-filled defaults, used when no previous-period data exists or the
    /// previous-period lookup fails.
    pub const ZERO: ChangeStats = ChangeStats {
        change_mb: 0.0,
        change_percent: 0.0,
        growth_rate: 0.0,
    };
}

/// Change of `current_avg` against the previous window's raw average.
/// `change_mb` is rounded to whole MB; the percent is rounded to two decimals
/// and reused as the growth rate.
pub fn change_stats(current_avg: f64, previous_avg: Option<f64>) -> ChangeStats {
    let Some(prev) = previous_avg else {
        return ChangeStats::ZERO;
    };
    let change_mb = (current_avg - prev).round();
    let change_percent = if prev > 0.0 {
        round2(change_mb / prev * 100.0)
    } else {
        0.0
    };
    ChangeStats {
        change_mb,
        change_percent,
        growth_rate: change_percent,
    }
}

pub fn trend_direction(change_percent: f64) -> TrendDirection {
    if change_percent > TREND_THRESHOLD_PERCENT {
        TrendDirection::Growing
    } else if change_percent < -TREND_THRESHOLD_PERCENT {
        TrendDirection::Shrinking
    } else {
        TrendDirection::Stable
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
