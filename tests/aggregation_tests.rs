// Pure statistics tests: metric summaries, change stats, trend thresholds

use fleetcap::aggregation::stats::{change_stats, mean, summarize, trend_direction, ChangeStats};
use fleetcap::models::TrendDirection;

#[test]
fn summarize_empty_returns_none() {
    assert!(summarize(&[]).is_none());
}

#[test]
fn summarize_single_value() {
    let s = summarize(&[512.0]).unwrap();
    assert_eq!(s.avg, 512.0);
    assert_eq!(s.max, 512.0);
    assert_eq!(s.min, 512.0);
    assert_eq!(s.count, 1);
}

#[test]
fn summarize_multiple_computes_avg_min_max() {
    let s = summarize(&[100.0, 200.0, 300.0]).unwrap();
    assert_eq!(s.avg, 200.0);
    assert_eq!(s.min, 100.0);
    assert_eq!(s.max, 300.0);
    assert_eq!(s.count, 3);
}

#[test]
fn mean_of_empty_is_zero() {
    assert_eq!(mean(&[]), 0.0);
}

#[test]
fn change_stats_without_previous_data_zero_fills() {
    let c = change_stats(150.0, None);
    assert_eq!(c, ChangeStats::ZERO);
    assert_eq!(c.change_mb, 0.0);
    assert_eq!(c.change_percent, 0.0);
    assert_eq!(c.growth_rate, 0.0);
}

#[test]
fn change_stats_hundred_vs_eighty() {
    let c = change_stats(100.0, Some(80.0));
    assert_eq!(c.change_mb, 20.0);
    assert_eq!(c.change_percent, 25.0);
    assert_eq!(c.growth_rate, 25.0);
}

#[test]
fn change_stats_rounds_percent_to_two_decimals() {
    // 13 / 90 * 100 = 14.444...
    let c = change_stats(103.0, Some(90.0));
    assert_eq!(c.change_mb, 13.0);
    assert_eq!(c.change_percent, 14.44);
}

#[test]
fn change_stats_rounds_delta_to_whole_mb() {
    let c = change_stats(100.6, Some(80.0));
    assert_eq!(c.change_mb, 21.0);
}

#[test]
fn change_stats_with_zero_previous_average() {
    // previous data exists but averages zero: delta is reported, percent is not
    let c = change_stats(50.0, Some(0.0));
    assert_eq!(c.change_mb, 50.0);
    assert_eq!(c.change_percent, 0.0);
    assert_eq!(c.growth_rate, 0.0);
}

#[test]
fn change_stats_negative_delta() {
    let c = change_stats(60.0, Some(80.0));
    assert_eq!(c.change_mb, -20.0);
    assert_eq!(c.change_percent, -25.0);
}

#[test]
fn trend_is_stable_within_five_percent() {
    assert_eq!(trend_direction(0.0), TrendDirection::Stable);
    assert_eq!(trend_direction(5.0), TrendDirection::Stable);
    assert_eq!(trend_direction(-5.0), TrendDirection::Stable);
}

#[test]
fn trend_flips_beyond_threshold() {
    assert_eq!(trend_direction(5.01), TrendDirection::Growing);
    assert_eq!(trend_direction(25.0), TrendDirection::Growing);
    assert_eq!(trend_direction(-5.01), TrendDirection::Shrinking);
    assert_eq!(trend_direction(-30.0), TrendDirection::Shrinking);
}
