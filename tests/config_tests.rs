// Config loading and validation tests

use fleetcap::config::AppConfig;

const VALID_CONFIG: &str = r#"
[database]
path = "data/capacity.db"
max_pool_size = 5

[aggregation]
daily_interval_secs = 900
rollup_schedule = "0 2 * * *"
rollup_interval_secs = 86400
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.database.path, "data/capacity.db");
    assert_eq!(config.database.max_pool_size, 5);
    assert_eq!(config.aggregation.daily_interval_secs, 900);
    assert_eq!(config.aggregation.rollup_schedule.as_deref(), Some("0 2 * * *"));
    assert_eq!(config.aggregation.rollup_interval_secs, 86400);
    assert!(config.aggregation.backfill_on_start);
}

#[test]
fn test_config_rollup_schedule_is_optional() {
    let without = VALID_CONFIG.replace("rollup_schedule = \"0 2 * * *\"\n", "");
    let config = AppConfig::load_from_str(&without).expect("load_from_str");
    assert!(config.aggregation.rollup_schedule.is_none());
}

#[test]
fn test_config_validation_rejects_empty_db_path() {
    let bad = VALID_CONFIG.replace("path = \"data/capacity.db\"", "path = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("database.path"));
}

#[test]
fn test_config_validation_rejects_max_pool_size_zero() {
    let bad = VALID_CONFIG.replace("max_pool_size = 5", "max_pool_size = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("max_pool_size"));
}

#[test]
fn test_config_validation_rejects_daily_interval_zero() {
    let bad = VALID_CONFIG.replace("daily_interval_secs = 900", "daily_interval_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("daily_interval_secs"));
}

#[test]
fn test_config_validation_rejects_rollup_interval_zero() {
    let bad = VALID_CONFIG.replace("rollup_interval_secs = 86400", "rollup_interval_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("rollup_interval_secs"));
}

#[test]
fn test_config_validation_rejects_blank_rollup_schedule() {
    let bad = VALID_CONFIG.replace("rollup_schedule = \"0 2 * * *\"", "rollup_schedule = \" \"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("rollup_schedule"));
}

#[test]
fn test_config_backfill_on_start_can_be_disabled() {
    let with_flag = format!("{VALID_CONFIG}backfill_on_start = false\n");
    let config = AppConfig::load_from_str(&with_flag).expect("load_from_str");
    assert!(!config.aggregation.backfill_on_start);
}
