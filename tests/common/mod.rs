// Shared test helpers

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use fleetcap::capacity_repo::CapacityRepo;
use fleetcap::models::{DatabaseSizeSample, InstanceSizeSample};
use tempfile::TempDir;

/// Fresh repo on a temp SQLite file. Keep the TempDir alive for the test's duration.
pub async fn test_repo() -> (TempDir, Arc<CapacityRepo>) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("capacity.db");
    let repo = CapacityRepo::connect(path.to_str().unwrap(), 5)
        .await
        .unwrap();
    repo.init().await.unwrap();
    (dir, Arc::new(repo))
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn seed_instance_sample(
    repo: &CapacityRepo,
    instance_id: i64,
    collected_on: NaiveDate,
    total_size_mb: f64,
) {
    repo.record_instance_sample(&InstanceSizeSample {
        instance_id,
        collected_on,
        total_size_mb,
    })
    .await
    .unwrap();
}

pub async fn seed_database_sample(
    repo: &CapacityRepo,
    instance_id: i64,
    database_name: &str,
    collected_on: NaiveDate,
    total_size_mb: f64,
    data_file_mb: Option<f64>,
    log_file_mb: Option<f64>,
) {
    repo.record_database_sample(&DatabaseSizeSample {
        instance_id,
        database_name: database_name.to_string(),
        collected_on,
        total_size_mb,
        data_file_mb,
        log_file_mb,
    })
    .await
    .unwrap();
}
