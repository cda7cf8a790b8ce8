// Raw capacity samples written by the external collector; read-only input
// to the aggregation engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One collected size sample for a whole instance on a given date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceSizeSample {
    pub instance_id: i64,
    pub collected_on: NaiveDate,
    pub total_size_mb: f64,
}

/// One collected size sample for a database on an instance. The data-file and
/// log-file breakdown is optional; not every collector vendor reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSizeSample {
    pub instance_id: i64,
    pub database_name: String,
    pub collected_on: NaiveDate,
    pub total_size_mb: f64,
    pub data_file_mb: Option<f64>,
    pub log_file_mb: Option<f64>,
}
