// Library for tests to access modules

pub mod aggregation;
pub mod aggregation_worker;
pub mod backfill;
pub mod capacity_repo;
pub mod config;
pub mod error;
pub mod models;
pub mod period;
