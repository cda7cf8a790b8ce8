// Fleet entities: instances and the databases monitored on them

use serde::{Deserialize, Serialize};

/// One monitored database instance. `active` controls whether fleet-wide
/// aggregation runs enumerate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub id: i64,
    pub name: String,
    pub active: bool,
}

/// One (instance, database) pair at database granularity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseRef {
    pub instance_id: i64,
    pub instance_name: String,
    pub database_name: String,
}

impl DatabaseRef {
    /// Display label used in logs and progress payloads.
    pub fn label(&self) -> String {
        format!("{}/{}", self.instance_name, self.database_name)
    }
}
