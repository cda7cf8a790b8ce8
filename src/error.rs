// Caller-facing error taxonomy. Per-entity failures never surface here;
// they are recovered at the entity boundary and reported in the RunSummary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregationError {
    /// Bad request parameter (period type, scope). Raised before any entity is touched.
    #[error("validation: {0}")]
    Validation(String),

    /// Referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Storage failure outside the per-entity boundary (e.g. listing active entities).
    #[error("storage: {0:#}")]
    Storage(anyhow::Error),
}

impl AggregationError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<anyhow::Error> for AggregationError {
    fn from(e: anyhow::Error) -> Self {
        Self::Storage(e)
    }
}
