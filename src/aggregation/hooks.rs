// Progress hooks: the seam an external session/progress tracker attaches to.
// Hooks fire for every entity outcome, including skipped; a failing hook is
// logged and dropped, never allowed to disturb aggregation.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::summary::{EntitySummary, RunStatus};

/// Payload delivered with on_complete / on_error.
#[derive(Debug, Clone, Serialize)]
pub struct EntityProgress {
    pub status: RunStatus,
    pub processed_records: u32,
    pub error: Option<String>,
}

impl From<&EntitySummary> for EntityProgress {
    fn from(summary: &EntitySummary) -> Self {
        Self {
            status: summary.status,
            processed_records: summary.processed_records,
            error: summary.error.clone(),
        }
    }
}

pub trait ProgressHooks: Send + Sync {
    fn on_start(&self, entity: &str) -> anyhow::Result<()> {
        let _ = entity;
        Ok(())
    }

    fn on_complete(&self, entity: &str, progress: &EntityProgress) -> anyhow::Result<()> {
        let _ = (entity, progress);
        Ok(())
    }

    fn on_error(&self, entity: &str, progress: &EntityProgress) -> anyhow::Result<()> {
        let _ = (entity, progress);
        Ok(())
    }
}

/// Hooks that do nothing; the default for callers without a tracker.
pub struct NoopHooks;

impl ProgressHooks for NoopHooks {}

/// Hooks that report progress through tracing.
pub struct LogHooks;

impl ProgressHooks for LogHooks {
    fn on_start(&self, entity: &str) -> anyhow::Result<()> {
        debug!(entity, "entity aggregation started");
        Ok(())
    }

    fn on_complete(&self, entity: &str, progress: &EntityProgress) -> anyhow::Result<()> {
        info!(
            entity,
            status = progress.status.as_str(),
            processed_records = progress.processed_records,
            "entity aggregation finished"
        );
        Ok(())
    }

    fn on_error(&self, entity: &str, progress: &EntityProgress) -> anyhow::Result<()> {
        warn!(
            entity,
            error = progress.error.as_deref().unwrap_or(""),
            "entity aggregation failed"
        );
        Ok(())
    }
}

/// Swallows a hook's own failure.
pub(crate) fn fire(result: anyhow::Result<()>, hook: &str, entity: &str) {
    if let Err(e) = result {
        warn!(error = %e, hook, entity, "progress hook failed; continuing");
    }
}
