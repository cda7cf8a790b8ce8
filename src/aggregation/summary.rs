// Per-invocation result values. Not persisted; callers render or forward them.

use serde::Serialize;

/// Outcome of a run or merged set of runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Skipped,
    Failed,
}

impl RunStatus {
    /// Uniform derivation: any failure wins, then all-skipped, then completed.
    pub fn derive(processed: u32, failed: u32) -> RunStatus {
        if failed > 0 {
            RunStatus::Failed
        } else if processed == 0 {
            RunStatus::Skipped
        } else {
            RunStatus::Completed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Completed => "completed",
            RunStatus::Skipped => "skipped",
            RunStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one fleet-wide run (or a merge of several).
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub status: RunStatus,
    pub processed: u32,
    pub skipped: u32,
    pub failed: u32,
    pub message: String,
    pub errors: Vec<String>,
}

impl RunSummary {
    /// Folds several run summaries into one: counts summed, errors
    /// concatenated, status re-derived from the totals.
    pub fn merge(label: &str, parts: impl IntoIterator<Item = RunSummary>) -> RunSummary {
        let mut tally = RunTally::default();
        for part in parts {
            tally.processed += part.processed;
            tally.skipped += part.skipped;
            tally.failed += part.failed;
            tally.errors.extend(part.errors);
        }
        tally.finish(label)
    }
}

/// Result of processing a single entity for a single window.
#[derive(Debug, Clone, Serialize)]
pub struct EntitySummary {
    pub status: RunStatus,
    pub processed_records: u32,
    pub message: String,
    pub error: Option<String>,
}

impl EntitySummary {
    pub fn completed(entity: &str, processed_records: u32) -> Self {
        Self {
            status: RunStatus::Completed,
            processed_records,
            message: format!("{entity}: aggregated {processed_records} samples"),
            error: None,
        }
    }

    pub fn skipped(entity: &str) -> Self {
        Self {
            status: RunStatus::Skipped,
            processed_records: 0,
            message: format!("{entity}: no measurements in window"),
            error: None,
        }
    }

    pub fn failed(entity: &str, error: String) -> Self {
        Self {
            status: RunStatus::Failed,
            processed_records: 0,
            message: format!("{entity}: aggregation failed"),
            error: Some(error),
        }
    }
}

/// Running counts while a runner walks its entities.
#[derive(Debug, Default)]
pub struct RunTally {
    pub processed: u32,
    pub skipped: u32,
    pub failed: u32,
    pub errors: Vec<String>,
}

impl RunTally {
    pub fn record(&mut self, outcome: &EntitySummary) {
        match outcome.status {
            RunStatus::Completed => self.processed += 1,
            RunStatus::Skipped => self.skipped += 1,
            RunStatus::Failed => self.failed += 1,
        }
        if let Some(e) = &outcome.error {
            self.errors.push(e.clone());
        }
    }

    pub fn finish(self, label: &str) -> RunSummary {
        let status = RunStatus::derive(self.processed, self.failed);
        let message = format!(
            "{label}: {} processed, {} skipped, {} failed",
            self.processed, self.skipped, self.failed
        );
        RunSummary {
            status,
            processed: self.processed,
            skipped: self.skipped,
            failed: self.failed,
            message,
            errors: self.errors,
        }
    }
}
