use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::collection::File;

/// Outcome of classifying a collection: nothing has been deleted yet.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupPlan {
    /// Oldest first.
    pub delete: Vec<File>,
    /// Newest first.
    pub keep: Vec<File>,
}

impl CleanupPlan {
    pub fn is_noop(&self) -> bool {
        self.delete.is_empty()
    }

    /// Report what a real run would do, without touching anything.
    pub fn dry_run_report(&self) -> CleanupReport {
        let mut report = CleanupReport::new(self.keep.len(), true);
        for file in &self.delete {
            report.deleted.push(file.path().to_path_buf());
            report.freed_bytes += file.size();
        }
        report
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletionFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Final account of one cleanup run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupReport {
    pub run_id: String,
    pub dry_run: bool,
    pub deleted: Vec<PathBuf>,
    pub failed: Vec<DeletionFailure>,
    pub kept: usize,
    pub freed_bytes: u64,
}

impl CleanupReport {
    pub(crate) fn new(kept: usize, dry_run: bool) -> Self {
        CleanupReport {
            run_id: uuid::Uuid::new_v4().to_string(),
            dry_run,
            deleted: Vec::new(),
            failed: Vec::new(),
            kept,
            freed_bytes: 0,
        }
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn kept_count(&self) -> usize {
        self.kept
    }

    pub fn attempted(&self) -> usize {
        self.deleted.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}
