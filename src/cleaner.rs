mod deleter;
mod keeper;
mod policies;
mod range;
mod stepwise;
mod types;


use std::collections::HashSet;
use std::path::Path;

use bytesize::ByteSize;
use chrono::{DateTime, Local};

use crate::collection::{File, FileCollection};

pub use deleter::{Deleter, LocalDeleter};
pub use keeper::{Keeper, OnePerGroup};
pub use policies::{Capacity, Outdated, Quantity};
pub use range::Range;
pub use stepwise::{Stepwise, StepwisePolicy};
pub use types::{CleanupPlan, CleanupReport, DeletionFailure};

/// Rule deciding which backups are no longer needed.
#[derive(Debug)]
pub enum Policy {
    Stepwise(Stepwise),
    Quantity(Quantity),
    Outdated(Outdated),
    Capacity(Capacity),
}

impl Policy {
    fn select(&self, collection: &FileCollection, now: DateTime<Local>) -> Vec<File> {
        match self {
            Policy::Stepwise(stepwise) => stepwise.select(collection, now),
            Policy::Quantity(quantity) => quantity.select(collection),
            Policy::Outdated(outdated) => outdated.select(collection, now),
            Policy::Capacity(capacity) => capacity.select(collection),
        }
    }
}

/// Applies a policy to the backups of one job.
///
/// A cleaner is used for a single run: keepers accumulate state while files
/// are classified, so `plan` consumes it. Whatever the policy says, the
/// `retain_latest` newest backups (at least one) are never deleted.
#[derive(Debug)]
pub struct Cleaner {
    policy: Policy,
    retain_latest: usize,
}

impl Cleaner {
    pub fn new(policy: Policy) -> Self {
        Cleaner {
            policy,
            retain_latest: 1,
        }
    }

    pub fn stepwise(ranges: Vec<Range>) -> Self {
        Cleaner::new(Policy::Stepwise(Stepwise::new(ranges)))
    }

    pub fn with_retain_latest(mut self, count: usize) -> Self {
        self.retain_latest = count.max(1);
        self
    }

    pub fn retain_latest(&self) -> usize {
        self.retain_latest
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Classify every file of `collection` as deleted or kept.
    pub fn plan(self, collection: &FileCollection, now: DateTime<Local>) -> CleanupPlan {
        let protected: HashSet<&Path> = collection
            .newest_first()
            .take(self.retain_latest)
            .map(File::path)
            .collect();

        let mut delete = self.policy.select(collection, now);
        delete.retain(|file| {
            let keep = protected.contains(file.path());
            if keep {
                log::debug!("Retaining {}: among the latest backups", file.path().display());
            }
            !keep
        });

        let keep = {
            let doomed: HashSet<&Path> = delete.iter().map(File::path).collect();
            collection
                .newest_first()
                .filter(|file| !doomed.contains(file.path()))
                .cloned()
                .collect()
        };

        CleanupPlan { delete, keep }
    }

    /// Plan and delete in one go.
    pub fn run(
        self,
        collection: &FileCollection,
        now: DateTime<Local>,
        deleter: &dyn Deleter,
    ) -> CleanupReport {
        let plan = self.plan(collection, now);
        execute(&plan, deleter)
    }
}

/// Delete every file the plan marks, one by one.
///
/// Failures are recorded in the report and do not stop the batch.
pub fn execute(plan: &CleanupPlan, deleter: &dyn Deleter) -> CleanupReport {
    let mut report = CleanupReport::new(plan.keep.len(), false);

    for file in &plan.delete {
        match deleter.delete(file) {
            Ok(()) => {
                log::debug!("Deleted {}", file.path().display());
                report.deleted.push(file.path().to_path_buf());
                report.freed_bytes += file.size();
            }
            Err(err) => {
                log::warn!("Failed to remove {}: {}", file.path().display(), err);
                report.failed.push(DeletionFailure {
                    path: file.path().to_path_buf(),
                    reason: err.to_string(),
                });
            }
        }
    }

    log::info!(
        "Cleanup {} finished: {} deleted, {} failed, {} kept, {} freed",
        report.run_id,
        report.deleted_count(),
        report.failed_count(),
        report.kept_count(),
        ByteSize::b(report.freed_bytes)
    );
    report
}
