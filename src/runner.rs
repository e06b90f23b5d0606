// src/runner.rs

use crate::cleaner::{execute, CleanupReport, Deleter};
use crate::clock::Clock;
use crate::collection::FileCollection;
use crate::config::JobConfig;
use crate::restore::RestorePlan;
use crate::target::{CompressionResolver, Target};
use crate::{Error, Result};

/// Existing artifacts of `target`, in every directory its dirname template
/// expands to.
pub fn collect_backups(target: &Target) -> Result<FileCollection> {
    let pattern = target.filename_regex()?;
    FileCollection::scan_template(target.dirname_template(), &pattern)
}

/// Apply the job's cleanup policy to its backup directory.
///
/// Returns `Ok(None)` when the job has no cleanup configured.
pub fn cleanup_job(
    job: &JobConfig,
    clock: &dyn Clock,
    deleter: &dyn Deleter,
    dry_run: bool,
) -> Result<Option<CleanupReport>> {
    let Some(cleanup) = &job.cleanup else {
        log::info!("Job {} has no cleanup configured, skipping", job.name);
        return Ok(None);
    };

    let now = clock.now();
    let target = job.resolve_target(&now, &CompressionResolver::default())?;
    let collection = collect_backups(&target)?;
    log::info!(
        "Cleaning up {}: {} backups under {}",
        job.name,
        collection.len(),
        target.dirname_template().display()
    );

    let plan = cleanup.cleaner(now)?.plan(&collection, now);
    let report = if dry_run {
        for file in &plan.delete {
            log::info!("Would delete {}", file.path().display());
        }
        plan.dry_run_report()
    } else {
        execute(&plan, deleter)
    };
    Ok(Some(report))
}

/// Restore plan for the newest existing artifact of the job.
pub fn restore_plan_for_job(job: &JobConfig, clock: &dyn Clock) -> Result<RestorePlan> {
    let restore = job.restore.as_ref().ok_or_else(|| {
        Error::Configuration(format!("job {} has no restore configured", job.name))
    })?;

    let now = clock.now();
    let target = job.resolve_target(&now, &CompressionResolver::default())?;
    let collection = collect_backups(&target)?;
    let newest = collection.newest().ok_or_else(|| {
        Error::InvalidOperation(format!(
            "no backups of {} found under {}",
            job.name,
            target.dirname_template().display()
        ))
    })?;

    log::debug!("Planning restore of {}", newest.path().display());
    let artifact = target.at_path(newest.path())?;
    restore.build_plan(&artifact)
}
