mod steps;


use std::path::Path;

use serde::Serialize;

use crate::executor::{run_checked, CommandExecutor};
use crate::target::{ArtifactKind, Decompressor, Target};
use crate::{Error, Result};

pub use steps::{DirectoryRestore, MysqlRestore, OpensslDecryption};

/// Shell commands that bring a backup back: decrypt, then extract, then restore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestorePlan {
    decryption: Vec<String>,
    extract: Vec<String>,
    restore: Vec<String>,
}

impl RestorePlan {
    pub fn new() -> Self {
        RestorePlan::default()
    }

    pub fn add_decryption_command(&mut self, command: impl Into<String>) -> &mut Self {
        self.decryption.push(command.into());
        self
    }

    pub fn add_extract_command(&mut self, command: impl Into<String>) -> &mut Self {
        self.extract.push(command.into());
        self
    }

    pub fn add_restore_command(&mut self, command: impl Into<String>) -> &mut Self {
        self.restore.push(command.into());
        self
    }

    pub fn decryption_commands(&self) -> &[String] {
        &self.decryption
    }

    pub fn extract_commands(&self) -> &[String] {
        &self.extract
    }

    pub fn restore_commands(&self) -> &[String] {
        &self.restore
    }

    pub fn is_empty(&self) -> bool {
        self.decryption.is_empty() && self.extract.is_empty() && self.restore.is_empty()
    }

    /// All commands in execution order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.decryption
            .iter()
            .chain(&self.extract)
            .chain(&self.restore)
            .map(String::as_str)
    }

    /// Run every command in order, stopping at the first one that fails.
    /// Returns the number of commands run.
    pub fn execute(&self, executor: &dyn CommandExecutor, working_dir: Option<&Path>) -> Result<usize> {
        let mut ran = 0;
        for command in self.commands() {
            run_checked(executor, command, working_dir, &[0])?;
            ran += 1;
        }
        Ok(ran)
    }
}

/// A collaborator contributing commands for one stage of a restore.
pub trait RestoreStep {
    fn contribute(&self, target: &Target, plan: &mut RestorePlan) -> Result<()>;
}

/// Assemble the plan for `target`.
///
/// Decryption is required for encrypted targets; extraction is added for
/// compressed files and for directory archives.
pub fn build_restore_plan(
    target: &Target,
    decryption: Option<&dyn RestoreStep>,
    decompressor: Decompressor,
    source: &dyn RestoreStep,
) -> Result<RestorePlan> {
    let mut plan = RestorePlan::new();

    if target.is_encrypted() {
        let step = decryption.ok_or_else(|| {
            Error::Configuration(format!(
                "{} is encrypted but no decryption is configured",
                target.filename()
            ))
        })?;
        step.contribute(target, &mut plan)?;
    }

    if target.is_compressed() || target.kind() == ArtifactKind::Directory {
        plan.add_extract_command(decompressor.decompress(target)?);
    }

    source.contribute(target, &mut plan)?;
    Ok(plan)
}
