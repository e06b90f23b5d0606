use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::Result;

/// Snapshot of one backup artifact. Later changes on disk are not reflected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct File {
    path: PathBuf,
    modified: DateTime<Local>,
    size: u64,
}

impl File {
    pub fn new(path: impl Into<PathBuf>, modified: DateTime<Local>, size: u64) -> Self {
        File {
            path: path.into(),
            modified,
            size,
        }
    }

    /// Read size and modification time from filesystem metadata.
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path)?;
        let modified = DateTime::<Local>::from(metadata.modified()?);
        Ok(File::new(path, modified, metadata.len()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn modified(&self) -> DateTime<Local> {
        self.modified
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Age in whole seconds relative to `now`; negative for files from the future.
    pub fn age_at(&self, now: DateTime<Local>) -> i64 {
        now.signed_duration_since(self.modified).num_seconds()
    }
}
