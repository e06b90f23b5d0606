mod file;
mod local;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use chrono::{DateTime, Local};

pub use file::File;

/// The existing backups of one job, ordered by modification time.
///
/// Ties on modification time keep discovery order. Built once per run and
/// read-only afterwards; deletion decisions are kept elsewhere.
#[derive(Debug, Clone, Default)]
pub struct FileCollection {
    files: BTreeMap<(DateTime<Local>, usize), File>,
}

impl FileCollection {
    pub fn new() -> Self {
        FileCollection {
            files: BTreeMap::new(),
        }
    }

    pub fn from_files(files: impl IntoIterator<Item = File>) -> Self {
        let files = files
            .into_iter()
            .enumerate()
            .map(|(seq, file)| ((file.modified(), seq), file))
            .collect();
        FileCollection { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn oldest_first(&self) -> impl DoubleEndedIterator<Item = &File> {
        self.files.values()
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &File> {
        self.files.values().rev()
    }

    pub fn newest(&self) -> Option<&File> {
        self.files.values().next_back()
    }

    pub fn total_size(&self) -> u64 {
        self.files.values().map(File::size).sum()
    }
}

impl FromIterator<File> for FileCollection {
    fn from_iter<I: IntoIterator<Item = File>>(iter: I) -> Self {
        FileCollection::from_files(iter)
    }
}
