use std::path::{Component, Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use super::{File, FileCollection};
use crate::date_format;
use crate::Result;

impl FileCollection {
    /// Like [`FileCollection::scan`], over every directory matching `dir_template`.
    ///
    /// Directory components holding date placeholders (`/backups/%Y/%m`) match
    /// any expansion, so backups written on earlier dates are found too.
    pub fn scan_template(dir_template: &Path, pattern: &Regex) -> Result<Self> {
        let mut base = PathBuf::new();
        let mut dated = Vec::new();
        for component in dir_template.components() {
            let templated = match component {
                Component::Normal(name) => {
                    date_format::has_placeholders(&name.to_string_lossy())
                }
                _ => false,
            };
            if templated || !dated.is_empty() {
                let name = component.as_os_str().to_string_lossy();
                let source = format!("^{}$", date_format::placeholders_to_regex(&name));
                dated.push(Regex::new(&source)?);
            } else {
                base.push(component);
            }
        }

        if dated.is_empty() {
            return FileCollection::scan(dir_template, pattern);
        }
        if !base.is_dir() {
            log::debug!("Backup directory {} does not exist yet", base.display());
            return Ok(FileCollection::new());
        }

        let depth = dated.len();
        let mut files = Vec::new();
        let walker = WalkDir::new(&base)
            .max_depth(depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || (entry.file_type().is_dir()
                        && dated[entry.depth() - 1]
                            .is_match(&entry.file_name().to_string_lossy()))
            });
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Skipping unreadable entry in {}: {}", base.display(), err);
                    continue;
                }
            };
            if entry.depth() == depth {
                files.extend(FileCollection::scan(entry.path(), pattern)?.files.into_values());
            }
        }

        log::debug!(
            "Found {} backups under {}",
            files.len(),
            dir_template.display()
        );
        Ok(FileCollection::from_files(files))
    }

    /// Collect the regular files directly inside `dir` whose name matches `pattern`.
    ///
    /// Entries are discovered in file name order so ties on modification time
    /// resolve the same way on every run. A missing directory is an empty collection.
    pub fn scan(dir: &Path, pattern: &Regex) -> Result<Self> {
        if !dir.exists() {
            log::debug!("Backup directory {} does not exist yet", dir.display());
            return Ok(FileCollection::new());
        }
        if !dir.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a directory", dir.display()),
            )
            .into());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Skipping unreadable entry in {}: {}", dir.display(), err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !pattern.is_match(&name) {
                continue;
            }
            match File::from_path(entry.path()) {
                Ok(file) => files.push(file),
                Err(err) => {
                    log::warn!("Failed to read metadata of {}: {}", entry.path().display(), err);
                }
            }
        }

        log::debug!("Found {} backups in {}", files.len(), dir.display());
        Ok(FileCollection::from_files(files))
    }
}
