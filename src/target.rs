mod compression;
mod decompressor;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::date_format;
use crate::{Error, Result};

pub use compression::{Compression, CompressionResolver, CompressorSpec, DEFAULT_COMPRESSORS};
pub use decompressor::Decompressor;

/// What a backup artifact contains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    #[default]
    File,
    Directory,
}

/// Fully resolved identity of one backup artifact.
///
/// The on-disk name is `<filename>[.<compression suffix>][.<crypt suffix>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    dirname: PathBuf,
    dirname_template: PathBuf,
    filename: String,
    filename_template: String,
    compression: Option<Compression>,
    crypt_suffix: Option<String>,
    kind: ArtifactKind,
}

impl Target {
    /// Resolve `dirname` and `filename`, expanding `%<letter>` date placeholders against `now`.
    pub fn new(dirname: &str, filename: &str, now: &DateTime<Local>) -> Result<Self> {
        let dir_template = dirname.trim();
        let file_template = filename.trim();
        if dir_template.is_empty() {
            return Err(Error::Configuration(
                "target directory must not be empty".to_string(),
            ));
        }
        if file_template.is_empty() {
            return Err(Error::Configuration(
                "target filename must not be empty".to_string(),
            ));
        }

        let dirname = expand_home(&date_format::expand_placeholders(dir_template, now))?;
        Ok(Target {
            dirname,
            dirname_template: expand_home(dir_template)?,
            filename: date_format::expand_placeholders(file_template, now),
            filename_template: file_template.to_string(),
            compression: None,
            crypt_suffix: None,
            kind: ArtifactKind::File,
        })
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = Some(compression);
        self
    }

    /// Suffix added by encryption, e.g. `enc`. Blank values clear it.
    pub fn with_crypt_suffix(mut self, suffix: &str) -> Self {
        let suffix = suffix.trim().trim_start_matches('.');
        self.crypt_suffix = (!suffix.is_empty()).then(|| suffix.to_string());
        self
    }

    pub fn with_kind(mut self, kind: ArtifactKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn dirname(&self) -> &Path {
        &self.dirname
    }

    /// Unexpanded directory, `~/` already resolved.
    pub fn dirname_template(&self) -> &Path {
        &self.dirname_template
    }

    /// Expanded filename without any suffix.
    pub fn filename_plain(&self) -> &str {
        &self.filename
    }

    /// Unexpanded filename as configured.
    pub fn filename_template(&self) -> &str {
        &self.filename_template
    }

    /// Effective on-disk filename, including compression and crypt suffixes.
    pub fn filename(&self) -> String {
        let mut name = self.filename_decrypted();
        if let Some(suffix) = &self.crypt_suffix {
            name.push('.');
            name.push_str(suffix);
        }
        name
    }

    /// Filename once decrypted: compression suffix only.
    pub fn filename_decrypted(&self) -> String {
        match &self.compression {
            Some(compression) => format!("{}.{}", self.filename, compression.suffix()),
            None => self.filename.clone(),
        }
    }

    pub fn pathname(&self) -> PathBuf {
        self.dirname.join(self.filename())
    }

    pub fn compression(&self) -> Option<&Compression> {
        self.compression.as_ref()
    }

    pub fn crypt_suffix(&self) -> Option<&str> {
        self.crypt_suffix.as_deref()
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn is_compressed(&self) -> bool {
        self.compression.is_some()
    }

    pub fn is_encrypted(&self) -> bool {
        self.crypt_suffix.is_some()
    }

    pub fn mime_type(&self) -> &'static str {
        self.compression
            .as_ref()
            .map(Compression::mime_type)
            .unwrap_or("text/plain")
    }

    fn suffixes(&self) -> String {
        self.filename()[self.filename.len()..].to_string()
    }

    /// Anchored regex matching the artifacts of this target for any date.
    pub fn filename_regex(&self) -> Result<Regex> {
        let source = format!(
            "^{}{}$",
            date_format::placeholders_to_regex(&self.filename_template),
            regex::escape(&self.suffixes())
        );
        Ok(Regex::new(&source)?)
    }

    /// The same target pointed at an existing artifact named `file_name`.
    pub fn at_artifact(&self, file_name: &str) -> Result<Target> {
        if !self.filename_regex()?.is_match(file_name) {
            return Err(Error::InvalidOperation(format!(
                "{} is not an artifact of {}",
                file_name, self.filename_template
            )));
        }
        let suffixes = self.suffixes();
        let plain = file_name.strip_suffix(suffixes.as_str()).unwrap_or(file_name);
        Ok(Target {
            filename: plain.to_string(),
            ..self.clone()
        })
    }

    /// The same target pointed at the existing artifact at `path`, which may
    /// live in a directory expanded for another date.
    pub fn at_path(&self, path: &Path) -> Result<Target> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::InvalidOperation(format!("{} has no file name", path.display()))
            })?;
        let mut target = self.at_artifact(&file_name)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            target.dirname = parent.to_path_buf();
        }
        Ok(target)
    }
}

fn expand_home(input: &str) -> Result<PathBuf> {
    if let Some(rest) = input.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Configuration("could not find home directory".to_string()))?;
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(input))
}
