use super::{ArtifactKind, Target};
use crate::executor::{run_checked, shell_quote, CommandExecutor, CommandOutput};
use crate::{Error, Result};

/// Builds the extraction command for a backup artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decompressor {
    /// A single (compressed) file.
    File,
    /// A directory tree packed with tar, compressed or not.
    Directory,
}

impl Decompressor {
    pub fn for_target(target: &Target) -> Self {
        match target.kind() {
            ArtifactKind::File => Decompressor::File,
            ArtifactKind::Directory => Decompressor::Directory,
        }
    }

    /// Command that unpacks the (already decrypted) artifact of `target`.
    pub fn decompress(&self, target: &Target) -> Result<String> {
        let filename = target.filename_decrypted();
        let quoted = shell_quote(&filename);
        match self {
            Decompressor::Directory => Ok(format!("tar -xvf {}", quoted)),
            Decompressor::File => {
                let compression = target.compression().ok_or_else(|| {
                    Error::InvalidOperation(format!(
                        "{} is not compressed, there is nothing to decompress",
                        filename
                    ))
                })?;
                if compression.is_zip() {
                    Ok(format!("unzip {}", quoted))
                } else {
                    Ok(format!(
                        "{} -dk {}",
                        shell_quote(compression.command()),
                        quoted
                    ))
                }
            }
        }
    }

    /// Exit codes that count as a successful extraction.
    pub fn successful_exit_codes(&self, target: &Target) -> &'static [i32] {
        match (self, target.compression()) {
            (Decompressor::File, Some(compression)) => compression.successful_exit_codes(),
            _ => &[0],
        }
    }

    /// Run the extraction inside the target directory.
    pub fn extract(
        &self,
        target: &Target,
        executor: &dyn CommandExecutor,
    ) -> Result<CommandOutput> {
        let command = self.decompress(target)?;
        log::info!("Extracting {}", target.pathname().display());
        run_checked(
            executor,
            &command,
            Some(target.dirname()),
            self.successful_exit_codes(target),
        )
    }
}
