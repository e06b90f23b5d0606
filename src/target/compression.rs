use std::path::Path;

use crate::{Error, Result};

/// Static description of a compressor binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressorSpec {
    pub name: &'static str,
    pub suffix: &'static str,
    pub mime_type: &'static str,
    /// Can read stdin and write stdout inside a shell pipeline.
    pub pipeable: bool,
    pub exit_codes: &'static [i32],
}

/// The compressors known out of the box.
pub const DEFAULT_COMPRESSORS: &[CompressorSpec] = &[
    CompressorSpec {
        name: "gzip",
        suffix: "gz",
        mime_type: "application/x-gzip",
        pipeable: true,
        exit_codes: &[0],
    },
    CompressorSpec {
        name: "bzip2",
        suffix: "bz2",
        mime_type: "application/x-bzip2",
        pipeable: true,
        exit_codes: &[0],
    },
    CompressorSpec {
        name: "xz",
        suffix: "xz",
        mime_type: "application/x-xz",
        pipeable: true,
        exit_codes: &[0],
    },
    CompressorSpec {
        name: "zip",
        suffix: "zip",
        mime_type: "application/zip",
        pipeable: false,
        exit_codes: &[0],
    },
];

/// A resolved compressor: the command as configured plus its static description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compression {
    command: String,
    spec: CompressorSpec,
}

impl Compression {
    /// Binary name the compressor was recognised by (`gzip`, `zip`, ...).
    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    /// Invocation command; keeps the full path when one was configured.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn suffix(&self) -> &'static str {
        self.spec.suffix
    }

    pub fn mime_type(&self) -> &'static str {
        self.spec.mime_type
    }

    pub fn is_pipeable(&self) -> bool {
        self.spec.pipeable
    }

    pub fn successful_exit_codes(&self) -> &'static [i32] {
        self.spec.exit_codes
    }

    pub fn is_zip(&self) -> bool {
        self.spec.name == "zip"
    }
}

/// Maps user supplied compressor identifiers onto a compressor table.
#[derive(Debug, Clone, Copy)]
pub struct CompressionResolver {
    table: &'static [CompressorSpec],
}

impl Default for CompressionResolver {
    fn default() -> Self {
        CompressionResolver::new(DEFAULT_COMPRESSORS)
    }
}

impl CompressionResolver {
    pub fn new(table: &'static [CompressorSpec]) -> Self {
        CompressionResolver { table }
    }

    /// Resolve a name (`gzip`) or a path to a binary (`/usr/local/bin/gzip`).
    ///
    /// Only the trailing binary name is matched against the table; the full
    /// identifier is kept as the invocation command.
    pub fn resolve(&self, identifier: &str) -> Result<Compression> {
        let command = identifier.trim();
        let binary = Path::new(command)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();

        self.table
            .iter()
            .find(|spec| spec.name == binary)
            .map(|spec| Compression {
                command: command.to_string(),
                spec: *spec,
            })
            .ok_or_else(|| Error::UnsupportedCompression(identifier.to_string()))
    }
}
