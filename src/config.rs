// src/config.rs

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use crate::cleaner::{Capacity, Cleaner, Outdated, Policy, Quantity, Stepwise, StepwisePolicy};
use crate::restore::{
    build_restore_plan, DirectoryRestore, MysqlRestore, OpensslDecryption, RestorePlan,
    RestoreStep,
};
use crate::target::{ArtifactKind, CompressionResolver, Decompressor, Target};
use crate::{Error, Result};

/// Environment variable pointing at the configuration file.
pub const CONFIG_ENV: &str = "BACKUP_ORCHESTRATOR_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub jobs: Vec<JobConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub target: TargetConfig,
    #[serde(default)]
    pub cleanup: Option<CleanupConfig>,
    #[serde(default)]
    pub restore: Option<RestoreConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub dirname: String,
    pub filename: String,
    /// Compressor name or path to its binary.
    pub compress: Option<String>,
    pub crypt_suffix: Option<String>,
    #[serde(default)]
    pub kind: ArtifactKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CleanupConfig {
    Stepwise {
        #[serde(default)]
        keep_all_days: u32,
        #[serde(default)]
        keep_daily_days: u32,
        #[serde(default)]
        keep_weekly_days: u32,
        #[serde(default)]
        keep_monthly_days: u32,
        #[serde(default)]
        keep_yearly_days: u32,
        #[serde(default = "default_retain_latest")]
        retain_latest: usize,
    },
    Quantity {
        amount: usize,
        #[serde(default = "default_retain_latest")]
        retain_latest: usize,
    },
    Outdated {
        /// e.g. `36h`, `14d`, `2w`, `6m`, `1y`
        older_than: String,
        #[serde(default = "default_retain_latest")]
        retain_latest: usize,
    },
    Capacity {
        /// e.g. `500MB`, `2 GiB`
        size: String,
        #[serde(default = "default_retain_latest")]
        retain_latest: usize,
    },
}

fn default_retain_latest() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreConfig {
    #[serde(default)]
    pub decryption: Option<DecryptionConfig>,
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptionConfig {
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    pub key_file: PathBuf,
}

fn default_algorithm() -> String {
    "aes-256-cbc".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    Mysql {
        database: String,
        user: Option<String>,
        host: Option<String>,
    },
    Directory {
        extracted: String,
        destination: PathBuf,
    },
}

impl OrchestratorConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: OrchestratorConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to [`CONFIG_ENV`] and then the user config directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = resolve_config_path(path)?;
        let raw = fs::read_to_string(&path).map_err(|e| {
            Error::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        log::debug!("Loaded configuration from {}", path.display());
        OrchestratorConfig::from_json(&raw)
    }

    pub fn job(&self, name: &str) -> Result<&JobConfig> {
        self.jobs
            .iter()
            .find(|job| job.name == name)
            .ok_or_else(|| Error::Configuration(format!("no job named '{}'", name)))
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for job in &self.jobs {
            if job.name.trim().is_empty() {
                return Err(Error::Configuration("job names must not be empty".to_string()));
            }
            if !seen.insert(job.name.as_str()) {
                return Err(Error::Configuration(format!(
                    "job '{}' is defined more than once",
                    job.name
                )));
            }
        }
        Ok(())
    }
}

pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(value) = env::var(CONFIG_ENV) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value.trim()));
        }
    }
    dirs::config_dir()
        .map(|dir| dir.join("backup-orchestrator").join("config.json"))
        .ok_or_else(|| Error::Configuration("could not find a configuration directory".to_string()))
}

impl JobConfig {
    pub fn resolve_target(
        &self,
        now: &DateTime<Local>,
        resolver: &CompressionResolver,
    ) -> Result<Target> {
        let mut target = Target::new(&self.target.dirname, &self.target.filename, now)?
            .with_kind(self.target.kind);
        if let Some(compress) = &self.target.compress {
            target = target.with_compression(resolver.resolve(compress)?);
        }
        if let Some(suffix) = &self.target.crypt_suffix {
            target = target.with_crypt_suffix(suffix);
        }
        Ok(target)
    }
}

impl CleanupConfig {
    /// A fresh cleaner for one run.
    pub fn cleaner(&self, now: DateTime<Local>) -> Result<Cleaner> {
        let (policy, retain_latest) = match self {
            CleanupConfig::Stepwise {
                keep_all_days,
                keep_daily_days,
                keep_weekly_days,
                keep_monthly_days,
                keep_yearly_days,
                retain_latest,
            } => {
                let policy = StepwisePolicy {
                    keep_all_days: *keep_all_days,
                    keep_daily_days: *keep_daily_days,
                    keep_weekly_days: *keep_weekly_days,
                    keep_monthly_days: *keep_monthly_days,
                    keep_yearly_days: *keep_yearly_days,
                };
                (Policy::Stepwise(Stepwise::from_policy(&policy, now)), *retain_latest)
            }
            CleanupConfig::Quantity {
                amount,
                retain_latest,
            } => (Policy::Quantity(Quantity { amount: *amount }), *retain_latest),
            CleanupConfig::Outdated {
                older_than,
                retain_latest,
            } => (
                Policy::Outdated(Outdated {
                    older_than: parse_age(older_than)?,
                }),
                *retain_latest,
            ),
            CleanupConfig::Capacity {
                size,
                retain_latest,
            } => (
                Policy::Capacity(Capacity {
                    max_size: parse_size(size)?,
                }),
                *retain_latest,
            ),
        };
        Ok(Cleaner::new(policy).with_retain_latest(retain_latest))
    }
}

impl RestoreConfig {
    pub fn build_plan(&self, target: &Target) -> Result<RestorePlan> {
        let decryption = self.decryption.as_ref().map(|d| OpensslDecryption {
            algorithm: d.algorithm.clone(),
            key_file: d.key_file.clone(),
        });
        let source: Box<dyn RestoreStep> = match &self.source {
            SourceConfig::Mysql {
                database,
                user,
                host,
            } => Box::new(MysqlRestore {
                database: database.clone(),
                user: user.clone(),
                host: host.clone(),
            }),
            SourceConfig::Directory {
                extracted,
                destination,
            } => Box::new(DirectoryRestore {
                extracted: extracted.clone(),
                destination: destination.clone(),
            }),
        };
        build_restore_plan(
            target,
            decryption.as_ref().map(|d| d as &dyn RestoreStep),
            Decompressor::for_target(target),
            source.as_ref(),
        )
    }
}

/// Parse `<number><unit>` where unit is one of `s`, `i` (minutes), `h`, `d`,
/// `w`, `m` (30 days) or `y` (365 days), case-insensitive.
pub fn parse_age(input: &str) -> Result<Duration> {
    let trimmed = input.trim();
    let invalid = || Error::Configuration(format!("invalid age '{}'", input));
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (digits, unit) = trimmed.split_at(split);
    let amount: i64 = digits.parse().map_err(|_| invalid())?;
    let seconds_per_unit = match unit.trim().to_ascii_lowercase().as_str() {
        "s" => 1,
        "i" => 60,
        "h" => 3_600,
        "d" => 86_400,
        "w" => 7 * 86_400,
        "m" => 30 * 86_400,
        "y" => 365 * 86_400,
        _ => return Err(invalid()),
    };
    amount
        .checked_mul(seconds_per_unit)
        .and_then(Duration::try_seconds)
        .ok_or_else(invalid)
}

/// Parse a human readable size such as `500MB` or `2 GiB` into bytes.
pub fn parse_size(input: &str) -> Result<u64> {
    input
        .trim()
        .parse::<ByteSize>()
        .map(|size| size.as_u64())
        .map_err(|e| Error::Configuration(format!("invalid size '{}': {}", input, e)))
}
