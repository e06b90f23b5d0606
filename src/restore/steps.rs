use std::path::PathBuf;

use super::{RestorePlan, RestoreStep};
use crate::executor::shell_quote;
use crate::target::Target;
use crate::Result;

/// Decrypts artifacts written with `openssl enc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpensslDecryption {
    pub algorithm: String,
    pub key_file: PathBuf,
}

impl RestoreStep for OpensslDecryption {
    fn contribute(&self, target: &Target, plan: &mut RestorePlan) -> Result<()> {
        if !target.is_encrypted() {
            return Ok(());
        }
        plan.add_decryption_command(format!(
            "openssl enc -d -{} -pass {} -in {} -out {}",
            shell_quote(self.algorithm.trim_start_matches('-')),
            shell_quote(&format!("file:{}", self.key_file.display())),
            shell_quote(&target.filename()),
            shell_quote(&target.filename_decrypted())
        ));
        Ok(())
    }
}

/// Loads a SQL dump into a MySQL database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MysqlRestore {
    pub database: String,
    pub user: Option<String>,
    pub host: Option<String>,
}

impl RestoreStep for MysqlRestore {
    fn contribute(&self, target: &Target, plan: &mut RestorePlan) -> Result<()> {
        let mut command = String::from("mysql");
        if let Some(user) = &self.user {
            command.push_str(&format!(" {}", shell_quote(&format!("--user={}", user))));
        }
        if let Some(host) = &self.host {
            command.push_str(&format!(" {}", shell_quote(&format!("--host={}", host))));
        }
        command.push_str(&format!(
            " {} < {}",
            shell_quote(&self.database),
            shell_quote(target.filename_plain())
        ));
        plan.add_restore_command(command);
        Ok(())
    }
}

/// Copies an extracted directory tree back into place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRestore {
    /// Directory the archive unpacks into, relative to the target directory.
    pub extracted: String,
    pub destination: PathBuf,
}

impl RestoreStep for DirectoryRestore {
    fn contribute(&self, _target: &Target, plan: &mut RestorePlan) -> Result<()> {
        let source = format!("{}/.", self.extracted.trim_end_matches('/'));
        plan.add_restore_command(format!(
            "cp -R {} {}",
            shell_quote(&source),
            shell_quote(&self.destination.to_string_lossy())
        ));
        Ok(())
    }
}
