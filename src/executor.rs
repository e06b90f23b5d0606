use std::borrow::Cow;
use std::path::Path;
use std::process::Command;

use crate::{Error, Result};

/// Captured result of one shell command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn succeeded_with(&self, exit_codes: &[i32]) -> bool {
        self.exit_code
            .map(|code| exit_codes.contains(&code))
            .unwrap_or(false)
    }
}

/// Runs command strings built by targets, decompressors and restore plans.
pub trait CommandExecutor {
    fn run(&self, command: &str, working_dir: Option<&Path>) -> Result<CommandOutput>;
}

/// Executes commands through `sh -c`.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        ShellExecutor {
            shell: "sh".to_string(),
        }
    }
}

impl ShellExecutor {
    pub fn with_shell(shell: impl Into<String>) -> Self {
        ShellExecutor {
            shell: shell.into(),
        }
    }
}

impl CommandExecutor for ShellExecutor {
    fn run(&self, command: &str, working_dir: Option<&Path>) -> Result<CommandOutput> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c").arg(command);
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        log::debug!("Running `{}`", command);
        let output = cmd.output()?;
        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Quote `arg` for `sh` when it contains anything beyond plain path characters.
pub fn shell_quote(arg: &str) -> Cow<'_, str> {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=+,@%".contains(c));
    if plain {
        Cow::Borrowed(arg)
    } else {
        Cow::Owned(format!("'{}'", arg.replace('\'', "'\\''")))
    }
}

/// Run `command` and fail unless it exits with one of `exit_codes`.
pub fn run_checked(
    executor: &dyn CommandExecutor,
    command: &str,
    working_dir: Option<&Path>,
    exit_codes: &[i32],
) -> Result<CommandOutput> {
    let output = executor.run(command, working_dir)?;
    if output.succeeded_with(exit_codes) {
        Ok(output)
    } else {
        log::warn!(
            "Command `{}` failed (status {:?}): {}",
            command,
            output.exit_code,
            output.stderr.trim()
        );
        Err(Error::CommandFailed {
            command: command.to_string(),
            exit_code: output.exit_code,
            stderr: output.stderr,
        })
    }
}
