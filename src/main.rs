//! Backup orchestrator command-line tool.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use backup_orchestrator_lib::config::OrchestratorConfig;
use backup_orchestrator_lib::runner::{cleanup_job, restore_plan_for_job};
use backup_orchestrator_lib::{Clock, CompressionResolver, LocalDeleter, SystemClock};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "backup-orchestrator", version, about, long_about = None)]
struct Cli {
    /// Path to the JSON configuration file (defaults to $BACKUP_ORCHESTRATOR_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Delete backups the job's cleanup policy no longer needs
    Cleanup {
        /// Only clean up this job
        #[arg(long)]
        job: Option<String>,

        /// Report what would be deleted without deleting anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the commands restoring the newest backup of a job
    RestorePlan {
        #[arg(long)]
        job: String,
    },

    /// Print the resolved target of a job
    ShowTarget {
        #[arg(long)]
        job: String,
    },
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config =
        OrchestratorConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let clock = SystemClock;

    match cli.command {
        Commands::Cleanup { job, dry_run } => {
            let jobs = match &job {
                Some(name) => vec![config.job(name)?],
                None => config.jobs.iter().collect(),
            };

            let mut failed = false;
            for job in jobs {
                match cleanup_job(job, &clock, &LocalDeleter, dry_run) {
                    Ok(Some(report)) => {
                        failed |= !report.is_success();
                        println!("{}", serde_json::to_string_pretty(&report)?);
                    }
                    Ok(None) => {}
                    Err(err) => {
                        log::error!("Cleanup of {} failed: {}", job.name, err);
                        failed = true;
                    }
                }
            }

            if failed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::RestorePlan { job } => {
            let plan = restore_plan_for_job(config.job(&job)?, &clock)
                .with_context(|| format!("Failed to plan restore of {}", job))?;
            for command in plan.commands() {
                println!("{}", command);
            }
        }
        Commands::ShowTarget { job } => {
            let target = config
                .job(&job)?
                .resolve_target(&clock.now(), &CompressionResolver::default())?;
            let summary = serde_json::json!({
                "pathname": target.pathname(),
                "filename": target.filename(),
                "filename_plain": target.filename_plain(),
                "compression": target.compression().map(|c| c.name()),
                "encrypted": target.is_encrypted(),
                "mime_type": target.mime_type(),
                "pattern": target.filename_regex()?.as_str(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}
