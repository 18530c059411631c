//! Command-line interface for agent-rs configuration management

mod render;

use agent_config::{
    ConfigReloader, ConfigStore, OverallStatus, ReloadOutcome, SettingsManager, keys,
};
use agent_utils::{LogLevel, ProjectPaths};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "agent-cli")]
#[command(about = "Reload and inspect agent-rs environment configuration", long_about = None)]
struct Args {
    /// Project root (defaults to TRADINGAGENTS_PROJECT_ROOT, then the current directory)
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,

    /// Configuration file, relative to the project root
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reload the configuration file and show what changed
    Reload,
    /// Show configuration status and validation results
    Status {
        /// Reload the configuration file first
        #[arg(long)]
        reload: bool,
    },
    /// Validate a single key/value pair
    Validate {
        key: String,
        value: String,
    },
    /// Reload, then exit non-zero when the configuration is not usable
    Check,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let store = Arc::new(ConfigStore::from_process_env());
    let level = store
        .get(keys::LOG_LEVEL)
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(LogLevel::Info);
    agent_utils::init_tracing_with_level(level);

    let mut paths = match args.project_root {
        Some(root) => ProjectPaths::new(root),
        None => ProjectPaths::from_env()?,
    };
    if let Some(env_file) = &args.env_file {
        paths = paths.with_env_file(env_file);
    }

    let settings = match SettingsManager::from_snapshot(&store.snapshot()) {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %e, "Ignoring invalid runtime settings from process environment");
            SettingsManager::default()
        }
    };
    let settings = Arc::new(settings);
    let reloader = ConfigReloader::new(paths, Arc::clone(&store)).with_listener(settings.clone());

    info!(command = ?args.command, "Starting agent-cli");

    match args.command {
        Command::Reload => {
            let outcome = reloader.reload();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", render::reload_outcome(&outcome));
            }
            Ok(if outcome.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Status { reload } => {
            let outcome = reload.then(|| reloader.reload());
            print_status(&reloader, outcome.as_ref(), args.json)?;
            Ok(match outcome {
                Some(outcome) if !outcome.success => ExitCode::FAILURE,
                _ => ExitCode::SUCCESS,
            })
        }
        Command::Validate { key, value } => {
            let validation = reloader.validate_key(&key, &value);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&validation)?);
            } else {
                println!("{}", render::validation_line(&key, &validation));
            }
            Ok(if validation.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Check => {
            let outcome = reloader.reload();
            let overall = print_status(&reloader, Some(&outcome), args.json)?;
            Ok(match overall {
                OverallStatus::Critical => ExitCode::from(2),
                _ if !outcome.success => ExitCode::FAILURE,
                OverallStatus::Healthy | OverallStatus::Warning => ExitCode::SUCCESS,
                OverallStatus::Unknown | OverallStatus::Error => ExitCode::FAILURE,
            })
        }
    }
}

/// Print the reload outcome, if any, then the status report; return the overall status
fn print_status(
    reloader: &ConfigReloader,
    reload: Option<&ReloadOutcome>,
    json: bool,
) -> anyhow::Result<OverallStatus> {
    let response = reloader.status_response();
    if json {
        let document = render::StatusDocument {
            reload,
            status: &response,
        };
        println!("{}", render::status_json(&document)?);
    } else {
        if let Some(outcome) = reload {
            println!("{}", render::reload_outcome(outcome));
        }
        println!("{}", render::status_response(&response));
    }
    Ok(match &response {
        agent_config::StatusResponse::Ok(status) => status.validation_results.overall_status,
        agent_config::StatusResponse::Error { .. } => OverallStatus::Error,
    })
}
