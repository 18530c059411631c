//! Project automation tasks for agent-rs

use agent_config::KeyGroup;
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Project automation tasks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all tests
    Test,
    /// Run clippy lints
    Lint,
    /// Check formatting
    Fmt,
    /// Write a `.env.example` listing every tracked configuration key
    EnvExample {
        /// Output path
        #[arg(long, default_value = ".env.example")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Test => cargo(&["test", "--workspace"]),
        Commands::Lint => cargo(&[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ]),
        Commands::Fmt => cargo(&["fmt", "--all", "--", "--check"]),
        Commands::EnvExample { output } => write_env_example(&output),
    }
}

fn cargo(args: &[&str]) -> anyhow::Result<()> {
    println!("Running cargo {}...", args.join(" "));
    let status = Command::new(std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string()))
        .args(args)
        .status()
        .context("failed to spawn cargo")?;
    if !status.success() {
        bail!("cargo {} failed with {}", args.join(" "), status);
    }
    Ok(())
}

fn env_example() -> String {
    let mut content = String::from("# Copy to .env and fill in the values you need\n");
    for group in KeyGroup::ALL {
        content.push_str(&format!("\n# {}\n", group));
        for key in group.keys() {
            content.push_str(&format!("{}=\n", key));
        }
    }
    content
}

fn write_env_example(output: &Path) -> anyhow::Result<()> {
    std::fs::write(output, env_example())
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(())
}
