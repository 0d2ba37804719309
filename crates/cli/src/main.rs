//! Drain - online log template miner
//!
//! # Usage
//!
//! ```bash
//! # Mine templates from log files
//! drain mine /var/log/auth.log -n +1
//!
//! # Keep mining as the file grows, saving state on exit
//! drain mine /var/log/syslog -f --state syslog.json
//!
//! # Print the clusters of a saved state
//! drain show syslog.json --top 20
//! ```

mod cmd;
mod config;
mod output;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use config::{Config, LogFormat};

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

/// Drain - online log template miner
#[derive(Parser, Debug)]
#[command(name = "drain")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cluster log lines into templates
    Mine(cmd::mine::MineArgs),

    /// Print a file's lines without mining them
    Tail(cmd::tail::TailArgs),

    /// Print the clusters of a saved state file
    Show(cmd::show::ShowArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let log_level = resolve_log_level(cli.log_level.as_deref(), &config);
    init_logging(&log_level, config.log.format)?;

    match cli.command {
        Command::Mine(args) => cmd::mine::run(args, &config).await,
        Command::Tail(args) => cmd::tail::run(args, &config).await,
        Command::Show(args) => cmd::show::run(args),
    }
}

/// Load the config file if one was given, defaults otherwise
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::from_file(path)?),
        None => Ok(Config::default()),
    }
}

/// Resolve log level: CLI flag > config file > default "info"
fn resolve_log_level(cli_level: Option<&str>, config: &Config) -> String {
    match cli_level {
        Some(level) => level.to_string(),
        None => config.log.level.as_str().to_string(),
    }
}

/// Initialize the tracing subscriber for logging
///
/// Logs go to stderr; stdout is reserved for command output.
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Console => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_ansi(atty::is(atty::Stream::Stderr)),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}
