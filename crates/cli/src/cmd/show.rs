//! Show command - print the clusters of a saved state file

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use drain_core::{Drain, SnapshotStore};

use crate::output::{Format, Formatter};

#[cfg(test)]
#[path = "show_test.rs"]
mod tests;

/// Show command arguments
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// State file written by `drain mine --state`
    #[arg(value_name = "STATE")]
    state: PathBuf,

    /// Only print the N largest clusters
    #[arg(long, value_name = "N")]
    top: Option<usize>,

    /// Output format: text (default), json, compact
    #[arg(short = 'o', long = "output", default_value = "text")]
    format: Format,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

/// Run the show command
pub fn run(args: ShowArgs) -> Result<()> {
    let drain = load(&args.state)?;

    Formatter::new(args.format)
        .with_color(super::use_color(args.no_color))
        .with_top(args.top)
        .print(drain.clusters())
        .context("failed to write clusters")?;

    Ok(())
}

/// Restore the engine saved at `path`
fn load(path: &Path) -> Result<Drain> {
    let store = SnapshotStore::new(path);
    let Some(snapshot) = store
        .load()
        .with_context(|| format!("failed to load state '{}'", path.display()))?
    else {
        bail!("state file '{}' does not exist", path.display());
    };

    let drain = Drain::from_snapshot(snapshot)
        .with_context(|| format!("state file '{}' is inconsistent", path.display()))?;
    tracing::debug!(clusters = drain.cluster_count(), "Loaded state");
    Ok(drain)
}
