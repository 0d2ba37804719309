//! Mine command - cluster log files into templates
//!
//! Tails every file into one funnel, then prints the clusters largest
//! first. With `--state` the engine resumes from a saved snapshot and the
//! result is written back; with `--follow` it keeps mining until Ctrl+C.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Args;
use drain_core::{Drain, DrainConfig, SnapshotStore};
use drain_tail::{FileTailer, FromLine, LinePreprocessor, TailOptions, spawn_funnel};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::output::{Format, Formatter};

#[cfg(test)]
#[path = "mine_test.rs"]
mod tests;

/// Mine command arguments
#[derive(Args, Debug)]
pub struct MineArgs {
    /// Log files to mine
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Keep reading as the files grow, until Ctrl+C
    #[arg(short, long)]
    follow: bool,

    /// Start at the last NUM lines, or at line NUM with a leading '+'
    #[arg(short = 'n', long = "lines", value_name = "[+]NUM")]
    lines: Option<FromLine>,

    /// Only mine the text after the first occurrence of this string
    #[arg(long, value_name = "STR")]
    parse_after_str: Option<String>,

    /// Only mine the text from this character column on
    #[arg(long, value_name = "COL")]
    parse_after_col: Option<usize>,

    /// Extra token delimiters, added to the configured ones
    #[arg(long, value_name = "CHARS")]
    delimiters: Option<String>,

    /// Tree depth
    #[arg(long, value_name = "N")]
    depth: Option<usize>,

    /// Maximum literal children per tree node
    #[arg(long, value_name = "N")]
    max_children: Option<usize>,

    /// Similarity threshold (0.0 - 1.0)
    #[arg(long, value_name = "X")]
    similarity: Option<f64>,

    /// Snapshot file to resume from and save to
    #[arg(long, value_name = "PATH")]
    state: Option<PathBuf>,

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

impl MineArgs {
    /// Engine settings with command-line overrides applied
    pub fn engine_config(&self, base: &DrainConfig) -> DrainConfig {
        let mut config = base.clone();
        if let Some(depth) = self.depth {
            config = config.with_max_depth(depth);
        }
        if let Some(max) = self.max_children {
            config = config.with_max_children(max);
        }
        if let Some(threshold) = self.similarity {
            config = config.with_similarity_threshold(threshold);
        }
        if let Some(extra) = &self.delimiters {
            config = config.with_additional_delimiters(extra);
        }
        config
    }

    /// Tailing options with command-line overrides applied
    pub fn tail_options(&self, config: &Config) -> TailOptions {
        let options = config.tail.options(self.follow);
        match self.lines {
            Some(from_line) => options.with_from_line(from_line),
            None => options,
        }
    }

    /// Line cut applied before mining
    pub fn preprocessor(&self) -> LinePreprocessor {
        let mut preprocessor = LinePreprocessor::new();
        if let Some(separator) = &self.parse_after_str {
            preprocessor = preprocessor.with_parse_after_str(separator.as_str());
        }
        if let Some(column) = self.parse_after_col {
            preprocessor = preprocessor.with_parse_after_col(column);
        }
        preprocessor
    }
}

/// Run the mine command
pub async fn run(args: MineArgs, config: &Config) -> Result<()> {
    let drain = mine(&args, config).await?;

    Formatter::new(args.format)
        .with_color(super::use_color(args.no_color))
        .with_top(args.top)
        .print(drain.clusters())
        .context("failed to write clusters")?;

    Ok(())
}

/// Mine the files and return the engine
pub(crate) async fn mine(args: &MineArgs, config: &Config) -> Result<Drain> {
    super::check_files(&args.files)?;

    let engine_config = args.engine_config(&config.drain.engine_config());
    engine_config
        .validate()
        .map_err(|message| anyhow!("invalid engine settings: {message}"))?;

    let store = args.state.as_ref().map(SnapshotStore::new);
    let drain = open_engine(engine_config, store.as_ref())?;

    let cancel = CancellationToken::new();
    let (funnel_task, handle) = spawn_funnel(
        drain,
        config.funnel.funnel_config(),
        store,
        args.preprocessor(),
        cancel.clone(),
    );

    let options = args.tail_options(config);
    let tailers: Vec<_> = args
        .files
        .iter()
        .map(|path| {
            let tailer = FileTailer::new(path, options);
            tokio::spawn(tailer.run(handle.sender(), cancel.clone()))
        })
        .collect();
    // The funnel stops once every tailer has dropped its sender
    drop(handle);

    if args.follow {
        let signal_cancel = cancel.clone();
        tokio::spawn(async move {
            super::wait_for_shutdown().await;
            info!("Shutdown signal received, finishing up");
            signal_cancel.cancel();
        });
    }

    let mut tail_error = None;
    for (path, tailer) in args.files.iter().zip(tailers) {
        match tailer.await? {
            Ok(stats) => debug!(
                path = %path.display(),
                lines = stats.lines,
                bytes = stats.bytes,
                rotations = stats.rotations,
                truncations = stats.truncations,
                "Finished tailing"
            ),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Tailing failed");
                cancel.cancel();
                tail_error.get_or_insert(e);
            }
        }
    }

    let output = funnel_task.await?;
    if let Some(e) = tail_error {
        return Err(e.into());
    }
    if let Some(e) = output.report.checkpoint_error {
        return Err(anyhow::Error::new(e).context("failed to save state"));
    }

    info!(
        lines = output.report.lines,
        new_clusters = output.report.new_clusters,
        clusters = output.drain.cluster_count(),
        "Mining finished"
    );

    Ok(output.drain)
}

/// Resume from the snapshot in `store`, or start a fresh engine
///
/// A saved snapshot keeps its own engine settings.
fn open_engine(config: DrainConfig, store: Option<&SnapshotStore>) -> Result<Drain> {
    let snapshot = match store {
        Some(store) => store
            .load()
            .with_context(|| format!("failed to load state '{}'", store.path().display()))?,
        None => None,
    };

    let Some(snapshot) = snapshot else {
        return Ok(Drain::new(config)?);
    };

    if snapshot.config != config {
        warn!("Resuming with the engine settings saved in the state file; overrides ignored");
    }

    let drain = Drain::from_snapshot(snapshot)?;
    info!(clusters = drain.cluster_count(), "Resumed from saved state");
    Ok(drain)
}
