//! Line funnel - Single writer in front of a Drain engine
//!
//! Any number of tailers push lines into one bounded channel; one task owns
//! the engine and processes them in arrival order.
//!
//! # Design
//!
//! - Tailers send [`SourcedLine`]s through cloned senders (backpressure when full)
//! - The funnel task preprocesses each line and feeds it to the engine
//! - Snapshots are checkpointed on an interval when something changed
//! - Shutdown drains queued lines, writes a final checkpoint and hands the
//!   engine back to the caller

use crate::reader::SourcedLine;
use drain_core::{Drain, DrainError, SnapshotStore};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[cfg(test)]
#[path = "funnel_test.rs"]
mod tests;

/// Default channel capacity for the line queue
const DEFAULT_CHANNEL_CAPACITY: usize = 10_000;

/// Default time between snapshot checkpoints
const DEFAULT_CHECKPOINT_INTERVAL: Duration = Duration::from_secs(30);

/// Default number of lines between progress logs
const DEFAULT_PROGRESS_EVERY: u64 = 10_000;

/// Strips a fixed prefix off each line before it reaches the engine
///
/// A column cut takes precedence over a separator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinePreprocessor {
    parse_after_str: Option<String>,
    parse_after_col: Option<usize>,
}

impl LinePreprocessor {
    /// Pass lines through unchanged
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the text after the first occurrence of `separator`
    ///
    /// Lines without the separator are kept whole. An empty separator
    /// disables the cut.
    pub fn with_parse_after_str(mut self, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        self.parse_after_str = (!separator.is_empty()).then_some(separator);
        self
    }

    /// Keep only the text from character column `column` on
    ///
    /// Lines shorter than the column become empty. Column 0 disables the cut.
    pub fn with_parse_after_col(mut self, column: usize) -> Self {
        self.parse_after_col = (column > 0).then_some(column);
        self
    }

    /// Whether lines pass through unchanged
    pub fn is_identity(&self) -> bool {
        self.parse_after_str.is_none() && self.parse_after_col.is_none()
    }

    /// Apply the cut to one line
    pub fn apply<'a>(&self, line: &'a str) -> &'a str {
        if let Some(column) = self.parse_after_col {
            return line
                .char_indices()
                .nth(column)
                .map_or("", |(index, _)| &line[index..]);
        }

        if let Some(separator) = &self.parse_after_str {
            return line
                .find(separator.as_str())
                .map_or(line, |index| &line[index + separator.len()..]);
        }

        line
    }
}

/// Handle for feeding lines to a running funnel
#[derive(Debug, Clone)]
pub struct FunnelHandle {
    sender: mpsc::Sender<SourcedLine>,
}

impl FunnelHandle {
    /// A sender for a tailer
    pub fn sender(&self) -> mpsc::Sender<SourcedLine> {
        self.sender.clone()
    }

    /// Send a line, waiting if the queue is full
    ///
    /// Returns `false` if the funnel has stopped.
    pub async fn send(&self, line: SourcedLine) -> bool {
        self.sender.send(line).await.is_ok()
    }

    /// Check if the funnel is still running (channel not closed)
    pub fn is_active(&self) -> bool {
        !self.sender.is_closed()
    }
}

/// Configuration for the funnel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunnelConfig {
    /// Channel capacity for the line queue
    pub channel_capacity: usize,

    /// Time between snapshot checkpoints
    pub checkpoint_interval: Duration,

    /// Lines between progress logs
    pub progress_every: u64,
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

impl FunnelConfig {
    /// Create config with custom channel capacity
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Create config with custom checkpoint interval
    pub fn with_checkpoint_interval(mut self, interval: Duration) -> Self {
        self.checkpoint_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Create config with custom progress log frequency
    pub fn with_progress_every(mut self, lines: u64) -> Self {
        self.progress_every = lines.max(1);
        self
    }
}

/// What a funnel run did
#[derive(Debug, Default)]
pub struct FunnelReport {
    /// Lines processed
    pub lines: u64,

    /// Clusters created during the run
    pub new_clusters: u64,

    /// Snapshots written
    pub checkpoints: u64,

    /// Wall time of the run
    pub elapsed: Duration,

    /// Error from the final checkpoint, if it failed
    pub checkpoint_error: Option<DrainError>,
}

/// Engine and report returned when a funnel stops
#[derive(Debug)]
pub struct FunnelOutput {
    /// The engine with every processed line applied
    pub drain: Drain,

    /// Run summary
    pub report: FunnelReport,
}

/// Single-writer task owning a Drain engine
pub struct DrainFunnel {
    /// The engine
    drain: Drain,

    /// Channel receiver for lines
    receiver: mpsc::Receiver<SourcedLine>,

    /// Funnel configuration
    config: FunnelConfig,

    /// Cut applied before processing
    preprocessor: LinePreprocessor,

    /// Where checkpoints go, if anywhere
    store: Option<SnapshotStore>,

    /// Cancellation token for graceful shutdown
    cancel: CancellationToken,
}

impl DrainFunnel {
    /// Create a funnel and return its handle
    ///
    /// The funnel should be spawned as a tokio task. It stops when `cancel`
    /// fires or when the handle and every sender cloned from it are dropped.
    pub fn new(
        drain: Drain,
        config: FunnelConfig,
        store: Option<SnapshotStore>,
        cancel: CancellationToken,
    ) -> (Self, FunnelHandle) {
        let (sender, receiver) = mpsc::channel(config.channel_capacity.max(1));

        let funnel = Self {
            drain,
            receiver,
            config,
            preprocessor: LinePreprocessor::default(),
            store,
            cancel,
        };

        (funnel, FunnelHandle { sender })
    }

    /// Set the line preprocessor
    pub fn with_preprocessor(mut self, preprocessor: LinePreprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    /// Run the funnel until shutdown
    ///
    /// This should be spawned as a tokio task:
    /// ```ignore
    /// let output = tokio::spawn(funnel.run()).await?;
    /// ```
    pub async fn run(mut self) -> FunnelOutput {
        let started = Instant::now();
        let mut report = FunnelReport::default();
        let mut dirty = false;

        let period = self.config.checkpoint_interval.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

        tracing::info!(
            clusters = self.drain.cluster_count(),
            checkpoint_interval_secs = period.as_secs(),
            persist = self.store.is_some(),
            "Drain funnel started"
        );

        loop {
            tokio::select! {
                // Receive next line
                received = self.receiver.recv() => match received {
                    Some(line) => {
                        self.ingest(&line, &mut report);
                        dirty = true;
                    }
                    None => {
                        tracing::debug!("All line senders dropped");
                        break;
                    }
                },

                // Periodic checkpoint
                _ = interval.tick() => {
                    if dirty {
                        if let Err(e) = self.checkpoint(&mut report) {
                            tracing::warn!(error = %e, "Failed to checkpoint drain snapshot");
                        }
                        dirty = false;
                    }
                }

                // Cancellation
                _ = self.cancel.cancelled() => {
                    tracing::info!("Drain funnel received shutdown signal");
                    break;
                }
            }
        }

        // Drain remaining lines from channel
        while let Ok(line) = self.receiver.try_recv() {
            self.ingest(&line, &mut report);
            dirty = true;
        }

        // Final checkpoint
        if dirty && let Err(e) = self.checkpoint(&mut report) {
            tracing::warn!(error = %e, "Failed to write final drain snapshot");
            report.checkpoint_error = Some(e);
        }

        report.elapsed = started.elapsed();
        tracing::info!(
            lines = report.lines,
            new_clusters = report.new_clusters,
            clusters = self.drain.cluster_count(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Drain funnel stopped"
        );

        FunnelOutput {
            drain: self.drain,
            report,
        }
    }

    fn ingest(&mut self, sourced: &SourcedLine, report: &mut FunnelReport) {
        let content = self.preprocessor.apply(&sourced.line);
        let result = self.drain.process(content);
        report.lines += 1;

        if result.is_new {
            report.new_clusters += 1;
            tracing::debug!(
                cluster_id = %result.cluster_id,
                source = %sourced.source.display(),
                template = %result.template_string(),
                "New cluster"
            );
        }

        if self.config.progress_every > 0 && report.lines % self.config.progress_every == 0 {
            tracing::info!(
                lines = report.lines,
                clusters = self.drain.cluster_count(),
                "Mining progress"
            );
        }
    }

    fn checkpoint(&self, report: &mut FunnelReport) -> Result<(), DrainError> {
        let Some(store) = &self.store else {
            return Ok(());
        };

        store.save(&self.drain.snapshot())?;
        report.checkpoints += 1;
        Ok(())
    }
}

/// Spawn a funnel task
///
/// Convenience function that creates and spawns the funnel.
/// Returns the task handle, which yields the engine, and the line handle.
pub fn spawn_funnel(
    drain: Drain,
    config: FunnelConfig,
    store: Option<SnapshotStore>,
    preprocessor: LinePreprocessor,
    cancel: CancellationToken,
) -> (JoinHandle<FunnelOutput>, FunnelHandle) {
    let (funnel, handle) = DrainFunnel::new(drain, config, store, cancel);
    let task = tokio::spawn(funnel.with_preprocessor(preprocessor).run());
    (task, handle)
}
