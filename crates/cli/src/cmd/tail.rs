//! Tail command - print a file's lines without mining them

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use drain_tail::{FileTailer, FromLine, SourcedLine};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;

#[cfg(test)]
#[path = "tail_test.rs"]
mod tests;

/// Tail command arguments
#[derive(Args, Debug)]
pub struct TailArgs {
    /// File to print
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Keep printing as the file grows, until Ctrl+C
    #[arg(short, long)]
    follow: bool,

    /// Start at the last NUM lines, or at line NUM with a leading '+'
    #[arg(short = 'n', long = "lines", value_name = "[+]NUM")]
    lines: Option<FromLine>,
}

/// Run the tail command
pub async fn run(args: TailArgs, config: &Config) -> Result<()> {
    super::check_files(&[&args.file])?;

    let mut options = config.tail.options(args.follow);
    if let Some(from_line) = args.lines {
        options = options.with_from_line(from_line);
    }

    let cancel = CancellationToken::new();
    let (sender, mut receiver) = mpsc::channel(config.funnel.channel_capacity.max(1));
    let tailer = tokio::spawn(FileTailer::new(&args.file, options).run(sender, cancel.clone()));

    if args.follow {
        let signal_cancel = cancel.clone();
        tokio::spawn(async move {
            super::wait_for_shutdown().await;
            signal_cancel.cancel();
        });
    }

    let mut out = BufWriter::new(io::stdout());
    let copied = copy_lines(&mut receiver, &mut out).await;
    // Stops the tailer if we quit early
    drop(receiver);

    match copied {
        Ok(lines) => tracing::debug!(lines, "Printed lines"),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("Stdout closed");
            cancel.cancel();
        }
        Err(e) => {
            cancel.cancel();
            return Err(e).context("failed to write to stdout");
        }
    }

    tailer.await??;
    Ok(())
}

/// Write received lines to `out` until every sender is gone
///
/// Flushes whenever the queue runs dry so followed output shows up promptly.
async fn copy_lines<W: Write>(
    receiver: &mut mpsc::Receiver<SourcedLine>,
    out: &mut W,
) -> io::Result<u64> {
    let mut lines = 0;
    while let Some(sourced) = receiver.recv().await {
        writeln!(out, "{}", sourced.line)?;
        lines += 1;
        if receiver.is_empty() {
            out.flush()?;
        }
    }
    out.flush()?;
    Ok(lines)
}
