//! File tailer - Follow a log file like `tail -f`
//!
//! Reads complete lines from a chosen starting line and forwards them to a
//! channel. In follow mode the file is polled on an interval:
//!
//! - appended data is read from the last offset
//! - a file that shrank below the offset was truncated and is re-read from 0
//! - a file whose inode changed was rotated and is reopened from 0
//! - a path that is temporarily missing is waited for
//!
//! A trailing line without its newline is held back until the newline
//! arrives, so consumers only ever see whole lines.

use crate::error::{TailError, TailResult};
use std::fmt;
use std::fs::Metadata;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[cfg(test)]
#[path = "reader_test.rs"]
mod tests;

/// Default number of trailing lines to start from
const DEFAULT_LINE_COUNT: u64 = 10;

/// Default polling interval in follow mode
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Read buffer size
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Where to start reading a file
///
/// Parsed from `"N"` (the last N lines) or `"+N"` (from line N, 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FromLine {
    /// Count from the start of the file instead of the end
    pub from_start: bool,

    /// Line count (from the end) or line number (from the start)
    pub count: u64,
}

impl FromLine {
    /// Start at the last `count` lines
    pub const fn last(count: u64) -> Self {
        Self {
            from_start: false,
            count,
        }
    }

    /// Start at 1-based line `line`
    pub const fn starting_at(line: u64) -> Self {
        Self {
            from_start: true,
            count: line,
        }
    }

    /// Start at the beginning of the file
    pub const fn beginning() -> Self {
        Self::starting_at(1)
    }
}

impl Default for FromLine {
    fn default() -> Self {
        Self::last(DEFAULT_LINE_COUNT)
    }
}

impl FromStr for FromLine {
    type Err = TailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (from_start, digits) = match trimmed.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TailError::InvalidFromLine(s.to_string()));
        }

        let count = digits
            .parse::<u64>()
            .map_err(|_| TailError::InvalidFromLine(s.to_string()))?;

        Ok(Self { from_start, count })
    }
}

impl fmt::Display for FromLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from_start {
            write!(f, "+{}", self.count)
        } else {
            write!(f, "{}", self.count)
        }
    }
}

/// Byte offset where reading should start for an in-memory file
///
/// A final line without a trailing newline still counts as a line. Asking
/// for more lines than exist starts at 0 (from the end) or at EOF (from the
/// start). Reference for the chunked [`locate_start`].
#[cfg(test)]
pub(crate) fn find_start_offset(bytes: &[u8], from_line: FromLine) -> u64 {
    let len = bytes.len() as u64;

    if from_line.from_start {
        let mut remaining = from_line.count.saturating_sub(1);
        if remaining == 0 {
            return 0;
        }
        skip_forward(bytes, &mut remaining).map_or(len, |i| i as u64)
    } else {
        if from_line.count == 0 {
            return len;
        }
        let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
        let mut remaining = from_line.count;
        skip_backward(body, &mut remaining).map_or(0, |i| i as u64)
    }
}

/// Index just past the newline that brings `remaining` to zero, scanning forward
fn skip_forward(bytes: &[u8], remaining: &mut u64) -> Option<usize> {
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'\n' {
            *remaining -= 1;
            if *remaining == 0 {
                return Some(i + 1);
            }
        }
    }
    None
}

/// Index just past the newline that brings `remaining` to zero, scanning backward
fn skip_backward(bytes: &[u8], remaining: &mut u64) -> Option<usize> {
    for i in (0..bytes.len()).rev() {
        if bytes[i] == b'\n' {
            *remaining -= 1;
            if *remaining == 0 {
                return Some(i + 1);
            }
        }
    }
    None
}

/// Byte offset where reading should start, reading `file` in chunks
///
/// A final line without a trailing newline still counts as a line. Asking
/// for more lines than exist starts at 0 (from the end) or at EOF (from the
/// start).
async fn locate_start(
    file: &mut File,
    len: u64,
    from_line: FromLine,
    chunk_size: usize,
) -> io::Result<u64> {
    let mut chunk = vec![0u8; chunk_size];

    if from_line.from_start {
        let mut remaining = from_line.count.saturating_sub(1);
        if remaining == 0 {
            return Ok(0);
        }

        file.seek(SeekFrom::Start(0)).await?;
        let mut position = 0u64;
        loop {
            let n = file.read(&mut chunk).await?;
            if n == 0 {
                return Ok(position);
            }
            if let Some(i) = skip_forward(&chunk[..n], &mut remaining) {
                return Ok(position + i as u64);
            }
            position += n as u64;
        }
    }

    if from_line.count == 0 || len == 0 {
        return Ok(len);
    }

    // A trailing newline terminates the last line rather than starting a new one
    let mut end = len;
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1)).await?;
    file.read_exact(&mut last).await?;
    if last[0] == b'\n' {
        end -= 1;
    }

    let mut remaining = from_line.count;
    while end > 0 {
        let start = end.saturating_sub(chunk_size as u64);
        let window = &mut chunk[..(end - start) as usize];
        file.seek(SeekFrom::Start(start)).await?;
        file.read_exact(&mut *window).await?;

        if let Some(i) = skip_backward(window, &mut remaining) {
            return Ok(start + i as u64);
        }
        end = start;
    }

    Ok(0)
}

/// A line read from a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedLine {
    /// File the line came from
    pub source: Arc<Path>,

    /// Line content without its line terminator
    pub line: String,
}

/// Tailing options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TailOptions {
    /// Starting line
    pub from_line: FromLine,

    /// Keep polling for new data after EOF
    pub follow: bool,

    /// Polling interval in follow mode
    pub poll_interval: Duration,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            from_line: FromLine::default(),
            follow: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl TailOptions {
    /// Set the starting line
    pub fn with_from_line(mut self, from_line: FromLine) -> Self {
        self.from_line = from_line;
        self
    }

    /// Enable or disable follow mode
    pub fn with_follow(mut self, follow: bool) -> Self {
        self.follow = follow;
        self
    }

    /// Set the polling interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }
}

/// Counters for one tailed file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TailStats {
    /// Lines forwarded
    pub lines: u64,

    /// Bytes read
    pub bytes: u64,

    /// Times the file was replaced and reopened
    pub rotations: u64,

    /// Times the file shrank and was re-read from the start
    pub truncations: u64,
}

/// Open file and read position
struct TailState {
    file: File,
    file_id: Option<u64>,
    offset: u64,
    pending: Vec<u8>,
    chunk: Vec<u8>,
    stats: TailStats,
}

/// Tails one file into a channel
#[derive(Debug, Clone)]
pub struct FileTailer {
    path: PathBuf,
    source: Arc<Path>,
    options: TailOptions,
}

impl FileTailer {
    /// Create a tailer for `path`
    pub fn new(path: impl Into<PathBuf>, options: TailOptions) -> Self {
        let path = path.into();
        Self {
            source: Arc::from(path.as_path()),
            path,
            options,
        }
    }

    /// Tailed path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Tailing options
    pub fn options(&self) -> &TailOptions {
        &self.options
    }

    /// Read the file, forwarding every line to `sender`
    ///
    /// Without follow this returns at EOF. With follow it returns when
    /// `cancel` fires or the receiver is dropped.
    pub async fn run(
        self,
        sender: mpsc::Sender<SourcedLine>,
        cancel: CancellationToken,
    ) -> TailResult<TailStats> {
        let (mut file, meta) = self.open().await?;
        let offset = locate_start(&mut file, meta.len(), self.options.from_line, READ_CHUNK_SIZE)
            .await
            .map_err(|e| TailError::io(&self.path, e))?;

        tracing::debug!(
            path = %self.path.display(),
            from_line = %self.options.from_line,
            offset,
            "Reading file from position"
        );

        let mut state = TailState {
            file,
            file_id: file_id(&meta),
            offset,
            pending: Vec::new(),
            chunk: vec![0u8; READ_CHUNK_SIZE],
            stats: TailStats::default(),
        };

        if !self.read_available(&mut state, &sender).await? {
            return Ok(state.stats);
        }

        if !self.options.follow {
            self.flush_pending(&mut state, &sender).await;
            self.log_done(offset, &state);
            return Ok(state.stats);
        }

        let mut interval = tokio::time::interval(self.options.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(path = %self.path.display(), "Tailer received shutdown signal");
                    self.flush_pending(&mut state, &sender).await;
                    break;
                }

                _ = sender.closed() => {
                    tracing::debug!(path = %self.path.display(), "Line receiver dropped, stopping tailer");
                    break;
                }

                _ = interval.tick() => {
                    if !self.poll(&mut state, &sender).await? {
                        break;
                    }
                }
            }
        }

        self.log_done(offset, &state);
        Ok(state.stats)
    }

    async fn open(&self) -> TailResult<(File, Metadata)> {
        let file = File::open(&self.path)
            .await
            .map_err(|e| TailError::io(&self.path, e))?;
        let meta = file
            .metadata()
            .await
            .map_err(|e| TailError::io(&self.path, e))?;

        if !meta.is_file() {
            return Err(TailError::NotAFile(self.path.clone()));
        }

        Ok((file, meta))
    }

    /// One follow-mode tick; `false` once the receiver is gone
    async fn poll(
        &self,
        state: &mut TailState,
        sender: &mpsc::Sender<SourcedLine>,
    ) -> TailResult<bool> {
        // Catch up on the open handle before looking at the path, so lines
        // written just before a rotation are not lost
        if !self.read_available(state, sender).await? {
            return Ok(false);
        }

        let meta = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::trace!(path = %self.path.display(), "File missing, waiting for it");
                return Ok(true);
            }
            Err(e) => return Err(TailError::io(&self.path, e)),
        };

        let current_id = file_id(&meta);
        if current_id.is_some() && current_id != state.file_id {
            if !self.flush_pending(state, sender).await {
                return Ok(false);
            }

            let (file, meta) = match self.open().await {
                Ok(opened) => opened,
                Err(TailError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                    return Ok(true);
                }
                Err(e) => return Err(e),
            };

            state.file = file;
            state.file_id = file_id(&meta);
            state.offset = 0;
            state.stats.rotations += 1;
            tracing::info!(path = %self.path.display(), "File rotated, reading new file from start");
        } else if meta.len() < state.offset {
            tracing::info!(
                path = %self.path.display(),
                offset = state.offset,
                size = meta.len(),
                "File truncated, reading from start"
            );
            state.offset = 0;
            state.pending.clear();
            state.stats.truncations += 1;
        } else {
            return Ok(true);
        }

        self.read_available(state, sender).await
    }

    /// Read to EOF, forwarding complete lines; `false` once the receiver is gone
    async fn read_available(
        &self,
        state: &mut TailState,
        sender: &mpsc::Sender<SourcedLine>,
    ) -> TailResult<bool> {
        let start = state.offset;
        state
            .file
            .seek(SeekFrom::Start(start))
            .await
            .map_err(|e| TailError::io(&self.path, e))?;

        loop {
            let n = state
                .file
                .read(&mut state.chunk)
                .await
                .map_err(|e| TailError::io(&self.path, e))?;
            if n == 0 {
                break;
            }

            state.offset += n as u64;
            state.stats.bytes += n as u64;
            state.pending.extend_from_slice(&state.chunk[..n]);

            if !self.emit_complete_lines(state, sender).await {
                return Ok(false);
            }
        }

        if state.offset > start {
            tracing::trace!(
                path = %self.path.display(),
                from = start,
                to = state.offset,
                bytes = state.offset - start,
                "Read"
            );
        }

        Ok(true)
    }

    async fn emit_complete_lines(
        &self,
        state: &mut TailState,
        sender: &mpsc::Sender<SourcedLine>,
    ) -> bool {
        let mut consumed = 0;

        while let Some(pos) = state.pending[consumed..].iter().position(|&b| b == b'\n') {
            let end = consumed + pos;
            let line = decode_line(&state.pending[consumed..end]);
            consumed = end + 1;

            if !self.send(line, &mut state.stats, sender).await {
                state.pending.drain(..consumed);
                return false;
            }
        }

        state.pending.drain(..consumed);
        true
    }

    /// Forward a held-back partial line
    async fn flush_pending(&self, state: &mut TailState, sender: &mpsc::Sender<SourcedLine>) -> bool {
        if state.pending.is_empty() {
            return true;
        }

        let line = decode_line(&state.pending);
        state.pending.clear();
        self.send(line, &mut state.stats, sender).await
    }

    async fn send(
        &self,
        line: String,
        stats: &mut TailStats,
        sender: &mpsc::Sender<SourcedLine>,
    ) -> bool {
        let sourced = SourcedLine {
            source: Arc::clone(&self.source),
            line,
        };

        if sender.send(sourced).await.is_err() {
            tracing::debug!(path = %self.path.display(), "Line receiver dropped, stopping tailer");
            return false;
        }

        stats.lines += 1;
        true
    }

    fn log_done(&self, start: u64, state: &TailState) {
        tracing::debug!(
            path = %self.path.display(),
            start,
            end = state.offset,
            lines = state.stats.lines,
            bytes = state.stats.bytes,
            "Finished tailing file"
        );
    }
}

/// Decode a line, dropping a trailing carriage return
fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(unix)]
fn file_id(meta: &Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(meta.ino())
}

#[cfg(not(unix))]
fn file_id(_meta: &Metadata) -> Option<u64> {
    None
}
