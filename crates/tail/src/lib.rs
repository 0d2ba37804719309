//! Drain - Tail
//!
//! Feeds log files into a Drain engine.
//!
//! # Architecture
//!
//! ```text
//! [FileTailer a.log] ─┐
//! [FileTailer b.log] ─┼─→ mpsc ─→ [DrainFunnel] ─→ Drain::process
//! [FileTailer c.log] ─┘                 │
//!                                       └─→ SnapshotStore (checkpoints)
//! ```
//!
//! Each [`FileTailer`] reads one file (optionally following it through
//! truncation and rotation) and pushes whole lines into a bounded channel.
//! A single [`DrainFunnel`] task owns the engine, so the engine never needs
//! a lock.

pub mod error;
pub mod funnel;
pub mod reader;

pub use error::{TailError, TailResult};
pub use funnel::{
    DrainFunnel, FunnelConfig, FunnelHandle, FunnelOutput, FunnelReport, LinePreprocessor,
    spawn_funnel,
};
pub use reader::{FileTailer, FromLine, SourcedLine, TailOptions, TailStats};
