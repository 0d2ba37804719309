//! Drain - Core
//!
//! Online log template mining. Feeds raw log lines one at a time through a
//! fixed-depth prefix tree and groups them into clusters, each summarized by
//! a template whose variable positions are rendered as `<*>`.
//!
//! # Overview
//!
//! ```text
//! line → [Tokenizer] → [PrefixTree] → bucket → [best_match] → merge / create
//! ```
//!
//! - **Tokenizer**: splits on a configurable delimiter set
//! - **PrefixTree**: routes by token count, then by the first few tokens
//! - **Matcher**: position-wise similarity against each candidate template
//! - **Cluster**: template, match count and the route it was filed under
//!
//! # Example
//!
//! ```
//! use drain_core::{Drain, DrainConfig};
//!
//! let mut drain = Drain::new(DrainConfig::new().with_similarity_threshold(0.5))?;
//!
//! drain.process("user 5 login ok");
//! let result = drain.process("user 7 login ok");
//!
//! assert!(!result.is_new);
//! assert_eq!(result.template_string(), "user <*> login ok");
//! # Ok::<(), drain_core::DrainError>(())
//! ```
//!
//! # Concurrency
//!
//! [`Drain::process`] takes `&mut self`, so one engine has one writer at a
//! time. Use [`SharedDrain`] to process from several threads, or route all
//! lines through one task that owns the engine.
//!
//! # Persistence
//!
//! [`Drain::snapshot`] and [`Drain::from_snapshot`] move the whole engine
//! state in and out of a [`DrainSnapshot`]; [`SnapshotStore`] keeps one on
//! disk as JSON.

mod cluster;
mod config;
mod drain;
mod error;
mod matcher;
mod persistence;
mod shared;
mod tokenizer;
mod tree;

pub use cluster::{
    ClusterId, LogCluster, Token, WILDCARD_MARKER, canonical_name, merge_template,
    render_template,
};
pub use config::DrainConfig;
pub use drain::{ClusterUpdate, Drain, DrainStats, ProcessResult};
pub use error::{DrainError, DrainResult};
pub use matcher::{best_match, similarity};
pub use persistence::{DrainSnapshot, FORMAT_VERSION, SnapshotStore, StoredCluster};
pub use shared::SharedDrain;
pub use tokenizer::{Tokenizer, tokenize};
pub use tree::{PrefixTree, has_digit};
