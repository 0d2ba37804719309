//! Drain engine configuration
//!
//! Tuning knobs for the fixed-depth tree and the similarity rule.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

/// Tree levels that branch on token count rather than on a token
const LENGTH_LEVELS: usize = 1;

/// Smallest depth that still routes on one token
const MIN_DEPTH: usize = 2;

/// Configuration for a Drain engine
///
/// # Example
///
/// ```toml
/// [drain]
/// max_depth = 4
/// max_children = 100
/// similarity_threshold = 0.4
/// delimiters = " \t_"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrainConfig {
    /// Depth of the tree; the root dispatches on token count and every
    /// level below it on one token
    ///
    /// A depth of 4 routes on the first three tokens of a line.
    /// Default: 4
    pub max_depth: usize,

    /// Maximum literal children per internal node
    ///
    /// Once a node is full, unseen tokens share its wildcard branch.
    /// Default: 100
    pub max_children: usize,

    /// Minimum fraction of agreeing positions for a line to join a cluster
    ///
    /// Higher values = stricter matching, more clusters
    /// Lower values = more lenient matching, fewer clusters
    /// Default: 0.4
    pub similarity_threshold: f64,

    /// Characters that separate tokens
    ///
    /// Default: space and tab
    pub delimiters: String,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            max_children: 100,
            similarity_threshold: 0.4,
            delimiters: " \t".to_string(),
        }
    }
}

impl DrainConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tree depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set max literal children per node
    pub fn with_max_children(mut self, max: usize) -> Self {
        self.max_children = max;
        self
    }

    /// Set similarity threshold
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Replace the delimiter set
    pub fn with_delimiters(mut self, delimiters: impl Into<String>) -> Self {
        self.delimiters = delimiters.into();
        self
    }

    /// Add delimiters on top of the current set
    pub fn with_additional_delimiters(mut self, extra: &str) -> Self {
        for c in extra.chars() {
            if !self.delimiters.contains(c) {
                self.delimiters.push(c);
            }
        }
        self
    }

    /// Number of leading tokens used to route a line of `token_count` tokens
    pub fn prefix_len(&self, token_count: usize) -> usize {
        self.max_depth
            .saturating_sub(LENGTH_LEVELS)
            .min(token_count)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.similarity_threshold.is_finite()
            || self.similarity_threshold < 0.0
            || self.similarity_threshold > 1.0
        {
            return Err(format!(
                "similarity_threshold must be between 0.0 and 1.0, got {}",
                self.similarity_threshold
            ));
        }

        if self.max_depth < MIN_DEPTH {
            return Err(format!(
                "max_depth must be at least {}, got {}",
                MIN_DEPTH, self.max_depth
            ));
        }

        if self.max_children == 0 {
            return Err("max_children must be at least 1".to_string());
        }

        Ok(())
    }
}
