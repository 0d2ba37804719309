//! Drain Algorithm - Online log template mining
//!
//! Clusters a stream of log lines by structure using a fixed-depth prefix
//! tree. Each line either joins the most similar cluster in its bucket,
//! generalizing that cluster's template where they disagree, or starts a
//! new cluster.
//!
//! # Algorithm Overview
//!
//! 1. Split the line into tokens
//! 2. Navigate tree by: token count → first tokens (digits take `<*>`)
//! 3. Score every cluster in the bucket, keep the first best one
//! 4. Merge into it if the score clears the threshold, otherwise create a
//!    new cluster and file it in the tree
//!
//! # Reference
//!
//! "Drain: An Online Log Parsing Approach with Fixed Depth Tree"
//! by Pinjia He et al.

use crate::cluster::{ClusterId, LogCluster, Token, render_template};
use crate::config::DrainConfig;
use crate::error::{DrainError, DrainResult};
use crate::matcher::best_match;
use crate::tokenizer::Tokenizer;
use crate::tree::PrefixTree;

#[cfg(test)]
#[path = "drain_test.rs"]
mod tests;

/// Counters kept by an engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainStats {
    /// Lines passed to `process`
    pub lines_processed: u64,

    /// Clusters created
    pub clusters_created: u64,

    /// Template positions turned into wildcards
    pub positions_generalized: u64,
}

/// Outcome of processing one line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessResult<'a> {
    /// Cluster the line was assigned to
    pub cluster_id: ClusterId,

    /// Template of that cluster after the line was merged
    pub template: &'a [Token],

    /// Whether the line created the cluster
    pub is_new: bool,
}

impl ProcessResult<'_> {
    /// Template rendered with `<*>` for wildcards
    pub fn template_string(&self) -> String {
        render_template(self.template)
    }

    /// Detach the result from the engine borrow
    pub fn into_owned(self) -> ClusterUpdate {
        ClusterUpdate {
            cluster_id: self.cluster_id,
            template: self.template.to_vec(),
            is_new: self.is_new,
        }
    }
}

/// Owned copy of a [`ProcessResult`]
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterUpdate {
    /// Cluster the line was assigned to
    pub cluster_id: ClusterId,

    /// Template after the merge
    pub template: Vec<Token>,

    /// Whether the line created the cluster
    pub is_new: bool,
}

impl ClusterUpdate {
    /// Template rendered with `<*>` for wildcards
    pub fn template_string(&self) -> String {
        render_template(&self.template)
    }
}

/// Drain engine
///
/// Owns the prefix tree and every cluster. `process` takes `&mut self`;
/// share an engine between tasks through a single funnel or
/// [`SharedDrain`](crate::SharedDrain).
#[derive(Debug, Clone)]
pub struct Drain {
    config: DrainConfig,
    tokenizer: Tokenizer,
    tree: PrefixTree,

    /// Clusters in creation order; cluster `n` lives at index `n - 1`
    clusters: Vec<LogCluster>,

    stats: DrainStats,
}

impl Drain {
    /// Create an engine, validating the configuration
    pub fn new(config: DrainConfig) -> DrainResult<Self> {
        config.validate().map_err(DrainError::config)?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: DrainConfig) -> Self {
        Self {
            tokenizer: Tokenizer::new(&config.delimiters),
            tree: PrefixTree::new(&config),
            clusters: Vec::new(),
            stats: DrainStats::default(),
            config,
        }
    }

    /// Rebuild an engine from clusters sorted by id, ids dense from 1
    pub(crate) fn from_clusters(config: DrainConfig, clusters: Vec<LogCluster>) -> DrainResult<Self> {
        let mut drain = Self::new(config)?;

        for cluster in &clusters {
            drain
                .tree
                .insert_route(cluster.token_count(), cluster.route(), cluster.id());
        }

        drain.stats.clusters_created = clusters.len() as u64;
        drain.clusters = clusters;
        Ok(drain)
    }

    /// Assign a raw log line to a cluster
    ///
    /// Never fails: empty or malformed lines are clustered like any other.
    pub fn process(&mut self, line: &str) -> ProcessResult<'_> {
        let tokens = self.tokenizer.tokenize(line);
        self.process_tokens(&tokens)
    }

    /// Assign an already tokenized line to a cluster
    pub fn process_tokens(&mut self, tokens: &[&str]) -> ProcessResult<'_> {
        self.stats.lines_processed += 1;

        let matched = self.match_tokens(tokens).map(LogCluster::id);
        match matched {
            Some(id) => {
                let cluster = &mut self.clusters[slot(id)];
                let generalized = cluster.absorb(tokens);

                if generalized > 0 {
                    self.stats.positions_generalized += generalized as u64;
                    tracing::trace!(
                        cluster_id = %id,
                        generalized,
                        "Template generalized"
                    );
                }

                ProcessResult {
                    cluster_id: id,
                    template: cluster.template(),
                    is_new: false,
                }
            }
            None => {
                let index = self.clusters.len();
                let id = ClusterId::new(index as u64 + 1);
                let route_len = self.tree.route_len(tokens.len());

                self.tree.insert(tokens, id);
                self.clusters.push(LogCluster::new(id, tokens, route_len));
                self.stats.clusters_created += 1;

                tracing::debug!(
                    cluster_id = %id,
                    token_count = tokens.len(),
                    "New log cluster"
                );

                ProcessResult {
                    cluster_id: id,
                    template: self.clusters[index].template(),
                    is_new: true,
                }
            }
        }
    }

    /// Find the cluster a line would join, without changing anything
    pub fn find(&self, line: &str) -> Option<&LogCluster> {
        let tokens = self.tokenizer.tokenize(line);
        self.match_tokens(&tokens)
    }

    fn match_tokens(&self, tokens: &[&str]) -> Option<&LogCluster> {
        let bucket = self.tree.descend(tokens)?;
        let candidates = bucket.iter().map(|id| &self.clusters[slot(*id)]);
        best_match(candidates, tokens, self.config.similarity_threshold)
    }

    /// Get a cluster by id
    pub fn cluster(&self, id: ClusterId) -> Option<&LogCluster> {
        let index = usize::try_from(id.get()).ok()?.checked_sub(1)?;
        self.clusters.get(index)
    }

    /// All clusters in creation order
    pub fn clusters(&self) -> &[LogCluster] {
        &self.clusters
    }

    /// Number of live clusters
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Engine counters
    pub fn stats(&self) -> DrainStats {
        self.stats
    }

    /// Engine configuration
    pub fn config(&self) -> &DrainConfig {
        &self.config
    }

    /// The prefix tree indexing the clusters
    pub fn tree(&self) -> &PrefixTree {
        &self.tree
    }

    /// Tokenizer built from the configured delimiters
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }
}

impl Default for Drain {
    fn default() -> Self {
        Self::with_valid_config(DrainConfig::default())
    }
}

/// Vector slot of a cluster id
fn slot(id: ClusterId) -> usize {
    (id.get() - 1) as usize
}
