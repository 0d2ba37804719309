//! Snapshot persistence - Save and restore engine state
//!
//! Stores every cluster together with the routing prefix it was filed
//! under, so a restored engine rebuilds exactly the same tree even when
//! the templates' leading positions have since become wildcards.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "config": {"max_depth": 4, "max_children": 100, "similarity_threshold": 0.4, "delimiters": " \t"},
//!   "clusters": [
//!     {"id": 1, "token_length": 4, "template": ["user", null, "login", "ok"], "route": ["user", "5", "login"], "count": 42}
//!   ]
//! }
//! ```
//!
//! `null` marks a wildcard position.

use crate::cluster::{ClusterId, LogCluster, Token};
use crate::config::DrainConfig;
use crate::drain::Drain;
use crate::error::{DrainError, DrainResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;

/// Snapshot format version
pub const FORMAT_VERSION: u32 = 1;

/// Serializable cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCluster {
    /// Cluster ID
    pub id: ClusterId,

    /// Token count of every line in the cluster
    pub token_length: usize,

    /// Template tokens, `None` for wildcards
    pub template: Vec<Option<String>>,

    /// Tokens the cluster was routed by at creation
    #[serde(default)]
    pub route: Vec<String>,

    /// Match count
    pub count: u64,
}

impl From<&LogCluster> for StoredCluster {
    fn from(cluster: &LogCluster) -> Self {
        Self {
            id: cluster.id(),
            token_length: cluster.token_count(),
            template: cluster
                .template()
                .iter()
                .map(|t| t.as_literal().map(str::to_string))
                .collect(),
            route: cluster.route().to_vec(),
            count: cluster.match_count(),
        }
    }
}

/// Full engine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrainSnapshot {
    /// Format version
    pub version: u32,

    /// Engine configuration the clusters were mined with
    pub config: DrainConfig,

    /// Clusters in id order
    pub clusters: Vec<StoredCluster>,
}

impl DrainSnapshot {
    /// Parse a snapshot from JSON
    pub fn from_reader<R: Read>(reader: R) -> DrainResult<Self> {
        let snapshot: DrainSnapshot = serde_json::from_reader(reader)
            .map_err(|e| DrainError::snapshot(format!("failed to parse snapshot: {}", e)))?;

        if snapshot.version != FORMAT_VERSION {
            tracing::warn!(
                "Snapshot version mismatch: expected {}, got {}",
                FORMAT_VERSION,
                snapshot.version
            );
        }

        Ok(snapshot)
    }

    /// Write the snapshot as pretty JSON
    pub fn to_writer<W: Write>(&self, writer: W) -> DrainResult<()> {
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| DrainError::snapshot(format!("failed to write snapshot: {}", e)))
    }
}

impl Drain {
    /// Export the engine state
    pub fn snapshot(&self) -> DrainSnapshot {
        DrainSnapshot {
            version: FORMAT_VERSION,
            config: self.config().clone(),
            clusters: self.clusters().iter().map(StoredCluster::from).collect(),
        }
    }

    /// Rebuild an engine from a snapshot
    ///
    /// Clusters are replayed into a fresh tree in ascending id order using
    /// their stored routes. Ids must run from 1 without gaps.
    pub fn from_snapshot(snapshot: DrainSnapshot) -> DrainResult<Self> {
        let DrainSnapshot {
            config, clusters, ..
        } = snapshot;
        config.validate().map_err(DrainError::config)?;

        let route_depth = config.prefix_len(usize::MAX);
        let mut stored = clusters;
        stored.sort_by_key(|c| c.id);

        let mut seen = HashSet::with_capacity(stored.len());
        let mut restored = Vec::with_capacity(stored.len());

        for (index, cluster) in stored.into_iter().enumerate() {
            if !seen.insert(cluster.id) {
                return Err(DrainError::snapshot(format!(
                    "duplicate cluster id {}",
                    cluster.id
                )));
            }

            if cluster.id.get() != index as u64 + 1 {
                return Err(DrainError::snapshot(format!(
                    "cluster ids must be contiguous from 1, found {} at position {}",
                    cluster.id,
                    index + 1
                )));
            }

            if cluster.template.len() != cluster.token_length {
                return Err(DrainError::snapshot(format!(
                    "cluster {} has {} template tokens but token_length {}",
                    cluster.id,
                    cluster.template.len(),
                    cluster.token_length
                )));
            }

            if cluster.route.len() != route_depth.min(cluster.token_length) {
                return Err(DrainError::snapshot(format!(
                    "cluster {} has a route of {} tokens, expected {}",
                    cluster.id,
                    cluster.route.len(),
                    route_depth.min(cluster.token_length)
                )));
            }

            if cluster.count == 0 {
                return Err(DrainError::snapshot(format!(
                    "cluster {} has a zero match count",
                    cluster.id
                )));
            }

            let template: Vec<Token> = cluster.template.into_iter().map(Token::from).collect();
            restored.push(LogCluster::restore(
                cluster.id,
                template,
                cluster.count,
                cluster.route,
            ));
        }

        tracing::debug!(clusters = restored.len(), "Restored drain snapshot");
        Drain::from_clusters(config, restored)
    }
}

/// File-backed snapshot storage
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a store for `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot, or `None` if the file does not exist yet
    pub fn load(&self) -> DrainResult<Option<DrainSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        DrainSnapshot::from_reader(BufReader::new(file)).map(Some)
    }

    /// Save a snapshot atomically
    pub fn save(&self, snapshot: &DrainSnapshot) -> DrainResult<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        // Write to temp file first
        let temp_path = self.path.with_extension("tmp");
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);

        snapshot.to_writer(&mut writer)?;
        writer.flush()?;

        // Atomic rename
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!(
            path = %self.path.display(),
            clusters = snapshot.clusters.len(),
            "Saved drain snapshot"
        );
        Ok(())
    }
}
