//! Lock-guarded engine handle
//!
//! For callers that cannot route every line through one task: each
//! `process` call holds the mutex for exactly one line.

use crate::cluster::{ClusterId, LogCluster};
use crate::drain::{ClusterUpdate, Drain, DrainStats};
use parking_lot::Mutex;
use std::sync::Arc;

#[cfg(test)]
#[path = "shared_test.rs"]
mod tests;

/// Cloneable handle to one engine behind a mutex
#[derive(Debug, Clone, Default)]
pub struct SharedDrain {
    inner: Arc<Mutex<Drain>>,
}

impl SharedDrain {
    /// Wrap an engine
    pub fn new(drain: Drain) -> Self {
        Self {
            inner: Arc::new(Mutex::new(drain)),
        }
    }

    /// Process one line under the lock
    pub fn process(&self, line: &str) -> ClusterUpdate {
        self.inner.lock().process(line).into_owned()
    }

    /// Copy of a cluster
    pub fn cluster(&self, id: ClusterId) -> Option<LogCluster> {
        self.inner.lock().cluster(id).cloned()
    }

    /// Copy of every cluster, in creation order
    pub fn clusters(&self) -> Vec<LogCluster> {
        self.inner.lock().clusters().to_vec()
    }

    /// Number of live clusters
    pub fn cluster_count(&self) -> usize {
        self.inner.lock().cluster_count()
    }

    /// Engine counters
    pub fn stats(&self) -> DrainStats {
        self.inner.lock().stats()
    }

    /// Run a closure with exclusive access to the engine
    pub fn with<R>(&self, f: impl FnOnce(&mut Drain) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Recover the engine if this is the last handle
    pub fn try_into_inner(self) -> Result<Drain, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}
