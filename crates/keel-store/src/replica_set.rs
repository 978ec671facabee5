//! ReplicaSetStore: shared state behind every client and collection handle:
//! namespaced document maps, replica reachability, and the fault injector.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;

use keel_core::constants::codes;
use keel_core::{DriverError, DriverResult, Document};

use crate::faults::FaultInjector;

/// Replica count used by [`ReplicaSetStore::new`].
pub const DEFAULT_REPLICAS: usize = 3;

/// Documents of one collection, keyed by id. Each entry lives in one shard,
/// so conditional updates on different documents never contend.
pub(crate) type DocumentMap = DashMap<String, Document>;

/// An in-process replica set.
#[derive(Debug)]
pub struct ReplicaSetStore {
    collections: DashMap<String, Arc<DocumentMap>>,
    replicas: usize,
    reachable: Mutex<usize>,
    quorum_changed: Condvar,
    faults: FaultInjector,
}

impl ReplicaSetStore {
    /// A healthy three-member replica set.
    pub fn new() -> Self {
        Self::with_replicas(DEFAULT_REPLICAS)
    }

    pub fn with_replicas(replicas: usize) -> Self {
        let replicas = replicas.max(1);
        Self {
            collections: DashMap::new(),
            replicas,
            reachable: Mutex::new(replicas),
            quorum_changed: Condvar::new(),
            faults: FaultInjector::new(),
        }
    }

    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Members needed to acknowledge a majority write.
    pub fn quorum(&self) -> usize {
        self.replicas / 2 + 1
    }

    /// Simulate a partition or election: only `n` members stay reachable.
    /// Wakes any linearizable read waiting for quorum.
    pub fn set_reachable_replicas(&self, n: usize) {
        let n = n.min(self.replicas);
        *self.lock_reachable() = n;
        tracing::info!(reachable = n, replicas = self.replicas, "store: reachability changed");
        self.quorum_changed.notify_all();
    }

    pub fn reachable_replicas(&self) -> usize {
        *self.lock_reachable()
    }

    pub fn has_quorum(&self) -> bool {
        self.reachable_replicas() >= self.quorum()
    }

    /// Fails when no member at all can be reached.
    pub(crate) fn ensure_reachable(&self) -> DriverResult<()> {
        if self.reachable_replicas() == 0 {
            return Err(DriverError::new(
                codes::HOST_UNREACHABLE,
                "no replica set member is reachable",
            ));
        }
        Ok(())
    }

    /// Majority writes need a primary backed by a quorum.
    pub(crate) fn ensure_writable(&self) -> DriverResult<()> {
        self.ensure_reachable()?;
        if !self.has_quorum() {
            return Err(DriverError::new(
                codes::NOT_WRITABLE_PRIMARY,
                "no primary: replica set has lost quorum",
            ));
        }
        Ok(())
    }

    /// Block until a quorum is reachable. With a `max_time`, give up after it
    /// elapses and report the expiry as a driver error.
    pub(crate) fn wait_for_quorum(&self, max_time: Option<Duration>) -> DriverResult<()> {
        let quorum = self.quorum();
        let mut reachable = self.lock_reachable();
        match max_time {
            None => {
                while *reachable < quorum {
                    reachable = self
                        .quorum_changed
                        .wait(reachable)
                        .unwrap_or_else(|e| e.into_inner());
                }
            }
            Some(limit) => {
                let deadline = Instant::now() + limit;
                while *reachable < quorum {
                    let now = Instant::now();
                    if now >= deadline {
                        tracing::debug!(
                            max_time_ms = limit.as_millis() as u64,
                            "store: linearizable read timed out waiting for quorum"
                        );
                        return Err(DriverError::new(
                            codes::MAX_TIME_MS_EXPIRED,
                            "operation exceeded time limit",
                        ));
                    }
                    let (guard, _) = self
                        .quorum_changed
                        .wait_timeout(reachable, deadline - now)
                        .unwrap_or_else(|e| e.into_inner());
                    reachable = guard;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn documents(&self, database: &str, collection: &str) -> Arc<DocumentMap> {
        let namespace = format!("{database}.{collection}");
        self.collections
            .entry(namespace)
            .or_insert_with(|| Arc::new(DashMap::new()))
            .clone()
    }

    /// Direct snapshot of one document, bypassing faults and reachability.
    /// For assertions in tests and tooling.
    pub fn peek(&self, database: &str, collection: &str, id: &str) -> Option<Document> {
        self.documents(database, collection)
            .get(id)
            .map(|entry| entry.value().clone())
    }

    /// Number of stored documents, bypassing faults and reachability.
    pub fn len(&self, database: &str, collection: &str) -> usize {
        self.documents(database, collection).len()
    }

    pub fn is_empty(&self, database: &str, collection: &str) -> bool {
        self.len(database, collection) == 0
    }

    fn lock_reachable(&self) -> std::sync::MutexGuard<'_, usize> {
        self.reachable.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ReplicaSetStore {
    fn default() -> Self {
        Self::new()
    }
}
