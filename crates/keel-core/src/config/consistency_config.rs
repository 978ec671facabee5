use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Read bounds per consistency level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyConfig {
    /// Upper bound for a linearizable single-document read.
    pub linearizable_read_timeout_ms: u64,
    /// Optional bound for majority multi-document reads and counts.
    pub majority_read_timeout_ms: Option<u64>,
}

impl ConsistencyConfig {
    pub fn linearizable_read_timeout(&self) -> Duration {
        Duration::from_millis(self.linearizable_read_timeout_ms)
    }

    pub fn majority_read_timeout(&self) -> Option<Duration> {
        self.majority_read_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            linearizable_read_timeout_ms: defaults::DEFAULT_LINEARIZABLE_READ_TIMEOUT_MS,
            majority_read_timeout_ms: None,
        }
    }
}
