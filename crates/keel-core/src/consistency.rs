use serde::{Deserialize, Serialize};

/// Durability/freshness level a collection handle is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyLevel {
    /// Acknowledged by a quorum of replicas. Reads see a durable snapshot,
    /// not necessarily the newest write.
    Majority,
    /// Reads reflect every write acknowledged before the read started.
    /// May block while a quorum is unreachable.
    Linearizable,
}

impl ConsistencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyLevel::Majority => "majority",
            ConsistencyLevel::Linearizable => "linearizable",
        }
    }
}

impl std::fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
