use serde::{Deserialize, Serialize};

use super::defaults;

/// Opid ledger tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Maximum operation ids kept per document, oldest evicted first.
    /// Must exceed the number of increments that can be in flight on one
    /// document at the same time, or a late retry may no longer find its own
    /// opid and apply twice.
    pub opid_cap: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            opid_cap: defaults::DEFAULT_OPID_CAP,
        }
    }
}
