//! What a protocol needs to run: bound collection handles plus the shared
//! executor, selector and id source.

use std::sync::Arc;

use keel_core::traits::{Collection, IdGenerator, StoreClient};
use keel_core::ConsistencyLevel;

use crate::consistency::{Consistency, ConsistencySelector};
use crate::retry::RetryExecutor;

/// One collection handle per consistency level, bound at connect time and
/// read-only afterwards.
pub(crate) struct Handles {
    majority: Arc<dyn Collection>,
    linearizable: Arc<dyn Collection>,
}

impl Handles {
    pub(crate) fn bind(client: &dyn StoreClient, database: &str, collection: &str) -> Self {
        Self {
            majority: client.collection(database, collection, ConsistencyLevel::Majority),
            linearizable: client.collection(database, collection, ConsistencyLevel::Linearizable),
        }
    }

    pub(crate) fn for_level(&self, level: ConsistencyLevel) -> &dyn Collection {
        match level {
            ConsistencyLevel::Majority => self.majority.as_ref(),
            ConsistencyLevel::Linearizable => self.linearizable.as_ref(),
        }
    }
}

/// Borrowed view handed to the protocol functions for one call.
pub(crate) struct OpContext<'a> {
    pub handles: &'a Handles,
    pub executor: &'a RetryExecutor,
    pub selector: &'a ConsistencySelector,
    pub ids: &'a dyn IdGenerator,
    pub opid_cap: usize,
}

impl OpContext<'_> {
    /// The handle matching `consistency.level`.
    pub(crate) fn collection(&self, consistency: &Consistency) -> &dyn Collection {
        self.handles.for_level(consistency.level)
    }
}
