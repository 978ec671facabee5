//! Connect-by-address for the in-process store.

use std::sync::Arc;

use keel_core::constants::codes;
use keel_core::traits::{Collection, Connector, Credentials, StoreClient};
use keel_core::{ConsistencyLevel, DriverError, DriverResult};

use crate::collection::MemoryCollection;
use crate::faults::OpKind;
use crate::replica_set::ReplicaSetStore;

/// Address prefix accepted by [`MemoryConnector`].
pub const ADDRESS_SCHEME: &str = "mem://";

/// Resolves `mem://<name>` to one shared [`ReplicaSetStore`].
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    store: Arc<ReplicaSetStore>,
    name: String,
    required: Option<Credentials>,
}

impl MemoryConnector {
    pub fn new(store: Arc<ReplicaSetStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            required: None,
        }
    }

    /// Reject connections that do not present exactly these credentials.
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.required = Some(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        });
        self
    }

    pub fn address(&self) -> String {
        format!("{ADDRESS_SCHEME}{}", self.name)
    }

    pub fn store(&self) -> &Arc<ReplicaSetStore> {
        &self.store
    }
}

impl Connector for MemoryConnector {
    fn connect(
        &self,
        address: &str,
        credentials: Option<&Credentials>,
    ) -> DriverResult<Arc<dyn StoreClient>> {
        if let Some(fault) = self.store.faults().next(OpKind::Connect) {
            return Err(fault.into_error(OpKind::Connect));
        }

        let name = address.strip_prefix(ADDRESS_SCHEME).ok_or_else(|| {
            DriverError::new(
                codes::FAILED_TO_PARSE,
                format!("unsupported address '{address}', expected {ADDRESS_SCHEME}<name>"),
            )
        })?;
        if name != self.name {
            return Err(DriverError::new(
                codes::HOST_NOT_FOUND,
                format!("no replica set named '{name}'"),
            ));
        }
        self.store.ensure_reachable()?;

        if let Some(required) = &self.required {
            if credentials != Some(required) {
                let user = credentials.map(|c| c.username.as_str()).unwrap_or("<none>");
                return Err(DriverError::new(
                    codes::AUTHENTICATION_FAILED,
                    format!("authentication failed for user '{user}'"),
                ));
            }
        }

        tracing::debug!(address, "store: client connected");
        Ok(Arc::new(MemoryClient {
            store: Arc::clone(&self.store),
        }))
    }
}

/// Client handed out by [`MemoryConnector`].
#[derive(Debug, Clone)]
pub struct MemoryClient {
    store: Arc<ReplicaSetStore>,
}

impl StoreClient for MemoryClient {
    fn collection(
        &self,
        database: &str,
        name: &str,
        level: ConsistencyLevel,
    ) -> Arc<dyn Collection> {
        Arc::new(MemoryCollection::new(
            Arc::clone(&self.store),
            database,
            name,
            level,
        ))
    }
}
