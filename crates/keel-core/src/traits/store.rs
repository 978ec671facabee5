//! The storage-driver boundary. The protocol layer only ever talks to a store
//! through these traits.

use std::sync::Arc;
use std::time::Duration;

use crate::consistency::ConsistencyLevel;
use crate::document::Document;
use crate::errors::DriverResult;
use crate::query::{Filter, Projection, Update};

/// Per-call options attached by the consistency selector and the protocols.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Server-side time limit. Expiry is reported as a driver error, never
    /// as a blocked call.
    pub max_time: Option<Duration>,
    /// Free-form tag recorded with the operation, for tracing on the store side.
    pub comment: Option<String>,
}

impl CallOptions {
    pub fn with_max_time(mut self, max_time: Option<Duration>) -> Self {
        self.max_time = max_time;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opens client connections by address.
pub trait Connector: Send + Sync {
    fn connect(
        &self,
        address: &str,
        credentials: Option<&Credentials>,
    ) -> DriverResult<Arc<dyn StoreClient>>;
}

/// A connected client that hands out collection handles.
pub trait StoreClient: Send + Sync {
    /// A handle whose reads and writes use the given consistency level.
    fn collection(
        &self,
        database: &str,
        name: &str,
        level: ConsistencyLevel,
    ) -> Arc<dyn Collection>;
}

/// Document operations on one collection at one consistency level.
pub trait Collection: Send + Sync {
    fn level(&self) -> ConsistencyLevel;

    /// Insert a document that already carries its id. A taken id fails with a
    /// duplicate-key code.
    fn insert_one(&self, doc: &Document, opts: &CallOptions) -> DriverResult<()>;

    fn find(&self, filter: &Filter, opts: &CallOptions) -> DriverResult<Vec<Document>>;

    /// Atomically apply `update` to the first document matching `filter` and
    /// return its projected post-image, or `None` when nothing matched.
    fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
        projection: &Projection,
        opts: &CallOptions,
    ) -> DriverResult<Option<Document>>;

    /// Delete every matching document, returning how many were removed.
    fn delete_many(&self, filter: &Filter, opts: &CallOptions) -> DriverResult<u64>;

    fn count(&self, filter: &Filter, opts: &CallOptions) -> DriverResult<u64>;
}
