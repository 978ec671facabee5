//! Session: connection lifecycle gating every protocol call.
//!
//! ```text
//! Disconnected ──connect()──▶ Connecting ──ok──▶ Connected
//!                                  └──────err──▶ Failed
//! ```
//! `Connected` and `Failed` are final; reconnecting means a new session.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use keel_core::config::KeelConfig;
use keel_core::constants::codes;
use keel_core::traits::{Connector, Credentials, IdGenerator, UuidV7Generator};
use keel_core::{DocId, Document, Filter, KeelError, KeelResult, OperationId};
use tracing::{info, warn, Span};

use crate::classifier::{ClassificationTable, ErrorClassifier};
use crate::consistency::ConsistencySelector;
use crate::context::{Handles, OpContext};
use crate::ledger::{self, Increment};
use crate::retry::RetryExecutor;
use crate::{insert, reads};

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

enum State {
    Disconnected,
    Connecting,
    Connected(Arc<Handles>),
    Failed,
}

impl State {
    fn public(&self) -> SessionState {
        match self {
            State::Disconnected => SessionState::Disconnected,
            State::Connecting => SessionState::Connecting,
            State::Connected(_) => SessionState::Connected,
            State::Failed => SessionState::Failed,
        }
    }
}

/// The entry point of the data layer. Share it across threads behind an `Arc`.
pub struct Session {
    config: KeelConfig,
    connector: Arc<dyn Connector>,
    ids: Arc<dyn IdGenerator>,
    executor: RetryExecutor,
    selector: ConsistencySelector,
    span: Span,
    state: Mutex<State>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.config.connection.address)
            .field("state", &self.state())
            .finish()
    }
}

impl Session {
    /// A session with default id generation and the configured code table.
    pub fn new(config: KeelConfig, connector: Arc<dyn Connector>) -> KeelResult<Self> {
        SessionBuilder::new(connector).config(config).build()
    }

    pub fn builder(connector: Arc<dyn Connector>) -> SessionBuilder {
        SessionBuilder::new(connector)
    }

    pub fn state(&self) -> SessionState {
        self.lock_state().public()
    }

    pub fn config(&self) -> &KeelConfig {
        &self.config
    }

    /// Connect and bind the majority and linearizable collection handles.
    ///
    /// Only valid from `Disconnected`. The state lock is not held while the
    /// connector runs.
    pub fn connect(&self) -> KeelResult<()> {
        let _guard = self.span.enter();
        {
            let mut state = self.lock_state();
            match *state {
                State::Disconnected => *state = State::Connecting,
                State::Connecting | State::Connected(_) => return Err(KeelError::AlreadyConnected),
                State::Failed => return Err(KeelError::SessionFailed),
            }
        }

        let conn = &self.config.connection;
        let credentials = match (&conn.username, &conn.password) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        match self.connector.connect(&conn.address, credentials.as_ref()) {
            Ok(client) => {
                let handles = Handles::bind(client.as_ref(), &conn.database, &conn.collection);
                *self.lock_state() = State::Connected(Arc::new(handles));
                info!("session: connected");
                Ok(())
            }
            Err(err) => {
                *self.lock_state() = State::Failed;
                warn!(code = err.code, error = %err.message, "session: connect failed");
                if err.code == codes::AUTHENTICATION_FAILED {
                    Err(KeelError::AuthenticationFailed {
                        reason: err.message,
                    })
                } else {
                    Err(KeelError::ConnectionFailed {
                        address: conn.address.clone(),
                        source: err,
                    })
                }
            }
        }
    }

    /// Insert a document, minting its id if it has none. Returns the id.
    pub fn insert(&self, doc: &Document) -> KeelResult<DocId> {
        self.with_context(|ctx| insert::insert(ctx, doc))
    }

    /// Increment `counter` on document `id` exactly once for this call.
    pub fn increment_counter(&self, id: &DocId) -> KeelResult<Increment> {
        let opid = OperationId::new(self.ids.next_id());
        self.with_context(|ctx| ledger::increment(ctx, id, &opid, true))
    }

    /// Increment under a caller-chosen operation id. Repeating the call with
    /// the same `opid` applies at most once, as long as the opid has not been
    /// evicted from the document's ledger.
    pub fn increment_counter_as(&self, id: &DocId, opid: &OperationId) -> KeelResult<Increment> {
        self.with_context(|ctx| ledger::increment(ctx, id, opid, false))
    }

    /// Mint an operation id for use with [`Session::increment_counter_as`].
    pub fn new_operation_id(&self) -> OperationId {
        OperationId::new(self.ids.next_id())
    }

    /// Linearizable read of one document.
    pub fn get_by_id(&self, id: &DocId) -> KeelResult<Option<Document>> {
        self.with_context(|ctx| reads::get_by_id(ctx, id))
    }

    /// Majority read of all documents matching `filter`.
    pub fn find(&self, filter: &Filter) -> KeelResult<Vec<Document>> {
        self.with_context(|ctx| reads::find(ctx, filter))
    }

    /// Majority read of documents whose `field` timestamp is at or after `since`.
    /// Store the field with [`crate::canonical_timestamp`] so it compares
    /// correctly.
    pub fn find_since(&self, field: &str, since: DateTime<Utc>) -> KeelResult<Vec<Document>> {
        self.with_context(|ctx| reads::find_since(ctx, field, since))
    }

    /// Majority count of documents matching `filter`.
    pub fn count(&self, filter: &Filter) -> KeelResult<u64> {
        self.with_context(|ctx| reads::count(ctx, filter))
    }

    /// Delete a document; succeeds whether or not it existed.
    pub fn delete_by_id(&self, id: &DocId) -> KeelResult<()> {
        self.with_context(|ctx| reads::delete_by_id(ctx, id))
    }

    /// Assert `Connected`, then run `f` inside the session span.
    fn with_context<T>(&self, f: impl FnOnce(&OpContext<'_>) -> KeelResult<T>) -> KeelResult<T> {
        let handles = match &*self.lock_state() {
            State::Connected(handles) => Arc::clone(handles),
            _ => return Err(KeelError::NotConnected),
        };
        let _guard = self.span.enter();
        let ctx = OpContext {
            handles: &handles,
            executor: &self.executor,
            selector: &self.selector,
            ids: self.ids.as_ref(),
            opid_cap: self.config.ledger.opid_cap,
        };
        f(&ctx)
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        // Transitions are single assignments; a poisoned lock still holds a
        // valid state.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Builder for [`Session`] with injectable collaborators.
pub struct SessionBuilder {
    connector: Arc<dyn Connector>,
    config: KeelConfig,
    ids: Option<Arc<dyn IdGenerator>>,
    table: Option<ClassificationTable>,
    span: Option<Span>,
}

impl SessionBuilder {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            config: KeelConfig::default(),
            ids: None,
            table: None,
            span: None,
        }
    }

    pub fn config(mut self, config: KeelConfig) -> Self {
        self.config = config;
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Override the code table built from `config.classifier`.
    pub fn classification_table(mut self, table: ClassificationTable) -> Self {
        self.table = Some(table);
        self
    }

    /// Span that scopes every event this session emits. Defaults to a
    /// `keel.session` span tagged with the address and namespace.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn build(self) -> KeelResult<Session> {
        self.config.validate()?;

        let table = self
            .table
            .unwrap_or_else(|| ClassificationTable::from_config(&self.config.classifier));
        let conn = &self.config.connection;
        let span = self.span.unwrap_or_else(|| {
            crate::session_span!(conn.address, format!("{}.{}", conn.database, conn.collection))
        });

        Ok(Session {
            connector: self.connector,
            ids: self.ids.unwrap_or_else(|| Arc::new(UuidV7Generator)),
            executor: RetryExecutor::new(Arc::new(ErrorClassifier::new(table))),
            selector: ConsistencySelector::from_config(&self.config.consistency),
            span,
            state: Mutex::new(State::Disconnected),
            config: self.config,
        })
    }
}
