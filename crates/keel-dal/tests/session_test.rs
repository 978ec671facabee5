//! Session lifecycle: connect once, fail fast before connect, no reconnect
//! after failure.

use std::sync::Arc;

use keel_core::config::KeelConfig;
use keel_core::constants::codes;
use keel_core::{DocId, Document, Filter, KeelError};
use keel_dal::{Session, SessionState};
use keel_store::{Fault, MemoryConnector, OpKind, ReplicaSetStore};

fn config() -> KeelConfig {
    let mut config = KeelConfig::default();
    config.connection.address = "mem://test".to_string();
    config
}

fn session_with(config: KeelConfig, connector: MemoryConnector) -> Session {
    Session::new(config, Arc::new(connector)).unwrap()
}

#[test]
fn new_session_is_disconnected() {
    let store = Arc::new(ReplicaSetStore::new());
    let session = session_with(config(), MemoryConnector::new(store, "test"));
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[test]
fn operations_before_connect_fail_fast() {
    let store = Arc::new(ReplicaSetStore::new());
    let session = session_with(config(), MemoryConnector::new(Arc::clone(&store), "test"));
    let id = DocId::new("a");

    assert!(matches!(
        session.insert(&Document::with_counter(0)),
        Err(KeelError::NotConnected)
    ));
    assert!(matches!(
        session.increment_counter(&id),
        Err(KeelError::NotConnected)
    ));
    assert!(matches!(session.get_by_id(&id), Err(KeelError::NotConnected)));
    assert!(matches!(
        session.find(&Filter::all()),
        Err(KeelError::NotConnected)
    ));
    assert!(matches!(
        session.count(&Filter::all()),
        Err(KeelError::NotConnected)
    ));
    assert!(matches!(
        session.delete_by_id(&id),
        Err(KeelError::NotConnected)
    ));

    // Nothing reached the store.
    assert_eq!(store.faults().attempts(OpKind::Insert), 0);
    assert_eq!(store.faults().attempts(OpKind::Find), 0);
}

#[test]
fn connect_then_use() {
    let store = Arc::new(ReplicaSetStore::new());
    let session = session_with(config(), MemoryConnector::new(Arc::clone(&store), "test"));
    session.connect().unwrap();
    assert_eq!(session.state(), SessionState::Connected);

    let id = session.insert(&Document::with_counter(0)).unwrap();
    assert!(store.peek("dal", "example", id.as_str()).is_some());
}

#[test]
fn second_connect_is_rejected_and_session_stays_usable() {
    let store = Arc::new(ReplicaSetStore::new());
    let session = session_with(config(), MemoryConnector::new(store, "test"));
    session.connect().unwrap();

    assert!(matches!(session.connect(), Err(KeelError::AlreadyConnected)));
    assert_eq!(session.state(), SessionState::Connected);
    assert!(session.insert(&Document::with_counter(0)).is_ok());
}

#[test]
fn wrong_credentials_fail_authentication() {
    let store = Arc::new(ReplicaSetStore::new());
    let connector = MemoryConnector::new(store, "test").with_credentials("app", "s3cret");
    let mut config = config();
    config.connection.username = Some("app".to_string());
    config.connection.password = Some("wrong".to_string());
    let session = session_with(config, connector);

    match session.connect() {
        Err(KeelError::AuthenticationFailed { reason }) => assert!(reason.contains("app")),
        other => panic!("expected AuthenticationFailed, got {other:?}"),
    }
    assert_eq!(session.state(), SessionState::Failed);
}

#[test]
fn matching_credentials_connect() {
    let store = Arc::new(ReplicaSetStore::new());
    let connector = MemoryConnector::new(store, "test").with_credentials("app", "s3cret");
    let mut config = config();
    config.connection.username = Some("app".to_string());
    config.connection.password = Some("s3cret".to_string());
    let session = session_with(config, connector);

    session.connect().unwrap();
    assert_eq!(session.state(), SessionState::Connected);
}

#[test]
fn unknown_address_fails_connection() {
    let store = Arc::new(ReplicaSetStore::new());
    let session = session_with(config(), MemoryConnector::new(store, "other"));

    match session.connect() {
        Err(KeelError::ConnectionFailed { address, source }) => {
            assert_eq!(address, "mem://test");
            assert_eq!(source.code, codes::HOST_NOT_FOUND);
        }
        other => panic!("expected ConnectionFailed, got {other:?}"),
    }
    assert_eq!(session.state(), SessionState::Failed);
}

#[test]
fn failed_session_cannot_reconnect_or_operate() {
    let store = Arc::new(ReplicaSetStore::new());
    store
        .faults()
        .inject(OpKind::Connect, Fault::Before(codes::NETWORK_TIMEOUT));
    let session = session_with(config(), MemoryConnector::new(Arc::clone(&store), "test"));

    assert!(matches!(
        session.connect(),
        Err(KeelError::ConnectionFailed { .. })
    ));
    // The store is healthy again, but the session stays failed.
    assert_eq!(store.faults().pending(), 0);
    assert!(matches!(session.connect(), Err(KeelError::SessionFailed)));
    assert!(matches!(
        session.insert(&Document::with_counter(0)),
        Err(KeelError::NotConnected)
    ));
    assert_eq!(session.state(), SessionState::Failed);
}

#[test]
fn invalid_config_is_rejected_at_build() {
    let store = Arc::new(ReplicaSetStore::new());
    let mut config = config();
    config.ledger.opid_cap = 0;
    let result = Session::new(config, Arc::new(MemoryConnector::new(store, "test")));
    assert!(matches!(result, Err(KeelError::Config(_))));
}

#[test]
fn builder_accepts_a_custom_span() {
    let store = Arc::new(ReplicaSetStore::new());
    let session = Session::builder(Arc::new(MemoryConnector::new(store, "test")))
        .config(config())
        .span(tracing::info_span!("tenant", name = "acme"))
        .build()
        .unwrap();
    session.connect().unwrap();
    assert!(session.count(&Filter::all()).is_ok());
}

#[test]
fn session_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
}

#[test]
fn tracing_init_is_idempotent() {
    keel_dal::init_tracing_with_filter("keel=debug");
    keel_dal::init_tracing(&KeelConfig::default().observability);
}
