//! Reads per consistency level, time-window queries, counts and delete.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use keel_core::config::KeelConfig;
use keel_core::constants::codes;
use keel_core::{DocId, Document, Filter, KeelError};
use keel_dal::{canonical_timestamp, Session};
use keel_store::{Fault, MemoryConnector, OpKind, ReplicaSetStore};

fn connected_with(config: KeelConfig) -> (Arc<ReplicaSetStore>, Session) {
    let store = Arc::new(ReplicaSetStore::new());
    let mut config = config;
    config.connection.address = "mem://test".to_string();
    let session = Session::new(
        config,
        Arc::new(MemoryConnector::new(Arc::clone(&store), "test")),
    )
    .unwrap();
    session.connect().unwrap();
    (store, session)
}

fn connected() -> (Arc<ReplicaSetStore>, Session) {
    connected_with(KeelConfig::default())
}

fn short_linearizable_timeout() -> KeelConfig {
    let mut config = KeelConfig::default();
    config.consistency.linearizable_read_timeout_ms = 20;
    config
}

#[test]
fn get_by_id_returns_the_latest_state() {
    let (_store, session) = connected();
    let id = session.insert(&Document::with_counter(0)).unwrap();
    session.increment_counter(&id).unwrap();

    let doc = session.get_by_id(&id).unwrap().unwrap();
    assert_eq!(doc.counter(), Some(1));
    assert!(session.get_by_id(&DocId::new("absent")).unwrap().is_none());
}

#[test]
fn linearizable_read_times_out_without_quorum() {
    let (store, session) = connected_with(short_linearizable_timeout());
    let id = session.insert(&Document::with_counter(0)).unwrap();
    store.set_reachable_replicas(1);

    match session.get_by_id(&id) {
        Err(KeelError::StoreUnavailable { cause, .. }) => {
            assert_eq!(cause.code, codes::MAX_TIME_MS_EXPIRED)
        }
        other => panic!("expected StoreUnavailable, got {other:?}"),
    }
    assert_eq!(store.faults().attempts(OpKind::Find), 2);
}

#[test]
fn linearizable_read_waits_for_quorum_to_return() {
    let mut config = KeelConfig::default();
    config.consistency.linearizable_read_timeout_ms = 5_000;
    let (store, session) = connected_with(config);
    let id = session.insert(&Document::with_counter(0)).unwrap();
    store.set_reachable_replicas(1);

    let healer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            store.set_reachable_replicas(3);
        })
    };

    assert!(session.get_by_id(&id).unwrap().is_some());
    healer.join().unwrap();
}

#[test]
fn majority_reads_are_served_without_quorum() {
    let (store, session) = connected_with(short_linearizable_timeout());
    for _ in 0..3 {
        session.insert(&Document::with_counter(0)).unwrap();
    }
    store.set_reachable_replicas(1);

    assert_eq!(session.find(&Filter::all()).unwrap().len(), 3);
    assert_eq!(session.count(&Filter::all()).unwrap(), 3);
}

#[test]
fn reads_fail_when_no_member_is_reachable() {
    let (store, session) = connected();
    store.set_reachable_replicas(0);

    match session.find(&Filter::all()) {
        Err(KeelError::StoreUnavailable { cause, .. }) => {
            assert_eq!(cause.code, codes::HOST_UNREACHABLE)
        }
        other => panic!("expected StoreUnavailable, got {other:?}"),
    }
}

#[test]
fn find_and_count_apply_the_filter() {
    let (_store, session) = connected();
    for (name, kind) in [("a", "order"), ("b", "refund"), ("c", "order")] {
        session
            .insert(
                &Document::with_counter(0)
                    .with_id(DocId::new(name))
                    .with_field("kind", kind),
            )
            .unwrap();
    }

    let orders = session.find(&Filter::all().eq("kind", "order")).unwrap();
    let ids: Vec<&str> = orders
        .iter()
        .filter_map(|doc| doc.id().map(DocId::as_str))
        .collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert_eq!(session.count(&Filter::all().ne("kind", "order")).unwrap(), 1);
}

#[test]
fn find_since_selects_by_timestamp() {
    let (_store, session) = connected();
    for (name, at) in [
        ("old", "2024-01-01T00:00:00.000Z"),
        ("edge", "2024-03-01T12:00:00.000Z"),
        ("new", "2024-06-30T23:59:59.999Z"),
    ] {
        session
            .insert(
                &Document::with_counter(0)
                    .with_id(DocId::new(name))
                    .with_field("created_at", at),
            )
            .unwrap();
    }

    let since = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let found = session.find_since("created_at", since).unwrap();
    let ids: Vec<&str> = found
        .iter()
        .filter_map(|doc| doc.id().map(DocId::as_str))
        .collect();
    assert_eq!(ids, vec!["edge", "new"]);
}

#[test]
fn transient_read_failure_is_retried() {
    let (store, session) = connected();
    session.insert(&Document::with_counter(0)).unwrap();
    store
        .faults()
        .inject(OpKind::Count, Fault::Before(codes::SOCKET_EXCEPTION));

    assert_eq!(session.count(&Filter::all()).unwrap(), 1);
    assert_eq!(store.faults().attempts(OpKind::Count), 2);
}

#[test]
fn delete_is_idempotent() {
    let (store, session) = connected();
    let id = session.insert(&Document::with_counter(0)).unwrap();

    session.delete_by_id(&id).unwrap();
    assert!(store.peek("dal", "example", id.as_str()).is_none());
    session.delete_by_id(&id).unwrap();
}

#[test]
fn delete_with_lost_acknowledgment_succeeds() {
    let (store, session) = connected();
    let id = session.insert(&Document::with_counter(0)).unwrap();
    store
        .faults()
        .inject(OpKind::Delete, Fault::LostAck(codes::NETWORK_TIMEOUT));

    session.delete_by_id(&id).unwrap();
    assert!(store.is_empty("dal", "example"));
    assert_eq!(store.faults().attempts(OpKind::Delete), 2);
}

#[test]
fn majority_read_timeout_is_configurable() {
    let mut config = KeelConfig::default();
    config.consistency.majority_read_timeout_ms = Some(250);
    let (_store, session) = connected_with(config);
    session.insert(&Document::with_counter(0)).unwrap();
    assert_eq!(session.find(&Filter::all()).unwrap().len(), 1);
}

#[test]
fn duplicate_on_count_retry_is_not_a_zero_count() {
    let (store, session) = connected();
    session.insert(&Document::with_counter(0)).unwrap();
    store
        .faults()
        .inject(OpKind::Count, Fault::Before(codes::NETWORK_TIMEOUT));
    store
        .faults()
        .inject(OpKind::Count, Fault::Before(codes::DUPLICATE_KEY));

    match session.count(&Filter::all()) {
        Err(KeelError::StoreUnavailable { cause, .. }) => {
            assert_eq!(cause.code, codes::DUPLICATE_KEY)
        }
        other => panic!("expected StoreUnavailable, got {other:?}"),
    }
}

#[test]
fn canonical_timestamps_always_carry_milliseconds() {
    let whole_second = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    assert_eq!(canonical_timestamp(whole_second), "2024-03-01T12:00:00.000Z");
    let half_second = whole_second + chrono::Duration::milliseconds(500);
    assert_eq!(canonical_timestamp(half_second), "2024-03-01T12:00:00.500Z");
}

#[test]
fn find_since_orders_within_one_second() {
    let (_store, session) = connected();
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    for (name, offset_ms) in [("early", 0), ("late", 750)] {
        session
            .insert(
                &Document::with_counter(0)
                    .with_id(DocId::new(name))
                    .with_field(
                        "created_at",
                        canonical_timestamp(base + chrono::Duration::milliseconds(offset_ms)),
                    ),
            )
            .unwrap();
    }

    let found = session
        .find_since("created_at", base + chrono::Duration::milliseconds(500))
        .unwrap();
    let ids: Vec<&str> = found
        .iter()
        .filter_map(|doc| doc.id().map(DocId::as_str))
        .collect();
    assert_eq!(ids, vec!["late"]);
}
