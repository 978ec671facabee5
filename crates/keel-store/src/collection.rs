//! MemoryCollection: one collection of a [`ReplicaSetStore`] seen at one
//! consistency level.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;

use keel_core::constants::codes;
use keel_core::traits::{CallOptions, Collection};
use keel_core::{
    ConsistencyLevel, DriverError, DriverResult, Document, Filter, Projection, Update,
};

use crate::eval;
use crate::faults::{Fault, OpKind};
use crate::replica_set::{DocumentMap, ReplicaSetStore};

/// Collection handle bound to a consistency level.
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    store: Arc<ReplicaSetStore>,
    docs: Arc<DocumentMap>,
    namespace: String,
    level: ConsistencyLevel,
}

impl MemoryCollection {
    pub fn new(
        store: Arc<ReplicaSetStore>,
        database: &str,
        name: &str,
        level: ConsistencyLevel,
    ) -> Self {
        let docs = store.documents(database, name);
        Self {
            store,
            docs,
            namespace: format!("{database}.{name}"),
            level,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Run one operation under fault injection and the availability rules of
    /// this handle's level.
    fn execute<T>(
        &self,
        kind: OpKind,
        opts: &CallOptions,
        op: impl FnOnce() -> DriverResult<T>,
    ) -> DriverResult<T> {
        let fault = self.store.faults().next(kind);
        if let Some(before @ Fault::Before(_)) = fault {
            return Err(before.into_error(kind));
        }

        match kind {
            OpKind::Insert | OpKind::Update | OpKind::Delete => self.store.ensure_writable()?,
            _ => {
                self.store.ensure_reachable()?;
                if self.level == ConsistencyLevel::Linearizable {
                    self.store.wait_for_quorum(opts.max_time)?;
                }
            }
        }

        tracing::trace!(
            namespace = %self.namespace,
            level = %self.level,
            ?kind,
            comment = opts.comment.as_deref().unwrap_or(""),
            "store: executing"
        );
        let result = op();

        match fault {
            Some(lost @ Fault::LostAck(_)) => Err(lost.into_error(kind)),
            _ => result,
        }
    }

    fn matching_ids(&self, filter: &Filter) -> Vec<String> {
        if let Some(id) = &filter.id {
            return vec![id.to_string()];
        }
        let mut ids: Vec<String> = self
            .docs
            .iter()
            .filter(|entry| eval::matches(filter, entry.value()))
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        ids
    }
}

impl Collection for MemoryCollection {
    fn level(&self) -> ConsistencyLevel {
        self.level
    }

    fn insert_one(&self, doc: &Document, opts: &CallOptions) -> DriverResult<()> {
        self.execute(OpKind::Insert, opts, || {
            let id = doc.id().ok_or_else(|| {
                DriverError::new(codes::BAD_VALUE, "document must carry an id before insert")
            })?;
            match self.docs.entry(id.to_string()) {
                Entry::Occupied(_) => Err(DriverError::new(
                    codes::DUPLICATE_KEY,
                    format!(
                        "E11000 duplicate key error collection: {} dup key: {{ _id: \"{id}\" }}",
                        self.namespace
                    ),
                )),
                Entry::Vacant(slot) => {
                    slot.insert(doc.clone());
                    Ok(())
                }
            }
        })
    }

    fn find(&self, filter: &Filter, opts: &CallOptions) -> DriverResult<Vec<Document>> {
        self.execute(OpKind::Find, opts, || {
            let mut found: Vec<Document> = match &filter.id {
                Some(id) => self
                    .docs
                    .get(id.as_str())
                    .filter(|entry| eval::matches(filter, entry.value()))
                    .map(|entry| vec![entry.value().clone()])
                    .unwrap_or_default(),
                None => self
                    .docs
                    .iter()
                    .filter(|entry| eval::matches(filter, entry.value()))
                    .map(|entry| entry.value().clone())
                    .collect(),
            };
            found.sort_by(|a, b| a.id().cmp(&b.id()));
            Ok(found)
        })
    }

    fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
        projection: &Projection,
        opts: &CallOptions,
    ) -> DriverResult<Option<Document>> {
        self.execute(OpKind::Update, opts, || {
            for id in self.matching_ids(filter) {
                // The shard write lock makes check-then-apply atomic per document.
                let Some(mut entry) = self.docs.get_mut(&id) else {
                    continue;
                };
                if !eval::matches(filter, entry.value()) {
                    continue;
                }
                let mut next = entry.value().clone();
                eval::apply(update, &mut next)?;
                *entry.value_mut() = next;
                let post_image = entry.value();
                return Ok(Some(match &projection.fields {
                    Some(fields) => post_image.project(fields),
                    None => post_image.clone(),
                }));
            }
            Ok(None)
        })
    }

    fn delete_many(&self, filter: &Filter, opts: &CallOptions) -> DriverResult<u64> {
        self.execute(OpKind::Delete, opts, || {
            let mut removed = 0;
            for id in self.matching_ids(filter) {
                if self
                    .docs
                    .remove_if(&id, |_, doc| eval::matches(filter, doc))
                    .is_some()
                {
                    removed += 1;
                }
            }
            Ok(removed)
        })
    }

    fn count(&self, filter: &Filter, opts: &CallOptions) -> DriverResult<u64> {
        self.execute(OpKind::Count, opts, || {
            let n = self
                .docs
                .iter()
                .filter(|entry| eval::matches(filter, entry.value()))
                .count();
            Ok(n as u64)
        })
    }
}
