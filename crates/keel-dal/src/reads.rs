//! Reads and the naturally idempotent delete, all through the retry executor.

use chrono::{DateTime, SecondsFormat, Utc};
use keel_core::{DocId, Document, Filter, KeelResult};
use tracing::debug;

use crate::context::OpContext;

/// The one timestamp format `find_since` compares against: RFC 3339 in UTC
/// with exactly three fractional digits and a `Z` suffix, e.g.
/// `2024-03-01T12:00:00.000Z`. Values stored in any other shape (no
/// fraction, an offset, more digits) do not order correctly as text.
pub fn canonical_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Freshest state of one document.
pub(crate) fn get_by_id(ctx: &OpContext<'_>, id: &DocId) -> KeelResult<Option<Document>> {
    let span = crate::read_span!("get_by_id");
    let _guard = span.enter();

    let consistency = ctx.selector.single_read();
    let collection = ctx.collection(&consistency);
    let filter = Filter::by_id(id);
    let found = ctx.executor.run_read("get_by_id", |attempt| {
        let opts = consistency.call_options(format!("get_by_id attempt {}", attempt.number()));
        collection.find(&filter, &opts)
    })?;
    debug!(%id, found = found.len(), "read: get_by_id");
    Ok(found.into_iter().next())
}

/// Every document matching `filter`, from a durable snapshot.
pub(crate) fn find(ctx: &OpContext<'_>, filter: &Filter) -> KeelResult<Vec<Document>> {
    let span = crate::read_span!("find");
    let _guard = span.enter();

    let consistency = ctx.selector.multi_read();
    let collection = ctx.collection(&consistency);
    let found = ctx.executor.run_read("find", |attempt| {
        let opts = consistency.call_options(format!("find attempt {}", attempt.number()));
        collection.find(filter, &opts)
    })?;
    debug!(found = found.len(), "read: find");
    Ok(found)
}

/// Documents whose `field` is at or after `since`. The field must hold a
/// [`canonical_timestamp`] string; the comparison is textual.
pub(crate) fn find_since(
    ctx: &OpContext<'_>,
    field: &str,
    since: DateTime<Utc>,
) -> KeelResult<Vec<Document>> {
    find(ctx, &Filter::all().gte(field, canonical_timestamp(since)))
}

pub(crate) fn count(ctx: &OpContext<'_>, filter: &Filter) -> KeelResult<u64> {
    let span = crate::read_span!("count");
    let _guard = span.enter();

    let consistency = ctx.selector.multi_read();
    let collection = ctx.collection(&consistency);
    ctx.executor.run_read("count", |attempt| {
        let opts = consistency.call_options(format!("count attempt {}", attempt.number()));
        collection.count(filter, &opts)
    })
}

/// Remove a document. Deleting an absent document succeeds, which makes a
/// retry after a lost acknowledgment harmless.
pub(crate) fn delete_by_id(ctx: &OpContext<'_>, id: &DocId) -> KeelResult<()> {
    let consistency = ctx.selector.write();
    let collection = ctx.collection(&consistency);
    let filter = Filter::by_id(id);
    let removed = ctx.executor.run_read("delete", |attempt| {
        let opts = consistency.call_options(format!("delete attempt {}", attempt.number()));
        collection.delete_many(&filter, &opts)
    })?;
    debug!(%id, removed, "delete: done");
    Ok(())
}
