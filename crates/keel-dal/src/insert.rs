//! Idempotent insert: the id is fixed before the first send, so a retried
//! insert can collide only with itself.

use keel_core::{DocId, Document, KeelError, KeelResult};
use tracing::{debug, info};

use crate::context::OpContext;
use crate::retry::{FailureKind, RetryOutcome};

/// Insert `doc` and return its id. The caller's document is never modified.
pub(crate) fn insert(ctx: &OpContext<'_>, doc: &Document) -> KeelResult<DocId> {
    let mut doc = doc.clone();
    let id = match doc.id() {
        Some(id) => id.clone(),
        None => {
            let id = DocId::new(ctx.ids.next_id());
            doc.id = Some(id.clone());
            id
        }
    };

    let span = crate::insert_span!(id);
    let _guard = span.enter();

    let consistency = ctx.selector.write();
    let collection = ctx.collection(&consistency);
    let outcome = ctx.executor.run("insert", |attempt| {
        let opts = consistency.call_options(format!("insert attempt {}", attempt.number()));
        collection.insert_one(&doc, &opts)
    });

    match outcome {
        RetryOutcome::Success(()) => {
            debug!(%id, "insert: stored");
            Ok(id)
        }
        RetryOutcome::SuccessNoOp => {
            info!(%id, "insert: first attempt had applied, acknowledgment was lost");
            Ok(id)
        }
        RetryOutcome::Failure(failure)
            if matches!(failure.kind, FailureKind::Rejected(_))
                && ctx.executor.classifier().is_duplicate_key(&failure.cause) =>
        {
            Err(KeelError::DuplicateId { id })
        }
        RetryOutcome::Failure(failure) => Err(failure.into_error()),
    }
}
