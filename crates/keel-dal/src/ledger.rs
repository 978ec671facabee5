//! Idempotent counter increment backed by a per-document opid ledger.
//!
//! Each logical increment carries one operation id. The update only matches
//! while that id is absent from the document's `opids`, and it appends the id
//! in the same atomic step, so any number of deliveries of one logical call
//! apply at most once. The ledger is capped; an id evicted before its retry
//! arrives is no longer protected.

use keel_core::constants::{COUNTER_FIELD, OPIDS_FIELD};
use keel_core::{DocId, Document, Filter, KeelError, KeelResult, OperationId, Projection, Update};
use tracing::{debug, info};

use crate::classifier::Attempt;
use crate::context::OpContext;
use crate::reads;
use crate::retry::RetryOutcome;

/// Result of one logical increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Increment {
    /// Applied by this call; `counter` is the authoritative new value.
    Applied { counter: i64 },
    /// An earlier delivery of this call already applied and its
    /// acknowledgment was lost. No value is available: re-read the document
    /// if the current count is needed.
    AlreadyApplied,
}

impl Increment {
    pub fn counter(&self) -> Option<i64> {
        match self {
            Increment::Applied { counter } => Some(*counter),
            Increment::AlreadyApplied => None,
        }
    }
}

/// What one attempt of the conditional update observed.
enum Step {
    Updated(Document),
    NoMatch(Attempt),
}

/// Increment `id` under `opid`. `minted` is true when the opid was created
/// for this call, so it cannot already be in any ledger.
pub(crate) fn increment(
    ctx: &OpContext<'_>,
    id: &DocId,
    opid: &OperationId,
    minted: bool,
) -> KeelResult<Increment> {
    let span = crate::increment_span!(id, opid);
    let _guard = span.enter();

    let consistency = ctx.selector.write();
    let collection = ctx.collection(&consistency);
    let filter = Filter::by_id(id).not_contains(OPIDS_FIELD, opid.as_str());
    let update = Update::new()
        .inc(COUNTER_FIELD, 1)
        .push_capped(OPIDS_FIELD, opid.as_str(), ctx.opid_cap);
    let projection = Projection::only([COUNTER_FIELD]);

    let outcome = ctx.executor.run("increment", |attempt| {
        let opts = consistency.call_options(format!(
            "increment opid {opid} attempt {}",
            attempt.number()
        ));
        Ok(
            match collection.find_one_and_update(&filter, &update, &projection, &opts)? {
                Some(post_image) => Step::Updated(post_image),
                None => Step::NoMatch(attempt),
            },
        )
    });

    match outcome {
        RetryOutcome::Success(Step::Updated(post_image)) => {
            let counter = post_image
                .counter()
                .ok_or_else(|| KeelError::MalformedDocument {
                    id: id.clone(),
                    reason: format!("'{COUNTER_FIELD}' is missing or not an integer"),
                })?;
            debug!(%id, counter, "increment: applied");
            Ok(Increment::Applied { counter })
        }
        RetryOutcome::SuccessNoOp => {
            info!(%id, %opid, "increment: already applied by an earlier delivery");
            Ok(Increment::AlreadyApplied)
        }
        // A fresh opid cannot be in any ledger before the first send.
        RetryOutcome::Success(Step::NoMatch(Attempt::First)) if minted => {
            Err(KeelError::NotFound { id: id.clone() })
        }
        // A miss on the retry, or on a replayed caller opid, means either the
        // opid is already in the ledger or the document does not exist.
        RetryOutcome::Success(Step::NoMatch(attempt)) => match reads::get_by_id(ctx, id)? {
            Some(_) => {
                info!(
                    %id,
                    %opid,
                    attempt = attempt.number(),
                    "increment: already applied by an earlier delivery"
                );
                Ok(Increment::AlreadyApplied)
            }
            None => Err(KeelError::NotFound { id: id.clone() }),
        },
        RetryOutcome::Failure(failure) => Err(failure.into_error()),
    }
}
