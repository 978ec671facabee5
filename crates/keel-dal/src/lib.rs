//! keel-dal: idempotent writes over a replicated document store.
//!
//! Every call runs through a single-retry executor: one attempt, and one more
//! only when the first failed transiently. Inserts fix their id before the
//! first send and counter increments carry an operation id recorded in the
//! document, so a retry after a lost acknowledgment never applies twice.
//!
//! ```text
//! Session ── connect ──▶ Handles { majority, linearizable }
//!    │
//!    ├─ insert ─────────┐
//!    ├─ increment ──────┤── RetryExecutor ── ErrorClassifier
//!    └─ reads/delete ───┘         │
//!                       ConsistencySelector
//! ```

pub mod classifier;
pub mod consistency;
mod context;
mod insert;
pub mod ledger;
mod reads;
pub mod retry;
pub mod session;
pub mod tracing_setup;

pub use classifier::{Attempt, ClassificationTable, CodeClass, ErrorClassifier};
pub use consistency::{Consistency, ConsistencySelector, OperationShape};
pub use ledger::Increment;
pub use reads::canonical_timestamp;
pub use retry::{Failure, FailureKind, RetryExecutor, RetryOutcome};
pub use session::{Session, SessionBuilder, SessionState};
pub use tracing_setup::{init_tracing, init_tracing_with_filter};
