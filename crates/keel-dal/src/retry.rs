//! RetryExecutor: one attempt, plus exactly one more when the first failure
//! leaves the outcome unknown.

use std::sync::Arc;

use keel_core::{DriverError, DriverResult, ErrorCategory, KeelError, KeelResult};
use tracing::{debug, warn};

use crate::classifier::{Attempt, ErrorClassifier};

/// Result of running an operation through the executor.
#[derive(Debug)]
pub enum RetryOutcome<T> {
    /// An attempt succeeded and produced a value.
    Success(T),
    /// The retry hit a duplicate: the first attempt applied but no value is
    /// available.
    SuccessNoOp,
    Failure(Failure),
}

/// Why a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Two attempts in a row could not reach a usable store.
    StoreUnavailable,
    /// The first attempt failed in a way retrying cannot fix.
    Rejected(ErrorCategory),
}

/// A failed run, tagged by taxonomy, with the driver error that ended it.
#[derive(Debug, Clone)]
pub struct Failure {
    pub kind: FailureKind,
    pub operation: String,
    pub cause: DriverError,
}

impl Failure {
    pub fn into_error(self) -> KeelError {
        match self.kind {
            FailureKind::StoreUnavailable => KeelError::StoreUnavailable {
                operation: self.operation,
                cause: self.cause,
            },
            FailureKind::Rejected(category) => KeelError::Store {
                operation: self.operation,
                category,
                source: self.cause,
            },
        }
    }
}

impl<T> RetryOutcome<T> {
    pub fn is_success(&self) -> bool {
        !matches!(self, RetryOutcome::Failure(_))
    }

    /// Collapse into a `Result`; `SuccessNoOp` becomes `Ok(None)`.
    pub fn into_result(self) -> KeelResult<Option<T>> {
        match self {
            RetryOutcome::Success(value) => Ok(Some(value)),
            RetryOutcome::SuccessNoOp => Ok(None),
            RetryOutcome::Failure(failure) => Err(failure.into_error()),
        }
    }
}

/// Stateless single-retry executor; cheap to clone and share across threads.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    classifier: Arc<ErrorClassifier>,
}

impl RetryExecutor {
    pub fn new(classifier: Arc<ErrorClassifier>) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    /// Run `op`, retrying once on a transient failure.
    ///
    /// Attempts are strictly sequential. `op` receives the attempt so callers
    /// can read an empty result differently on the retry.
    pub fn run<T, F>(&self, operation: &str, op: F) -> RetryOutcome<T>
    where
        F: FnMut(Attempt) -> DriverResult<T>,
    {
        match self.settle(operation, op) {
            Settled::Value(value) => RetryOutcome::Success(value),
            Settled::DuplicateOnRetry(cause) => {
                debug!(
                    operation,
                    code = cause.code,
                    "retry: duplicate on retry, first attempt had applied"
                );
                RetryOutcome::SuccessNoOp
            }
            Settled::Failed(failure) => RetryOutcome::Failure(failure),
        }
    }

    /// Like [`RetryExecutor::run`] for operations that create nothing.
    ///
    /// A duplicate key on the retry cannot stem from the first attempt, so it
    /// is reported as an unavailable store instead of a no-op success.
    pub fn run_read<T, F>(&self, operation: &str, op: F) -> KeelResult<T>
    where
        F: FnMut(Attempt) -> DriverResult<T>,
    {
        match self.settle(operation, op) {
            Settled::Value(value) => Ok(value),
            Settled::DuplicateOnRetry(cause) => {
                warn!(
                    operation,
                    code = cause.code,
                    "retry: duplicate key on the retry of an operation that writes nothing"
                );
                Err(Failure {
                    kind: FailureKind::StoreUnavailable,
                    operation: operation.to_string(),
                    cause,
                }
                .into_error())
            }
            Settled::Failed(failure) => Err(failure.into_error()),
        }
    }

    fn settle<T, F>(&self, operation: &str, mut op: F) -> Settled<T>
    where
        F: FnMut(Attempt) -> DriverResult<T>,
    {
        let first = match op(Attempt::First) {
            Ok(value) => return Settled::Value(value),
            Err(err) => err,
        };

        let category = self.classifier.classify(&first, Attempt::First);
        if !category.is_retryable() {
            debug!(
                operation,
                code = first.code,
                %category,
                "retry: first attempt failed, not retrying"
            );
            return Settled::Failed(Failure {
                kind: FailureKind::Rejected(category),
                operation: operation.to_string(),
                cause: first,
            });
        }

        warn!(
            operation,
            code = first.code,
            error = %first.message,
            "retry: transient failure, retrying once"
        );

        let second = match op(Attempt::Retry) {
            Ok(value) => {
                debug!(operation, "retry: second attempt succeeded");
                return Settled::Value(value);
            }
            Err(err) => err,
        };

        match self.classifier.classify(&second, Attempt::Retry) {
            ErrorCategory::AmbiguousDuplicate => Settled::DuplicateOnRetry(second),
            category => {
                warn!(
                    operation,
                    code = second.code,
                    %category,
                    error = %second.message,
                    "retry: second attempt failed, store unavailable"
                );
                Settled::Failed(Failure {
                    kind: FailureKind::StoreUnavailable,
                    operation: operation.to_string(),
                    cause: second,
                })
            }
        }
    }
}

/// How a run ended before the caller interprets a duplicate on the retry.
enum Settled<T> {
    Value(T),
    DuplicateOnRetry(DriverError),
    Failed(Failure),
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(Arc::new(ErrorClassifier::default()))
    }
}
