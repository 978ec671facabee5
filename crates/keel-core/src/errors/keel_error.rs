use crate::document::DocId;

use super::{ConfigError, DriverError, ErrorCategory};

/// Errors surfaced to callers of the data layer.
///
/// Raw driver errors never escape untyped: every failure is tagged with the
/// taxonomy the caller can branch on.
#[derive(Debug, thiserror::Error)]
pub enum KeelError {
    #[error("session is not connected")]
    NotConnected,

    #[error("session is already connected")]
    AlreadyConnected,

    #[error("session failed to connect earlier; create a new session")]
    SessionFailed,

    #[error("authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("could not connect to {address}")]
    ConnectionFailed {
        address: String,
        #[source]
        source: DriverError,
    },

    #[error("document id {id} already exists")]
    DuplicateId { id: DocId },

    #[error("store unavailable: {operation} failed twice with transient errors")]
    StoreUnavailable {
        operation: String,
        #[source]
        cause: DriverError,
    },

    #[error("{operation} failed ({category})")]
    Store {
        operation: String,
        category: ErrorCategory,
        #[source]
        source: DriverError,
    },

    #[error("document {id} not found")]
    NotFound { id: DocId },

    #[error("document {id} is malformed: {reason}")]
    MalformedDocument { id: DocId, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl KeelError {
    /// Stable code string for callers that branch on error kind.
    pub fn code(&self) -> &'static str {
        match self {
            KeelError::NotConnected => "NOT_CONNECTED",
            KeelError::AlreadyConnected => "ALREADY_CONNECTED",
            KeelError::SessionFailed => "SESSION_FAILED",
            KeelError::AuthenticationFailed { .. } => "AUTHENTICATION_FAILED",
            KeelError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            KeelError::DuplicateId { .. } => "DUPLICATE_ID",
            KeelError::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
            KeelError::Store {
                category: ErrorCategory::Unclassified,
                ..
            } => "UNCLASSIFIED",
            KeelError::Store { .. } => "TERMINAL",
            KeelError::NotFound { .. } => "NOT_FOUND",
            KeelError::MalformedDocument { .. } => "MALFORMED_DOCUMENT",
            KeelError::Config(_) => "CONFIG_ERROR",
        }
    }
}
