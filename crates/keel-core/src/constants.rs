//! Driver error codes and reserved field names.
//!
//! Codes follow the numbering used by replica-set document stores so that a
//! real driver can report them unchanged.

/// Numeric failure codes reported by a store driver.
pub mod codes {
    pub const BAD_VALUE: i32 = 2;
    pub const HOST_UNREACHABLE: i32 = 6;
    pub const HOST_NOT_FOUND: i32 = 7;
    pub const FAILED_TO_PARSE: i32 = 9;
    pub const UNAUTHORIZED: i32 = 13;
    pub const TYPE_MISMATCH: i32 = 14;
    pub const AUTHENTICATION_FAILED: i32 = 18;
    pub const MAX_TIME_MS_EXPIRED: i32 = 50;
    pub const NETWORK_TIMEOUT: i32 = 89;
    pub const SHUTDOWN_IN_PROGRESS: i32 = 91;
    pub const DOCUMENT_VALIDATION_FAILURE: i32 = 121;
    pub const PRIMARY_STEPPED_DOWN: i32 = 189;
    pub const EXCEEDED_TIME_LIMIT: i32 = 262;
    pub const SOCKET_EXCEPTION: i32 = 9001;
    pub const NOT_WRITABLE_PRIMARY: i32 = 10107;
    pub const DUPLICATE_KEY: i32 = 11000;
    pub const DUPLICATE_KEY_ON_UPDATE: i32 = 11001;
    pub const INTERRUPTED_AT_SHUTDOWN: i32 = 11600;
    pub const INTERRUPTED: i32 = 11601;
    pub const INTERRUPTED_DUE_TO_REPL_STATE_CHANGE: i32 = 11602;
    pub const NOT_PRIMARY_NO_SECONDARY_OK: i32 = 13435;
    pub const NOT_PRIMARY_OR_SECONDARY: i32 = 13436;
}

/// Field holding the document id.
pub const ID_FIELD: &str = "_id";
/// Field holding a counter-bearing document's count.
pub const COUNTER_FIELD: &str = "counter";
/// Field holding the bounded ledger of applied operation ids.
pub const OPIDS_FIELD: &str = "opids";
