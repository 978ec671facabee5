// Single source of truth for all default values.

use crate::constants::codes;

// --- Connection ---
pub const DEFAULT_ADDRESS: &str = "mem://local";
pub const DEFAULT_DATABASE: &str = "dal";
pub const DEFAULT_COLLECTION: &str = "example";

// --- Ledger ---
pub const DEFAULT_OPID_CAP: usize = 100;

// --- Consistency ---
pub const DEFAULT_LINEARIZABLE_READ_TIMEOUT_MS: u64 = 10_000;
/// Upper bound for any configured read timeout (10 minutes).
pub const MAX_READ_TIMEOUT_MS: u64 = 600_000;

// --- Classifier ---
pub const DEFAULT_TRANSIENT_CODES: &[i32] = &[
    codes::HOST_UNREACHABLE,
    codes::HOST_NOT_FOUND,
    codes::MAX_TIME_MS_EXPIRED,
    codes::NETWORK_TIMEOUT,
    codes::SHUTDOWN_IN_PROGRESS,
    codes::PRIMARY_STEPPED_DOWN,
    codes::EXCEEDED_TIME_LIMIT,
    codes::SOCKET_EXCEPTION,
    codes::NOT_WRITABLE_PRIMARY,
    codes::INTERRUPTED_AT_SHUTDOWN,
    codes::INTERRUPTED,
    codes::INTERRUPTED_DUE_TO_REPL_STATE_CHANGE,
    codes::NOT_PRIMARY_NO_SECONDARY_OK,
    codes::NOT_PRIMARY_OR_SECONDARY,
];
pub const DEFAULT_DUPLICATE_KEY_CODES: &[i32] =
    &[codes::DUPLICATE_KEY, codes::DUPLICATE_KEY_ON_UPDATE];
pub const DEFAULT_TERMINAL_CODES: &[i32] = &[
    codes::BAD_VALUE,
    codes::FAILED_TO_PARSE,
    codes::UNAUTHORIZED,
    codes::TYPE_MISMATCH,
    codes::AUTHENTICATION_FAILED,
    codes::DOCUMENT_VALIDATION_FAILURE,
];

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
