//! Span definitions per operation: session, insert, increment, read.
//!
//! Operation spans are entered inside the session span, so every event a
//! protocol emits carries the session's address and namespace.

/// Create the span that scopes all logging of one session.
#[macro_export]
macro_rules! session_span {
    ($address:expr, $namespace:expr) => {
        tracing::info_span!("keel.session", address = %$address, namespace = %$namespace)
    };
}

/// Create an insert span.
#[macro_export]
macro_rules! insert_span {
    ($id:expr) => {
        tracing::debug_span!("keel.insert", id = %$id)
    };
}

/// Create an increment span.
#[macro_export]
macro_rules! increment_span {
    ($id:expr, $opid:expr) => {
        tracing::debug_span!("keel.increment", id = %$id, opid = %$opid)
    };
}

/// Create a read span.
#[macro_export]
macro_rules! read_span {
    ($operation:expr) => {
        tracing::debug_span!("keel.read", operation = $operation)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const SESSION: &str = "keel.session";
    pub const INSERT: &str = "keel.insert";
    pub const INCREMENT: &str = "keel.increment";
    pub const READ: &str = "keel.read";
}
