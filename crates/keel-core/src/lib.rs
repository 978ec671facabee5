//! # keel-core
//!
//! Foundation crate for the keel data layer.
//! Defines documents, query types, driver traits, errors, config, and constants.
//! The store driver and the protocol layer both depend on this.

pub mod config;
pub mod consistency;
pub mod constants;
pub mod document;
pub mod errors;
pub mod query;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::KeelConfig;
pub use consistency::ConsistencyLevel;
pub use document::{DocId, Document, OperationId};
pub use errors::{DriverError, DriverResult, ErrorCategory, KeelError, KeelResult};
pub use query::{Condition, Filter, Projection, Update, UpdateOp};
