//! Error types: the raw driver error, the classifier taxonomy, and the
//! typed errors surfaced to callers.

mod category;
mod config_error;
mod driver_error;
mod keel_error;

pub use category::ErrorCategory;
pub use config_error::ConfigError;
pub use driver_error::{DriverError, DriverResult};
pub use keel_error::KeelError;

/// Result alias used across the keel crates.
pub type KeelResult<T> = Result<T, KeelError>;
