/// Failure reported by a store driver, identified by its numeric code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("driver error {code}: {message}")]
pub struct DriverError {
    pub code: i32,
    pub message: String,
}

impl DriverError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

pub type DriverResult<T> = Result<T, DriverError>;
