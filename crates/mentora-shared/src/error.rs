use thiserror::Error;

/// Errors raised while decoding domain values from their stored or
/// user-entered text form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    #[error("Unknown offering kind: {0}")]
    UnknownKind(String),

    #[error("Invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("Invalid time (expected HH:MM): {0}")]
    InvalidTime(String),
}
