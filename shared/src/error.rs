//! Error types for the custom bot Lambda functions.

use thiserror::Error;
use tracing::{debug, error};

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the custom bot Lambda functions.
#[derive(Error, Debug)]
pub enum Error {
    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Upstream HTTP API error
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            _ => 500,
        }
    }
}

/// Call-site handling for best-effort AWS calls.
pub trait LogFailure<T> {
    /// Log the outcome of `command` for `contact_id` and turn a failure into `None`.
    fn log_failure(self, command: &'static str, contact_id: &str) -> Option<T>;
}

impl<T> LogFailure<T> for Result<T> {
    fn log_failure(self, command: &'static str, contact_id: &str) -> Option<T> {
        match self {
            Ok(value) => {
                debug!(command, contact_id, "Call succeeded");
                Some(value)
            }
            Err(e) => {
                error!(command, contact_id, error = %e, "Call failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Validation("missing".into()).status_code(), 400);
        assert_eq!(Error::NotFound("session".into()).status_code(), 500);
        assert_eq!(Error::Aws("throttled".into()).status_code(), 500);
    }

    #[test]
    fn test_log_failure_discards_error() {
        let failed: Result<u32> = Err(Error::Aws("throttled".into()));
        assert_eq!(failed.log_failure("SendMessage", "contact-1"), None);

        let ok: Result<u32> = Ok(7);
        assert_eq!(ok.log_failure("SendMessage", "contact-1"), Some(7));
    }
}
