//! # Table Store Errors

use thiserror::Error;

/// Result type for table store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while talking to the remote table store.
///
/// None of these are recovered locally; they propagate to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Connection, TLS or protocol failure before a response arrived
    #[error("Store unreachable: {0}")]
    Transport(String),

    /// No response within the configured timeout
    #[error("Store request timed out after {0}s")]
    Timeout(u64),

    /// The store answered with a non-success status
    #[error("Store rejected request ({status} {kind}): {message}")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },

    /// The store answered with a body we could not decode
    #[error("Malformed store response: {0}")]
    Decode(String),

    /// Local failure (client construction, poisoned lock)
    #[error("Store internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Build an API error from a status code and message
    pub fn api(status: u16, kind: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Api {
            status,
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Whether the store reported authentication or permission failure
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, StoreError::Api { status: 401 | 403, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = StoreError::api(422, "INVALID_FILTER_BY_FORMULA", "bad formula");
        assert_eq!(
            err.to_string(),
            "Store rejected request (422 INVALID_FILTER_BY_FORMULA): bad formula"
        );
    }

    #[test]
    fn test_auth_failure() {
        assert!(StoreError::api(401, "AUTHENTICATION_REQUIRED", "").is_auth_failure());
        assert!(StoreError::api(403, "INVALID_PERMISSIONS", "").is_auth_failure());
        assert!(!StoreError::api(404, "NOT_FOUND", "").is_auth_failure());
        assert!(!StoreError::Timeout(10).is_auth_failure());
    }
}
