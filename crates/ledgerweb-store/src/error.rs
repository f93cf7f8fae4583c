//! Error types for ledgerweb-store

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreErrorCode {
    /// No record for the id
    NotFound,
    /// The record was permanently purged
    Gone,
    /// The record is not in the state the operation requires
    Conflict,
    /// A reference row already exists
    Duplicate,
    /// Transport/availability failure, retryable
    Transient,
    /// Internal store failure
    Internal,
}

impl std::fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreErrorCode::NotFound => write!(f, "NOT_FOUND"),
            StoreErrorCode::Gone => write!(f, "GONE"),
            StoreErrorCode::Conflict => write!(f, "CONFLICT"),
            StoreErrorCode::Duplicate => write!(f, "DUPLICATE"),
            StoreErrorCode::Transient => write!(f, "TRANSIENT"),
            StoreErrorCode::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Main error type for store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Entry not found: {id}")]
    NotFound { id: String },

    #[error("Entry was purged: {id}")]
    Gone { id: String },

    #[error("Conflict on {id}: {message}")]
    Conflict { id: String, message: String },

    #[error("Duplicate: {what}")]
    Duplicate { what: String },

    #[error("Transient store failure: {message}")]
    Transient { message: String },

    #[error("Internal store error: {message}")]
    Internal { message: String },
}

impl StoreError {
    /// Get the error code
    pub fn code(&self) -> StoreErrorCode {
        match self {
            StoreError::NotFound { .. } => StoreErrorCode::NotFound,
            StoreError::Gone { .. } => StoreErrorCode::Gone,
            StoreError::Conflict { .. } => StoreErrorCode::Conflict,
            StoreError::Duplicate { .. } => StoreErrorCode::Duplicate,
            StoreError::Transient { .. } => StoreErrorCode::Transient,
            StoreError::Internal { .. } => StoreErrorCode::Internal,
        }
    }

    /// Whether retrying the operation can possibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Transient { .. })
    }
}

/// Result type with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(StoreErrorCode::NotFound.to_string(), "NOT_FOUND");
        assert_eq!(StoreErrorCode::Transient.to_string(), "TRANSIENT");
    }

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(StoreError::Transient { message: "timeout".into() }.is_retryable());
        assert!(!StoreError::NotFound { id: "ent-1:abc".into() }.is_retryable());
        assert!(!StoreError::Conflict { id: "ent-1:abc".into(), message: "state".into() }.is_retryable());
        assert!(!StoreError::Duplicate { what: "company Acme".into() }.is_retryable());
    }
}
