//! Error types for ledgerweb-core
//!
//! One error kind per failure class: unknown id, illegal
//! transition, locked record, missing privilege, malformed input,
//! transient store trouble, cancelled computation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ledgerweb_store::StoreError;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown entry id
    NotFound,
    /// Transition illegal from the entry's current state
    InvalidState,
    /// Edit attempted on a locked record
    LockedRecord,
    /// Caller lacks the required role
    Permission,
    /// Malformed input fields
    Validation,
    /// Store unavailable, retryable
    TransientStore,
    /// Computation abandoned by the caller
    Cancelled,
    /// Internal error
    Internal,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::NotFound => write!(f, "NOT_FOUND"),
            ErrorCode::InvalidState => write!(f, "INVALID_STATE"),
            ErrorCode::LockedRecord => write!(f, "LOCKED_RECORD"),
            ErrorCode::Permission => write!(f, "PERMISSION"),
            ErrorCode::Validation => write!(f, "VALIDATION"),
            ErrorCode::TransientStore => write!(f, "TRANSIENT_STORE"),
            ErrorCode::Cancelled => write!(f, "CANCELLED"),
            ErrorCode::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - application may be unstable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for ledgerweb-core
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Entry not found: {id}")]
    NotFound { id: String },

    #[error("Cannot {operation} entry {id}: entry is {status}")]
    InvalidState {
        id: String,
        status: String,
        operation: String,
    },

    #[error("Entry is locked: {id}")]
    LockedRecord { id: String },

    #[error("Role {role} may not {operation}")]
    Permission { role: String, operation: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Transient store failure: {message}")]
    TransientStore { message: String },

    #[error("{operation} was cancelled")]
    Cancelled { operation: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl LedgerError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            LedgerError::NotFound { .. } => ErrorCode::NotFound,
            LedgerError::InvalidState { .. } => ErrorCode::InvalidState,
            LedgerError::LockedRecord { .. } => ErrorCode::LockedRecord,
            LedgerError::Permission { .. } => ErrorCode::Permission,
            LedgerError::Validation { .. } => ErrorCode::Validation,
            LedgerError::TransientStore { .. } => ErrorCode::TransientStore,
            LedgerError::Cancelled { .. } => ErrorCode::Cancelled,
            LedgerError::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LedgerError::NotFound { .. } => ErrorSeverity::Info,
            LedgerError::InvalidState { .. } => ErrorSeverity::Warning,
            LedgerError::LockedRecord { .. } => ErrorSeverity::Warning,
            LedgerError::Permission { .. } => ErrorSeverity::Warning,
            LedgerError::Validation { .. } => ErrorSeverity::Warning,
            LedgerError::TransientStore { .. } => ErrorSeverity::Error,
            LedgerError::Cancelled { .. } => ErrorSeverity::Info,
            LedgerError::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    /// Only transient store failures are worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::TransientStore { .. })
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => LedgerError::NotFound { id },
            StoreError::Gone { id } => LedgerError::InvalidState {
                id,
                status: "purged".to_string(),
                operation: "modify".to_string(),
            },
            StoreError::Conflict { id, message } => LedgerError::InvalidState {
                id,
                status: message,
                operation: "modify".to_string(),
            },
            StoreError::Duplicate { what } => LedgerError::Validation {
                message: format!("duplicate {}", what),
            },
            StoreError::Transient { message } => LedgerError::TransientStore { message },
            StoreError::Internal { message } => LedgerError::Internal { message },
        }
    }
}

/// Result type with LedgerError
pub type LedgerResult<T> = Result<T, LedgerError>;

// ==================== Tests ====================
