//! Error types for the batch importer
//!
//! Row-level problems are recorded in the import report and never abort
//! the batch, so there is no batch-level error type at all.

use thiserror::Error;

/// Why one row could not be mapped onto an entry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("row {row}: no account name under any recognized header")]
    MissingAccount { row: usize },

    #[error("row {row}: negative amount")]
    NegativeAmount { row: usize },
}
