//! Batch import processor
//!
//! Takes an already-tabular row set (file parsing is the caller's
//! concern), maps heterogeneous column headers onto the entry schema,
//! and drives entries through the ledger's create path in fixed-size
//! batches. Partial failure is the normal case: bad rows are counted
//! and skipped, and the batch always runs to completion.

pub mod error;
pub mod mapping;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use ledgerweb_core::{Ledger, LedgerRef};

pub use error::RowError;
pub use mapping::{map_row, parse_date, sanitize_amount, RawRow, DEFAULT_COMPANY};

/// Progress snapshot delivered after each batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportProgress {
    pub current_batch: usize,
    pub total_batches: usize,
    pub success_count: usize,
    pub error_count: usize,
}

/// Final outcome of an import run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub total_batches: usize,
    /// Human-readable error messages, capped at the configured bound;
    /// `errors_truncated` marks that more occurred than are listed
    pub errors: Vec<String>,
    pub errors_truncated: bool,
}

impl ImportReport {
    fn record_error(&mut self, max_messages: usize, message: String) {
        self.error_count += 1;
        if self.errors.len() < max_messages {
            self.errors.push(message);
        } else {
            self.errors_truncated = true;
        }
    }
}

/// Batch importer over a shared ledger handle
pub struct Importer {
    ledger: LedgerRef,
    batch_size: usize,
    max_error_messages: usize,
}

impl Importer {
    pub fn new(ledger: LedgerRef) -> Self {
        let import = &ledger.config().import;
        let batch_size = import.batch_size.max(1);
        let max_error_messages = import.max_error_messages;
        Self { ledger, batch_size, max_error_messages }
    }

    fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Import the rows, reporting per-batch progress through the
    /// optional channel. Never aborts on row failures.
    pub async fn import_rows(
        &self,
        rows: Vec<RawRow>,
        entered_by: &str,
        progress: Option<mpsc::UnboundedSender<ImportProgress>>,
    ) -> ImportReport {
        let total_rows = rows.len();
        let total_batches = total_rows.div_ceil(self.batch_size);
        let mut report = ImportReport {
            total_rows,
            total_batches,
            ..Default::default()
        };

        for (batch_index, batch) in rows.chunks(self.batch_size).enumerate() {
            let base = batch_index * self.batch_size;
            for (offset, row) in batch.iter().enumerate() {
                self.import_row(base + offset, row, entered_by, &mut report).await;
            }

            if let Some(ref sender) = progress {
                // A dropped receiver just means nobody is watching
                let _ = sender.send(ImportProgress {
                    current_batch: batch_index + 1,
                    total_batches,
                    success_count: report.success_count,
                    error_count: report.error_count,
                });
            }
            // Let other work interleave between batches
            tokio::task::yield_now().await;
        }

        log::info!(
            target: "ledgerweb::import",
            "import finished: {} of {} rows inserted, {} errors",
            report.success_count,
            report.total_rows,
            report.error_count
        );
        report
    }

    async fn import_row(
        &self,
        index: usize,
        row: &RawRow,
        entered_by: &str,
        report: &mut ImportReport,
    ) {
        let new = match map_row(index, row, entered_by) {
            Ok(new) => new,
            Err(err) => {
                report.record_error(self.max_error_messages, err.to_string());
                return;
            }
        };
        match self.ledger().create(new).await {
            Ok(_) => report.success_count += 1,
            Err(err) => {
                report.record_error(
                    self.max_error_messages,
                    format!("row {}: {}", index + 1, err),
                );
            }
        }
    }
}

// ==================== Tests ====================
