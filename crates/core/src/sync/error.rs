//! Sync engine error types.

use finsync_shared::config::SyncConfigError;
use finsync_shared::AppError;
use thiserror::Error;

use crate::ledger::LedgerValidationError;

/// Errors raised by the sync engine.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The change failed validation (strict mode only).
    #[error("Invalid change: {0}")]
    Validation(#[from] LedgerValidationError),

    /// The engine configuration is inconsistent.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(#[from] SyncConfigError),

    /// The CSV timestamp format cannot be rendered.
    #[error("Invalid CSV timestamp format: {0}")]
    InvalidTimestampFormat(String),

    /// Writing the CSV failed.
    #[error("CSV export failed: {0}")]
    Export(#[from] csv::Error),

    /// The CSV writer produced unusable output.
    #[error("CSV export produced invalid output: {0}")]
    ExportEncoding(String),
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Validation(e) => Self::Validation(e.to_string()),
            SyncError::InvalidConfig(e) => Self::Config(e.to_string()),
            SyncError::InvalidTimestampFormat(format) => {
                Self::Config(format!("Invalid CSV timestamp format: {format}"))
            }
            SyncError::Export(e) => Self::Export(e.to_string()),
            SyncError::ExportEncoding(msg) => Self::Export(msg),
        }
    }
}
