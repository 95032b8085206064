//! Export, import and backup errors

use std::path::PathBuf;

use thiserror::Error;

use domain_claims::ClaimError;

/// Errors raised while producing or reading files
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Please upload an Excel (.xlsx, .xls) or CSV file, got '{0}'")]
    UnsupportedFileType(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error(transparent)]
    Claims(#[from] ClaimError),

    #[error(transparent)]
    Backup(#[from] BackupError),
}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(error: rust_xlsxwriter::XlsxError) -> Self {
        ExportError::Spreadsheet(error.to_string())
    }
}

impl From<calamine::Error> for ExportError {
    fn from(error: calamine::Error) -> Self {
        ExportError::Spreadsheet(error.to_string())
    }
}

/// Errors raised by the backup directory
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid backup file name: {0}")]
    InvalidName(String),
}

impl ExportError {
    pub(crate) fn pdf(error: impl std::fmt::Display) -> Self {
        ExportError::Pdf(error.to_string())
    }
}

impl BackupError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BackupError::Io {
            path: path.into(),
            source,
        }
    }
}
