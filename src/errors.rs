use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Error type that captures common stock ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("stock file `{}` not found", .0.display())]
    NotFound(PathBuf),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("row {index} is out of range (ledger holds {len} records)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Record not found: {0}")]
    RecordNotFound(Uuid),
    #[error("{brand} - {flavour} is already in the current stock")]
    DuplicateRecord { brand: String, flavour: String },
    #[error("Malformed stock sheet: {0}")]
    MalformedSheet(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Spreadsheet read error: {0}")]
    SheetRead(#[from] calamine::XlsxError),
    #[error("Spreadsheet write error: {0}")]
    SheetWrite(#[from] rust_xlsxwriter::XlsxError),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
