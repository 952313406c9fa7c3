pub mod xlsx_backend;

use std::path::Path;

use crate::{errors::Result, ledger::StockRow};

/// Abstraction over persistence backends capable of storing a stock table.
///
/// `load` must report a missing backing file as
/// [`LedgerError::NotFound`](crate::errors::LedgerError::NotFound) so callers
/// can seed a fresh ledger.
pub trait StockStorage {
    fn load(&self) -> Result<Vec<StockRow>>;
    fn save(&self, rows: &[StockRow]) -> Result<()>;
    fn location(&self) -> &Path;
}

pub use xlsx_backend::{load_rows_from_path, save_rows_to_path, XlsxStorage, HEADERS, SHEET_NAME};
