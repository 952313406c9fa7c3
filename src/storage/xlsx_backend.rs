use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use rust_xlsxwriter::Workbook;

use crate::{
    errors::{LedgerError, Result},
    ledger::StockRow,
    utils::paths::replace_file,
};

use super::StockStorage;

pub const SHEET_NAME: &str = "Stock";
pub const BRAND_HEADER: &str = "Brand";
pub const FLAVOUR_HEADER: &str = "Flavour";
pub const QUANTITY_HEADER: &str = "Estimated Quantity";
pub const HEADERS: [&str; 3] = [BRAND_HEADER, FLAVOUR_HEADER, QUANTITY_HEADER];

/// Spreadsheet-backed persistence for a single stock file.
#[derive(Debug, Clone)]
pub struct XlsxStorage {
    path: PathBuf,
}

impl XlsxStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StockStorage for XlsxStorage {
    fn load(&self) -> Result<Vec<StockRow>> {
        load_rows_from_path(&self.path)
    }

    fn save(&self, rows: &[StockRow]) -> Result<()> {
        save_rows_to_path(rows, &self.path)
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

/// Reads the first worksheet of `path` as a stock table.
pub fn load_rows_from_path(path: &Path) -> Result<Vec<StockRow>> {
    match fs::metadata(path) {
        Ok(_) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(LedgerError::NotFound(path.to_path_buf()));
        }
        Err(err) => return Err(err.into()),
    }

    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LedgerError::MalformedSheet("workbook has no worksheets".into()))?;
    let range = workbook.worksheet_range(&sheet_name)?;
    rows_from_range(&range)
}

/// Writes `rows` to `path`, staging through a temporary sibling file.
///
/// Filesystem failures surface as [`LedgerError::Persistence`]; the
/// previous file at `path` is left as it was.
pub fn save_rows_to_path(rows: &[StockRow], path: &Path) -> Result<()> {
    let bytes = render_workbook(rows)?;
    replace_file(path, &bytes).map_err(|err| {
        LedgerError::Persistence(format!("could not write {}: {}", path.display(), err))
    })?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "stock sheet written");
    Ok(())
}

fn render_workbook(rows: &[StockRow]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }
    for (idx, row) in rows.iter().enumerate() {
        let line = idx as u32 + 1;
        worksheet.write_string(line, 0, row.brand.as_str())?;
        worksheet.write_string(line, 1, row.flavour.as_str())?;
        worksheet.write_number(line, 2, f64::from(row.quantity))?;
    }

    Ok(workbook.save_to_buffer()?)
}

struct ColumnMap {
    brand: usize,
    flavour: usize,
    quantity: usize,
}

impl ColumnMap {
    fn from_header(header: &[Data]) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|cell| cell_text(cell).as_deref() == Some(name))
                .ok_or_else(|| LedgerError::MalformedSheet(format!("missing `{}` column", name)))
        };
        Ok(Self {
            brand: find(BRAND_HEADER)?,
            flavour: find(FLAVOUR_HEADER)?,
            quantity: find(QUANTITY_HEADER)?,
        })
    }
}

fn rows_from_range(range: &Range<Data>) -> Result<Vec<StockRow>> {
    let mut lines = range.rows();
    let header = lines
        .next()
        .ok_or_else(|| LedgerError::MalformedSheet("sheet is empty".into()))?;
    let columns = ColumnMap::from_header(header)?;

    let mut rows = Vec::new();
    // Header is spreadsheet row 1.
    for (offset, line) in lines.enumerate() {
        let sheet_row = offset + 2;
        if line.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        let brand = name_cell(line.get(columns.brand), BRAND_HEADER, sheet_row)?;
        let flavour = name_cell(line.get(columns.flavour), FLAVOUR_HEADER, sheet_row)?;
        let quantity = parse_quantity_cell(line.get(columns.quantity), sheet_row)?;
        rows.push(StockRow {
            brand,
            flavour,
            quantity,
        });
    }
    Ok(rows)
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.trim().to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
        other => Some(other.to_string()),
    }
}

fn name_cell(cell: Option<&Data>, header: &str, sheet_row: usize) -> Result<String> {
    cell.and_then(cell_text)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| {
            LedgerError::MalformedSheet(format!("row {}: {} is empty", sheet_row, header))
        })
}

fn parse_quantity_cell(cell: Option<&Data>, sheet_row: usize) -> Result<u32> {
    let malformed = |detail: String| {
        LedgerError::MalformedSheet(format!(
            "row {}: {} {}",
            sheet_row, QUANTITY_HEADER, detail
        ))
    };
    match cell {
        Some(Data::Int(value)) => {
            u32::try_from(*value).map_err(|_| malformed(format!("`{}` is out of range", value)))
        }
        Some(Data::Float(value)) => {
            if value.fract() != 0.0 || *value < 0.0 || *value > f64::from(u32::MAX) {
                Err(malformed(format!(
                    "`{}` is not a non-negative integer",
                    value
                )))
            } else {
                Ok(*value as u32)
            }
        }
        Some(Data::String(text)) => text
            .trim()
            .parse::<u32>()
            .map_err(|_| malformed(format!("`{}` is not a non-negative integer", text))),
        Some(Data::Empty) | None => Err(malformed("is empty".into())),
        Some(other) => Err(malformed(format!("`{}` is not a number", other))),
    }
}
