use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{LedgerError, Result};

/// Stable, process-local identifier handed out when a record enters a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// A single row of the persisted stock table.
///
/// This is the shape that crosses the storage boundary; it carries no id
/// because the file layout is exactly `Brand, Flavour, Estimated Quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRow {
    pub brand: String,
    pub flavour: String,
    pub quantity: u32,
}

impl StockRow {
    pub fn new(brand: impl Into<String>, flavour: impl Into<String>, quantity: u32) -> Self {
        Self {
            brand: brand.into(),
            flavour: flavour.into(),
            quantity,
        }
    }
}

/// A stock row held by a ledger, tagged with its record id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: RecordId,
    pub brand: String,
    pub flavour: String,
    pub quantity: u32,
}

impl StockRecord {
    pub fn from_row(row: StockRow) -> Self {
        Self {
            id: RecordId::new(),
            brand: row.brand,
            flavour: row.flavour,
            quantity: row.quantity,
        }
    }

    pub fn to_row(&self) -> StockRow {
        StockRow {
            brand: self.brand.clone(),
            flavour: self.flavour.clone(),
            quantity: self.quantity,
        }
    }

    pub fn matches(&self, brand: &str, flavour: &str) -> bool {
        self.brand == brand && self.flavour == flavour
    }
}

/// Parses user-supplied text as a stock quantity.
///
/// Accepts surrounding whitespace; rejects anything that is not a
/// non-negative integer that fits in `u32`.
pub fn parse_quantity(raw: &str) -> Result<u32> {
    let trimmed = raw.trim();
    trimmed.parse::<u32>().map_err(|_| {
        LedgerError::Validation(format!(
            "Estimated Quantity must be a non-negative integer (got `{}`)",
            trimmed
        ))
    })
}

pub(crate) fn validate_name(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(LedgerError::Validation(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quantity_accepts_zero_and_padding() {
        assert_eq!(parse_quantity("0").unwrap(), 0);
        assert_eq!(parse_quantity("  42 ").unwrap(), 42);
    }

    #[test]
    fn parse_quantity_rejects_negative_and_text() {
        for raw in ["-1", "ten", "", "3.5"] {
            let err = parse_quantity(raw).expect_err("invalid quantity");
            assert!(matches!(err, LedgerError::Validation(_)), "{raw}: {err}");
        }
    }

    #[test]
    fn records_get_distinct_ids() {
        let a = StockRecord::from_row(StockRow::new("Brand A", "Flavour 1", 1));
        let b = StockRecord::from_row(StockRow::new("Brand A", "Flavour 1", 1));
        assert_ne!(a.id, b.id);
        assert_eq!(a.to_row(), b.to_row());
    }
}
