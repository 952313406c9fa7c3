use std::fmt;

use serde::{Deserialize, Serialize};

/// Quantities below this are flagged as running out.
pub const LOW_STOCK_BELOW: u32 = 2;
/// Quantities at or above this are considered healthy.
pub const OK_STOCK_FROM: u32 = 10;

/// Display tier for a stock quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    Low,
    Medium,
    Ok,
}

impl StockLevel {
    pub fn classify(quantity: u32) -> Self {
        if quantity < LOW_STOCK_BELOW {
            StockLevel::Low
        } else if quantity < OK_STOCK_FROM {
            StockLevel::Medium
        } else {
            StockLevel::Ok
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StockLevel::Low => "low",
            StockLevel::Medium => "medium",
            StockLevel::Ok => "ok",
        }
    }
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
