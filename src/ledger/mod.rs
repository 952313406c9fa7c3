//! Stock ledger model: records, display tiers, and the ledger itself.

#[allow(clippy::module_inception)]
pub mod ledger;
pub mod level;
pub mod record;

pub use ledger::{DuplicatePolicy, StockLedger, SEED_ROWS};
pub use level::StockLevel;
pub use record::{parse_quantity, RecordId, StockRecord, StockRow};
