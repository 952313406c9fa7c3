use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    level::StockLevel,
    record::{validate_name, RecordId, StockRecord, StockRow},
};
use crate::errors::{LedgerError, Result};

/// Rows written to a fresh stock file when none exists yet.
pub const SEED_ROWS: [(&str, &str, u32); 3] = [
    ("Brand A", "Flavour 1", 50),
    ("Brand B", "Flavour 2", 30),
    ("Brand C", "Flavour 3", 20),
];

/// What `add_product` does when the (brand, flavour) pair is already present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Append a separate record, e.g. a distinct batch.
    #[default]
    Allow,
    /// Add the quantity onto the first matching record.
    Merge,
    /// Refuse the add.
    Reject,
}

impl DuplicatePolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "allow" => Some(Self::Allow),
            "merge" => Some(Self::Merge),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Merge => "merge",
            Self::Reject => "reject",
        }
    }
}

/// In-memory stock ledger. Storage order is insertion order; display order is
/// derived through [`StockLedger::sorted`].
#[derive(Debug, Clone)]
pub struct StockLedger {
    records: Vec<StockRecord>,
    policy: DuplicatePolicy,
    updated_at: DateTime<Utc>,
}

impl StockLedger {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            records: Vec::new(),
            policy,
            updated_at: Utc::now(),
        }
    }

    /// Builds a ledger from persisted rows. Duplicates already in the file are
    /// kept as-is; the policy only governs later adds.
    pub fn from_rows(rows: Vec<StockRow>, policy: DuplicatePolicy) -> Self {
        let mut ledger = Self::new(policy);
        ledger.records = rows.into_iter().map(StockRecord::from_row).collect();
        ledger
    }

    pub fn seeded(policy: DuplicatePolicy) -> Self {
        let rows = SEED_ROWS
            .iter()
            .map(|(brand, flavour, quantity)| StockRow::new(*brand, *flavour, *quantity))
            .collect();
        Self::from_rows(rows, policy)
    }

    pub fn rows(&self) -> Vec<StockRow> {
        self.records.iter().map(StockRecord::to_row).collect()
    }

    pub fn records(&self) -> &[StockRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: DuplicatePolicy) {
        self.policy = policy;
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn get(&self, id: RecordId) -> Option<&StockRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    /// Adds a product and returns the id of the record holding it. Under
    /// [`DuplicatePolicy::Merge`] that is the existing record's id.
    pub fn add_product(&mut self, brand: &str, flavour: &str, quantity: u32) -> Result<RecordId> {
        // Stored trimmed, the same way names read back from the sheet.
        let (brand, flavour) = (brand.trim(), flavour.trim());
        validate_name("Brand", brand)?;
        validate_name("Flavour", flavour)?;

        let existing = self
            .records
            .iter()
            .position(|record| record.matches(brand, flavour));
        match (self.policy, existing) {
            (DuplicatePolicy::Reject, Some(_)) => Err(LedgerError::DuplicateRecord {
                brand: brand.to_string(),
                flavour: flavour.to_string(),
            }),
            (DuplicatePolicy::Merge, Some(idx)) => {
                let record = &mut self.records[idx];
                record.quantity = record.quantity.checked_add(quantity).ok_or_else(|| {
                    LedgerError::Validation(format!(
                        "merged quantity for {} - {} overflows",
                        brand, flavour
                    ))
                })?;
                let id = record.id;
                self.touch();
                Ok(id)
            }
            _ => {
                let record = StockRecord::from_row(StockRow::new(brand, flavour, quantity));
                let id = record.id;
                self.records.push(record);
                self.touch();
                Ok(id)
            }
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Result<StockRecord> {
        self.check_index(index)?;
        let removed = self.records.remove(index);
        self.touch();
        Ok(removed)
    }

    pub fn remove(&mut self, id: RecordId) -> Result<StockRecord> {
        let index = self
            .position(id)
            .ok_or(LedgerError::RecordNotFound(id.0))?;
        self.remove_at(index)
    }

    pub fn update_quantity_at(&mut self, index: usize, quantity: u32) -> Result<()> {
        self.check_index(index)?;
        self.records[index].quantity = quantity;
        self.touch();
        Ok(())
    }

    pub fn update_quantity(&mut self, id: RecordId, quantity: u32) -> Result<()> {
        let index = self
            .position(id)
            .ok_or(LedgerError::RecordNotFound(id.0))?;
        self.update_quantity_at(index, quantity)
    }

    /// Quantity of the first record matching both fields exactly.
    pub fn remaining_stock(&self, brand: &str, flavour: &str) -> Option<u32> {
        self.records
            .iter()
            .find(|record| record.matches(brand, flavour))
            .map(|record| record.quantity)
    }

    pub fn total_stock(&self) -> u64 {
        self.records
            .iter()
            .map(|record| u64::from(record.quantity))
            .sum()
    }

    /// Records ordered by (brand, flavour); ties keep storage order.
    pub fn sorted(&self) -> Vec<&StockRecord> {
        let mut view: Vec<&StockRecord> = self.records.iter().collect();
        view.sort_by(|a, b| (&a.brand, &a.flavour).cmp(&(&b.brand, &b.flavour)));
        view
    }

    pub fn with_level(&self, level: StockLevel) -> Vec<&StockRecord> {
        self.sorted()
            .into_iter()
            .filter(|record| StockLevel::classify(record.quantity) == level)
            .collect()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.records.len() {
            Ok(())
        } else {
            Err(LedgerError::IndexOutOfRange {
                index,
                len: self.records.len(),
            })
        }
    }
}

impl Default for StockLedger {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StockLedger {
        StockLedger::seeded(DuplicatePolicy::Allow)
    }

    fn triples(ledger: &StockLedger) -> Vec<(String, String, u32)> {
        ledger
            .records()
            .iter()
            .map(|r| (r.brand.clone(), r.flavour.clone(), r.quantity))
            .collect()
    }

    #[test]
    fn totals() {
        assert_eq!(StockLedger::default().total_stock(), 0);
        assert_eq!(sample().total_stock(), 100);
    }

    #[test]
    fn add_appends_and_is_retrievable() {
        let mut ledger = sample();
        let id = ledger
            .add_product("Brand Z", "Mint", 7)
            .expect("add product");
        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger.position(id), Some(3));
        assert_eq!(ledger.remaining_stock("Brand Z", "Mint"), Some(7));
    }

    #[test]
    fn add_trims_surrounding_whitespace() {
        let mut ledger = sample();
        let id = ledger.add_product(" Brand Z ", "\tMint ", 2).unwrap();
        let record = ledger.get(id).unwrap();
        assert_eq!((record.brand.as_str(), record.flavour.as_str()), ("Brand Z", "Mint"));
        assert_eq!(ledger.remaining_stock("Brand Z", "Mint"), Some(2));
    }

    #[test]
    fn add_rejects_blank_names_without_mutating() {
        let mut ledger = sample();
        let before = triples(&ledger);
        let err = ledger.add_product("  ", "Mint", 1).expect_err("blank brand");
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(triples(&ledger), before);
    }

    #[test]
    fn lookup_is_case_sensitive_and_returns_first_match() {
        let mut ledger = sample();
        ledger.add_product("Brand A", "Flavour 1", 3).unwrap();
        assert_eq!(ledger.remaining_stock("Brand A", "Flavour 1"), Some(50));
        assert_eq!(ledger.remaining_stock("brand a", "Flavour 1"), None);
        assert_eq!(ledger.remaining_stock("Nope", "Nothing"), None);
    }

    #[test]
    fn remove_at_keeps_other_records_intact() {
        let mut ledger = sample();
        let mut expected = triples(&ledger);
        expected.remove(1);
        let removed = ledger.remove_at(1).expect("remove");
        assert_eq!(removed.brand, "Brand B");
        assert_eq!(triples(&ledger), expected);
    }

    #[test]
    fn out_of_range_positions_are_rejected() {
        let mut ledger = sample();
        let before = triples(&ledger);
        assert!(matches!(
            ledger.remove_at(3),
            Err(LedgerError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert!(matches!(
            ledger.update_quantity_at(9, 1),
            Err(LedgerError::IndexOutOfRange { .. })
        ));
        assert_eq!(triples(&ledger), before);
    }

    #[test]
    fn ids_survive_reordering() {
        let mut ledger = sample();
        let c = ledger.records()[2].id;
        ledger.remove_at(0).unwrap();
        ledger.update_quantity(c, 4).unwrap();
        assert_eq!(ledger.get(c).map(|r| r.quantity), Some(4));
        ledger.remove(c).unwrap();
        assert!(matches!(
            ledger.remove(c),
            Err(LedgerError::RecordNotFound(_))
        ));
    }

    #[test]
    fn sorted_view_leaves_storage_order_alone() {
        let mut ledger = StockLedger::default();
        ledger.add_product("Zeta", "b", 1).unwrap();
        ledger.add_product("Alpha", "z", 1).unwrap();
        ledger.add_product("Alpha", "a", 1).unwrap();
        let sorted: Vec<_> = ledger
            .sorted()
            .iter()
            .map(|r| format!("{}/{}", r.brand, r.flavour))
            .collect();
        assert_eq!(sorted, ["Alpha/a", "Alpha/z", "Zeta/b"]);
        assert_eq!(ledger.records()[0].brand, "Zeta");
    }

    #[test]
    fn merge_policy_adds_onto_first_match() {
        let mut ledger = StockLedger::seeded(DuplicatePolicy::Merge);
        let first = ledger.records()[0].id;
        let id = ledger.add_product("Brand A", "Flavour 1", 5).unwrap();
        assert_eq!(id, first);
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.remaining_stock("Brand A", "Flavour 1"), Some(55));
    }

    #[test]
    fn merge_policy_reports_overflow() {
        let mut ledger = StockLedger::seeded(DuplicatePolicy::Merge);
        let err = ledger
            .add_product("Brand A", "Flavour 1", u32::MAX)
            .expect_err("overflow");
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(ledger.remaining_stock("Brand A", "Flavour 1"), Some(50));
    }

    #[test]
    fn reject_policy_refuses_duplicates() {
        let mut ledger = StockLedger::seeded(DuplicatePolicy::Reject);
        let err = ledger
            .add_product("Brand B", "Flavour 2", 1)
            .expect_err("duplicate");
        assert!(matches!(err, LedgerError::DuplicateRecord { .. }));
        assert_eq!(ledger.len(), 3);
        ledger.add_product("Brand B", "Flavour 9", 1).unwrap();
        assert_eq!(ledger.len(), 4);
    }

    #[test]
    fn level_filter() {
        let mut ledger = StockLedger::default();
        ledger.add_product("A", "x", 0).unwrap();
        ledger.add_product("B", "y", 5).unwrap();
        ledger.add_product("C", "z", 1).unwrap();
        let low: Vec<_> = ledger
            .with_level(StockLevel::Low)
            .iter()
            .map(|r| r.brand.as_str())
            .collect();
        assert_eq!(low, ["A", "C"]);
    }

    #[test]
    fn policy_names_round_trip() {
        for policy in [
            DuplicatePolicy::Allow,
            DuplicatePolicy::Merge,
            DuplicatePolicy::Reject,
        ] {
            assert_eq!(DuplicatePolicy::parse(policy.as_str()), Some(policy));
        }
        assert_eq!(DuplicatePolicy::parse("MERGE"), Some(DuplicatePolicy::Merge));
        assert_eq!(DuplicatePolicy::parse("sum"), None);
    }
}
