use std::path::Path;

use crate::errors::{LedgerError, Result};
use crate::ledger::{DuplicatePolicy, RecordId, StockLedger, StockLevel, StockRecord};
use crate::storage::StockStorage;

/// How the ledger came into memory at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    Loaded,
    Seeded,
}

/// Facade that pairs a stock ledger with its backing store.
///
/// Every mutation is applied to a staged copy which is persisted first; the
/// live ledger is only replaced once the save succeeds.
pub struct StockManager {
    ledger: StockLedger,
    storage: Box<dyn StockStorage>,
    origin: LoadOrigin,
}

impl StockManager {
    /// Loads the ledger from `storage`, seeding and persisting the default
    /// rows when the backing file does not exist.
    pub fn open(storage: Box<dyn StockStorage>, policy: DuplicatePolicy) -> Result<Self> {
        let (ledger, origin) = match storage.load() {
            Ok(rows) => {
                tracing::info!(
                    path = %storage.location().display(),
                    records = rows.len(),
                    "stock loaded"
                );
                (StockLedger::from_rows(rows, policy), LoadOrigin::Loaded)
            }
            Err(LedgerError::NotFound(path)) => {
                tracing::warn!(path = %path.display(), "stock file missing, seeding defaults");
                let ledger = StockLedger::seeded(policy);
                storage.save(&ledger.rows())?;
                (ledger, LoadOrigin::Seeded)
            }
            Err(err) => return Err(err),
        };
        Ok(Self {
            ledger,
            storage,
            origin,
        })
    }

    pub fn ledger(&self) -> &StockLedger {
        &self.ledger
    }

    pub fn origin(&self) -> LoadOrigin {
        self.origin
    }

    pub fn location(&self) -> &Path {
        self.storage.location()
    }

    pub fn save(&self) -> Result<()> {
        self.storage.save(&self.ledger.rows())?;
        tracing::info!(
            path = %self.storage.location().display(),
            records = self.ledger.len(),
            "stock saved"
        );
        Ok(())
    }

    pub fn set_policy(&mut self, policy: DuplicatePolicy) {
        self.ledger.set_policy(policy);
    }

    pub fn add_product(&mut self, brand: &str, flavour: &str, quantity: u32) -> Result<RecordId> {
        let id = self.commit(|ledger| ledger.add_product(brand, flavour, quantity))?;
        tracing::debug!(%id, brand, flavour, quantity, "product added");
        Ok(id)
    }

    pub fn remove_product_at(&mut self, index: usize) -> Result<StockRecord> {
        let removed = self.commit(|ledger| ledger.remove_at(index))?;
        tracing::debug!(index, id = %removed.id, "product removed");
        Ok(removed)
    }

    pub fn remove_product(&mut self, id: RecordId) -> Result<StockRecord> {
        let removed = self.commit(|ledger| ledger.remove(id))?;
        tracing::debug!(%id, "product removed");
        Ok(removed)
    }

    pub fn update_quantity_at(&mut self, index: usize, quantity: u32) -> Result<()> {
        self.commit(|ledger| ledger.update_quantity_at(index, quantity))?;
        tracing::debug!(index, quantity, "quantity updated");
        Ok(())
    }

    pub fn update_quantity(&mut self, id: RecordId, quantity: u32) -> Result<()> {
        self.commit(|ledger| ledger.update_quantity(id, quantity))?;
        tracing::debug!(%id, quantity, "quantity updated");
        Ok(())
    }

    pub fn remaining_stock(&self, brand: &str, flavour: &str) -> Option<u32> {
        self.ledger.remaining_stock(brand, flavour)
    }

    pub fn total_stock(&self) -> u64 {
        self.ledger.total_stock()
    }

    pub fn sorted(&self) -> Vec<&StockRecord> {
        self.ledger.sorted()
    }

    pub fn classify(quantity: u32) -> StockLevel {
        StockLevel::classify(quantity)
    }

    fn commit<T>(&mut self, change: impl FnOnce(&mut StockLedger) -> Result<T>) -> Result<T> {
        let mut staged = self.ledger.clone();
        let outcome = change(&mut staged)?;
        if let Err(err) = self.storage.save(&staged.rows()) {
            tracing::error!(
                path = %self.storage.location().display(),
                error = %err,
                "save failed, in-memory stock left unchanged"
            );
            return Err(err);
        }
        self.ledger = staged;
        Ok(outcome)
    }
}
