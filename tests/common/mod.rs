#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use once_cell::sync::Lazy;
use stock_ledger::{core::StockManager, ledger::DuplicatePolicy, storage::XlsxStorage};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh, empty directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Path of a not-yet-existing stock file inside an isolated directory.
pub fn stock_path() -> PathBuf {
    temp_base().join("vape_stock.xlsx")
}

pub fn open(path: &Path, policy: DuplicatePolicy) -> StockManager {
    StockManager::open(Box::new(XlsxStorage::new(path)), policy)
        .expect("open stock manager")
}

/// Opens a manager on a brand-new file, which seeds the default stock.
pub fn setup_test_env() -> (StockManager, PathBuf) {
    let path = stock_path();
    let manager = open(&path, DuplicatePolicy::Allow);
    (manager, path)
}

pub fn triples(manager: &StockManager) -> Vec<(String, String, u32)> {
    manager
        .ledger()
        .records()
        .iter()
        .map(|record| (record.brand.clone(), record.flavour.clone(), record.quantity))
        .collect()
}
