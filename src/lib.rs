#![doc(test(attr(deny(warnings))))]

//! Stock Ledger keeps a small inventory of (brand, flavour, quantity) records
//! in a spreadsheet file and exposes add/remove/update, aggregate and
//! stock-level queries over it.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Stock ledger tracing initialized.");
    });
}
