pub mod stock_manager;

pub use stock_manager::{LoadOrigin, StockManager};
