//! Terminal shell over the stock ledger: table view, add/remove/update
//! commands and stock queries.

pub mod commands;
pub mod context;
pub mod output;
pub mod registry;
pub mod shell;
pub mod table;

pub use context::{CliError, CliMode, CommandError, LoopControl, ShellContext};
pub use shell::{process_line, run_cli, SCRIPT_ENV};
