use std::{io, path::PathBuf};

use dialoguer::{theme::ColorfulTheme, Confirm};
use rustyline::error::ReadlineError;

use crate::{
    cli::{
        commands,
        output::{self, OutputPreferences},
        registry::CommandRegistry,
    },
    config::{Config, ConfigManager},
    core::{LoadOrigin, StockManager},
    errors::LedgerError,
    ledger::RecordId,
    storage::XlsxStorage,
};

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub manager: StockManager,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub theme: ColorfulTheme,
    /// Record ids in the order of the last rendered table; row `n` is `view[n - 1]`.
    /// Only `list` rebuilds it, so row numbers keep pointing at what was shown.
    pub view: Vec<RecordId>,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_config_manager(mode, ConfigManager::new()?)
    }

    pub fn with_base_dir(mode: CliMode, base: PathBuf) -> Result<Self, CliError> {
        Self::with_config_manager(mode, ConfigManager::with_base_dir(base)?)
    }

    fn with_config_manager(mode: CliMode, config_manager: ConfigManager) -> Result<Self, CliError> {
        let config = config_manager.load()?;
        output::set_preferences(OutputPreferences {
            high_contrast_mode: config.high_contrast,
            plain: mode == CliMode::Script,
        });

        let stock_file = config_manager.stock_file(&config);
        let storage = XlsxStorage::new(stock_file);
        let manager = StockManager::open(Box::new(storage), config.duplicate_policy)?;
        if manager.origin() == LoadOrigin::Seeded {
            output::info(format!(
                "Created {} with example stock.",
                manager.location().display()
            ));
        }

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        Ok(Self {
            mode,
            registry,
            manager,
            config_manager,
            config,
            theme: ColorfulTheme::default(),
            view: Vec::new(),
            last_command: None,
            running: true,
        })
    }

    pub fn prompt(&self) -> String {
        format!("stock [{}]> ", self.manager.ledger().len())
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    /// Re-derives the row numbering from the sorted display order. Call it
    /// only when that order is printed.
    pub fn refresh_view(&mut self) {
        self.view = self.manager.sorted().iter().map(|record| record.id).collect();
    }

    /// Maps a 1-based row from the last rendered table back to a record id.
    pub fn record_for_row(&self, raw: &str) -> Result<RecordId, CommandError> {
        let row: usize = raw.trim().parse().map_err(|_| {
            CommandError::InvalidArguments(format!("`{}` is not a row number", raw))
        })?;
        if self.view.is_empty() {
            return Err(CommandError::InvalidArguments(
                "no rows are shown; run `list` first".into(),
            ));
        }
        row.checked_sub(1)
            .and_then(|idx| self.view.get(idx).copied())
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "row {} is out of range (1-{})",
                    row,
                    self.view.len()
                ))
            })
    }

    pub fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(CommandError::from)
    }

    pub fn confirm_exit(&self) -> Result<bool, CliError> {
        self.confirm("Exit shell?").map_err(CliError::from)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let best = self
            .registry
            .names()
            .map(|name| (strsim::levenshtein(name, &input.to_lowercase()), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 2 {
                output::info(format!("Suggestion: `{}`?", name));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::info("Use `help` for usage details.");
            }
            other => output::error(other),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0}")]
    Command(String),
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Ledger(inner) => CliError::Ledger(inner),
            CommandError::Io(inner) => CliError::Io(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}
