use dirs::home_dir;
use std::{
    env,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

pub const HOME_ENV: &str = "STOCK_LEDGER_HOME";
const DEFAULT_DIR_NAME: &str = ".stock_ledger";
const CONFIG_FILE: &str = "config.json";
const DEFAULT_STOCK_FILE: &str = "vape_stock.xlsx";
const TMP_SUFFIX: &str = "tmp";

/// Resolves where the application keeps its files.
pub struct PathResolver;

impl PathResolver {
    /// Application data directory, `$STOCK_LEDGER_HOME` or `~/.stock_ledger`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(base: Option<PathBuf>) -> PathBuf {
        base.unwrap_or_else(Self::base_dir)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join(CONFIG_FILE)
    }

    pub fn stock_file_in(base: &Path) -> PathBuf {
        base.join(DEFAULT_STOCK_FILE)
    }
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(path)
}

/// Sibling of `path` used to stage writes, e.g. `stock.xlsx.tmp`.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.flush()?;
    Ok(())
}

/// Writes `data` to a staging sibling of `path`, then renames it into place.
pub fn replace_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp = tmp_path(path);
    write_atomic(&tmp, data)?;
    fs::rename(&tmp, path)
}
