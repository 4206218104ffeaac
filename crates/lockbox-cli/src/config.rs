use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};

/// Environment variable consulted when the config file has no passphrase.
pub const PASSPHRASE_ENV: &str = "LOCKBOX_PASSPHRASE";

/// Fallback used when neither the config file nor the environment provides
/// a passphrase. Known weakness: every deployment left on this constant can
/// read each other's records. Set a real passphrase in production.
pub const DEFAULT_PASSPHRASE: &str = "insecure-dev-passphrase";

/// User-level configuration loaded from `~/.config/lockbox/config.toml`
/// (platform-specific).
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Override for the data directory holding encrypted records.
    pub data_dir: Option<PathBuf>,
    /// Passphrase the store seals records under.
    pub passphrase: Option<String>,
}

/// Load config from the default path; if missing, return defaults.
pub fn load() -> Result<Config> {
    let path = default_path()?;
    load_from_path(path)
}

/// Load config from a given path; if missing or empty, return defaults.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = toml::from_str(&contents)?;
    Ok(cfg)
}

/// Resolve the default config path (platform aware).
pub fn default_path() -> Result<PathBuf> {
    let base = config_dir().ok_or_else(|| color_eyre::eyre::eyre!("no config dir available"))?;
    Ok(base.join("lockbox").join("config.toml"))
}

/// Resolve the passphrase: config file first, then the environment, then
/// the documented fallback constant.
pub fn resolve_passphrase(config: &Config) -> String {
    config
        .passphrase
        .clone()
        .or_else(|| std::env::var(PASSPHRASE_ENV).ok())
        .unwrap_or_else(|| DEFAULT_PASSPHRASE.to_string())
}

/// Write the given config to disk, creating parent directories as needed.
/// Will not overwrite an existing file, to avoid clobbering user edits.
pub fn write_default_if_missing(config: &Config) -> Result<PathBuf> {
    let path = default_path()?;
    if path.exists() {
        return Ok(path);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(config)?;
    fs::write(&path, body)?;
    Ok(path)
}
