use std::path::PathBuf;

use crate::config::{self, Config};
use color_eyre::Result;
use dirs::data_dir;
use lockbox_storage::{file_store::FileBackingStore, token_store::SecureTokenStore};
use tracing::debug;

/// Resolve the default data directory for Lockbox.
pub fn default_data_dir() -> Result<PathBuf> {
    let base = data_dir().ok_or_else(|| color_eyre::eyre::eyre!("no data dir available"))?;
    Ok(base.join("lockbox"))
}

/// Build the encrypted token store from config overrides and the resolved
/// passphrase.
pub fn store_from_config(config: &Config) -> Result<SecureTokenStore<FileBackingStore>> {
    let root = match &config.data_dir {
        Some(root) => {
            debug!(?root, "initializing token store (config override)");
            root.clone()
        }
        None => {
            let root = default_data_dir()?;
            debug!(?root, "initializing token store");
            root
        }
    };

    let passphrase = config::resolve_passphrase(config);
    let store = SecureTokenStore::new(FileBackingStore::new(root), passphrase)?;
    Ok(store)
}

/// Helper for tests to construct a store rooted at a temp dir with a fixed
/// passphrase.
#[cfg(test)]
pub fn test_store(root: impl Into<PathBuf>) -> SecureTokenStore<FileBackingStore> {
    SecureTokenStore::new(FileBackingStore::new(root), "test-passphrase").expect("store")
}
