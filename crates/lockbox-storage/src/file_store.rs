use std::{
    fs::{self, File},
    io::{Read, Write},
    path::PathBuf,
};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use lockbox_core::backing::{BackingStore, BackingStoreError};
use tempfile::NamedTempFile;

/// File-per-key backing store rooted at a directory. Records survive process
/// restarts; writes go through a temp file and an atomic rename so readers
/// never observe a partial record.
pub struct FileBackingStore {
    root: PathBuf,
}

impl FileBackingStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(sanitize_key(key))
    }
}

impl BackingStore for FileBackingStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, BackingStoreError> {
        let mut file = match File::open(self.path_for(key)) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(storage_err(err)),
        };

        let mut text = String::new();
        file.read_to_string(&mut text).map_err(storage_err)?;
        Ok(Some(text))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), BackingStoreError> {
        fs::create_dir_all(&self.root).map_err(storage_err)?;

        let mut tmp = NamedTempFile::new_in(&self.root).map_err(storage_err)?;
        tmp.write_all(value.as_bytes()).map_err(storage_err)?;
        tmp.flush().map_err(storage_err)?;
        tmp.persist(self.path_for(key))
            .map_err(|e| storage_err(e.error))?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), BackingStoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_err(err)),
        }
    }
}

// Keys may contain path separators; encode them into safe filenames.
fn sanitize_key(key: &str) -> String {
    URL_SAFE_NO_PAD.encode(key)
}

fn storage_err<E: ToString>(err: E) -> BackingStoreError {
    BackingStoreError::Storage {
        reason: err.to_string(),
    }
}
