//! File-backed JSON array store.

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::RegistryError;

/// Stores a list of records as one pretty-printed JSON array in a file.
///
/// `load_all` reads the whole document; `save_all` rewrites it in full.
/// There is no incremental update: from the caller's perspective every save
/// is a complete replace of the store.
#[derive(Debug, Clone)]
pub struct JsonStore<T> {
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a store over the given file path. The file need not exist.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _records: PhantomData,
        }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every record from the store.
    ///
    /// An absent file is an empty store, not an error.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Store`] if the file exists but cannot be read or
    /// parsed. Callers degrade to an empty collection and report the error;
    /// they never propagate a raw parse failure out of a query operation.
    pub fn load_all(&self) -> Result<Vec<T>, RegistryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)
            .map_err(|e| RegistryError::Store(format!("read {}: {e}", self.path.display())))?;
        serde_json::from_str(&contents)
            .map_err(|e| RegistryError::Store(format!("parse {}: {e}", self.path.display())))
    }

    /// Rewrites the store with the given records, creating the containing
    /// directory if absent.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Store`] on serialization or write failure.
    pub fn save_all(&self, records: &[T]) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| RegistryError::Store(format!("create {}: {e}", parent.display())))?;
        }
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| RegistryError::Store(format!("serialize: {e}")))?;
        fs::write(&self.path, json)
            .map_err(|e| RegistryError::Store(format!("write {}: {e}", self.path.display())))
    }
}
