//! Persistence of the most recently uploaded dataset.
//!
//! A [`DatasetStore`] holds at most one JSON-LD blob. A successful upload
//! replaces it wholesale, and loading prefers it over the well-known input
//! document.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};

use crate::{config::DataConfig, error::KnowflowError};

const STORE_FILE: &str = "latest.jsonld";

/// Load/save contract for the latest uploaded dataset.
pub trait DatasetStore {
    /// Returns the stored blob, or `None` if nothing has been stored.
    ///
    /// # Errors
    ///
    /// Returns [`KnowflowError::Store`] if the backend cannot be read.
    fn load(&self) -> Result<Option<String>, KnowflowError>;

    /// Replaces the stored blob.
    ///
    /// # Errors
    ///
    /// Returns [`KnowflowError::Store`] if the backend cannot be written.
    fn save(&mut self, blob: &str) -> Result<(), KnowflowError>;

    /// Removes the stored blob, if any.
    ///
    /// # Errors
    ///
    /// Returns [`KnowflowError::Store`] if the backend cannot be written.
    fn clear(&mut self) -> Result<(), KnowflowError>;
}

/// A store kept in memory for the lifetime of the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blob: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DatasetStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, KnowflowError> {
        Ok(self.blob.clone())
    }

    fn save(&mut self, blob: &str) -> Result<(), KnowflowError> {
        self.blob = Some(blob.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), KnowflowError> {
        self.blob = None;
        Ok(())
    }
}

/// A store backed by a single file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A store in the platform data directory, if one can be determined.
    pub fn in_data_dir() -> Option<Self> {
        let dirs = ProjectDirs::from("com", "knowflow", "knowflow")?;
        Some(Self::new(dirs.data_dir().join(STORE_FILE)))
    }

    /// The store file named in the data configuration, falling back to
    /// [`FileStore::in_data_dir`].
    pub fn from_config(config: &DataConfig) -> Option<Self> {
        config.store().map(Self::new).or_else(Self::in_data_dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn store_error(&self, action: &str, err: io::Error) -> KnowflowError {
        KnowflowError::Store(format!(
            "failed to {action} `{}`: {err}",
            self.path.display()
        ))
    }
}

impl DatasetStore for FileStore {
    fn load(&self) -> Result<Option<String>, KnowflowError> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => {
                debug!(path = self.path.display().to_string(); "Stored dataset read");
                Ok(Some(blob))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(self.store_error("read", err)),
        }
    }

    fn save(&mut self, blob: &str) -> Result<(), KnowflowError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| self.store_error("create directory for", err))?;
        }
        fs::write(&self.path, blob).map_err(|err| self.store_error("write", err))?;
        info!(path = self.path.display().to_string(), bytes = blob.len(); "Dataset stored");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), KnowflowError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.store_error("remove", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_replaces_wholesale() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), None);

        store.save("first").unwrap();
        store.save("second").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("second"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("nested/latest.jsonld"));

        assert_eq!(store.load().unwrap(), None);
        store.save("{\"@graph\": []}").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("{\"@graph\": []}"));

        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_configured_store_path() {
        let config = DataConfig::default().with_store("/tmp/knowflow/latest.jsonld");
        let store = FileStore::from_config(&config).unwrap();

        assert_eq!(store.path(), Path::new("/tmp/knowflow/latest.jsonld"));
    }

    #[test]
    fn test_file_store_unreadable_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(matches!(store.load(), Err(KnowflowError::Store(_))));
    }
}
