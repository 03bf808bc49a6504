//! Local persistence of the editor text and theme.
//!
//! Only two keys are ever written: [`LAST_TEXT_KEY`] and [`THEME_KEY`]. A
//! missing key is a normal condition and callers fall back to defaults.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, trace};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const LAST_TEXT_KEY: &str = "textToDiagram_lastText";
pub const THEME_KEY: &str = "textToDiagram_theme";

const STATE_FILE: &str = "state.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on `{path}`: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Corrupt state file `{path}`: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A string-keyed, last-write-wins store.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage backed by a JSON object in `<dir>/state.json`.
///
/// Every `set` rewrites the whole file through a temporary file in the same
/// directory, so a crash never leaves a half-written state file behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Opens the state file in `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the directory cannot be created or
    /// the file cannot be read, and [`StorageError::Corrupt`] when it is not
    /// a JSON object of strings.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(STATE_FILE);
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|source| {
                StorageError::Corrupt {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        debug!(path:? = path, keys = entries.len(); "Opened state file");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let io_error = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));

        let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
        serde_json::to_writer_pretty(&mut file, &self.entries).map_err(|source| {
            StorageError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        file.persist(&self.path)
            .map_err(|err| io_error(err.error))?;
        trace!(path:? = self.path; "State file written");
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }
}
