//! File-backed key-value store.
//!
//! All keys live in one JSON object file. Every `set` rewrites the whole
//! file atomically (write to a temporary file, then rename over the
//! original), so a crash mid-write never leaves a truncated store behind.

use super::KeyValueStore;
use crate::error::{Error, Result};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the data directory
const APP_NAME: &str = "draftpad";

/// Store file name
const STORE_FILE_NAME: &str = "storage.json";

/// Temporary file name used during atomic writes
const STORE_TEMP_NAME: &str = "storage.json.tmp";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Directory Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Get the platform-specific data directory for the application.
///
/// - **Windows**: `%APPDATA%\draftpad\`
/// - **macOS**: `~/Library/Application Support/draftpad/`
/// - **Linux**: `~/.local/share/draftpad/`
///
/// # Errors
///
/// Returns `Error::DataDirNotFound` if the directory cannot be determined.
pub fn get_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::DataDirNotFound)
}

// ─────────────────────────────────────────────────────────────────────────────
// File Store
// ─────────────────────────────────────────────────────────────────────────────

/// Key-value store persisted to a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store backed by the file at `path`. The file and its parent directory
    /// are created on the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data directory.
    pub fn in_data_dir() -> Result<Self> {
        Ok(Self::new(get_data_dir()?.join(STORE_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole store. A missing or empty file is an empty store.
    fn read_all(&self, key: &str) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| Error::StoreRead {
            key: key.to_string(),
            source: Box::new(e),
        })?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| Error::StoreRead {
            key: key.to_string(),
            source: Box::new(e),
        })
    }

    fn write_all(&self, key: &str, values: &BTreeMap<String, String>) -> Result<()> {
        let write_err = |e: Box<dyn std::error::Error + Send + Sync>| Error::StoreWrite {
            key: key.to_string(),
            source: e,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating data directory: {}", parent.display());
                fs::create_dir_all(parent).map_err(|e| write_err(Box::new(e)))?;
            }
        }

        let json = serde_json::to_string(values).map_err(|e| write_err(Box::new(e)))?;
        let temp_path = self.path.with_file_name(STORE_TEMP_NAME);
        fs::write(&temp_path, json).map_err(|e| write_err(Box::new(e)))?;
        fs::rename(&temp_path, &self.path).map_err(|e| write_err(Box::new(e)))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all(key)?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut values = match self.read_all(key) {
            Ok(values) => values,
            Err(e) => {
                warn!(
                    "Store file {} is unreadable ({}), starting a fresh store",
                    self.path.display(),
                    e
                );
                BTreeMap::new()
            }
        };
        values.insert(key.to_string(), value.to_string());
        self.write_all(key, &values)?;
        debug!("Stored '{}' in {}", key, self.path.display());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
