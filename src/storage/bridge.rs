//! Snapshot persistence through a key-value store.

use super::KeyValueStore;
use crate::document::{convert_from_raw, convert_to_raw, EditorState, RawContentState};
use crate::error::{Error, Result};
use log::{debug, info, warn};

/// Key the document is stored under unless configured otherwise.
pub const DEFAULT_DOCUMENT_KEY: &str = "editorState";

/// Saves and loads editor snapshots as JSON under one fixed key.
pub struct PersistenceBridge {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl PersistenceBridge {
    pub fn new(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Serialize the snapshot's content and overwrite the stored document.
    pub fn save(&mut self, state: &EditorState) -> Result<()> {
        let raw = convert_to_raw(state.content());
        let json = serde_json::to_string(&raw).map_err(|e| Error::StoreWrite {
            key: self.key.clone(),
            source: Box::new(e),
        })?;
        self.store.set(&self.key, &json)?;
        debug!("Persisted document ({} bytes) under '{}'", json.len(), self.key);
        Ok(())
    }

    /// Load the stored document.
    ///
    /// Returns `None` when nothing is stored, and also when the stored value
    /// cannot be read or is not a valid document; those cases are logged.
    pub fn load(&self) -> Option<EditorState> {
        match self.try_load() {
            Ok(Some(state)) => {
                info!("Loaded stored document from '{}'", self.key);
                Some(state)
            }
            Ok(None) => {
                debug!("No stored document under '{}'", self.key);
                None
            }
            Err(e) => {
                warn!("Ignoring stored document under '{}': {}", self.key, e);
                None
            }
        }
    }

    fn try_load(&self) -> Result<Option<EditorState>> {
        let Some(json) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        let raw: RawContentState = serde_json::from_str(&json)?;
        let content = convert_from_raw(&raw)?;
        Ok(Some(EditorState::create_with_content(content)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
