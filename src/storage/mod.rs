//! Document storage for Draftpad
//!
//! This module abstracts the flat string key-value store the document is
//! persisted to, and the bridge that (de)serializes editor snapshots into it.
//!
//! - `KeyValueStore`: the store interface (`get`/`set`)
//! - `MemoryStore`: in-process store, used for ephemeral sessions and tests
//! - `FileStore`: a JSON object file in the platform data directory
//! - `PersistenceBridge`: snapshot save/load under one fixed key

mod bridge;
mod file;

pub use bridge::*;
pub use file::*;

use crate::error::Result;
use std::collections::HashMap;

/// A flat, string-keyed, string-valued persistent store.
pub trait KeyValueStore {
    /// Read the value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store. Contents are lost when it is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
