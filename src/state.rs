//! Application state management for Draftpad
//!
//! This module defines the [`StateController`], which owns the current
//! editor snapshot and mediates between keyboard commands, typing shortcuts,
//! and document persistence, and the [`AppState`] that wraps it together
//! with user settings and transient UI state.
//!
//! All snapshot transitions go through [`StateController::commit`], which
//! replaces the snapshot, bumps the render revision, and persists.

use crate::config::{save_config_silent, Settings, StorageBackend};
use crate::document::rich_utils::{self, KeyCommand};
use crate::document::{EditorState, SelectionState};
use crate::error::{Error, Result};
use crate::markdown::shortcuts;
use crate::storage::{FileStore, KeyValueStore, MemoryStore, PersistenceBridge};
use log::{debug, info, warn};

// ─────────────────────────────────────────────────────────────────────────────
// Handle Result
// ─────────────────────────────────────────────────────────────────────────────

/// Whether an input was consumed by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleResult {
    /// The input produced a committed snapshot
    Handled,
    /// The input had no effect; the caller may fall back to default handling
    NotHandled,
}

impl HandleResult {
    pub fn is_handled(&self) -> bool {
        matches!(self, HandleResult::Handled)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// State Controller
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the single current snapshot of the document.
///
/// The snapshot is replaced (never mutated) by [`commit`](Self::commit), and
/// every commit is written through the persistence bridge.
pub struct StateController {
    snapshot: EditorState,
    bridge: PersistenceBridge,
    /// Incremented on every commit so the view knows to re-render
    revision: u64,
    /// Last persistence failure, kept until the UI takes it
    persist_warning: Option<Error>,
}

impl StateController {
    /// Create a controller from whatever the bridge has stored.
    ///
    /// An absent or malformed stored document yields an empty document.
    pub fn initialize(bridge: PersistenceBridge) -> Self {
        let snapshot = bridge.load().unwrap_or_else(|| {
            info!("Starting with an empty document");
            EditorState::create_empty()
        });
        Self {
            snapshot,
            bridge,
            revision: 0,
            persist_warning: None,
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> &EditorState {
        &self.snapshot
    }

    /// Render revision; changes whenever the snapshot is replaced.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input Handling
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve a key command through the engine's command table.
    pub fn on_key_command(&mut self, command: KeyCommand) -> HandleResult {
        match rich_utils::handle_key_command(&self.snapshot, command) {
            Some(next) => {
                self.commit(next);
                HandleResult::Handled
            }
            None => {
                debug!("Key command '{}' not handled", command.name());
                HandleResult::NotHandled
            }
        }
    }

    /// Check typed characters for a formatting shortcut before they are
    /// inserted. When one fires, the formatted snapshot is committed and the
    /// characters must not be inserted.
    pub fn on_before_character_insert(&mut self, chars: &str) -> HandleResult {
        let Some(action) = shortcuts::detect_in_state(&self.snapshot, chars) else {
            return HandleResult::NotHandled;
        };

        debug!("Shortcut fired: {:?}", action);
        let next = shortcuts::apply_shortcut(&self.snapshot, action);
        self.commit(next);
        HandleResult::Handled
    }

    /// Insert characters at the selection with the current inline style.
    pub fn insert_characters(&mut self, chars: &str) {
        let next = rich_utils::insert_characters(&self.snapshot, chars);
        self.commit(next);
    }

    /// Typed text: shortcuts first, plain insertion otherwise.
    pub fn handle_text_input(&mut self, chars: &str) {
        if chars.is_empty() {
            return;
        }
        if !self.on_before_character_insert(chars).is_handled() {
            self.insert_characters(chars);
        }
    }

    /// Move the selection, e.g. after a click in the editor surface.
    pub fn select(&mut self, selection: SelectionState) {
        if self.snapshot.selection() == &selection {
            return;
        }
        let next = self.snapshot.with_selection(selection);
        self.commit(next);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commit and Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the current snapshot and persist it.
    ///
    /// A persistence failure keeps the new snapshot in memory and is stored
    /// as a warning for the UI. Returns `true` if the snapshot was persisted.
    pub fn commit(&mut self, next: EditorState) -> bool {
        self.snapshot = next;
        self.revision = self.revision.wrapping_add(1);
        debug!(
            "Committed {:?} (revision {})",
            self.snapshot.last_change_type(),
            self.revision
        );

        match self.bridge.save(&self.snapshot) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to persist document: {}", e);
                self.persist_warning = Some(e);
                false
            }
        }
    }

    /// Take the last persistence failure, if any.
    pub fn take_persist_warning(&mut self) -> Option<Error> {
        self.persist_warning.take()
    }

    /// Persist the current snapshot without changing it.
    pub fn manual_save(&mut self) -> Result<()> {
        self.bridge.save(&self.snapshot)?;
        info!("Document saved under '{}'", self.bridge.key());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UI State
// ─────────────────────────────────────────────────────────────────────────────

/// UI-related state flags.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Whether the "saved" acknowledgment dialog is open
    pub show_save_ack: bool,
    /// Whether to show error modal
    pub show_error_modal: bool,
    /// Error message for modal
    pub error_message: String,
    /// Temporary toast message
    pub toast_message: Option<String>,
    /// When the toast message should expire (as seconds since app start)
    pub toast_expires_at: Option<f64>,
}

/// Message shown after a manual save.
pub const SAVE_ACK_MESSAGE: &str = "Editor state saved!";

// ─────────────────────────────────────────────────────────────────────────────
// Application State
// ─────────────────────────────────────────────────────────────────────────────

/// Central application state.
pub struct AppState {
    /// The document controller
    pub controller: StateController,
    /// User settings (loaded from config)
    pub settings: Settings,
    /// UI-related state
    pub ui: UiState,
    /// Whether settings have been modified and need saving
    settings_dirty: bool,
}

impl AppState {
    /// Build the state for the given settings, opening the configured store.
    pub fn with_settings(settings: Settings) -> Self {
        let store = open_store(settings.storage_backend);
        let bridge = PersistenceBridge::new(store, settings.document_key.clone());
        Self::with_bridge(settings, bridge)
    }

    /// Build the state around an existing persistence bridge.
    pub fn with_bridge(settings: Settings, bridge: PersistenceBridge) -> Self {
        Self {
            controller: StateController::initialize(bridge),
            settings,
            ui: UiState::default(),
            settings_dirty: false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Saving
    // ─────────────────────────────────────────────────────────────────────────

    /// Manually save the document and acknowledge it, as a dialog or a
    /// toast depending on settings.
    pub fn manual_save(&mut self, current_time: f64) {
        match self.controller.manual_save() {
            Ok(()) => {
                if self.settings.confirm_save_with_dialog {
                    self.ui.show_save_ack = true;
                } else {
                    self.show_toast(SAVE_ACK_MESSAGE, current_time, 2.0);
                }
            }
            Err(e) => {
                warn!("Manual save failed: {}", e);
                self.show_error(format!("Could not save the document:\n{}", e));
            }
        }
    }

    /// Close the save acknowledgment dialog.
    pub fn dismiss_save_ack(&mut self) {
        self.ui.show_save_ack = false;
    }

    /// Surface a pending persistence warning as a toast.
    pub fn surface_persist_warning(&mut self, current_time: f64) {
        if let Some(e) = self.controller.take_persist_warning() {
            self.show_toast(format!("Changes not saved: {}", e), current_time, 4.0);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Update settings and mark as dirty.
    pub fn update_settings<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        f(&mut self.settings);
        self.settings_dirty = true;
    }

    /// Save settings to config file if modified.
    ///
    /// Returns `true` if settings were saved.
    pub fn save_settings_if_dirty(&mut self) -> bool {
        if self.settings_dirty {
            if save_config_silent(&self.settings) {
                self.settings_dirty = false;
                info!("Settings saved");
                return true;
            }
            warn!("Failed to save settings");
        }
        false
    }

    /// Persist what needs persisting before the application exits.
    pub fn shutdown(&mut self) {
        if let Err(e) = self.controller.manual_save() {
            warn!("Failed to save document during shutdown: {}", e);
        }
        self.save_settings_if_dirty();
        info!("AppState shutdown complete");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Messages
    // ─────────────────────────────────────────────────────────────────────────

    /// Show an error in a modal dialog.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.ui.error_message = message.into();
        self.ui.show_error_modal = true;
    }

    /// Dismiss the error modal.
    pub fn dismiss_error(&mut self) {
        self.ui.show_error_modal = false;
        self.ui.error_message.clear();
    }

    /// Show a temporary toast message (disappears after duration).
    ///
    /// `current_time` should be the current app time in seconds.
    /// `duration` is how long to show the message in seconds.
    pub fn show_toast(&mut self, message: impl Into<String>, current_time: f64, duration: f64) {
        self.ui.toast_message = Some(message.into());
        self.ui.toast_expires_at = Some(current_time + duration);
    }

    /// Update toast state - clears expired toasts.
    ///
    /// Call this each frame with the current time.
    pub fn update_toast(&mut self, current_time: f64) {
        if let Some(expires_at) = self.ui.toast_expires_at {
            if current_time >= expires_at {
                self.ui.toast_message = None;
                self.ui.toast_expires_at = None;
            }
        }
    }
}

/// Open the document store for the configured backend.
///
/// Falls back to an in-memory store when the data directory is unavailable.
fn open_store(backend: StorageBackend) -> Box<dyn KeyValueStore> {
    match backend {
        StorageBackend::Memory => {
            info!("Using in-memory document store");
            Box::new(MemoryStore::new())
        }
        StorageBackend::File => match FileStore::in_data_dir() {
            Ok(store) => {
                info!("Using document store at {}", store.path().display());
                Box::new(store)
            }
            Err(e) => {
                warn!("{}; falling back to in-memory document store", e);
                Box::new(MemoryStore::new())
            }
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockType, InlineStyle};
    use crate::storage::DEFAULT_DOCUMENT_KEY;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io;
    use std::rc::Rc;

    /// Store whose contents stay observable after it is handed to a bridge.
    #[derive(Clone, Default)]
    struct SharedStore {
        values: Rc<RefCell<HashMap<String, String>>>,
        fail_writes: Rc<RefCell<bool>>,
    }

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.borrow().get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            if *self.fail_writes.borrow() {
                return Err(Error::StoreWrite {
                    key: key.to_string(),
                    source: Box::new(io::Error::new(io::ErrorKind::Other, "quota exceeded")),
                });
            }
            self.values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    impl SharedStore {
        fn stored(&self) -> Option<String> {
            self.values.borrow().get(DEFAULT_DOCUMENT_KEY).cloned()
        }

        fn bridge(&self) -> PersistenceBridge {
            PersistenceBridge::new(Box::new(self.clone()), DEFAULT_DOCUMENT_KEY)
        }
    }

    fn controller() -> (StateController, SharedStore) {
        let store = SharedStore::default();
        (StateController::initialize(store.bridge()), store)
    }

    fn type_text(controller: &mut StateController, text: &str) {
        for ch in text.chars() {
            controller.handle_text_input(&ch.to_string());
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Initialization tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_initialize_with_empty_store() {
        let (controller, _) = controller();
        let empty = EditorState::create_empty();
        assert_eq!(controller.snapshot().content(), empty.content());
        assert_eq!(controller.revision(), 0);
    }

    #[test]
    fn test_initialize_with_invalid_json() {
        let store = SharedStore::default();
        store
            .values
            .borrow_mut()
            .insert(DEFAULT_DOCUMENT_KEY.to_string(), "not json at all".to_string());

        let controller = StateController::initialize(store.bridge());
        assert_eq!(
            controller.snapshot().content(),
            EditorState::create_empty().content()
        );
    }

    #[test]
    fn test_initialize_restores_committed_document() {
        let (mut first, store) = controller();
        type_text(&mut first, "# Heading");
        first.on_key_command(KeyCommand::SplitBlock);
        type_text(&mut first, "** urgent");

        let reopened = StateController::initialize(store.bridge());
        assert_eq!(reopened.snapshot().content(), first.snapshot().content());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commit tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_commit_persists_and_bumps_revision() {
        let (mut controller, store) = controller();
        let next = rich_utils::insert_characters(controller.snapshot(), "hello");

        assert!(controller.commit(next.clone()));
        assert_eq!(controller.revision(), 1);
        assert_eq!(controller.snapshot(), &next);

        let loaded = store.bridge().load().unwrap();
        assert_eq!(loaded.content(), next.content());
    }

    #[test]
    fn test_every_keystroke_is_persisted() {
        let (mut controller, store) = controller();
        type_text(&mut controller, "ab");
        assert_eq!(controller.revision(), 2);
        assert!(store.stored().unwrap().contains("\"text\":\"ab\""));
    }

    #[test]
    fn test_write_failure_keeps_snapshot_and_warns() {
        let (mut controller, store) = controller();
        *store.fail_writes.borrow_mut() = true;

        type_text(&mut controller, "kept");
        assert_eq!(controller.snapshot().current_block().text(), "kept");

        let warning = controller.take_persist_warning().unwrap();
        assert!(matches!(warning, Error::StoreWrite { .. }));
        assert!(controller.take_persist_warning().is_none());
        assert!(store.stored().is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Shortcut tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_header_shortcut_through_controller() {
        let (mut controller, _) = controller();
        controller.handle_text_input("#");
        assert_eq!(
            controller.on_before_character_insert(" "),
            HandleResult::Handled
        );

        let block = controller.snapshot().current_block();
        assert_eq!(block.block_type(), BlockType::HeaderOne);
        assert_eq!(block.text(), "");
    }

    #[test]
    fn test_red_shortcut_through_controller() {
        let (mut controller, _) = controller();
        type_text(&mut controller, "** warning");

        let block = controller.snapshot().current_block();
        assert_eq!(block.text(), "warning");
        assert!(block.range_has_style(0, 7, InlineStyle::Red));
    }

    #[test]
    fn test_red_shortcut_over_selected_range() {
        let (mut controller, store) = controller();
        type_text(&mut controller, "**abc");
        let key = controller.snapshot().selection().block_key().clone();
        controller.select(SelectionState::range(key.clone(), 2, 5));

        assert!(controller.on_before_character_insert(" ").is_handled());

        let snapshot = controller.snapshot();
        let block = snapshot.current_block();
        assert_eq!(block.text(), "abc");
        assert!(block.range_has_style(0, 3, InlineStyle::Red));
        assert_eq!(snapshot.selection(), &SelectionState::range(key, 0, 3));
        assert!(store.stored().unwrap().contains("RED"));
    }

    #[test]
    fn test_untabulated_marker_types_space() {
        let (mut controller, _) = controller();
        type_text(&mut controller, "## x");
        let block = controller.snapshot().current_block();
        assert_eq!(block.text(), "## x");
        assert_eq!(block.block_type(), BlockType::Unstyled);
    }

    #[test]
    fn test_plain_characters_not_handled() {
        let (mut controller, _) = controller();
        assert_eq!(
            controller.on_before_character_insert("a"),
            HandleResult::NotHandled
        );
        assert_eq!(controller.revision(), 0);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Key command tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_key_command_handled() {
        let (mut controller, _) = controller();
        type_text(&mut controller, "abc");
        assert!(controller.on_key_command(KeyCommand::Backspace).is_handled());
        assert_eq!(controller.snapshot().current_block().text(), "ab");
    }

    #[test]
    fn test_key_command_not_handled_at_document_start() {
        let (mut controller, _) = controller();
        assert_eq!(
            controller.on_key_command(KeyCommand::Backspace),
            HandleResult::NotHandled
        );
        assert_eq!(controller.revision(), 0);
    }

    #[test]
    fn test_select_same_selection_is_noop() {
        let (mut controller, _) = controller();
        let selection = controller.snapshot().selection().clone();
        controller.select(selection);
        assert_eq!(controller.revision(), 0);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Manual save tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_manual_save_leaves_snapshot_unchanged() {
        let (mut controller, store) = controller();
        type_text(&mut controller, "* bold");
        let before = controller.snapshot().clone();
        let revision = controller.revision();

        controller.manual_save().unwrap();
        assert_eq!(controller.snapshot(), &before);
        assert_eq!(controller.revision(), revision);
        assert_eq!(
            store.bridge().load().unwrap().content(),
            before.content()
        );
    }

    #[test]
    fn test_app_state_save_acknowledgment() {
        let store = SharedStore::default();
        let mut state = AppState::with_bridge(Settings::default(), store.bridge());
        state.manual_save(0.0);
        assert!(state.ui.show_save_ack);
        state.dismiss_save_ack();
        assert!(!state.ui.show_save_ack);

        let settings = Settings {
            confirm_save_with_dialog: false,
            ..Settings::default()
        };
        let mut state = AppState::with_bridge(settings, store.bridge());
        state.manual_save(1.0);
        assert!(!state.ui.show_save_ack);
        assert_eq!(state.ui.toast_message.as_deref(), Some(SAVE_ACK_MESSAGE));
        state.update_toast(5.0);
        assert!(state.ui.toast_message.is_none());
    }

    #[test]
    fn test_app_state_surfaces_persist_warning() {
        let store = SharedStore::default();
        *store.fail_writes.borrow_mut() = true;
        let mut state = AppState::with_bridge(Settings::default(), store.bridge());

        state.controller.handle_text_input("x");
        state.surface_persist_warning(0.0);
        assert!(state
            .ui
            .toast_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Changes not saved")));

        state.manual_save(0.0);
        assert!(state.ui.show_error_modal);
        assert!(!state.ui.show_save_ack);
    }
}
