//! Main application module for Draftpad
//!
//! This module implements the eframe App trait for the main application,
//! handling window management, UI updates, and event processing.

use crate::config::{Settings, WindowSize};
use crate::editor::EditorWidget;
use crate::state::{AppState, SAVE_ACK_MESSAGE};
use crate::string_utils::char_count;
use crate::theme::ThemeManager;
use eframe::egui;
use log::{debug, info};

/// Keyboard shortcut actions that need to be deferred.
///
/// These actions are detected in the input handling closure and executed
/// afterwards to avoid borrow conflicts.
#[derive(Debug, Clone, Copy)]
enum KeyboardAction {
    /// Save the document (Ctrl+S)
    Save,
    /// Toggle light/dark theme (Ctrl+Shift+T)
    ToggleTheme,
}

/// The main application struct that holds all state and implements eframe::App.
pub struct DraftpadApp {
    /// Central application state
    state: AppState,
    /// Theme manager for handling theme switching
    theme_manager: ThemeManager,
    /// Whether the editor should grab focus on the next frame
    focus_editor: bool,
    /// Last known window size (for detecting changes)
    last_window_size: Option<egui::Vec2>,
    /// Application start time for timing toast messages
    start_time: std::time::Instant,
}

impl DraftpadApp {
    /// Create a new DraftpadApp instance.
    ///
    /// Opens the configured document store, restores the stored document,
    /// and applies the saved theme preference.
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        info!("Initializing Draftpad");

        let state = AppState::with_settings(settings);

        let mut theme_manager = ThemeManager::new(state.settings.theme);
        theme_manager.apply_if_needed(&cc.egui_ctx);
        info!("Applied initial theme: {:?}", state.settings.theme);

        Self {
            state,
            theme_manager,
            focus_editor: true,
            last_window_size: None,
            start_time: std::time::Instant::now(),
        }
    }

    /// Get elapsed time since app start in seconds.
    fn get_app_time(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Update window size in settings if changed.
    fn update_window_state(&mut self, ctx: &egui::Context) {
        let Some(size) = ctx.input(|i| i.viewport().inner_rect.map(|r| r.size())) else {
            return;
        };

        let changed = self
            .last_window_size
            .map(|s| (s - size).length() > 1.0)
            .unwrap_or(true);
        if changed {
            self.last_window_size = Some(size);
            self.state.update_settings(|s| {
                s.window_size = WindowSize {
                    width: size.x,
                    height: size.y,
                };
            });
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────────────────

    fn save_document(&mut self) {
        let now = self.get_app_time();
        self.state.manual_save(now);
    }

    fn toggle_theme(&mut self) {
        let theme = self.state.settings.theme.toggle();
        self.state.update_settings(|s| s.theme = theme);
        self.theme_manager.set_theme(theme);
        info!("Theme switched to {}", theme.label());
    }

    /// Handle application-level keyboard shortcuts.
    ///
    /// - Ctrl+S: Save the document
    /// - Ctrl+Shift+T: Toggle theme
    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        let action = ctx.input(|i| {
            if i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::T) {
                debug!("Keyboard shortcut: Ctrl+Shift+T (Toggle Theme)");
                return Some(KeyboardAction::ToggleTheme);
            }

            if i.modifiers.command && !i.modifiers.shift && i.key_pressed(egui::Key::S) {
                debug!("Keyboard shortcut: Ctrl+S (Save)");
                return Some(KeyboardAction::Save);
            }

            None
        });

        match action {
            Some(KeyboardAction::Save) => self.save_document(),
            Some(KeyboardAction::ToggleTheme) => self.toggle_theme(),
            None => {}
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    fn render_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading("Draftpad");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Save").on_hover_text("Save (Ctrl+S)").clicked() {
                        self.save_document();
                    }

                    let theme_label = self.state.settings.theme.toggle().label();
                    if ui
                        .button(theme_label)
                        .on_hover_text("Toggle theme (Ctrl+Shift+T)")
                        .clicked()
                    {
                        self.toggle_theme();
                    }
                });
            });
            ui.add_space(4.0);
        });
    }

    fn render_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let snapshot = self.state.controller.snapshot();
                let content = snapshot.content();
                let status = if content.is_blank() {
                    "Type # then space for a heading, * for bold, ** for red".to_string()
                } else {
                    format!(
                        "{} · {} blocks · {} characters",
                        snapshot.current_block().block_type(),
                        content.blocks().len(),
                        char_count(&content.plain_text()),
                    )
                };
                ui.label(egui::RichText::new(status).small().weak());

                if let Some(toast) = &self.state.ui.toast_message {
                    ui.with_layout(
                        egui::Layout::centered_and_justified(egui::Direction::LeftToRight),
                        |ui| {
                            ui.label(egui::RichText::new(toast).italics());
                        },
                    );
                }
            });
        });
    }

    fn render_editor(&mut self, ctx: &egui::Context) {
        let colors = self.theme_manager.colors();
        let [r, g, b] = self.state.settings.red_style_color;
        let font_size = self.state.settings.font_size;
        let focus = std::mem::take(&mut self.focus_editor);

        egui::CentralPanel::default().show(ctx, |ui| {
            let output = EditorWidget::new(&mut self.state.controller)
                .id(egui::Id::new("draftpad_editor"))
                .font_size(font_size)
                .red_color(egui::Color32::from_rgb(r, g, b))
                .colors(colors)
                .request_focus(focus)
                .show(ui);

            if output.changed {
                ctx.request_repaint();
            }
            output.response.on_hover_cursor(egui::CursorIcon::Text);
        });
    }

    fn render_dialogs(&mut self, ctx: &egui::Context) {
        if self.state.ui.show_save_ack {
            egui::Window::new("Saved")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(SAVE_ACK_MESSAGE);
                    ui.separator();
                    if ui.button("OK").clicked() {
                        self.state.dismiss_save_ack();
                        self.focus_editor = true;
                    }
                });
        }

        if self.state.ui.show_error_modal {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(egui::RichText::new("⚠").size(24.0));
                    ui.label(&self.state.ui.error_message);
                    ui.separator();
                    if ui.button("OK").clicked() {
                        self.state.dismiss_error();
                        self.focus_editor = true;
                    }
                });
        }
    }
}

impl eframe::App for DraftpadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme_manager.apply_if_needed(ctx);

        // Update toast message (clear if expired)
        let current_time = self.get_app_time();
        self.state.update_toast(current_time);

        self.update_window_state(ctx);
        self.handle_keyboard_shortcuts(ctx);

        self.render_header(ctx);
        self.render_status_bar(ctx);
        self.render_editor(ctx);
        self.render_dialogs(ctx);

        // Failed writes from this frame's edits become a toast
        self.state.surface_persist_warning(current_time);

        // Keep repainting while a toast is visible so it expires on time
        if self.state.ui.toast_expires_at.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }
    }

    /// Called when the application is about to close.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application exiting");
        self.state.shutdown();
    }

    /// Save persistent state.
    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        debug!("Saving application state");
        self.state.save_settings_if_dirty();
    }

    /// Auto-save interval in seconds.
    fn auto_save_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(30)
    }
}
