//! Theme handling for Draftpad
//!
//! Converts the light/dark `Theme` setting into egui `Visuals` and exposes
//! the handful of colors the editor surface paints with directly.
//!
//! ```ignore
//! let mut themes = ThemeManager::new(settings.theme);
//! themes.apply_if_needed(ctx);
//! let colors = themes.colors();
//! ```

use crate::config::Theme;
use eframe::egui::{self, Color32, Context, Rounding, Stroke, Visuals};
use log::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Editor Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Colors used when painting the editor surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorColors {
    /// Editor background
    pub background: Color32,
    /// Body text
    pub text: Color32,
    /// Emphasized text, used for the bold style
    pub strong: Color32,
    /// Muted text (list markers, hints)
    pub muted: Color32,
    /// Caret stroke
    pub caret: Color32,
    /// Selected text background
    pub selection: Color32,
    /// Inline code background
    pub code_bg: Color32,
    /// Blockquote bar
    pub quote_bar: Color32,
}

impl EditorColors {
    pub fn light() -> Self {
        Self {
            background: Color32::from_rgb(255, 255, 255),
            text: Color32::from_rgb(36, 41, 47),
            strong: Color32::from_rgb(0, 0, 0),
            muted: Color32::from_rgb(110, 119, 129),
            caret: Color32::from_rgb(9, 105, 218),
            selection: Color32::from_rgba_unmultiplied(9, 105, 218, 60),
            code_bg: Color32::from_rgb(240, 242, 245),
            quote_bar: Color32::from_rgb(208, 215, 222),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Color32::from_rgb(30, 30, 30),
            text: Color32::from_rgb(220, 220, 220),
            strong: Color32::from_rgb(255, 255, 255),
            muted: Color32::from_rgb(140, 140, 140),
            caret: Color32::from_rgb(100, 160, 255),
            selection: Color32::from_rgba_unmultiplied(100, 160, 255, 70),
            code_bg: Color32::from_rgb(45, 45, 48),
            quote_bar: Color32::from_rgb(80, 80, 80),
        }
    }

    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self::light(),
            Theme::Dark => Self::dark(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Visuals
// ─────────────────────────────────────────────────────────────────────────────

/// Create egui Visuals for the given theme.
pub fn create_visuals(theme: Theme) -> Visuals {
    let colors = EditorColors::for_theme(theme);
    let mut visuals = match theme {
        Theme::Light => Visuals::light(),
        Theme::Dark => Visuals::dark(),
    };

    visuals.panel_fill = colors.background;
    visuals.window_fill = colors.background;
    visuals.code_bg_color = colors.code_bg;
    visuals.selection.bg_fill = colors.selection;
    visuals.selection.stroke = Stroke::new(1.0, colors.caret);
    visuals.text_cursor.stroke = Stroke::new(2.0, colors.caret);

    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_shadow = egui::epaint::Shadow {
        offset: egui::vec2(0.0, 2.0),
        blur: 8.0,
        spread: 0.0,
        color: Color32::from_black_alpha(25),
    };

    visuals
}

// ─────────────────────────────────────────────────────────────────────────────
// Theme Manager
// ─────────────────────────────────────────────────────────────────────────────

/// Tracks the active theme and applies it to the egui context on change.
#[derive(Debug, Clone)]
pub struct ThemeManager {
    current_theme: Theme,
    needs_apply: bool,
}

impl ThemeManager {
    pub fn new(theme: Theme) -> Self {
        Self {
            current_theme: theme,
            needs_apply: true,
        }
    }

    /// Switch theme; the new visuals are applied on the next frame.
    pub fn set_theme(&mut self, theme: Theme) {
        if self.current_theme != theme {
            self.current_theme = theme;
            self.needs_apply = true;
        }
    }

    /// Apply the theme only if it changed since the last application.
    ///
    /// Returns `true` if the theme was applied.
    pub fn apply_if_needed(&mut self, ctx: &Context) -> bool {
        if !self.needs_apply {
            return false;
        }
        ctx.set_visuals(create_visuals(self.current_theme));
        self.needs_apply = false;
        debug!("Applied theme: {:?}", self.current_theme);
        true
    }

    pub fn colors(&self) -> EditorColors {
        EditorColors::for_theme(self.current_theme)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
