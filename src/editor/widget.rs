//! Rich text editor widget for Draftpad
//!
//! Renders the controller's current snapshot block by block with egui
//! `LayoutJob`s, paints the caret and selection, and feeds keyboard input
//! and clicks back into the [`StateController`].

use super::input::{self, EditorInput};
use crate::document::{BlockType, ContentBlock, InlineStyle, SelectionState, StyleSet};
use crate::state::StateController;
use crate::string_utils::char_index_to_byte_index;
use crate::theme::EditorColors;
use eframe::egui::text::{CCursor, LayoutJob, TextFormat};
use eframe::egui::{self, Color32, FontFamily, FontId, Galley, Pos2, Rect, ScrollArea, Sense, Stroke, Ui};
use log::debug;
use std::sync::Arc;

/// Vertical gap between blocks, as a fraction of the font size.
const BLOCK_SPACING: f32 = 0.5;

/// Horizontal indent for list items and quotes, as a fraction of the font size.
const INDENT: f32 = 1.6;

/// Horizontal shift of the second paint that thickens bold text.
const BOLD_OFFSET: f32 = 0.6;

/// Result of showing the editor widget.
pub struct EditorOutput {
    /// Response covering the whole editing surface.
    pub response: egui::Response,
    /// Whether any input produced a new snapshot this frame.
    pub changed: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Widget
// ─────────────────────────────────────────────────────────────────────────────

/// The editing surface.
///
/// # Example
///
/// ```ignore
/// EditorWidget::new(&mut state.controller)
///     .font_size(settings.font_size)
///     .red_color(Color32::from_rgb(255, 0, 0))
///     .colors(theme.colors())
///     .show(ui);
/// ```
pub struct EditorWidget<'a> {
    controller: &'a mut StateController,
    font_size: f32,
    red_color: Color32,
    colors: EditorColors,
    id: Option<egui::Id>,
    request_focus: bool,
}

impl<'a> EditorWidget<'a> {
    pub fn new(controller: &'a mut StateController) -> Self {
        Self {
            controller,
            font_size: 16.0,
            red_color: Color32::RED,
            colors: EditorColors::light(),
            id: None,
            request_focus: false,
        }
    }

    /// Set the body font size.
    #[must_use]
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Set the color of the red inline style.
    #[must_use]
    pub fn red_color(mut self, color: Color32) -> Self {
        self.red_color = color;
        self
    }

    /// Set the palette used for painting.
    #[must_use]
    pub fn colors(mut self, colors: EditorColors) -> Self {
        self.colors = colors;
        self
    }

    /// Set a custom ID for the editor.
    #[must_use]
    pub fn id(mut self, id: egui::Id) -> Self {
        self.id = Some(id);
        self
    }

    /// Take keyboard focus this frame.
    #[must_use]
    pub fn request_focus(mut self, focus: bool) -> Self {
        self.request_focus = focus;
        self
    }

    /// Show the editor widget and return the output.
    pub fn show(self, ui: &mut Ui) -> EditorOutput {
        let id = self.id.unwrap_or_else(|| ui.id().with("editor"));
        let controller = self.controller;
        let params = RenderParams {
            font_size: self.font_size,
            red_color: self.red_color,
            colors: self.colors,
        };

        // Input is consumed before layout so the frame shows its result.
        let revision_before = controller.revision();
        let has_focus = ui.memory(|m| m.has_focus(id));
        if has_focus {
            ui.memory_mut(|m| {
                m.set_focus_lock_filter(
                    id,
                    egui::EventFilter {
                        tab: false,
                        horizontal_arrows: true,
                        vertical_arrows: true,
                        escape: false,
                    },
                )
            });
            let inputs = ui.input(input::collect_inputs);
            apply_inputs(controller, inputs);
        }

        let response = ScrollArea::vertical()
            .id_source(id.with("scroll"))
            .auto_shrink([false, false])
            .show(ui, |ui| paint_document(ui, id, controller, &params, has_focus))
            .inner;

        if self.request_focus || response.clicked() {
            response.request_focus();
        }

        let changed = controller.revision() != revision_before;
        EditorOutput { response, changed }
    }
}

fn apply_inputs(controller: &mut StateController, inputs: Vec<EditorInput>) {
    for event in inputs {
        match event {
            EditorInput::Command(command) => {
                controller.on_key_command(command);
            }
            EditorInput::Text(text) => controller.handle_text_input(&text),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Painting
// ─────────────────────────────────────────────────────────────────────────────

/// Visual parameters shared by every block.
#[derive(Debug, Clone, Copy)]
struct RenderParams {
    font_size: f32,
    red_color: Color32,
    colors: EditorColors,
}

/// A laid-out block and where it goes.
struct PlacedBlock {
    galley: Arc<Galley>,
    /// Bold runs only, painted again with a small offset
    bold: Option<Arc<Galley>>,
    /// Offset of the galley from the top-left of the surface
    offset: egui::Vec2,
    height: f32,
}

fn paint_document(
    ui: &mut Ui,
    id: egui::Id,
    controller: &mut StateController,
    params: &RenderParams,
    has_focus: bool,
) -> egui::Response {
    let snapshot = controller.snapshot();
    let content = snapshot.content();
    let selection = snapshot.selection();
    let width = ui.available_width();
    let indent = params.font_size * INDENT;

    // Lay out every block first so the surface can be allocated in one piece.
    let mut placed = Vec::with_capacity(content.blocks().len());
    let mut y = 0.0;
    for block in content.blocks() {
        let selected = (block.key() == selection.block_key() && !selection.is_collapsed())
            .then(|| (selection.start_offset(), selection.end_offset()));
        let left = block_indent(block.block_type(), indent);

        let max_width = (width - left).max(params.font_size);
        let mut job = layout_block(block, selected, params);
        job.wrap.max_width = max_width;
        let galley = ui.fonts(|f| f.layout_job(job));
        let bold = bold_overlay(block, params).map(|mut job| {
            job.wrap.max_width = max_width;
            ui.fonts(|f| f.layout_job(job))
        });

        let height = galley.size().y;
        placed.push(PlacedBlock {
            galley,
            bold,
            offset: egui::vec2(left, y),
            height,
        });
        y += height + params.font_size * BLOCK_SPACING;
    }

    let desired = egui::vec2(width, y.max(ui.available_height()));
    let (rect, _) = ui.allocate_exact_size(desired, Sense::hover());
    let response = ui.interact(rect, id, Sense::click());
    let painter = ui.painter_at(rect);

    let mut ordinal = 0usize;
    for (block, place) in content.blocks().iter().zip(&placed) {
        let origin = rect.min + place.offset;
        let block_rect = Rect::from_min_size(
            Pos2::new(rect.min.x, origin.y),
            egui::vec2(rect.width(), place.height),
        );

        ordinal = if block.block_type() == BlockType::OrderedListItem {
            ordinal + 1
        } else {
            0
        };
        paint_block_decoration(&painter, block.block_type(), block_rect, ordinal, params);
        painter.galley(origin, place.galley.clone(), params.colors.text);
        if let Some(bold) = &place.bold {
            painter.galley(
                origin + egui::vec2(BOLD_OFFSET, 0.0),
                bold.clone(),
                params.colors.text,
            );
        }

        if has_focus && block.key() == selection.block_key() {
            let caret = place
                .galley
                .pos_from_ccursor(CCursor::new(selection.focus_offset()));
            let top = origin + caret.min.to_vec2();
            painter.line_segment(
                [top, top + egui::vec2(0.0, caret.height())],
                Stroke::new(2.0, params.colors.caret),
            );
        }
    }

    if response.clicked() {
        if let Some(pointer) = response.interact_pointer_pos() {
            if let Some(clicked) = hit_test(content.blocks(), &placed, rect.min, pointer) {
                debug!(
                    "Caret placed at {}:{}",
                    clicked.block_key().as_str(),
                    clicked.focus_offset()
                );
                controller.select(clicked);
            }
        }
    }

    response
}

/// Find the caret position for a click. Clicks between or past blocks go
/// to the nearest block.
fn hit_test(
    blocks: &[ContentBlock],
    placed: &[PlacedBlock],
    surface_origin: Pos2,
    pointer: Pos2,
) -> Option<SelectionState> {
    let local = pointer - surface_origin;
    let index = placed
        .iter()
        .position(|p| local.y < p.offset.y + p.height)
        .unwrap_or(placed.len().saturating_sub(1));

    let (block, place) = blocks.get(index).zip(placed.get(index))?;
    let cursor = place.galley.cursor_from_pos(local - place.offset);
    let offset = cursor.ccursor.index.min(block.len());
    Some(SelectionState::collapsed(block.key().clone(), offset))
}

fn paint_block_decoration(
    painter: &egui::Painter,
    block_type: BlockType,
    rect: Rect,
    ordinal: usize,
    params: &RenderParams,
) {
    let font = FontId::proportional(params.font_size);
    let marker_pos = rect.left_top() + egui::vec2(params.font_size * 0.4, 0.0);
    match block_type {
        BlockType::UnorderedListItem => {
            painter.text(
                marker_pos,
                egui::Align2::LEFT_TOP,
                "•",
                font,
                params.colors.muted,
            );
        }
        BlockType::OrderedListItem => {
            painter.text(
                marker_pos,
                egui::Align2::LEFT_TOP,
                format!("{}.", ordinal),
                font,
                params.colors.muted,
            );
        }
        BlockType::Blockquote => {
            let bar = Rect::from_min_size(rect.left_top(), egui::vec2(3.0, rect.height()));
            painter.rect_filled(bar, 1.0, params.colors.quote_bar);
        }
        BlockType::CodeBlock => {
            painter.rect_filled(rect.expand(2.0), 4.0, params.colors.code_bg);
        }
        _ => {}
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Layout
// ─────────────────────────────────────────────────────────────────────────────

/// A character range of a block that renders with one format.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    start: usize,
    end: usize,
    styles: StyleSet,
    selected: bool,
}

/// Split a block into uniformly formatted sections, cutting style runs at
/// the selection boundaries.
fn block_sections(block: &ContentBlock, selected: Option<(usize, usize)>) -> Vec<Section> {
    let (sel_start, sel_end) = selected.unwrap_or((0, 0));
    let mut sections = Vec::new();

    for (start, end, styles) in block.style_runs() {
        let mut cuts = vec![start, end];
        for bound in [sel_start, sel_end] {
            if bound > start && bound < end {
                cuts.push(bound);
            }
        }
        cuts.sort_unstable();

        for pair in cuts.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            sections.push(Section {
                start: a,
                end: b,
                styles: styles.clone(),
                selected: a >= sel_start && b <= sel_end && sel_start < sel_end,
            });
        }
    }
    sections
}

/// Relative text size for a block type.
fn block_scale(block_type: BlockType) -> f32 {
    match block_type.header_level() {
        Some(1) => 2.0,
        Some(2) => 1.6,
        Some(3) => 1.35,
        Some(4) => 1.15,
        Some(5) => 1.0,
        Some(_) => 0.9,
        None => 1.0,
    }
}

fn block_indent(block_type: BlockType, indent: f32) -> f32 {
    match block_type {
        BlockType::UnorderedListItem | BlockType::OrderedListItem | BlockType::Blockquote => {
            indent
        }
        BlockType::CodeBlock => indent * 0.25,
        _ => 0.0,
    }
}

/// Text format for a set of inline styles within a block.
fn text_format(
    styles: &StyleSet,
    block_type: BlockType,
    selected: bool,
    params: &RenderParams,
) -> TextFormat {
    let size = params.font_size * block_scale(block_type);
    let monospace = block_type == BlockType::CodeBlock || styles.contains(&InlineStyle::Code);
    let family = if monospace {
        FontFamily::Monospace
    } else {
        FontFamily::Proportional
    };

    let mut color = if styles.contains(&InlineStyle::Bold) || block_type.header_level().is_some() {
        params.colors.strong
    } else if block_type == BlockType::Blockquote {
        params.colors.muted
    } else {
        params.colors.text
    };
    if styles.contains(&InlineStyle::Red) {
        color = params.red_color;
    }

    let background = if selected {
        params.colors.selection
    } else if styles.contains(&InlineStyle::Code) {
        params.colors.code_bg
    } else {
        Color32::TRANSPARENT
    };

    let line = Stroke::new((size / 14.0).max(1.0), color);
    TextFormat {
        font_id: FontId::new(size, family),
        color,
        background,
        italics: styles.contains(&InlineStyle::Italic) || block_type == BlockType::Blockquote,
        underline: if styles.contains(&InlineStyle::Underline) {
            line
        } else {
            Stroke::NONE
        },
        strikethrough: if styles.contains(&InlineStyle::Strikethrough) {
            line
        } else {
            Stroke::NONE
        },
        ..Default::default()
    }
}

/// Build the layout job for one block.
fn layout_block(
    block: &ContentBlock,
    selected: Option<(usize, usize)>,
    params: &RenderParams,
) -> LayoutJob {
    let text = block.text();
    let mut job = LayoutJob {
        text: text.to_string(),
        ..Default::default()
    };

    for section in block_sections(block, selected) {
        let byte_range = char_index_to_byte_index(text, section.start)
            ..char_index_to_byte_index(text, section.end);
        job.sections.push(egui::text::LayoutSection {
            leading_space: 0.0,
            byte_range,
            format: text_format(&section.styles, block.block_type(), section.selected, params),
        });
    }

    // Empty blocks still need a row of the right height for the caret.
    if job.sections.is_empty() {
        let format = text_format(&StyleSet::new(), block.block_type(), false, params);
        job.append("", 0.0, format);
    }
    job
}

/// Layout of the block's bold runs alone. Everything else is transparent,
/// and the sections match `layout_block`, so glyphs land in the same places.
fn bold_overlay(block: &ContentBlock, params: &RenderParams) -> Option<LayoutJob> {
    if !block.styles().iter().any(|s| s.contains(&InlineStyle::Bold)) {
        return None;
    }

    let mut job = layout_block(block, None, params);
    for (layout, section) in job.sections.iter_mut().zip(block_sections(block, None)) {
        let format = &mut layout.format;
        if !section.styles.contains(&InlineStyle::Bold) {
            format.color = Color32::TRANSPARENT;
        }
        format.background = Color32::TRANSPARENT;
        format.underline = Stroke::NONE;
        format.strikethrough = Stroke::NONE;
    }
    Some(job)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
