//! Deterministic inline flow layout.
//!
//! A deliberately small formatting model:
//!
//! - block boxes stack vertically and take the full container width;
//! - inline content flows left to right and wraps before a word that does
//!   not fit on a non-empty line; whitespace runs collapse to one advance
//!   and never start a line;
//! - inline-block boxes are laid out at the container width, shrink to their
//!   content, and wrap as a unit;
//! - `br` ends the current line; `display: none` yields an empty box.
//!
//! Text is measured in display columns times a fixed advance. Geometry is
//! recomputed lazily whenever the document generation or the viewport width
//! changes.

use super::Layout;
use crate::dom::{Document, NodeData, NodeId};
use crate::geometry::Rect;
use crate::style::{Display, computed_display};
use crate::unicode::{WidthMethod, display_width_with_method};
use std::collections::HashMap;

const EPSILON: f32 = 0.01;

/// Measurement constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowMetrics {
    /// Advance per display column.
    pub advance: f32,
    /// Height of one line box.
    pub line_height: f32,
    pub width_method: WidthMethod,
}

impl Default for FlowMetrics {
    fn default() -> Self {
        Self {
            advance: 10.0,
            line_height: 20.0,
            width_method: WidthMethod::WcWidth,
        }
    }
}

struct LineCursor {
    left: f32,
    right: f32,
    x: f32,
    y: f32,
    line_height: f32,
    line_bottom: f32,
    max_x: f32,
    has_content: bool,
    after_space: bool,
}

impl LineCursor {
    fn new(left: f32, top: f32, width: f32, line_height: f32) -> Self {
        Self {
            left,
            right: left + width,
            x: left,
            y: top,
            line_height,
            line_bottom: top,
            max_x: left,
            has_content: false,
            after_space: false,
        }
    }

    fn break_line(&mut self) {
        self.y = self.line_bottom.max(self.y + self.line_height);
        self.x = self.left;
        self.line_bottom = self.y;
        self.has_content = false;
        self.after_space = false;
    }

    /// Place an atomic box, wrapping first if it overflows a non-empty line.
    fn place(&mut self, width: f32, height: f32) -> (f32, f32) {
        if self.has_content && self.x + width > self.right + EPSILON {
            self.break_line();
        }
        let at = (self.x, self.y);
        self.x += width;
        self.max_x = self.max_x.max(self.x);
        self.line_bottom = self.line_bottom.max(self.y + height);
        self.has_content = true;
        self.after_space = false;
        at
    }

    fn space(&mut self, advance: f32) -> Option<Rect> {
        if !self.has_content || self.after_space {
            return None;
        }
        let rect = Rect::new(self.x, self.y, advance, self.line_height);
        self.x += advance;
        self.after_space = true;
        Some(rect)
    }

    fn bottom(&self) -> f32 {
        if self.has_content {
            self.line_bottom.max(self.y)
        } else {
            self.y
        }
    }
}

/// Reference layout engine.
#[derive(Clone, Debug)]
pub struct FlowLayout {
    viewport_width: f32,
    metrics: FlowMetrics,
    rects: HashMap<NodeId, Rect>,
    generation: Option<u64>,
}

impl FlowLayout {
    /// Create a layout for a viewport of the given width.
    #[must_use]
    pub fn new(viewport_width: f32) -> Self {
        Self {
            viewport_width,
            metrics: FlowMetrics::default(),
            rects: HashMap::new(),
            generation: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: FlowMetrics) -> Self {
        self.metrics = metrics;
        self.generation = None;
        self
    }

    #[must_use]
    pub fn metrics(&self) -> FlowMetrics {
        self.metrics
    }

    #[must_use]
    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    /// Resize the viewport; cached geometry is discarded.
    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width;
        self.generation = None;
    }

    fn ensure(&mut self, doc: &Document) {
        if self.generation == Some(doc.generation()) {
            return;
        }
        self.rects.clear();
        let root = doc.root();
        self.layout_block(doc, root, 0.0, 0.0, self.viewport_width);
        self.generation = Some(doc.generation());
    }

    /// Lay out `node`'s children as a block; returns (used width, height).
    fn layout_block(
        &mut self,
        doc: &Document,
        node: NodeId,
        left: f32,
        top: f32,
        width: f32,
    ) -> (f32, f32) {
        let mut cursor = LineCursor::new(left, top, width, self.metrics.line_height);
        for &child in doc.children(node) {
            self.flow(doc, child, &mut cursor);
        }
        let height = cursor.bottom() - top;
        self.rects.insert(node, Rect::new(left, top, width, height));
        (cursor.max_x - left, height)
    }

    fn flow(&mut self, doc: &Document, node: NodeId, cursor: &mut LineCursor) {
        let Some(data) = doc.node(node).map(|n| n.data()) else {
            return;
        };
        if let NodeData::Text(text) = data {
            self.flow_text(node, text, cursor);
            return;
        }

        match computed_display(doc, node) {
            Display::None => {
                self.rects.insert(node, Rect::new(cursor.x, cursor.y, 0.0, 0.0));
            }
            Display::Block => {
                if cursor.has_content {
                    cursor.break_line();
                }
                let (_, height) =
                    self.layout_block(doc, node, cursor.left, cursor.y, cursor.right - cursor.left);
                cursor.y += height;
                cursor.line_bottom = cursor.y;
                cursor.x = cursor.left;
                cursor.has_content = false;
                cursor.after_space = false;
            }
            Display::Inline if doc.tag(node) == Some("br") => {
                self.rects.insert(
                    node,
                    Rect::new(cursor.x, cursor.y, 0.0, self.metrics.line_height),
                );
                cursor.break_line();
            }
            Display::Inline => {
                let start = Rect::new(cursor.x, cursor.y, 0.0, self.metrics.line_height);
                let mut rect = Rect::default();
                for &child in doc.children(node) {
                    self.flow(doc, child, cursor);
                    if let Some(child_rect) = self.rects.get(&child) {
                        rect = rect.union(child_rect);
                    }
                }
                self.rects.insert(node, if rect.is_empty() { start } else { rect });
            }
            Display::InlineBlock => {
                let available = cursor.right - cursor.left;
                let (width, height) = self.layout_block(doc, node, 0.0, 0.0, available);
                let (x, y) = cursor.place(width, height);
                for descendant in doc.descendants(node) {
                    if let Some(r) = self.rects.get_mut(&descendant) {
                        *r = r.offset(x, y);
                    }
                }
                self.rects.insert(node, Rect::new(x, y, width, height));
            }
        }
    }

    fn flow_text(&mut self, node: NodeId, text: &str, cursor: &mut LineCursor) {
        let advance = self.metrics.advance;
        let start = Rect::new(cursor.x, cursor.y, 0.0, 0.0);
        let mut rect = Rect::default();

        let mut rest = text;
        while !rest.is_empty() {
            let is_space = rest.starts_with(char::is_whitespace);
            let end = rest
                .find(|c: char| c.is_whitespace() != is_space)
                .unwrap_or(rest.len());
            let (piece, tail) = rest.split_at(end);
            rest = tail;

            if is_space {
                if let Some(space) = cursor.space(advance) {
                    rect = rect.union(&space);
                }
                continue;
            }
            let columns = display_width_with_method(piece, self.metrics.width_method);
            let width = columns as f32 * advance;
            let (x, y) = cursor.place(width, self.metrics.line_height);
            rect = rect.union(&Rect::new(x, y, width, self.metrics.line_height));
        }

        self.rects.insert(node, if rect.is_empty() { start } else { rect });
    }
}

impl Layout for FlowLayout {
    fn bounding_rect(&mut self, doc: &Document, node: NodeId) -> Rect {
        self.ensure(doc);
        self.rects.get(&node).copied().unwrap_or_default()
    }
}
