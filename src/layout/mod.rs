//! Geometry provider interface.
//!
//! The splitter never computes geometry itself. Smart-wrap correction and
//! line detection ask a [`Layout`] for rendered boxes, and every query must
//! reflect all tree mutations made before it (layout is "committed" at the
//! point of the query). [`FlowLayout`] is a deterministic reference engine;
//! hosts embedding a real renderer implement the trait over their own
//! layout tree.

mod flow;

pub use flow::{FlowLayout, FlowMetrics};

use crate::dom::{Document, NodeId};
use crate::geometry::Rect;
use crate::style::{Display, computed_display, computed_text_align, computed_white_space};

/// Rendered geometry and computed style for document nodes.
pub trait Layout {
    /// Border box of `node` after all mutations so far.
    fn bounding_rect(&mut self, doc: &Document, node: NodeId) -> Rect;

    /// Computed outer display type.
    fn display(&mut self, doc: &Document, node: NodeId) -> Display {
        computed_display(doc, node)
    }

    /// Computed `text-align`.
    fn text_align(&mut self, doc: &Document, node: NodeId) -> String {
        computed_text_align(doc, node)
    }

    /// Computed `white-space`.
    fn white_space(&mut self, doc: &Document, node: NodeId) -> String {
        computed_white_space(doc, node)
    }

    /// Rendered width, used to decide whether a resize needs a re-split.
    fn offset_width(&mut self, doc: &Document, node: NodeId) -> f32 {
        self.bounding_rect(doc, node).width
    }
}

impl<L: Layout + ?Sized> Layout for &mut L {
    fn bounding_rect(&mut self, doc: &Document, node: NodeId) -> Rect {
        (**self).bounding_rect(doc, node)
    }

    fn display(&mut self, doc: &Document, node: NodeId) -> Display {
        (**self).display(doc, node)
    }

    fn text_align(&mut self, doc: &Document, node: NodeId) -> String {
        (**self).text_align(doc, node)
    }

    fn white_space(&mut self, doc: &Document, node: NodeId) -> String {
        (**self).white_space(doc, node)
    }

    fn offset_width(&mut self, doc: &Document, node: NodeId) -> f32 {
        (**self).offset_width(doc, node)
    }
}
