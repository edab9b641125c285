//! Computed style resolution.
//!
//! Only the properties the splitter depends on are resolved:
//!
//! - [`Display`]: inline `display` style, else the tag's default
//! - `text-align`: inherited, default `left`
//! - `white-space`: inherited, default `normal`

use crate::dom::{Document, NodeId};

/// Tags laid out as blocks when no inline `display` is set.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "ul",
];

/// Outer display type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Display {
    #[default]
    Inline,
    InlineBlock,
    Block,
    None,
}

impl Display {
    /// Parse a CSS `display` value. Unrecognized values resolve to `Inline`.
    #[must_use]
    pub fn from_css(value: &str) -> Self {
        match value.trim() {
            "inline" | "contents" => Self::Inline,
            "inline-block" | "inline-flex" | "inline-grid" | "inline-table" => Self::InlineBlock,
            "none" => Self::None,
            "block" | "flex" | "grid" | "table" | "list-item" | "flow-root" => Self::Block,
            _ => Self::Inline,
        }
    }

    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::InlineBlock => "inline-block",
            Self::Block => "block",
            Self::None => "none",
        }
    }
}

/// Resolve an element's display type. Text nodes are inline.
#[must_use]
pub fn computed_display(doc: &Document, node: NodeId) -> Display {
    if let Some(value) = doc.style_property(node, "display") {
        return Display::from_css(value);
    }
    match doc.tag(node) {
        Some(tag) if BLOCK_TAGS.contains(&tag) => Display::Block,
        _ => Display::Inline,
    }
}

fn inherited<'a>(doc: &'a Document, node: NodeId, property: &str) -> Option<&'a str> {
    let mut current = Some(node);
    while let Some(id) = current {
        if let Some(value) = doc.style_property(id, property) {
            return Some(value);
        }
        current = doc.parent(id);
    }
    None
}

/// Resolved `text-align`.
#[must_use]
pub fn computed_text_align(doc: &Document, node: NodeId) -> String {
    inherited(doc, node, "text-align").unwrap_or("left").to_string()
}

/// Resolved `white-space`.
#[must_use]
pub fn computed_white_space(doc: &Document, node: NodeId) -> String {
    inherited(doc, node, "white-space").unwrap_or("normal").to_string()
}
