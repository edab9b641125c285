//! Wrapper node factory.

use super::config::AriaMode;
use super::process::Pass;
use crate::dom::NodeId;
use crate::error::Result;
use crate::layout::Layout;

/// Kind of generated wrapper.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WrapperKind {
    Char,
    Word,
    Line,
}

impl WrapperKind {
    /// Name used for the fallback class and the index style property.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::Word => "word",
            Self::Line => "line",
        }
    }
}

/// Class attribute for a wrapper with 1-based `index`.
///
/// A `++` marker in the base requests an extra numbered class:
/// `"char++"` at index 3 yields `"char char3"`.
pub(crate) fn wrapper_class(base: &str, kind: WrapperKind, index: usize) -> String {
    let base = if base.is_empty() { kind.name() } else { base };
    if base.contains("++") {
        let name = base.replace("++", "");
        format!("{name} {name}{index}")
    } else {
        base.to_string()
    }
}

impl<L: Layout + ?Sized> Pass<'_, L> {
    /// Create a wrapper and append it to its collection.
    ///
    /// The node is returned detached; the caller inserts it.
    pub(crate) fn make(&mut self, kind: WrapperKind, content: &str) -> Result<NodeId> {
        let config = self.config;
        let index = self.out.by_kind(kind).len() + 1;

        let base = match kind {
            WrapperKind::Char => &config.chars_class,
            WrapperKind::Word => &config.words_class,
            WrapperKind::Line => &config.lines_class,
        };
        let element = self.create_element(&config.tag);
        self.doc
            .set_class_name(element, &wrapper_class(base, kind, index))?;
        if config.prop_index {
            self.doc.set_style_property(
                element,
                &format!("--{}", kind.name()),
                &index.to_string(),
            )?;
        }
        if config.aria != AriaMode::None {
            self.doc.set_attribute(element, "aria-hidden", "true")?;
        }
        if config.tag != "span" {
            let display = if kind == WrapperKind::Line {
                "block"
            } else {
                "inline-block"
            };
            self.doc.set_style_property(element, "position", "relative")?;
            self.doc.set_style_property(element, "display", display)?;
        }
        if !content.is_empty() {
            let text = self.create_text(content);
            self.doc.append_child(element, text)?;
        }

        self.out.by_kind_mut(kind).push(element);
        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapper_class_plain_and_numbered() {
        assert_eq!(wrapper_class("word", WrapperKind::Word, 4), "word");
        assert_eq!(wrapper_class("char++", WrapperKind::Char, 3), "char char3");
        assert_eq!(wrapper_class("", WrapperKind::Line, 1), "line");
    }
}
