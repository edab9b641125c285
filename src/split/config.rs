//! Split configuration.
//!
//! [`SplitConfig`] mirrors the attribute-style option set: plain fields with
//! defaults, `#[must_use]` builder methods, and parse helpers for the string
//! forms (`"chars, words"`, `"hidden"`, `"lines"`).

use super::TextSplit;
use crate::dom::{Document, NodeId, Selector};
use crate::unicode::{Segmenter, SpecialChars};
use bitflags::bitflags;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

bitflags! {
    /// Wrapper levels to produce.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SplitType: u8 {
        const CHARS = 0x01;
        const WORDS = 0x02;
        const LINES = 0x04;
    }
}

impl SplitType {
    /// Parse a comma-separated list such as `"chars, words"`.
    ///
    /// Unknown names are ignored, so an unrecognized list yields an empty set.
    #[must_use]
    pub fn parse(list: &str) -> Self {
        list.split(',')
            .map(str::trim)
            .fold(Self::empty(), |acc, name| match name {
                "chars" => acc | Self::CHARS,
                "words" => acc | Self::WORDS,
                "lines" => acc | Self::LINES,
                _ => acc,
            })
    }
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (Self::CHARS, "chars"),
            (Self::WORDS, "words"),
            (Self::LINES, "lines"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect();
        f.write_str(&names.join(","))
    }
}

/// Accessibility handling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AriaMode {
    /// Label the target with its original text; wrappers are decorative.
    #[default]
    Auto,
    /// Hide the target and wrappers from assistive technology.
    Hidden,
    /// Leave accessibility attributes untouched.
    None,
}

impl AriaMode {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "hidden" => Some(Self::Hidden),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// Named output collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Chars,
    Words,
    Lines,
}

impl Collection {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "chars" => Some(Self::Chars),
            "words" => Some(Self::Words),
            "lines" => Some(Self::Lines),
            _ => None,
        }
    }
}

/// A run of text produced by word tokenization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Piece<'a> {
    Word(&'a str),
    Delimiter(&'a str),
}

/// Word delimiter.
#[derive(Clone, Debug)]
pub enum Delimiter {
    Literal(String),
    Pattern(Regex),
}

impl Default for Delimiter {
    fn default() -> Self {
        Self::Literal(" ".to_string())
    }
}

impl Delimiter {
    /// Literal delimiter text, if this is a literal delimiter.
    #[must_use]
    pub fn literal(&self) -> Option<&str> {
        match self {
            Self::Literal(s) if !s.is_empty() => Some(s),
            Self::Literal(_) => Some(" "),
            Self::Pattern(_) => None,
        }
    }

    /// Split text into alternating words and delimiter runs, losslessly.
    pub(crate) fn tokenize<'a>(&self, text: &'a str) -> Vec<Piece<'a>> {
        let spans: Vec<(usize, usize)> = match self {
            Self::Pattern(pattern) => pattern
                .find_iter(text)
                .filter(|m| !m.is_empty())
                .map(|m| (m.start(), m.end()))
                .collect(),
            Self::Literal(_) => {
                let literal = self.literal().unwrap_or(" ");
                text.match_indices(literal)
                    .map(|(start, m)| (start, start + m.len()))
                    .collect()
            }
        };

        let mut pieces = Vec::with_capacity(spans.len() * 2 + 1);
        let mut last = 0;
        for (start, end) in spans {
            if start > last {
                pieces.push(Piece::Word(&text[last..start]));
            }
            pieces.push(Piece::Delimiter(&text[start..end]));
            last = end;
        }
        if last < text.len() {
            pieces.push(Piece::Word(&text[last..]));
        }
        pieces
    }
}

/// Subtrees excluded from splitting.
#[derive(Clone, Debug)]
pub enum Ignore {
    Nodes(Vec<NodeId>),
    Selector(Selector),
}

impl Ignore {
    /// Resolve to concrete elements under the given targets.
    pub(crate) fn resolve(&self, doc: &Document, targets: &[NodeId]) -> Vec<NodeId> {
        match self {
            Self::Nodes(nodes) => nodes.iter().copied().filter(|&n| doc.is_element(n)).collect(),
            Self::Selector(selector) => targets
                .iter()
                .flat_map(|&t| doc.query_selector_all(t, selector))
                .collect(),
        }
    }
}

/// Hook invoked after a split or revert.
pub type SplitHook = Arc<dyn Fn(&TextSplit) + Send + Sync>;

/// Text rewrite applied to every text run before splitting.
pub type PrepareText = Arc<dyn Fn(&str, NodeId) -> String + Send + Sync>;

/// Resolved option set for a split pass.
#[derive(Clone)]
#[allow(clippy::struct_excessive_bools)] // Mirrors the flat option set
pub struct SplitConfig {
    pub split_type: SplitType,
    /// Base class per wrapper kind; a `++` suffix adds a numbered class.
    pub chars_class: String,
    pub words_class: String,
    pub lines_class: String,
    /// Wrapper tag. `span` wrappers get no inline layout styles.
    pub tag: String,
    pub aria: AriaMode,
    /// Expose the 1-based ordinal as a `--char`/`--word`/`--line` style property.
    pub prop_index: bool,
    pub smart_wrap: bool,
    pub reduce_white_space: bool,
    pub word_delimiter: Delimiter,
    pub special_chars: Option<SpecialChars>,
    /// Smart-wrap correction only runs when this is also set.
    pub deep_slice: bool,
    pub auto_split: bool,
    pub ignore: Option<Ignore>,
    pub mask: Option<Collection>,
    pub segmenter: Segmenter,
    pub prepare_text: Option<PrepareText>,
    pub on_split: Option<SplitHook>,
    pub on_revert: Option<SplitHook>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            split_type: SplitType::all(),
            chars_class: "char".to_string(),
            words_class: "word".to_string(),
            lines_class: "line".to_string(),
            tag: "div".to_string(),
            aria: AriaMode::Auto,
            prop_index: false,
            smart_wrap: true,
            reduce_white_space: true,
            word_delimiter: Delimiter::default(),
            special_chars: None,
            deep_slice: true,
            auto_split: false,
            ignore: None,
            mask: None,
            segmenter: Segmenter::Unicode,
            prepare_text: None,
            on_split: None,
            on_revert: None,
        }
    }
}

impl fmt::Debug for SplitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitConfig")
            .field("split_type", &self.split_type)
            .field("chars_class", &self.chars_class)
            .field("words_class", &self.words_class)
            .field("lines_class", &self.lines_class)
            .field("tag", &self.tag)
            .field("aria", &self.aria)
            .field("prop_index", &self.prop_index)
            .field("smart_wrap", &self.smart_wrap)
            .field("reduce_white_space", &self.reduce_white_space)
            .field("word_delimiter", &self.word_delimiter)
            .field("special_chars", &self.special_chars)
            .field("deep_slice", &self.deep_slice)
            .field("auto_split", &self.auto_split)
            .field("ignore", &self.ignore)
            .field("mask", &self.mask)
            .field("segmenter", &self.segmenter)
            .finish_non_exhaustive()
    }
}

impl SplitConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_type(mut self, split_type: SplitType) -> Self {
        self.split_type = split_type;
        self
    }

    #[must_use]
    pub fn with_chars_class(mut self, class: impl Into<String>) -> Self {
        self.chars_class = class.into();
        self
    }

    #[must_use]
    pub fn with_words_class(mut self, class: impl Into<String>) -> Self {
        self.words_class = class.into();
        self
    }

    #[must_use]
    pub fn with_lines_class(mut self, class: impl Into<String>) -> Self {
        self.lines_class = class.into();
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    #[must_use]
    pub fn with_aria(mut self, aria: AriaMode) -> Self {
        self.aria = aria;
        self
    }

    #[must_use]
    pub fn with_prop_index(mut self, enabled: bool) -> Self {
        self.prop_index = enabled;
        self
    }

    #[must_use]
    pub fn with_smart_wrap(mut self, enabled: bool) -> Self {
        self.smart_wrap = enabled;
        self
    }

    #[must_use]
    pub fn with_reduce_white_space(mut self, enabled: bool) -> Self {
        self.reduce_white_space = enabled;
        self
    }

    #[must_use]
    pub fn with_word_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.word_delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_special_chars(mut self, special: SpecialChars) -> Self {
        self.special_chars = Some(special);
        self
    }

    #[must_use]
    pub fn with_deep_slice(mut self, enabled: bool) -> Self {
        self.deep_slice = enabled;
        self
    }

    #[must_use]
    pub fn with_auto_split(mut self, enabled: bool) -> Self {
        self.auto_split = enabled;
        self
    }

    #[must_use]
    pub fn with_ignore(mut self, ignore: Ignore) -> Self {
        self.ignore = Some(ignore);
        self
    }

    #[must_use]
    pub fn with_mask(mut self, collection: Collection) -> Self {
        self.mask = Some(collection);
        self
    }

    #[must_use]
    pub fn with_segmenter(mut self, segmenter: Segmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    #[must_use]
    pub fn with_prepare_text<F>(mut self, prepare: F) -> Self
    where
        F: Fn(&str, NodeId) -> String + Send + Sync + 'static,
    {
        self.prepare_text = Some(Arc::new(prepare));
        self
    }

    #[must_use]
    pub fn on_split<F>(mut self, hook: F) -> Self
    where
        F: Fn(&TextSplit) + Send + Sync + 'static,
    {
        self.on_split = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn on_revert<F>(mut self, hook: F) -> Self
    where
        F: Fn(&TextSplit) + Send + Sync + 'static,
    {
        self.on_revert = Some(Arc::new(hook));
        self
    }
}
