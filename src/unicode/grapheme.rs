//! Grapheme cluster segmentation.
//!
//! Two strategies are available:
//!
//! - [`Segmenter::Unicode`]: extended grapheme clusters (UAX #29) via
//!   `unicode-segmentation`. This is the default.
//! - [`Segmenter::Pattern`]: a regular-expression approximation that groups
//!   regional-indicator pairs, emoji with an optional modifier, an optional
//!   `VS16` + keycap, or an optional tag sequence terminated by `CANCEL TAG`,
//!   joined by any number of zero-width-joiner continuations. Anything else
//!   falls through to a single code point, so combining marks on plain
//!   letters are split from their base (documented limitation).

use regex::Regex;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

/// Emoji unit: base emoji followed by a modifier, `VS16` (+ keycap), or a tag run.
const EMOJI_UNIT: &str = r"\p{Emoji}(?:\p{Emoji_Modifier}|\x{FE0F}\x{20E3}?|[\x{E0020}-\x{E007E}]+\x{E007F})?";

fn fallback_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let source = format!(
            r"\p{{Regional_Indicator}}\p{{Regional_Indicator}}|{EMOJI_UNIT}(?:\x{{200D}}{EMOJI_UNIT})*|(?s:.)"
        );
        Regex::new(&source).expect("fallback grapheme pattern is valid")
    })
}

/// Grapheme segmentation strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Segmenter {
    /// Full Unicode extended grapheme clusters.
    #[default]
    Unicode,
    /// Pattern-based approximation.
    Pattern,
}

impl Segmenter {
    /// Split text into user-perceived characters.
    ///
    /// Concatenating the result always reproduces `text`.
    #[must_use]
    pub fn segment<'a>(self, text: &'a str) -> Vec<&'a str> {
        match self {
            Self::Unicode => text.graphemes(true).collect(),
            Self::Pattern => fallback_pattern()
                .find_iter(text)
                .map(|m| m.as_str())
                .collect(),
        }
    }
}

/// Segment with the default strategy.
#[must_use]
pub fn segment(text: &str) -> Vec<&str> {
    Segmenter::default().segment(text)
}
