//! Special-token merging.
//!
//! Grapheme segmentation splits multi-character tokens such as ligature
//! sequences or emoticons (`"->"`, `":-)"`) into separate units. Configured
//! tokens are re-coalesced here so each one becomes a single character
//! wrapper.

use regex::Regex;

/// Multi-segment tokens merged back into one unit.
#[derive(Clone, Debug)]
pub enum SpecialChars {
    /// Literal tokens.
    Tokens(Vec<String>),
    /// Every distinct match of the pattern in the text is a token.
    Pattern(Regex),
}

impl SpecialChars {
    /// Literal token list.
    #[must_use]
    pub fn tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Tokens(tokens.into_iter().map(Into::into).collect())
    }

    /// Candidate tokens for `text`, longest first.
    fn candidates(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = match self {
            Self::Tokens(tokens) => tokens
                .iter()
                .filter(|t| !t.is_empty() && text.contains(t.as_str()))
                .cloned()
                .collect(),
            Self::Pattern(pattern) => pattern
                .find_iter(text)
                .map(|m| m.as_str().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
        };
        found.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        found.dedup();
        found
    }
}

/// Re-combine adjacent segments whose concatenation equals a special token.
///
/// Scans right to left so merges further right never disturb boundaries to
/// their left. At each position the longest token that is reproduced exactly
/// by whole consecutive segments wins; partial matches are never merged.
#[must_use]
pub fn merge_special(segments: Vec<String>, special: Option<&SpecialChars>) -> Vec<String> {
    let Some(special) = special else {
        return segments;
    };
    let candidates = special.candidates(&segments.concat());
    if candidates.is_empty() {
        return segments;
    }

    let mut segments = segments;
    for i in (0..segments.len()).rev() {
        for token in &candidates {
            let current = &segments[i];
            if token.len() <= current.len() || !token.starts_with(current.as_str()) {
                continue;
            }
            let mut combined = current.clone();
            let mut end = i;
            while combined.len() < token.len() && end + 1 < segments.len() {
                end += 1;
                combined.push_str(&segments[end]);
                if !token.starts_with(combined.as_str()) {
                    break;
                }
            }
            if end > i && combined == *token {
                segments[i] = combined;
                segments.drain(i + 1..=end);
                break;
            }
        }
    }
    segments
}
