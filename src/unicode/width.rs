//! Display width of text, in columns.
//!
//! Used by the reference flow layout to measure words.

use unicode_width::UnicodeWidthStr;

/// Width calculation method for ambiguous-width characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WidthMethod {
    /// POSIX-like wcwidth: ambiguous width = 1.
    #[default]
    WcWidth,
    /// Unicode East Asian Width: ambiguous width = 2.
    Unicode,
}

/// Display width of a string using the default method.
#[must_use]
pub fn display_width(s: &str) -> usize {
    display_width_with_method(s, WidthMethod::default())
}

/// Display width of a string using a specific method.
#[must_use]
pub fn display_width_with_method(s: &str, method: WidthMethod) -> usize {
    // Fast path: printable ASCII is one column per byte.
    if s.bytes().all(|b| (0x20..0x7F).contains(&b)) {
        return s.len();
    }
    match method {
        WidthMethod::WcWidth => UnicodeWidthStr::width(s),
        WidthMethod::Unicode => UnicodeWidthStr::width_cjk(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn test_cjk_width() {
        assert_eq!(display_width("\u{6F22}\u{5B57}"), 4);
    }

    #[test]
    fn test_combining_is_zero_width() {
        assert_eq!(display_width("e\u{0301}"), 1);
    }

    #[test]
    fn test_width_methods() {
        // Circled digit one is ambiguous width.
        let s = "\u{2460}";
        assert_eq!(display_width_with_method(s, WidthMethod::WcWidth), 1);
        assert_eq!(display_width_with_method(s, WidthMethod::Unicode), 2);
    }
}
