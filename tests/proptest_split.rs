//! Property-based tests for segmentation and split/revert.

use proptest::prelude::*;
use textsplit::{
    Document, FlowLayout, Segmenter, SpecialChars, SplitConfig, SplitType, TextSplit,
    merge_special,
};

// ============================================================================
// Strategies
// ============================================================================

fn utf8_string() -> impl Strategy<Value = String> {
    "\\PC{0,60}"
}

/// Strings mixing ASCII, combining marks, flags, and emoji sequences.
fn mixed_string() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "a", "Z", " ", "e\u{301}", "\u{1F1EF}\u{1F1F5}", "\u{1F44B}\u{1F3FF}",
            "\u{1F469}\u{200D}\u{1F4BB}", "1\u{FE0F}\u{20E3}", "->", "\u{6F22}",
        ]),
        0..24,
    )
    .prop_map(|parts| parts.concat())
}

fn words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,7}", 1..10)
}

/// Fragments of plain text, some wrapped in inline markup.
fn fragment() -> impl Strategy<Value = String> {
    prop::collection::vec(
        ("[a-z]{1,5}( [a-z]{1,5}){0,3}", 0..4usize),
        1..6,
    )
    .prop_map(|parts| {
        parts
            .into_iter()
            .map(|(text, kind)| match kind {
                0 => format!("<em>{text}</em> "),
                1 => format!("<b>{text}</b>"),
                2 => format!("{text}<br>"),
                _ => format!("{text} "),
            })
            .collect()
    })
}

fn split_type() -> impl Strategy<Value = SplitType> {
    (1u8..8).prop_map(SplitType::from_bits_truncate)
}

// ============================================================================
// Segmentation Properties
// ============================================================================

proptest! {
    #[test]
    fn segmentation_is_lossless(s in utf8_string()) {
        for segmenter in [Segmenter::Unicode, Segmenter::Pattern] {
            let joined: String = segmenter.segment(&s).concat();
            prop_assert_eq!(&joined, &s);
        }
    }

    #[test]
    fn pattern_segmenter_never_splits_known_clusters(s in mixed_string()) {
        let units = Segmenter::Pattern.segment(&s);
        for unit in &units {
            prop_assert!(!unit.is_empty());
            prop_assert!(!unit.starts_with('\u{200D}'), "unit starts with ZWJ: {:?}", unit);
            prop_assert!(!unit.starts_with('\u{1F3FF}'), "unit starts with skin-tone modifier: {:?}", unit);
        }
    }

    #[test]
    fn merge_is_lossless(s in mixed_string()) {
        let segments: Vec<String> =
            Segmenter::Unicode.segment(&s).into_iter().map(str::to_string).collect();
        let special = SpecialChars::tokens(["->", "aZ", "e\u{301}a"]);
        let merged = merge_special(segments.clone(), Some(&special));
        prop_assert_eq!(merged.concat(), s);
        prop_assert!(merged.len() <= segments.len());
    }

    #[test]
    fn merge_without_tokens_is_identity(s in mixed_string()) {
        let segments: Vec<String> =
            Segmenter::Unicode.segment(&s).into_iter().map(str::to_string).collect();
        prop_assert_eq!(merge_special(segments.clone(), None), segments);
    }
}

// ============================================================================
// Split Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn words_round_trip(words in words(), width in 40.0f32..400.0) {
        let markup = format!("<p>{}</p>", words.join(" "));
        let mut doc = Document::parse(&markup).unwrap();
        let p = doc.element_children(doc.root())[0];
        let mut layout = FlowLayout::new(width);

        let config = SplitConfig::default().with_type(SplitType::CHARS | SplitType::WORDS);
        let mut split = TextSplit::new(&doc, p, config);
        split.split(&mut doc, &mut layout);

        let produced: Vec<String> = split.words().iter().map(|&w| doc.text_content(w)).collect();
        prop_assert_eq!(&produced, &words);
        let char_count: usize = words.iter().map(|w| w.len()).sum();
        prop_assert_eq!(split.chars().len(), char_count);

        split.revert(&mut doc);
        prop_assert_eq!(doc.outer_html(p), markup);
    }

    #[test]
    fn split_then_revert_is_identity(
        body in fragment(),
        split_type in split_type(),
        smart_wrap in any::<bool>(),
        width in 30.0f32..300.0,
    ) {
        let markup = format!("<div>{body}</div>");
        let mut doc = Document::parse(&markup).unwrap();
        let target = doc.element_children(doc.root())[0];
        let before = doc.outer_html(target);
        let live = doc.len();
        let mut layout = FlowLayout::new(width);

        let config = SplitConfig::default()
            .with_type(split_type)
            .with_smart_wrap(smart_wrap);
        let mut split = TextSplit::new(&doc, target, config);
        split.split(&mut doc, &mut layout);
        prop_assert!(split.errors().is_empty());
        prop_assert_eq!(doc.text_content(target).replace(' ', ""), body_text(&body));

        split.split(&mut doc, &mut layout);
        split.revert(&mut doc);
        prop_assert_eq!(doc.outer_html(target), before);
        prop_assert_eq!(doc.len(), live);
    }
}

/// Text of a generated fragment without markup or spaces.
fn body_text(body: &str) -> String {
    let doc = Document::parse(body).unwrap();
    doc.text_content(doc.root()).replace(' ', "")
}
