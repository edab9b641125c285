//! End-to-end split/revert behaviour over the reference flow layout.

mod common;

use common::{ancestors, fixture, texts};
use textsplit::{
    AriaMode, Collection, Document, FlowLayout, Ignore, Selector, SpecialChars, SplitConfig,
    SplitType, TextSplit,
};

fn words_and_chars() -> SplitConfig {
    SplitConfig::default().with_type(SplitType::CHARS | SplitType::WORDS)
}

#[test]
fn test_hi_there_words_and_chars() {
    let (mut doc, mut layout, p) = fixture("<p>Hi there</p>", 600.0);
    let mut split = TextSplit::new(&doc, p, words_and_chars());
    split.split(&mut doc, &mut layout);

    assert!(split.is_split());
    assert_eq!(texts(&doc, split.words()), vec!["Hi", "there"]);
    let per_word: Vec<usize> = split
        .words()
        .iter()
        .map(|&w| {
            split
                .chars()
                .iter()
                .filter(|&&c| doc.parent(c) == Some(w))
                .count()
        })
        .collect();
    assert_eq!(per_word, vec![2, 5]);
    assert!(split.lines().is_empty());

    split.revert(&mut doc);
    assert!(!split.is_split());
    assert_eq!(doc.inner_html(p), "Hi there");
    assert_eq!(doc.attribute(p, "aria-label"), None);
    assert!(split.chars().is_empty());
    assert!(split.words().is_empty());
}

#[test]
fn test_word_markup_snapshot() {
    let (mut doc, mut layout, p) = fixture("<p>Hi there</p>", 600.0);
    let config = SplitConfig::default()
        .with_type(SplitType::WORDS)
        .with_tag("span");
    TextSplit::new(&doc, p, config).split(&mut doc, &mut layout);

    insta::assert_snapshot!(
        doc.outer_html(p),
        @r#"<p aria-label="Hi there"><span class="word" aria-hidden="true">Hi</span> <span class="word" aria-hidden="true">there</span></p>"#
    );
}

#[test]
fn test_numbered_classes_and_index_properties() {
    let (mut doc, mut layout, p) = fixture("<p>ab</p>", 600.0);
    let config = words_and_chars()
        .with_chars_class("char++")
        .with_prop_index(true)
        .with_aria(AriaMode::None);
    TextSplit::new(&doc, p, config).split(&mut doc, &mut layout);

    insta::assert_snapshot!(
        doc.inner_html(p),
        @r#"<div class="word" style="--word: 1; position: relative; display: inline-block;"><div class="char char1" style="--char: 1; position: relative; display: inline-block;">a</div><div class="char char2" style="--char: 2; position: relative; display: inline-block;">b</div></div>"#
    );
}

#[test]
fn test_lines_only_dissolves_word_scaffolding() {
    let (mut doc, mut layout, p) = fixture("<p>aa bb</p>", 600.0);
    let config = SplitConfig::default()
        .with_type(SplitType::LINES)
        .with_tag("span")
        .with_aria(AriaMode::None);
    let mut split = TextSplit::new(&doc, p, config);
    split.split(&mut doc, &mut layout);

    assert!(split.words().is_empty());
    assert_eq!(split.lines().len(), 1);
    insta::assert_snapshot!(
        doc.inner_html(p),
        @r#"<span class="line" style="text-align: left;">aa bb</span>"#
    );
}

#[test]
fn test_chars_only_keeps_words_unbreakable() {
    let (mut doc, mut layout, p) = fixture("<p>ab cd</p>", 600.0);
    let config = SplitConfig::default().with_type(SplitType::CHARS);
    let mut split = TextSplit::new(&doc, p, config);
    split.split(&mut doc, &mut layout);

    assert_eq!(split.chars().len(), 4);
    assert!(split.words().is_empty());
    let spans = doc.element_children(p);
    assert_eq!(spans.len(), 2);
    for span in spans {
        assert_eq!(doc.tag(span), Some("span"));
        assert_eq!(doc.style_property(span, "white-space"), Some("nowrap"));
    }
    assert_eq!(doc.text_content(p), "ab cd");
}

#[test]
fn test_every_char_sits_in_exactly_one_word() {
    let (mut doc, mut layout, p) = fixture(
        "<p>The <em>quick</em> brown <strong>fox <b>jumps</b></strong> over</p>",
        120.0,
    );
    let mut split = TextSplit::new(&doc, p, SplitConfig::default());
    split.split(&mut doc, &mut layout);

    for &c in split.chars() {
        let owners = ancestors(&doc, c)
            .into_iter()
            .filter(|a| split.words().contains(a))
            .count();
        assert_eq!(owners, 1, "char {c} has {owners} word ancestors");
    }
    for &w in split.words() {
        let joined: String = split
            .chars()
            .iter()
            .filter(|c| ancestors(&doc, **c).contains(&w))
            .map(|&c| doc.text_content(c))
            .collect();
        assert_eq!(joined, doc.text_content(w));
    }
    assert_eq!(
        texts(&doc, split.words()),
        vec!["The", "quick", "brown", "fox", "jumps", "over"]
    );
}

#[test]
fn test_ignored_subtree_keeps_identity() {
    let (mut doc, mut layout, p) = fixture("<p>Hel<em>l</em>o world</p>", 600.0);
    let em = doc.element_children(p)[0];
    let config = SplitConfig::default()
        .with_type(SplitType::WORDS)
        .with_ignore(Ignore::Selector(Selector::parse("em").unwrap()));
    let mut split = TextSplit::new(&doc, p, config);
    split.split(&mut doc, &mut layout);

    assert_eq!(texts(&doc, split.words()), vec!["Hello", "world"]);
    assert_eq!(doc.parent(em), Some(split.words()[0]));
    assert_eq!(doc.text_content(em), "l");

    split.revert(&mut doc);
    assert_eq!(doc.element_children(p), vec![em]);
    assert_eq!(doc.inner_html(p), "Hel<em>l</em>o world");
}

#[test]
fn test_ignore_by_node_list() {
    let (mut doc, mut layout, p) = fixture("<p>a <code>x = 1</code> b</p>", 600.0);
    let code = doc.element_children(p)[0];
    let config = SplitConfig::default()
        .with_type(SplitType::WORDS)
        .with_ignore(Ignore::Nodes(vec![code]));
    let mut split = TextSplit::new(&doc, p, config);
    split.split(&mut doc, &mut layout);

    // Preceded by a delimiter, so it stays where it was, unsplit.
    assert_eq!(doc.parent(code), Some(p));
    assert_eq!(doc.inner_html(code), "x = 1");
    assert_eq!(texts(&doc, split.words()), vec!["a", "b"]);
}

#[test]
fn test_leading_and_trailing_spaces_survive() {
    let (mut doc, mut layout, p) = fixture("<p> padded </p>", 600.0);
    let mut split = TextSplit::new(&doc, p, SplitConfig::default().with_type(SplitType::WORDS));
    split.split(&mut doc, &mut layout);
    assert_eq!(doc.text_content(p), " padded ");
    split.revert(&mut doc);
    assert_eq!(doc.inner_html(p), " padded ");
}

#[test]
fn test_special_tokens_stay_whole() {
    let (mut doc, mut layout, p) = fixture("<p>a-&gt;b</p>", 600.0);
    let config = words_and_chars().with_special_chars(SpecialChars::tokens(["->"]));
    let mut split = TextSplit::new(&doc, p, config);
    split.split(&mut doc, &mut layout);
    assert_eq!(texts(&doc, split.chars()), vec!["a", "->", "b"]);
}

#[test]
fn test_emoji_graphemes_are_single_chars() {
    let (mut doc, mut layout, p) = fixture("<p>ok\u{1F1FA}\u{1F1F8}\u{1F44D}\u{1F3FD}</p>", 600.0);
    let mut split = TextSplit::new(&doc, p, words_and_chars());
    split.split(&mut doc, &mut layout);
    assert_eq!(
        texts(&doc, split.chars()),
        vec!["o", "k", "\u{1F1FA}\u{1F1F8}", "\u{1F44D}\u{1F3FD}"]
    );
}

#[test]
fn test_lines_follow_rendered_wrapping() {
    // Ten columns per word plus a space: 3 words fit in 110 units.
    let (mut doc, mut layout, p) = fixture("<p>aaa bbb ccc ddd eee</p>", 110.0);
    let mut split = TextSplit::new(&doc, p, SplitConfig::default());
    split.split(&mut doc, &mut layout);

    let lines: Vec<String> = texts(&doc, split.lines())
        .into_iter()
        .map(|l| l.trim().to_string())
        .collect();
    assert_eq!(lines, vec!["aaa bbb ccc", "ddd eee"]);
    for &line in split.lines() {
        assert_eq!(doc.style_property(line, "display"), Some("block"));
        assert_eq!(doc.style_property(line, "text-align"), Some("left"));
    }
    split.revert(&mut doc);
    assert_eq!(doc.inner_html(p), "aaa bbb ccc ddd eee");
}

#[test]
fn test_lines_inherit_text_align_and_drop_breaks() {
    let (mut doc, mut layout, p) = fixture(
        r#"<p style="text-align: center">one<br>two</p>"#,
        600.0,
    );
    let mut split = TextSplit::new(&doc, p, SplitConfig::default());
    split.split(&mut doc, &mut layout);

    assert_eq!(texts(&doc, split.lines()), vec!["one", "two"]);
    assert!(
        doc.descendants(p)
            .into_iter()
            .all(|n| doc.tag(n) != Some("br"))
    );
    assert_eq!(
        doc.style_property(split.lines()[1], "text-align"),
        Some("center")
    );
    split.revert(&mut doc);
    assert_eq!(doc.inner_html(p), "one<br>two");
}

#[test]
fn test_smart_wrap_splits_inline_container() {
    let markup = "<p>aaa <em>bbb ccc</em></p>";

    let (mut doc, mut layout, p) = fixture(markup, 70.0);
    let em = doc.element_children(p)[0];
    let mut split = TextSplit::new(&doc, p, SplitConfig::default());
    split.split(&mut doc, &mut layout);

    let bbb = split.words()[1];
    let clone = doc.parent(bbb).unwrap();
    assert_eq!(doc.tag(clone), Some("em"));
    assert_ne!(clone, em);
    assert_eq!(doc.parent(split.words()[2]), Some(em));
    let lines: Vec<String> = texts(&doc, split.lines())
        .into_iter()
        .map(|l| l.trim().to_string())
        .collect();
    assert_eq!(lines, vec!["aaa bbb", "ccc"]);

    split.revert(&mut doc);
    assert_eq!(doc.element_children(p), vec![em]);
    assert_eq!(doc.inner_html(p), "aaa <em>bbb ccc</em>");

    // Without correction the emphasis wraps as one box.
    let (mut doc, mut layout, p) = fixture(markup, 70.0);
    let mut split = TextSplit::new(&doc, p, SplitConfig::default().with_smart_wrap(false));
    split.split(&mut doc, &mut layout);
    let lines: Vec<String> = texts(&doc, split.lines())
        .into_iter()
        .map(|l| l.trim().to_string())
        .collect();
    assert_eq!(lines, vec!["aaa", "bbb ccc"]);
}

#[test]
fn test_masks_wrap_each_member() {
    let (mut doc, mut layout, p) = fixture("<p>ab</p>", 600.0);
    let config = words_and_chars().with_mask(Collection::Chars);
    let mut split = TextSplit::new(&doc, p, config);
    split.split(&mut doc, &mut layout);

    assert_eq!(split.masks().len(), 2);
    for (&mask, &c) in split.masks().iter().zip(split.chars()) {
        assert_eq!(doc.parent(c), Some(mask));
        assert_eq!(doc.class_name(mask), "char-mask");
        assert_eq!(doc.style_property(mask, "overflow"), Some("clip"));
    }
    split.revert(&mut doc);
    assert!(split.masks().is_empty());
    assert_eq!(doc.inner_html(p), "ab");
}

#[test]
fn test_aria_modes() {
    let (mut doc, mut layout, p) = fixture(r#"<p aria-hidden="false">Hi</p>"#, 600.0);
    let mut split = TextSplit::new(&doc, p, SplitConfig::default().with_aria(AriaMode::Hidden));
    split.split(&mut doc, &mut layout);
    assert_eq!(doc.attribute(p, "aria-hidden"), Some("true"));
    assert_eq!(doc.attribute(p, "aria-label"), None);
    split.revert(&mut doc);
    assert_eq!(doc.attribute(p, "aria-hidden"), Some("false"));

    split.split_with(
        &mut doc,
        &mut layout,
        SplitConfig::default().with_aria(AriaMode::None),
    );
    assert_eq!(doc.attribute(p, "aria-label"), None);
    assert!(
        split
            .chars()
            .iter()
            .all(|&c| doc.attribute(c, "aria-hidden").is_none())
    );
}

#[test]
fn test_resplit_matches_fresh_split() {
    let markup = "<p>one <em>two three</em> four five six</p>";
    let (mut doc, mut layout, p) = fixture(markup, 90.0);
    let mut split = TextSplit::new(&doc, p, SplitConfig::default());

    split.split(&mut doc, &mut layout);
    let first = doc.inner_html(p);
    let first_counts = (split.chars().len(), split.words().len(), split.lines().len());

    split.split(&mut doc, &mut layout);
    assert_eq!(doc.inner_html(p), first);
    assert_eq!(
        (split.chars().len(), split.words().len(), split.lines().len()),
        first_counts
    );

    split.revert(&mut doc);
    split.split(&mut doc, &mut layout);
    assert_eq!(doc.inner_html(p), first);
}

#[test]
fn test_revert_frees_generated_nodes() {
    let (mut doc, mut layout, p) = fixture("<p>alpha beta <b>gamma</b></p>", 80.0);
    let live = doc.len();
    let mut split = TextSplit::new(&doc, p, SplitConfig::default());
    split.split(&mut doc, &mut layout);
    assert!(doc.len() > live);
    split.revert(&mut doc);
    assert_eq!(doc.len(), live);
}

#[test]
fn test_multiple_targets_by_selector() {
    let mut doc = Document::parse(r#"<h2 class="t">One two</h2><p>skip</p><h2 class="t">Three</h2>"#)
        .unwrap();
    let mut layout = FlowLayout::new(600.0);
    let mut split = TextSplit::new(&doc, "h2.t", SplitConfig::default().with_type(SplitType::WORDS));
    split.split(&mut doc, &mut layout);

    assert_eq!(split.targets().len(), 2);
    assert_eq!(texts(&doc, split.words()), vec!["One", "two", "Three"]);
    assert_eq!(split.original_html(split.targets()[1]), Some("Three"));
    let skipped = doc.element_children(doc.root())[1];
    assert_eq!(doc.inner_html(skipped), "skip");
}

#[test]
fn test_destroy_is_terminal() {
    let (mut doc, mut layout, p) = fixture("<p>a b</p>", 600.0);
    let mut split = TextSplit::new(&doc, p, SplitConfig::default());
    split.split(&mut doc, &mut layout);
    split.destroy(&mut doc);

    assert!(split.is_destroyed());
    assert_eq!(doc.inner_html(p), "a b");
    split.split(&mut doc, &mut layout);
    assert!(!split.is_split());
    assert_eq!(doc.inner_html(p), "a b");
}

#[test]
fn test_hooks_run_after_transitions() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    let splits = Arc::new(AtomicUsize::new(0));
    let reverts = Arc::new(AtomicUsize::new(0));
    let seen_words = Arc::new(AtomicUsize::new(0));
    let config = SplitConfig::default()
        .on_split({
            let splits = Arc::clone(&splits);
            let seen_words = Arc::clone(&seen_words);
            move |s: &TextSplit| {
                splits.fetch_add(1, Ordering::SeqCst);
                seen_words.store(s.words().len(), Ordering::SeqCst);
            }
        })
        .on_revert({
            let reverts = Arc::clone(&reverts);
            move |s: &TextSplit| {
                assert!(!s.is_split());
                reverts.fetch_add(1, Ordering::SeqCst);
            }
        });

    let (mut doc, mut layout, p) = fixture("<p>a b c</p>", 600.0);
    let mut split = TextSplit::new(&doc, p, config);
    split.split(&mut doc, &mut layout);
    split.split(&mut doc, &mut layout);
    split.revert(&mut doc);

    assert_eq!(splits.load(Ordering::SeqCst), 2);
    assert_eq!(reverts.load(Ordering::SeqCst), 2);
    assert_eq!(seen_words.load(Ordering::SeqCst), 3);
}
