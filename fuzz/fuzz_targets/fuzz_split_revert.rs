//! Fuzz target for split followed by revert.
//!
//! Whatever the configuration, reverting must restore the original markup
//! and free every node the split created.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use textsplit::{Document, FlowLayout, SplitConfig, SplitType, TextSplit};

#[derive(Arbitrary, Debug)]
struct Input {
    markup: String,
    split_type: u8,
    smart_wrap: bool,
    reduce_white_space: bool,
    width: u16,
}

fuzz_target!(|input: Input| {
    let Ok(mut doc) = Document::parse(&input.markup) else {
        return;
    };
    let targets = doc.element_children(doc.root());
    if targets.is_empty() {
        return;
    }
    let before = doc.inner_html(doc.root());
    let live = doc.len();

    let mut layout = FlowLayout::new(f32::from(input.width.max(1)));
    let config = SplitConfig::default()
        .with_type(SplitType::from_bits_truncate(input.split_type))
        .with_smart_wrap(input.smart_wrap)
        .with_reduce_white_space(input.reduce_white_space);
    let mut split = TextSplit::new(&doc, targets, config);
    split.split(&mut doc, &mut layout);
    split.revert(&mut doc);

    assert_eq!(doc.inner_html(doc.root()), before);
    assert_eq!(doc.len(), live);
});
