//! Fuzz target for selector parsing and matching.

#![no_main]

use libfuzzer_sys::fuzz_target;
use textsplit::{Document, Selector};

const MARKUP: &str = r#"<div id="a" class="x y"><p class="x">one <em>two</em></p><span>three</span></div>"#;

fuzz_target!(|data: &str| {
    let Ok(selector) = Selector::parse(data) else {
        return;
    };
    let doc = Document::parse(MARKUP).expect("fixture parses");
    for id in doc.query_selector_all(doc.root(), &selector) {
        assert!(doc.is_element(id));
    }
});
