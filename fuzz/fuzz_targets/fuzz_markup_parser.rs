//! Fuzz target for the markup fragment parser.
//!
//! Arbitrary strings always parse. Serializing and parsing again must not
//! panic either.

#![no_main]

use libfuzzer_sys::fuzz_target;
use textsplit::Document;

fuzz_target!(|data: &str| {
    let doc = Document::parse(data).expect("parser recovers from any input");
    let html = doc.inner_html(doc.root());
    let _ = Document::parse(&html);
    let _ = doc.text_content(doc.root());
});
