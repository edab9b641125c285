//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Once;
use textsplit::{Document, FlowLayout, LogLevel, NodeId, set_log_callback};
use tracing::Level;

static INIT: Once = Once::new();

/// Route crate logs through `tracing` into the test writer.
pub fn setup_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_test_writer()
            .try_init();
        set_log_callback(|level, message| match level {
            LogLevel::Debug => tracing::debug!(target: "textsplit", "{message}"),
            LogLevel::Info => tracing::info!(target: "textsplit", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "textsplit", "{message}"),
            LogLevel::Error => tracing::error!(target: "textsplit", "{message}"),
        });
    });
}

/// Parse markup and return the document, a layout, and the first top-level element.
pub fn fixture(markup: &str, width: f32) -> (Document, FlowLayout, NodeId) {
    setup_test_logging();
    let doc = Document::parse(markup).expect("fixture markup parses");
    let target = doc.element_children(doc.root())[0];
    (doc, FlowLayout::new(width), target)
}

/// Text content of each node.
pub fn texts(doc: &Document, nodes: &[NodeId]) -> Vec<String> {
    nodes.iter().map(|&n| doc.text_content(n)).collect()
}

/// Ancestors of `node` up to (excluding) the root.
pub fn ancestors(doc: &Document, node: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut current = doc.parent(node);
    while let Some(id) = current {
        out.push(id);
        current = doc.parent(id);
    }
    out
}
