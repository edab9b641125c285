//! `textsplit` - reversible text splitting
//!
//! Decomposes the text of document elements into per-character, per-word,
//! and per-line wrapper nodes for animation, keeping layout, accessibility
//! attributes, and the original tree restorable.
//!
//! The crate ships its own arena document ([`Document`]) and asks a
//! [`Layout`] implementation for rendered geometry. [`FlowLayout`] is a
//! deterministic reference engine.
//!
//! ```
//! use textsplit::{Document, FlowLayout, SplitConfig, TextSplit};
//!
//! let mut doc = Document::parse("<h1>Split me up</h1>").unwrap();
//! let mut layout = FlowLayout::new(600.0);
//! let mut split = TextSplit::new(&doc, "h1", SplitConfig::default());
//!
//! split.split(&mut doc, &mut layout);
//! assert_eq!(split.words().len(), 3);
//! assert_eq!(split.lines().len(), 1);
//! ```

// Crate-level lint configuration
#![forbid(unsafe_code)]
#![allow(clippy::cast_possible_truncation)] // Intentional layout unit casts
#![allow(clippy::cast_precision_loss)] // Column counts fit in f32
#![allow(clippy::module_name_repetitions)] // Allow split::SplitConfig etc
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::needless_pass_by_value)] // Allow pass by value for small Copy types
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine
#![allow(clippy::needless_collect)] // Collect for assertions is clear

pub mod dom;
pub mod error;
pub mod event;
pub mod geometry;
pub mod layout;
pub mod registry;
pub mod split;
pub mod style;
pub mod unicode;

// Re-export core types at crate root
pub use dom::{Document, ElementData, Node, NodeData, NodeId, Selector};
pub use error::{Error, Result};
pub use event::{
    EVENT_REVERT, EVENT_SPLIT, LogLevel, SessionEvent, SplitCounts, clear_event_callback,
    emit_event, emit_log, set_event_callback, set_log_callback,
};
pub use geometry::{LINE_TOLERANCE, Rect};
pub use layout::{FlowLayout, FlowMetrics, Layout};
pub use registry::SplitRegistry;
pub use style::Display;

// Re-export the split engine
pub use split::{
    AriaMode, Collection, Delimiter, Ignore, RESIZE_DEBOUNCE, ResizeSignal, SplitConfig,
    SplitState, SplitType, Targets, TextSplit, WrapperKind, detect_lines,
};
pub use unicode::{Segmenter, SpecialChars, WidthMethod, merge_special, segment};
