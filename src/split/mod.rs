//! Split sessions.
//!
//! A [`TextSplit`] owns the restructuring of a fixed set of target elements:
//! it snapshots them, runs the tree processor and line detector over each
//! one, exposes the produced wrappers, and restores the originals on revert.
//!
//! Public entry points never return errors. Failures are logged through
//! [`emit_log`](crate::event::emit_log) and kept in [`TextSplit::errors`];
//! a failing target is rolled back while its siblings are still split.
//!
//! # Examples
//!
//! ```
//! use textsplit::{Document, FlowLayout, SplitConfig, SplitType, TextSplit};
//!
//! let mut doc = Document::parse("<p>Hi there</p>").unwrap();
//! let mut layout = FlowLayout::new(400.0);
//! let p = doc.element_children(doc.root())[0];
//!
//! let config = SplitConfig::default().with_type(SplitType::CHARS | SplitType::WORDS);
//! let mut split = TextSplit::new(&doc, p, config);
//! split.split(&mut doc, &mut layout);
//! assert_eq!(split.words().len(), 2);
//! assert_eq!(split.chars().len(), 7);
//!
//! split.revert(&mut doc);
//! assert_eq!(doc.inner_html(p), "Hi there");
//! ```

mod config;
mod factory;
mod lines;
mod process;
mod resize;
mod snapshot;

pub use config::{
    AriaMode, Collection, Delimiter, Ignore, PrepareText, SplitConfig, SplitHook, SplitType,
};
pub use factory::WrapperKind;
pub use lines::detect_lines;
pub use resize::{RESIZE_DEBOUNCE, ResizeSignal};

use crate::dom::{Document, NodeId, Selector};
use crate::error::{Error, Result};
use crate::event::{LogLevel, SessionEvent, SplitCounts, emit_log};
use crate::layout::Layout;
use process::Pass;
use resize::ResizeBinding;
use snapshot::TargetSnapshot;
use std::time::Instant;

/// Elements a session splits.
#[derive(Clone, Debug)]
pub enum Targets {
    /// Every element under the document root matching a selector.
    Selector(String),
    Nodes(Vec<NodeId>),
}

impl From<&str> for Targets {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<String> for Targets {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<NodeId> for Targets {
    fn from(node: NodeId) -> Self {
        Self::Nodes(vec![node])
    }
}

impl From<Vec<NodeId>> for Targets {
    fn from(nodes: Vec<NodeId>) -> Self {
        Self::Nodes(nodes)
    }
}

impl From<&[NodeId]> for Targets {
    fn from(nodes: &[NodeId]) -> Self {
        Self::Nodes(nodes.to_vec())
    }
}

impl Targets {
    /// Resolve to live elements in order, without duplicates or nesting.
    fn resolve(&self, doc: &Document) -> Result<Vec<NodeId>> {
        let candidates = match self {
            Self::Selector(source) => {
                let selector = Selector::parse(source)?;
                doc.query_selector_all(doc.root(), &selector)
            }
            Self::Nodes(nodes) => nodes.clone(),
        };

        let mut resolved: Vec<NodeId> = Vec::with_capacity(candidates.len());
        for node in candidates {
            if doc.is_element(node) && !resolved.contains(&node) {
                resolved.push(node);
            }
        }
        // A target nested in another would be processed twice.
        let outer = resolved.clone();
        resolved.retain(|&node| {
            !outer
                .iter()
                .any(|&other| other != node && doc.contains(other, node))
        });

        if resolved.is_empty() {
            return Err(Error::Selection(self.describe()));
        }
        Ok(resolved)
    }

    fn describe(&self) -> String {
        match self {
            Self::Selector(source) => format!("selector `{source}` matched no elements"),
            Self::Nodes(nodes) => format!("none of {} node(s) is a live element", nodes.len()),
        }
    }
}

/// Session lifecycle state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SplitState {
    #[default]
    Unsplit,
    Split,
}

/// Collection lengths at a point in time.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Marks {
    chars: usize,
    words: usize,
    lines: usize,
    masks: usize,
    created: usize,
}

impl Marks {
    fn get(self, collection: Collection) -> usize {
        match collection {
            Collection::Chars => self.chars,
            Collection::Words => self.words,
            Collection::Lines => self.lines,
        }
    }
}

/// Output of the current split pass, in creation order.
#[derive(Clone, Debug, Default)]
pub(crate) struct Collections {
    pub(crate) chars: Vec<NodeId>,
    pub(crate) words: Vec<NodeId>,
    pub(crate) lines: Vec<NodeId>,
    pub(crate) masks: Vec<NodeId>,
    /// Every node allocated by the pass, freed on revert.
    pub(crate) created: Vec<NodeId>,
}

impl Collections {
    pub(crate) fn by_kind(&self, kind: WrapperKind) -> &Vec<NodeId> {
        match kind {
            WrapperKind::Char => &self.chars,
            WrapperKind::Word => &self.words,
            WrapperKind::Line => &self.lines,
        }
    }

    pub(crate) fn by_kind_mut(&mut self, kind: WrapperKind) -> &mut Vec<NodeId> {
        match kind {
            WrapperKind::Char => &mut self.chars,
            WrapperKind::Word => &mut self.words,
            WrapperKind::Line => &mut self.lines,
        }
    }

    pub(crate) fn get(&self, collection: Collection) -> &[NodeId] {
        match collection {
            Collection::Chars => &self.chars,
            Collection::Words => &self.words,
            Collection::Lines => &self.lines,
        }
    }

    fn marks(&self) -> Marks {
        Marks {
            chars: self.chars.len(),
            words: self.words.len(),
            lines: self.lines.len(),
            masks: self.masks.len(),
            created: self.created.len(),
        }
    }

    /// Drop everything recorded after `marks`; returns the nodes to free.
    fn truncate(&mut self, marks: Marks) -> Vec<NodeId> {
        self.chars.truncate(marks.chars);
        self.words.truncate(marks.words);
        self.lines.truncate(marks.lines);
        self.masks.truncate(marks.masks);
        self.created.split_off(marks.created.min(self.created.len()))
    }

    fn clear(&mut self) {
        self.chars.clear();
        self.words.clear();
        self.lines.clear();
        self.masks.clear();
        self.created.clear();
    }
}

/// Split session over a fixed set of targets.
#[derive(Debug)]
pub struct TextSplit {
    targets: Vec<NodeId>,
    config: SplitConfig,
    state: SplitState,
    snapshots: Vec<TargetSnapshot>,
    collections: Collections,
    resize: Option<ResizeBinding>,
    errors: Vec<Error>,
    destroyed: bool,
}

impl TextSplit {
    /// Create a session. Nothing is mutated until [`Self::split`].
    ///
    /// When no target resolves the session is inert: a
    /// [`Error::Selection`] is logged and recorded, and `split` does nothing.
    pub fn new(doc: &Document, targets: impl Into<Targets>, config: SplitConfig) -> Self {
        let mut errors = Vec::new();
        let targets = match targets.into().resolve(doc) {
            Ok(targets) => targets,
            Err(error) => {
                emit_log(LogLevel::Warn, &error.to_string());
                errors.push(error);
                Vec::new()
            }
        };
        let resize = config.auto_split.then(ResizeBinding::default);
        Self {
            targets,
            config,
            state: SplitState::Unsplit,
            snapshots: Vec::new(),
            collections: Collections::default(),
            resize,
            errors,
            destroyed: false,
        }
    }

    /// Split every target, reverting a previous split first.
    pub fn split<L: Layout + ?Sized>(&mut self, doc: &mut Document, layout: &mut L) -> &mut Self {
        if self.destroyed {
            emit_log(LogLevel::Warn, "split called on a destroyed session");
            return self;
        }
        self.revert(doc);

        if self.targets.is_empty() {
            // Keep the selection error from construction.
            if !self.errors.iter().any(|e| matches!(e, Error::Selection(_))) {
                let error = Error::Selection("session has no targets".to_string());
                emit_log(LogLevel::Warn, &error.to_string());
                self.errors.push(error);
            }
            return self;
        }
        self.errors.clear();

        let split_type = self.config.split_type;
        if split_type.is_empty() {
            let error = Error::Configuration("type must include chars, words, or lines".to_string());
            emit_log(LogLevel::Warn, &error.to_string());
            self.errors.push(error);
            return self;
        }

        let ignore = self
            .config
            .ignore
            .as_ref()
            .map(|ignore| ignore.resolve(doc, &self.targets))
            .unwrap_or_default();
        self.snapshots = self
            .targets
            .iter()
            .map(|&target| TargetSnapshot::capture(doc, target))
            .collect();

        for index in 0..self.targets.len() {
            let target = self.targets[index];
            let marks = self.collections.marks();
            if let Err(source) = self.split_target(doc, layout, target, &ignore) {
                self.rollback(doc, index, marks);
                let error = Error::Processing {
                    target,
                    source: Box::new(source),
                };
                emit_log(LogLevel::Error, &error.to_string());
                self.errors.push(error);
            }
        }
        self.state = SplitState::Split;

        if self.config.auto_split && split_type.contains(SplitType::LINES) {
            for snapshot in &mut self.snapshots {
                snapshot.width = layout.offset_width(doc, snapshot.target);
            }
            self.resize.get_or_insert_with(ResizeBinding::default).observe();
        }

        let c = &self.collections;
        emit_log(
            LogLevel::Debug,
            &format!(
                "split {} target(s) as {split_type}: {} chars, {} words, {} lines",
                self.targets.len(),
                c.chars.len(),
                c.words.len(),
                c.lines.len()
            ),
        );
        SessionEvent::Split(SplitCounts {
            chars: c.chars.len(),
            words: c.words.len(),
            lines: c.lines.len(),
            masks: c.masks.len(),
        })
        .emit();
        if let Some(hook) = self.config.on_split.clone() {
            hook(self);
        }
        self
    }

    /// Replace the configuration, then split.
    pub fn split_with<L: Layout + ?Sized>(
        &mut self,
        doc: &mut Document,
        layout: &mut L,
        config: SplitConfig,
    ) -> &mut Self {
        self.revert(doc);
        if config.auto_split && self.resize.is_none() {
            self.resize = Some(ResizeBinding::default());
        }
        self.config = config;
        self.split(doc, layout)
    }

    fn split_target<L: Layout + ?Sized>(
        &mut self,
        doc: &mut Document,
        layout: &mut L,
        target: NodeId,
        ignore: &[NodeId],
    ) -> Result<()> {
        self.setup_accessibility(doc, target)?;

        let split_type = self.config.split_type;
        let marks = self.collections.marks();
        let mut pass = Pass::new(
            doc,
            layout,
            &self.config,
            &self.targets,
            ignore,
            &mut self.collections,
        );
        pass.process_element(target)?;
        if split_type.contains(SplitType::LINES) {
            pass.wrap_lines(target)?;
        }
        if !split_type.contains(SplitType::WORDS) {
            pass.unwrap_words(target, marks.words)?;
        }
        if let Some(mask) = self.config.mask {
            pass.apply_mask(mask, marks.get(mask))?;
        }
        Ok(())
    }

    fn setup_accessibility(&self, doc: &mut Document, target: NodeId) -> Result<()> {
        match self.config.aria {
            AriaMode::Auto => {
                let label = doc.text_content(target).trim().to_string();
                if !label.is_empty() {
                    doc.set_attribute(target, "aria-label", &label)?;
                }
            }
            AriaMode::Hidden => doc.set_attribute(target, "aria-hidden", "true")?,
            AriaMode::None => {}
        }
        Ok(())
    }

    /// Undo a failed target and free what its pass allocated.
    fn rollback(&mut self, doc: &mut Document, index: usize, marks: Marks) {
        let Some(snapshot) = self.snapshots.get(index) else {
            return;
        };
        let restored = snapshot.restore(doc);
        for node in self.collections.truncate(marks) {
            doc.free(node);
        }
        if let Err(error) = restored {
            emit_log(
                LogLevel::Error,
                &format!("rollback of {} failed: {error}", snapshot.target),
            );
            if let Err(error) = snapshot.restore_markup(doc) {
                emit_log(LogLevel::Error, &error.to_string());
            }
        }
    }

    /// Restore every target. No-op unless split.
    pub fn revert(&mut self, doc: &mut Document) -> &mut Self {
        if self.state != SplitState::Split {
            return self;
        }
        if let Some(binding) = self.resize.as_mut() {
            binding.disconnect();
        }

        let mut failed = Vec::new();
        for (index, snapshot) in self.snapshots.iter().enumerate() {
            if let Err(error) = snapshot.restore(doc) {
                failed.push((index, error));
            }
        }
        // Freed only after every original node is re-linked.
        for node in self.collections.created.drain(..) {
            doc.free(node);
        }
        for (index, error) in failed {
            let snapshot = &self.snapshots[index];
            emit_log(
                LogLevel::Error,
                &format!("revert of {} failed: {error}", snapshot.target),
            );
            if let Err(fallback) = snapshot.restore_markup(doc) {
                emit_log(LogLevel::Error, &fallback.to_string());
            }
            self.errors.push(error);
        }

        self.collections.clear();
        self.state = SplitState::Unsplit;
        SessionEvent::Revert.emit();
        if let Some(hook) = self.config.on_revert.clone() {
            hook(self);
        }
        self
    }

    /// Revert and release everything. The session stays inert afterwards.
    pub fn destroy(&mut self, doc: &mut Document) {
        self.revert(doc);
        self.resize = None;
        self.targets.clear();
        self.snapshots.clear();
        self.destroyed = true;
    }

    /// Record a host signal for the debounced auto-split.
    pub fn notify(&mut self, signal: ResizeSignal, now: Instant) {
        if let Some(binding) = self.resize.as_mut() {
            binding.signal(signal, now);
        }
    }

    pub fn notify_resize(&mut self, now: Instant) {
        self.notify(ResizeSignal::Resize, now);
    }

    pub fn notify_fonts_loaded(&mut self, now: Instant) {
        self.notify(ResizeSignal::FontsLoaded, now);
    }

    /// Deadline of the pending re-split, if any.
    #[must_use]
    pub fn pending_resplit(&self) -> Option<Instant> {
        self.resize.as_ref().and_then(ResizeBinding::deadline)
    }

    /// Run a due re-split. Returns `true` if the targets were split again.
    ///
    /// A resize only re-splits when some target's width changed; a font load
    /// always does.
    pub fn poll<L: Layout + ?Sized>(
        &mut self,
        doc: &mut Document,
        layout: &mut L,
        now: Instant,
    ) -> bool {
        let Some(due) = self.resize.as_mut().and_then(|b| b.take_due(now)) else {
            return false;
        };
        if self.state != SplitState::Split {
            return false;
        }

        let mut changed = due.fonts_loaded;
        for snapshot in &self.snapshots {
            let width = layout.offset_width(doc, snapshot.target);
            if (width - snapshot.width).abs() > f32::EPSILON {
                changed = true;
            }
        }
        if !changed {
            // Still observing; nothing to do until the next signal.
            return false;
        }

        emit_log(LogLevel::Debug, "re-splitting after layout change");
        self.split(doc, layout);
        true
    }

    #[must_use]
    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    #[must_use]
    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> SplitState {
        self.state
    }

    #[must_use]
    pub fn is_split(&self) -> bool {
        self.state == SplitState::Split
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Char wrappers in document order.
    #[must_use]
    pub fn chars(&self) -> &[NodeId] {
        &self.collections.chars
    }

    /// Word wrappers in document order. Empty unless words were requested.
    #[must_use]
    pub fn words(&self) -> &[NodeId] {
        &self.collections.words
    }

    #[must_use]
    pub fn lines(&self) -> &[NodeId] {
        &self.collections.lines
    }

    #[must_use]
    pub fn masks(&self) -> &[NodeId] {
        &self.collections.masks
    }

    #[must_use]
    pub fn collection(&self, collection: Collection) -> &[NodeId] {
        self.collections.get(collection)
    }

    /// Errors recorded by the most recent split and any revert since.
    #[must_use]
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Markup of `target` captured before the current split.
    #[must_use]
    pub fn original_html(&self, target: NodeId) -> Option<&str> {
        self.snapshots
            .iter()
            .find(|s| s.target == target)
            .map(|s| s.html.as_str())
    }
}
