//! Attribute-driven sessions.
//!
//! Elements marked with `data-text-split="chars, words"` get a session each.
//! The host calls [`SplitRegistry::attach`] whenever new content enters the
//! tree; already tracked elements are skipped, so repeated calls are cheap.

use crate::dom::{Document, NodeId};
use crate::event::{LogLevel, emit_log};
use crate::layout::Layout;
use crate::split::{SplitConfig, SplitType, TextSplit};
use std::collections::HashMap;
use std::time::Instant;

/// Marker attribute; its value is the split type list.
pub const SPLIT_ATTRIBUTE: &str = "data-text-split";

/// Prefix of the animation class moved from the target onto its wrappers.
pub const ANIM_CLASS_PREFIX: &str = "anim-";

/// Sessions keyed by target element.
#[derive(Debug, Default)]
pub struct SplitRegistry {
    sessions: HashMap<NodeId, TextSplit>,
    order: Vec<NodeId>,
    /// Animation class taken off each target at attach; put back on detach.
    anim_classes: HashMap<NodeId, String>,
}

impl SplitRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split every untracked marked element under `root`.
    ///
    /// Returns the number of new sessions.
    pub fn attach<L: Layout + ?Sized>(
        &mut self,
        doc: &mut Document,
        layout: &mut L,
        root: NodeId,
    ) -> usize {
        let marked: Vec<NodeId> = doc
            .descendants(root)
            .into_iter()
            .filter(|&id| doc.attribute(id, SPLIT_ATTRIBUTE).is_some())
            .filter(|id| !self.sessions.contains_key(id))
            .collect();

        let mut attached = 0;
        for target in marked {
            // A marked element inside a tracked target was split with it.
            if self.order.iter().any(|&t| doc.contains(t, target)) {
                continue;
            }
            let value = doc.attribute(target, SPLIT_ATTRIBUTE).unwrap_or_default();
            let split_type = if value.trim().is_empty() {
                SplitType::CHARS
            } else {
                SplitType::parse(value)
            };

            let anim_class = doc
                .class_name(target)
                .split_whitespace()
                .find(|c| c.starts_with(ANIM_CLASS_PREFIX))
                .map(str::to_string);
            if let Some(class) = &anim_class {
                if let Err(error) = doc.remove_class(target, class) {
                    emit_log(LogLevel::Warn, &error.to_string());
                }
            }

            let config = SplitConfig::default()
                .with_type(split_type)
                .with_smart_wrap(true);
            let mut session = TextSplit::new(doc, target, config);
            session.split(doc, layout);

            if let Some(class) = &anim_class {
                let wrappers = if split_type.contains(SplitType::CHARS) {
                    session.chars()
                } else if split_type.contains(SplitType::WORDS) {
                    session.words()
                } else {
                    session.lines()
                };
                for &wrapper in wrappers {
                    if let Err(error) = doc.add_class(wrapper, class) {
                        emit_log(LogLevel::Warn, &error.to_string());
                    }
                }
            }

            if let Some(class) = anim_class {
                self.anim_classes.insert(target, class);
            }
            self.sessions.insert(target, session);
            self.order.push(target);
            attached += 1;
        }
        attached
    }

    #[must_use]
    pub fn get(&self, target: NodeId) -> Option<&TextSplit> {
        self.sessions.get(&target)
    }

    pub fn get_mut(&mut self, target: NodeId) -> Option<&mut TextSplit> {
        self.sessions.get_mut(&target)
    }

    /// Tracked targets in attach order.
    #[must_use]
    pub fn targets(&self) -> &[NodeId] {
        &self.order
    }

    /// Destroy and forget the session for `target`, handing its animation
    /// class back to the target.
    pub fn detach(&mut self, doc: &mut Document, target: NodeId) -> bool {
        let Some(mut session) = self.sessions.remove(&target) else {
            return false;
        };
        session.destroy(doc);
        self.order.retain(|&t| t != target);
        if let Some(class) = self.anim_classes.remove(&target) {
            if let Err(error) = doc.add_class(target, &class) {
                emit_log(LogLevel::Warn, &error.to_string());
            }
        }
        true
    }

    /// Forward a resize signal to every session.
    pub fn notify_resize(&mut self, now: Instant) {
        for session in self.sessions.values_mut() {
            session.notify_resize(now);
        }
    }

    pub fn notify_fonts_loaded(&mut self, now: Instant) {
        for session in self.sessions.values_mut() {
            session.notify_fonts_loaded(now);
        }
    }

    /// Drive every session's debounced auto-split; returns how many re-split.
    pub fn poll<L: Layout + ?Sized>(
        &mut self,
        doc: &mut Document,
        layout: &mut L,
        now: Instant,
    ) -> usize {
        let mut count = 0;
        for target in &self.order {
            if let Some(session) = self.sessions.get_mut(target) {
                if session.poll(doc, layout, now) {
                    count += 1;
                }
            }
        }
        count
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
