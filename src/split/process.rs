//! Tree processor.
//!
//! A [`Pass`] walks one target depth first and replaces every text run with
//! word wrappers (and char wrappers inside them). Child lists are
//! materialized before each walk so insertions never invalidate iteration.
//! Smart-wrap correction runs right after each word lands, while the rest of
//! the container still holds unprocessed text.

use super::Collections;
use super::config::{Collection, Piece, SplitConfig, SplitType};
use super::factory::WrapperKind;
use crate::dom::{Document, NodeId};
use crate::error::Result;
use crate::layout::Layout;
use crate::style::Display;
use crate::unicode::merge_special;
use std::collections::HashSet;

/// Mutable state of one split pass over one target.
pub(crate) struct Pass<'a, L: Layout + ?Sized> {
    pub(crate) doc: &'a mut Document,
    pub(crate) layout: &'a mut L,
    pub(crate) config: &'a SplitConfig,
    /// Every target of the session; smart wrap never clones one.
    targets: &'a [NodeId],
    ignore: &'a [NodeId],
    pub(crate) out: &'a mut Collections,
    /// Word wrappers produced by this pass and still in place.
    words: HashSet<NodeId>,
}

impl<'a, L: Layout + ?Sized> Pass<'a, L> {
    pub(crate) fn new(
        doc: &'a mut Document,
        layout: &'a mut L,
        config: &'a SplitConfig,
        targets: &'a [NodeId],
        ignore: &'a [NodeId],
        out: &'a mut Collections,
    ) -> Self {
        Self {
            doc,
            layout,
            config,
            targets,
            ignore,
            out,
            words: HashSet::new(),
        }
    }

    pub(crate) fn create_element(&mut self, tag: &str) -> NodeId {
        let id = self.doc.create_element(tag);
        self.out.created.push(id);
        id
    }

    pub(crate) fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        let id = self.doc.create_text(text);
        self.out.created.push(id);
        id
    }

    fn clone_shallow(&mut self, node: NodeId) -> Result<NodeId> {
        let id = self.doc.clone_shallow(node)?;
        self.out.created.push(id);
        Ok(id)
    }

    /// Restructure the content of `element` in place.
    pub(crate) fn process_element(&mut self, element: NodeId) -> Result<()> {
        let split_chars = self.config.split_type.contains(SplitType::CHARS);
        for node in self.doc.child_nodes(element) {
            if self.doc.is_text(node) {
                self.process_text(node, element, split_chars)?;
                self.doc.remove(node)?;
            } else if self.doc.is_element(node) {
                if self.ignore.contains(&node) {
                    self.attach_ignored(node)?;
                } else {
                    self.process_element(node)?;
                }
                self.make_inline_block(node)?;
            }
        }
        Ok(())
    }

    /// Insert wrappers for `node`'s text before it. The caller removes `node`.
    fn process_text(&mut self, node: NodeId, parent: NodeId, split_chars: bool) -> Result<()> {
        let raw = self.doc.text(node).unwrap_or_default().to_string();
        let text = self.prepare_text(&raw, parent);
        if text.is_empty() {
            return Ok(());
        }

        let config = self.config;
        let merge_into = self
            .doc
            .previous_sibling(node)
            .filter(|prev| self.words.contains(prev));
        let mut pending = String::new();
        let mut first = true;
        let mut leading_delimiter = false;

        for piece in config.word_delimiter.tokenize(&text) {
            match piece {
                Piece::Delimiter(delimiter) => {
                    leading_delimiter |= first;
                    pending.push_str(delimiter);
                }
                Piece::Word(word) => {
                    self.flush_raw(&mut pending, parent, node)?;
                    let wrapper = match merge_into {
                        Some(previous) if first && !leading_delimiter => {
                            if !split_chars {
                                let fragment = self.create_text(word);
                                self.doc.append_child(previous, fragment)?;
                            }
                            previous
                        }
                        _ => {
                            let content = if split_chars { "" } else { word };
                            let wrapper = self.make(WrapperKind::Word, content)?;
                            self.doc.insert_before(parent, wrapper, Some(node))?;
                            self.words.insert(wrapper);
                            wrapper
                        }
                    };
                    if split_chars {
                        self.append_chars(wrapper, word)?;
                    }
                    self.correct_wrap(wrapper, parent)?;
                    first = false;
                }
            }
        }
        self.flush_raw(&mut pending, parent, node)
    }

    fn prepare_text(&mut self, raw: &str, parent: NodeId) -> String {
        let config = self.config;
        let text = match &config.prepare_text {
            Some(prepare) => prepare(raw, parent),
            None => raw.to_string(),
        };
        if config.reduce_white_space {
            return collapse_whitespace(&text);
        }
        if self.layout.white_space(self.doc, parent).starts_with("pre") {
            let delimiter = config.word_delimiter.literal().unwrap_or(" ");
            return text.replace('\n', &format!("{delimiter}\n"));
        }
        text
    }

    /// Emit buffered delimiter text as a raw sibling before `node`.
    fn flush_raw(&mut self, pending: &mut String, parent: NodeId, node: NodeId) -> Result<()> {
        if pending.is_empty() {
            return Ok(());
        }
        let raw = self.create_text(std::mem::take(pending));
        self.doc.insert_before(parent, raw, Some(node))
    }

    fn append_chars(&mut self, word: NodeId, text: &str) -> Result<()> {
        let config = self.config;
        let segments: Vec<String> = config
            .segmenter
            .segment(text)
            .into_iter()
            .map(str::to_string)
            .collect();
        for unit in merge_special(segments, config.special_chars.as_ref()) {
            let child = if unit == " " {
                self.create_text(unit)
            } else {
                self.make(WrapperKind::Char, &unit)?
            };
            self.doc.append_child(word, child)?;
        }
        Ok(())
    }

    /// Move an ignored element into the word it directly follows.
    fn attach_ignored(&mut self, node: NodeId) -> Result<()> {
        if let Some(&word) = self.out.words.last() {
            if self.words.contains(&word) && self.doc.previous_sibling(node) == Some(word) {
                self.doc.append_child(word, node)?;
            }
        }
        Ok(())
    }

    fn make_inline_block(&mut self, node: NodeId) -> Result<()> {
        if self.doc.tag(node) == Some("br") {
            return Ok(());
        }
        if self.layout.display(self.doc, node) == Display::Inline {
            self.doc.set_style_property(node, "display", "inline-block")?;
        }
        Ok(())
    }

    /// Split `parent` when `word` has wrapped onto a new line inside it.
    ///
    /// Everything before `word` moves into a shallow clone of `parent`
    /// inserted just before it, so the finished line keeps its own box.
    fn correct_wrap(&mut self, word: NodeId, parent: NodeId) -> Result<()> {
        if !(self.config.smart_wrap && self.config.deep_slice) || self.targets.contains(&parent) {
            return Ok(());
        }
        let Some(grandparent) = self.doc.parent(parent) else {
            return Ok(());
        };

        let word_rect = self.layout.bounding_rect(self.doc, word);
        let parent_rect = self.layout.bounding_rect(self.doc, parent);
        let wrapped = word_rect.top() > parent_rect.top() && word_rect.left() <= parent_rect.left();
        if !wrapped {
            return Ok(());
        }

        let preceding: Vec<NodeId> = self
            .doc
            .children(parent)
            .iter()
            .copied()
            .take_while(|&child| child != word)
            .collect();
        if preceding.is_empty() {
            return Ok(());
        }

        let clone = self.clone_shallow(parent)?;
        for child in preceding {
            self.doc.append_child(clone, child)?;
        }
        self.doc.insert_before(grandparent, clone, Some(parent))?;
        self.make_inline_block(clone)
    }

    /// Dissolve scaffolding word wrappers from `start` onward.
    pub(crate) fn unwrap_words(&mut self, target: NodeId, start: usize) -> Result<()> {
        let config = self.config;
        let split_chars = config.split_type.contains(SplitType::CHARS);
        let nowrap = config.smart_wrap && !config.split_type.contains(SplitType::LINES);
        let words: Vec<NodeId> = self.out.words.drain(start..).collect();

        for word in words {
            self.words.remove(&word);
            let Some(parent) = self.doc.parent(word) else {
                continue;
            };
            let next_text = self
                .doc
                .next_sibling(word)
                .filter(|&next| self.doc.is_text(next));
            let plain = self.doc.element_children(word).is_empty();

            match next_text {
                Some(next) if !split_chars && plain => {
                    let merged = format!(
                        "{}{}",
                        self.doc.text_content(word),
                        self.doc.text(next).unwrap_or_default()
                    );
                    self.doc.set_text(next, merged)?;
                    self.doc.remove(word)?;
                }
                _ if nowrap => {
                    let span = self.create_element("span");
                    self.doc.set_style_property(span, "white-space", "nowrap")?;
                    self.doc.insert_before(parent, span, Some(word))?;
                    for child in self.doc.child_nodes(word) {
                        self.doc.append_child(span, child)?;
                    }
                    self.doc.remove(word)?;
                }
                _ => self.doc.replace_with_children(word)?,
            }
        }
        self.doc.normalize(target)
    }

    /// Wrap each member of `collection` from `start` onward in a clipping clone.
    pub(crate) fn apply_mask(&mut self, collection: Collection, start: usize) -> Result<()> {
        let members = self.out.get(collection).get(start..).unwrap_or_default().to_vec();
        for member in members {
            let Some(parent) = self.doc.parent(member) else {
                continue;
            };
            let mask = self.clone_shallow(member)?;
            let class = self
                .doc
                .class_name(mask)
                .split_whitespace()
                .map(|c| format!("{c}-mask"))
                .collect::<Vec<_>>()
                .join(" ");
            self.doc.set_class_name(mask, &class)?;
            self.doc.set_style_property(mask, "overflow", "clip")?;
            self.doc.insert_before(parent, mask, Some(member))?;
            self.doc.append_child(mask, member)?;
            self.out.masks.push(mask);
        }
        Ok(())
    }
}

/// Collapse every whitespace run to a single space.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}
