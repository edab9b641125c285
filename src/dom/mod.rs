//! Arena-owned document tree.
//!
//! [`Document`] stores element and text nodes in a slot arena addressed by
//! [`NodeId`]. Freed slots are recycled through a free list. Each slot
//! carries a generation that advances when it is freed, so an id kept past
//! `free` answers `None` from every getter even after the slot is reused.
//!
//! Every structural or style mutation bumps [`Document::generation`]. Layout
//! engines compare generations to decide whether cached geometry is still
//! valid.
//!
//! # Examples
//!
//! ```
//! use textsplit::Document;
//!
//! let mut doc = Document::parse("<p>Hello <em>there</em></p>").unwrap();
//! let p = doc.element_children(doc.root())[0];
//! assert_eq!(doc.text_content(p), "Hello there");
//! assert_eq!(doc.inner_html(p), "Hello <em>there</em>");
//! ```

mod html;
mod selector;

pub use selector::Selector;

use crate::error::{Error, Result};
use std::fmt;

/// Handle to a node inside a [`Document`]: a slot index plus the slot's
/// generation at allocation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    slot: u32,
    generation: u32,
}

impl NodeId {
    /// Construct a first-generation id for a raw slot index.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            slot: raw,
            generation: 0,
        }
    }

    /// Raw slot index.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.slot
    }

    /// How many times the slot was freed before this id was handed out.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    const fn index(self) -> usize {
        self.slot as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "#{}", self.slot)
        } else {
            write!(f, "#{}v{}", self.slot, self.generation)
        }
    }
}

/// Element payload: tag, ordered attributes, ordered inline style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub style: Vec<(String, String)>,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            style: Vec::new(),
        }
    }

    /// Look up an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Look up an inline style property.
    #[must_use]
    pub fn style_property(&self, name: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Serialized inline style, `name: value;` pairs joined by spaces.
    #[must_use]
    pub fn style_text(&self) -> String {
        self.style
            .iter()
            .map(|(k, v)| format!("{k}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn set_style_text(&mut self, text: &str) {
        self.style.clear();
        for decl in text.split(';') {
            if let Some((name, value)) = decl.split_once(':') {
                let name = name.trim();
                let value = value.trim();
                if !name.is_empty() {
                    self.style.push((name.to_ascii_lowercase(), value.to_string()));
                }
            }
        }
    }
}

/// Node payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

/// A node slot: payload plus tree links.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    #[must_use]
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Owned document tree.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Slot>,
    free_list: Vec<u32>,
    root: NodeId,
    generation: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with a `body` root element.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            free_list: Vec::new(),
            root: NodeId::from_raw(0),
            generation: 0,
        };
        doc.root = doc.alloc(NodeData::Element(ElementData::new("body")));
        doc
    }

    /// Create a document whose root holds the parsed fragment.
    pub fn parse(markup: &str) -> Result<Self> {
        let mut doc = Self::new();
        let root = doc.root;
        doc.set_inner_html(root, markup)?;
        Ok(doc)
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Mutation counter; changes whenever structure or style changes.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.node.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let node = Node {
            data,
            parent: None,
            children: Vec::new(),
        };
        if let Some(raw) = self.free_list.pop() {
            let slot = &mut self.nodes[raw as usize];
            slot.node = Some(node);
            return NodeId {
                slot: raw,
                generation: slot.generation,
            };
        }
        self.nodes.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId::from_raw((self.nodes.len() - 1) as u32)
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn slot_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.slot_node_mut(id)
            .ok_or_else(|| Error::dom(format!("node {id} does not exist")))
    }

    /// Check whether an id refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id).map(Node::data), Some(NodeData::Element(_)))
    }

    #[must_use]
    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.node(id).map(Node::data), Some(NodeData::Text(_)))
    }

    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.node(id).map(Node::data) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element(el) => Ok(el),
            NodeData::Text(_) => Err(Error::dom(format!("node {id} is not an element"))),
        }
    }

    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    /// Text of a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.node(id).map(Node::data) {
            Some(NodeData::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<()> {
        match &mut self.node_mut(id)?.data {
            NodeData::Text(existing) => *existing = text.into(),
            NodeData::Element(_) => {
                return Err(Error::dom(format!("node {id} is not a text node")));
            }
        }
        self.touch();
        Ok(())
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], Node::children)
    }

    /// Materialized copy of a node's child list.
    ///
    /// Walks that mutate the tree iterate over this copy.
    #[must_use]
    pub fn child_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).to_vec()
    }

    #[must_use]
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    #[must_use]
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let pos = siblings.iter().position(|&c| c == id)?;
        pos.checked_sub(1).map(|p| siblings[p])
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    /// Inclusive ancestry check.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Pre-order descendants, excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference` (or at the end).
    ///
    /// The child is detached from its current parent first.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        if !self.is_element(parent) {
            return Err(Error::dom(format!("cannot insert into {parent}")));
        }
        if !self.is_alive(child) {
            return Err(Error::dom(format!("node {child} does not exist")));
        }
        if self.contains(child, parent) {
            return Err(Error::dom(format!(
                "cannot insert {child} into its own descendant {parent}"
            )));
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(Error::dom(format!(
                    "{reference} is not a child of {parent}"
                )));
            }
            if reference == child {
                return Ok(());
            }
        }

        self.detach(child);
        let siblings = &self.node_mut(parent)?.children;
        let index = reference
            .and_then(|r| siblings.iter().position(|&c| c == r))
            .unwrap_or(siblings.len());
        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.touch();
        Ok(())
    }

    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        if let Some(p) = self.slot_node_mut(parent) {
            p.children.retain(|&c| c != child);
        }
        if let Some(c) = self.slot_node_mut(child) {
            c.parent = None;
        }
    }

    /// Detach a node from its parent. The node stays alive.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        if !self.is_alive(id) {
            return Err(Error::dom(format!("node {id} does not exist")));
        }
        self.detach(id);
        self.touch();
        Ok(())
    }

    /// Release a single slot. Children are orphaned, not freed.
    pub fn free(&mut self, id: NodeId) {
        if !self.is_alive(id) || id == self.root {
            return;
        }
        self.detach(id);
        for child in self.child_nodes(id) {
            if let Some(c) = self.slot_node_mut(child) {
                if c.parent == Some(id) {
                    c.parent = None;
                }
            }
        }
        let slot = &mut self.nodes[id.index()];
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.slot);
        self.touch();
    }

    /// Release a node and everything under it.
    pub fn free_subtree(&mut self, id: NodeId) {
        for node in self.descendants(id) {
            self.free(node);
        }
        self.free(id);
    }

    /// Copy a node without its children.
    pub fn clone_shallow(&mut self, id: NodeId) -> Result<NodeId> {
        let data = self
            .node(id)
            .map(|n| n.data.clone())
            .ok_or_else(|| Error::dom(format!("node {id} does not exist")))?;
        Ok(self.alloc(data))
    }

    /// Replace a node by its children, in place.
    pub fn replace_with_children(&mut self, id: NodeId) -> Result<()> {
        let parent = self
            .parent(id)
            .ok_or_else(|| Error::dom(format!("node {id} has no parent")))?;
        for child in self.child_nodes(id) {
            self.insert_before(parent, child, Some(id))?;
        }
        self.remove(id)
    }

    /// Merge adjacent text nodes and drop empty ones, recursively.
    ///
    /// Dropped nodes are detached, never freed.
    pub fn normalize(&mut self, id: NodeId) -> Result<()> {
        let mut previous_text: Option<NodeId> = None;
        for child in self.child_nodes(id) {
            if self.is_element(child) {
                self.normalize(child)?;
                previous_text = None;
                continue;
            }
            let text = self.text(child).unwrap_or_default().to_string();
            if text.is_empty() {
                self.remove(child)?;
                continue;
            }
            match previous_text {
                Some(prev) => {
                    let merged = format!("{}{text}", self.text(prev).unwrap_or_default());
                    self.set_text(prev, merged)?;
                    self.remove(child)?;
                }
                None => previous_text = Some(child),
            }
        }
        Ok(())
    }

    /// Concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.text(d))
            .collect()
    }

    /// Attribute value. Inline style is read through [`Self::style_property`].
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attribute(name))
    }

    /// Set an attribute. Setting `style` replaces the inline style.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let el = self.element_mut(id)?;
        if name == "style" {
            el.set_style_text(value);
        } else if let Some(slot) = el.attributes.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value.to_string();
        } else {
            el.attributes.push((name, value.to_string()));
        }
        self.touch();
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<()> {
        let el = self.element_mut(id)?;
        if name == "style" {
            el.style.clear();
        } else {
            el.attributes.retain(|(k, _)| k != name);
        }
        self.touch();
        Ok(())
    }

    #[must_use]
    pub fn class_name(&self, id: NodeId) -> &str {
        self.attribute(id, "class").unwrap_or_default()
    }

    pub fn set_class_name(&mut self, id: NodeId, class: &str) -> Result<()> {
        if class.is_empty() {
            return self.remove_attribute(id, "class");
        }
        self.set_attribute(id, "class", class)
    }

    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.class_name(id).split_whitespace().any(|c| c == class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<()> {
        if self.has_class(id, class) {
            return Ok(());
        }
        let current = self.class_name(id);
        let updated = if current.trim().is_empty() {
            class.to_string()
        } else {
            format!("{} {class}", current.trim())
        };
        self.set_class_name(id, &updated)
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<()> {
        if !self.has_class(id, class) {
            return Ok(());
        }
        let updated = self
            .class_name(id)
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_class_name(id, &updated)
    }

    #[must_use]
    pub fn style_property(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.style_property(name))
    }

    pub fn set_style_property(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        let el = self.element_mut(id)?;
        if let Some(slot) = el.style.iter_mut().find(|(k, _)| k == name) {
            slot.1 = value.to_string();
        } else {
            el.style.push((name.to_string(), value.to_string()));
        }
        self.touch();
        Ok(())
    }

    pub fn remove_style_property(&mut self, id: NodeId, name: &str) -> Result<()> {
        self.element_mut(id)?.style.retain(|(k, _)| k != name);
        self.touch();
        Ok(())
    }

    /// Elements under `root` (root excluded) matching `selector`, in document order.
    #[must_use]
    pub fn query_selector_all(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| selector.matches(self, id))
            .collect()
    }

    /// Restore a node's payload and child list verbatim.
    ///
    /// Children are re-linked to `id`; nodes dropped from the list are
    /// detached only if they still point at `id`.
    pub(crate) fn restore_node(
        &mut self,
        id: NodeId,
        data: Option<NodeData>,
        children: Vec<NodeId>,
    ) -> Result<()> {
        for &child in &children {
            if !self.is_alive(child) {
                return Err(Error::dom(format!("node {child} does not exist")));
            }
        }
        let previous = std::mem::take(&mut self.node_mut(id)?.children);
        for old in previous {
            if let Some(c) = self.slot_node_mut(old) {
                if c.parent == Some(id) {
                    c.parent = None;
                }
            }
        }
        for &child in &children {
            self.detach(child);
            self.node_mut(child)?.parent = Some(id);
        }
        let node = self.node_mut(id)?;
        if let Some(data) = data {
            node.data = data;
        }
        node.children = children;
        self.touch();
        Ok(())
    }
}
