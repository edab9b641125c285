//! Markup serialization, and fragment parsing through `html5ever`.
//!
//! Parsing follows the HTML fragment algorithm with the target element as
//! context, so malformed input is recovered the way a browser would recover
//! it. Comments, processing instructions, and doctypes are dropped.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::ParseOpts;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeBuilderOpts, TreeSink};
use markup5ever::{Attribute, ExpandedName, LocalName, Namespace, QualName};

use super::{Document, NodeData, NodeId};
use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log};

pub(crate) const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text is emitted unescaped.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "plaintext", "script", "style", "xmp",
];

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// The parser drops one newline right after these start tags.
fn eats_leading_newline(tag: &str) -> bool {
    matches!(tag, "pre" | "textarea" | "listing")
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

impl Document {
    /// Serialized markup of a node's children.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialized markup of a node, including itself.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => {
                let parent_tag = node.parent.and_then(|p| self.tag(p));
                if parent_tag.is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag)) {
                    out.push_str(text);
                } else {
                    escape_text(text, out);
                }
            }
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_attribute(value, out);
                    out.push('"');
                }
                if !el.style.is_empty() {
                    out.push_str(" style=\"");
                    escape_attribute(&el.style_text(), out);
                    out.push('"');
                }
                out.push('>');
                if is_void(&el.tag) {
                    return;
                }
                let leading_newline = node
                    .children
                    .first()
                    .and_then(|&first| self.text(first))
                    .is_some_and(|text| text.starts_with('\n'));
                if leading_newline && eats_leading_newline(&el.tag) {
                    out.push('\n');
                }
                for &child in &node.children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }

    /// Replace a node's children with parsed markup.
    ///
    /// Previous children are released.
    pub fn set_inner_html(&mut self, id: NodeId, markup: &str) -> Result<()> {
        if !self.is_element(id) {
            return Err(Error::dom(format!("node {id} is not an element")));
        }
        for child in self.child_nodes(id) {
            self.free_subtree(child);
        }
        self.parse_fragment(id, markup)
    }

    /// Parse markup and append the resulting nodes to `parent`.
    ///
    /// `parent`'s tag is the parsing context, so `<li>` under a `ul` or
    /// raw text under a `textarea` come out the way a browser builds them.
    pub fn parse_fragment(&mut self, parent: NodeId, markup: &str) -> Result<()> {
        let tag = self
            .tag(parent)
            .ok_or_else(|| Error::dom(format!("node {parent} is not an element")))?
            .to_string();
        let context = QualName::new(
            None,
            Namespace::from(HTML_NAMESPACE),
            LocalName::from(tag.as_str()),
        );
        let opts = ParseOpts {
            tree_builder: TreeBuilderOpts {
                scripting_enabled: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let sink = FragmentSink::new(self, parent);
        html5ever::parse_fragment(sink, opts, context, Vec::new()).one(markup)
    }
}

/// Tree builder handle: a node id plus the element name the builder asks
/// for while it runs.
#[derive(Clone, Debug)]
struct Handle {
    id: NodeId,
    name: Rc<QualName>,
    /// Comments and processing instructions. Never attached.
    inert: bool,
}

fn qualified(local: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(local))
}

fn attribute_name(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{prefix}:{}", name.local),
        None => name.local.to_string(),
    }
}

/// Builds parser output straight into a [`Document`].
///
/// Everything is created detached under a scratch node, then moved into the
/// target parent by [`TreeSink::finish`]. Scratch nodes are released.
struct FragmentSink<'d> {
    doc: RefCell<&'d mut Document>,
    parent: NodeId,
    scratch: Handle,
    created: RefCell<Vec<NodeId>>,
    failure: RefCell<Option<Error>>,
    errors: Cell<usize>,
}

impl<'d> FragmentSink<'d> {
    fn new(doc: &'d mut Document, parent: NodeId) -> Self {
        let scratch = doc.create_element("template");
        Self {
            doc: RefCell::new(doc),
            parent,
            scratch: Handle {
                id: scratch,
                name: Rc::new(qualified("#document")),
                inert: false,
            },
            created: RefCell::new(vec![scratch]),
            failure: RefCell::new(None),
            errors: Cell::new(0),
        }
    }

    fn record(&self, result: Result<()>) {
        if let Err(err) = result {
            self.failure.borrow_mut().get_or_insert(err);
        }
    }

    fn track(&self, id: NodeId) -> NodeId {
        self.created.borrow_mut().push(id);
        id
    }

    fn inert_node(&self, label: &str) -> Handle {
        let id = self.doc.borrow_mut().create_text("");
        Handle {
            id: self.track(id),
            name: Rc::new(qualified(label)),
            inert: true,
        }
    }

    /// Insert under `parent` before `before`, or at the end. Text merges into
    /// an adjacent text node.
    fn insert(&self, parent: NodeId, before: Option<NodeId>, child: NodeOrText<Handle>) {
        let mut doc = self.doc.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => {
                if !node.inert {
                    let result = doc.insert_before(parent, node.id, before);
                    self.record(result);
                }
            }
            NodeOrText::AppendText(text) => {
                let adjacent = match before {
                    Some(sibling) => doc.previous_sibling(sibling),
                    None => doc.children(parent).last().copied(),
                };
                if let Some(prev) = adjacent.filter(|&prev| doc.is_text(prev)) {
                    let merged = format!("{}{}", doc.text(prev).unwrap_or_default(), &*text);
                    let result = doc.set_text(prev, merged);
                    self.record(result);
                    return;
                }
                let id = doc.create_text(&*text);
                self.created.borrow_mut().push(id);
                let result = doc.insert_before(parent, id, before);
                self.record(result);
            }
        }
    }

    fn release_scratch(doc: &mut Document, parent: NodeId, created: &[NodeId]) {
        for &id in created.iter().rev() {
            if !doc.contains(parent, id) {
                doc.free(id);
            }
        }
    }
}

impl TreeSink for FragmentSink<'_> {
    type Handle = Handle;
    type Output = Result<()>;
    type ElemName<'a>
        = ExpandedName<'a>
    where
        Self: 'a;

    fn finish(self) -> Result<()> {
        let doc = self.doc.into_inner();
        let created = self.created.into_inner();
        if let Some(err) = self.failure.into_inner() {
            Self::release_scratch(doc, self.parent, &created);
            return Err(err);
        }

        // The fragment's nodes live under the `html` element the builder
        // appends to the scratch document.
        for root in doc.child_nodes(self.scratch.id) {
            for child in doc.child_nodes(root) {
                if let Err(err) = doc.append_child(self.parent, child) {
                    Self::release_scratch(doc, self.parent, &created);
                    return Err(err);
                }
            }
        }
        Self::release_scratch(doc, self.parent, &created);

        let errors = self.errors.get();
        if errors > 0 {
            emit_log(
                LogLevel::Debug,
                &format!("recovered from {errors} markup error(s) under {}", self.parent),
            );
        }
        Ok(())
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        self.errors.set(self.errors.get() + 1);
        emit_log(LogLevel::Debug, &format!("markup: {msg}"));
    }

    fn get_document(&self) -> Handle {
        self.scratch.clone()
    }

    fn elem_name<'a>(&'a self, target: &'a Handle) -> ExpandedName<'a> {
        target.name.expanded()
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Handle {
        let mut doc = self.doc.borrow_mut();
        let id = doc.create_element(&name.local);
        for attr in &attrs {
            let result = doc.set_attribute(id, &attribute_name(&attr.name), &attr.value);
            self.record(result);
        }
        Handle {
            id: self.track(id),
            name: Rc::new(name),
            inert: false,
        }
    }

    fn create_comment(&self, _text: StrTendril) -> Handle {
        self.inert_node("#comment")
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Handle {
        self.inert_node("#pi")
    }

    fn append(&self, parent: &Handle, child: NodeOrText<Handle>) {
        if !parent.inert {
            self.insert(parent.id, None, child);
        }
    }

    fn append_before_sibling(&self, sibling: &Handle, child: NodeOrText<Handle>) {
        let parent = self.doc.borrow().parent(sibling.id);
        if let Some(parent) = parent {
            self.insert(parent, Some(sibling.id), child);
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Handle,
        prev_element: &Handle,
        child: NodeOrText<Handle>,
    ) {
        if self.doc.borrow().parent(element.id).is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
    }

    fn get_template_contents(&self, target: &Handle) -> Handle {
        target.clone()
    }

    fn same_node(&self, x: &Handle, y: &Handle) -> bool {
        x.id == y.id
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn add_attrs_if_missing(&self, target: &Handle, attrs: Vec<Attribute>) {
        let mut doc = self.doc.borrow_mut();
        for attr in &attrs {
            let name = attribute_name(&attr.name);
            if doc.attribute(target.id, &name).is_none() {
                let result = doc.set_attribute(target.id, &name, &attr.value);
                self.record(result);
            }
        }
    }

    fn remove_from_parent(&self, target: &Handle) {
        let result = self.doc.borrow_mut().remove(target.id);
        self.record(result);
    }

    fn reparent_children(&self, node: &Handle, new_parent: &Handle) {
        let mut doc = self.doc.borrow_mut();
        for child in doc.child_nodes(node.id) {
            let result = doc.append_child(new_parent.id, child);
            self.record(result);
        }
    }
}
