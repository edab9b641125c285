//! CSS selectors for target and ignore resolution.
//!
//! Parsing and matching are done by the `selectors` crate. This module
//! supplies the selector implementation types and an [`Element`] view over
//! arena nodes. Non-tree-structural pseudo-classes and pseudo-elements are
//! not supported.

use std::fmt;
use std::str::FromStr;

use cssparser::ToCss;
use markup5ever::{LocalName, Namespace};
use precomputed_hash::PrecomputedHash;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::matching::{self, MatchingContext};
use selectors::parser::{self, ParseRelative, SelectorList, SelectorParseErrorKind};
use selectors::{Element, OpaqueElement};

use super::html::HTML_NAMESPACE;
use super::{Document, Node, NodeId};
use crate::error::{Error, Result};

/// Selector implementation for the document arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Simple;

impl parser::SelectorImpl for Simple {
    type AttrValue = CssString;
    type Identifier = CssLocalName;
    type LocalName = CssLocalName;
    type NamespacePrefix = CssLocalName;
    type NamespaceUrl = Namespace;
    type BorrowedNamespaceUrl = Namespace;
    type BorrowedLocalName = CssLocalName;
    type NonTSPseudoClass = NonTSPseudoClass;
    type PseudoElement = PseudoElement;
    type ExtraMatchingData<'a> = ();
}

/// Attribute value in a selector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CssString(pub String);

impl<'a> From<&'a str> for CssString {
    fn from(value: &'a str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for CssString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToCss for CssString {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        cssparser::serialize_string(&self.0, dest)
    }
}

/// Tag, class, id, or attribute name in a selector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CssLocalName(pub LocalName);

impl<'a> From<&'a str> for CssLocalName {
    fn from(value: &'a str) -> Self {
        Self(value.into())
    }
}

impl ToCss for CssLocalName {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

impl PrecomputedHash for CssLocalName {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NonTSPseudoClass {}

impl parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = Simple;

    fn is_active_or_hover(&self) -> bool {
        false
    }

    fn is_user_action_state(&self) -> bool {
        false
    }
}

impl ToCss for NonTSPseudoClass {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PseudoElement {}

impl parser::PseudoElement for PseudoElement {
    type Impl = Simple;
}

impl ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

struct SelectorParser;

impl<'i> parser::Parser<'i> for SelectorParser {
    type Impl = Simple;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_is_and_where(&self) -> bool {
        true
    }

    fn parse_has(&self) -> bool {
        true
    }
}

/// An element node seen through the `selectors` matching interface.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ElementRef<'a> {
    doc: &'a Document,
    id: NodeId,
    node: &'a Node,
}

impl<'a> ElementRef<'a> {
    pub(crate) fn new(doc: &'a Document, id: NodeId) -> Option<Self> {
        let node = doc.node(id)?;
        doc.is_element(id).then_some(Self { doc, id, node })
    }

    fn tag(&self) -> &'a str {
        self.doc.tag(self.id).unwrap_or_default()
    }

    fn attribute(&self, name: &str) -> Option<&'a str> {
        self.doc.attribute(self.id, name)
    }

    fn sibling_element(&self, step: fn(&Document, NodeId) -> Option<NodeId>) -> Option<Self> {
        let mut current = step(self.doc, self.id);
        while let Some(id) = current {
            if let Some(element) = Self::new(self.doc, id) {
                return Some(element);
            }
            current = step(self.doc, id);
        }
        None
    }
}

impl Element for ElementRef<'_> {
    type Impl = Simple;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.node)
    }

    fn parent_element(&self) -> Option<Self> {
        self.doc.parent(self.id).and_then(|p| Self::new(self.doc, p))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn is_part(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.tag() == other.tag()
    }

    fn imported_part(&self, _name: &CssLocalName) -> Option<CssLocalName> {
        None
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.sibling_element(Document::previous_sibling)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.sibling_element(Document::next_sibling)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.doc
            .children(self.id)
            .iter()
            .find_map(|&child| Self::new(self.doc, child))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.tag() == &*name.0
    }

    fn has_namespace(&self, namespace: &Namespace) -> bool {
        &**namespace == HTML_NAMESPACE
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&Namespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        if let NamespaceConstraint::Specific(url) = *ns {
            if !url.is_empty() {
                return false;
            }
        }
        let name: &str = &local_name.0;
        if name == "style" {
            let Some(el) = self.doc.element(self.id) else {
                return false;
            };
            return !el.style.is_empty() && operation.eval_str(&el.style_text());
        }
        self.attribute(name).is_some_and(|value| operation.eval_str(value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match *pc {}
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match *pe {}
    }

    fn is_link(&self) -> bool {
        matches!(self.tag(), "a" | "area" | "link") && self.attribute("href").is_some()
    }

    fn is_html_slot_element(&self) -> bool {
        self.tag() == "slot"
    }

    fn has_id(&self, id: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.attribute("id")
            .is_some_and(|value| case_sensitivity.eq(id.0.as_bytes(), value.as_bytes()))
    }

    fn has_class(&self, name: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.doc
            .class_name(self.id)
            .split_ascii_whitespace()
            .any(|class| case_sensitivity.eq(name.0.as_bytes(), class.as_bytes()))
    }

    fn has_custom_state(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.doc.children(self.id).iter().all(|&child| {
            self.doc.text(child).is_some_and(str::is_empty)
        })
    }

    fn is_root(&self) -> bool {
        self.doc.parent(self.id).is_none()
    }

    fn apply_selector_flags(&self, _flags: matching::ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
        false
    }
}

/// A parsed selector list.
#[derive(Clone, Debug)]
pub struct Selector {
    source: String,
    list: SelectorList<Simple>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser_input = cssparser::ParserInput::new(input);
        let mut css = cssparser::Parser::new(&mut parser_input);
        let list = SelectorList::parse(&SelectorParser, &mut css, ParseRelative::No)
            .map_err(|err| Error::Selector(format!("{input:?}: {:?}", err.kind)))?;
        Ok(Self {
            source: input.to_string(),
            list,
        })
    }

    /// The text this selector was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Check whether an element matches any selector in the list.
    #[must_use]
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some(element) = ElementRef::new(doc, id) else {
            return false;
        };
        let mut caches = Default::default();
        let mut context = MatchingContext::new(
            matching::MatchingMode::Normal,
            None,
            &mut caches,
            matching::QuirksMode::NoQuirks,
            matching::NeedsSelectorFlags::No,
            matching::MatchingForInvalidation::No,
        );
        matching::matches_selector_list(&self.list, &element, &mut context)
    }
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Selector {}

impl FromStr for Selector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::parse(
            r#"<div id="hero" class="title big"><em>a</em><span data-text-split="words">b</span><span data-text-split>c</span></div>"#,
        )
        .unwrap()
    }

    fn count(doc: &Document, selector: &str) -> usize {
        doc.query_selector_all(doc.root(), &Selector::parse(selector).unwrap())
            .len()
    }

    #[test]
    fn test_tag_class_id() {
        let doc = doc();
        assert_eq!(count(&doc, "em"), 1);
        assert_eq!(count(&doc, "div.title.big"), 1);
        assert_eq!(count(&doc, "#hero"), 1);
        assert_eq!(count(&doc, ".missing"), 0);
        assert_eq!(count(&doc, "*"), 4);
    }

    #[test]
    fn test_attribute_selectors() {
        let doc = doc();
        assert_eq!(count(&doc, "[data-text-split]"), 2);
        assert_eq!(count(&doc, "span[data-text-split=\"words\"]"), 1);
        assert_eq!(count(&doc, "[data-text-split^=wo]"), 1);
        assert_eq!(count(&doc, "[class~=big]"), 1);
    }

    #[test]
    fn test_selector_list_document_order() {
        let doc = doc();
        let list: Selector = "span, em".parse().unwrap();
        let found = doc.query_selector_all(doc.root(), &list);
        assert_eq!(found.len(), 3);
        assert_eq!(doc.tag(found[0]), Some("em"));
        assert_eq!(list.source(), "span, em");
    }

    #[test]
    fn test_combinators() {
        let doc = doc();
        assert_eq!(count(&doc, "div em"), 1);
        assert_eq!(count(&doc, "#hero > span"), 2);
        assert_eq!(count(&doc, "em + span"), 1);
        assert_eq!(count(&doc, "em ~ span"), 2);
        assert_eq!(count(&doc, "p > em"), 0);
    }

    #[test]
    fn test_structural_pseudo_classes() {
        let doc = doc();
        assert_eq!(count(&doc, "span:last-child"), 1);
        assert_eq!(count(&doc, ":not(span)"), 2);
        assert_eq!(count(&doc, "div:has(> em)"), 1);
        assert_eq!(count(&doc, "span:nth-child(2)"), 1);
    }

    #[test]
    fn test_style_attribute_matches_serialized_style() {
        let doc = Document::parse(r#"<b style="color: red">x</b><b>y</b>"#).unwrap();
        assert_eq!(count(&doc, "[style*=red]"), 1);
        assert_eq!(count(&doc, "[style]"), 1);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(Selector::parse("div >"), Err(Error::Selector(_))));
        assert!(matches!(Selector::parse("a:hover"), Err(Error::Selector(_))));
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("a,").is_err());
        assert!(Selector::parse(".").is_err());
    }
}
