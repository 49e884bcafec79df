//! Fragment parsing and serialization on top of kuchiki.

use std::cell::Cell;
use std::iter;

use html5ever::{LocalName, Namespace, QualName};
use kuchiki::{traits::*, Attribute, ExpandedName, NodeRef};

use crate::entities;
use crate::error::Result;

const HTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Containers whose text is never rewritten.
pub(crate) const EXCLUDED: &[&str] = &[
    "head", "link", "pre", "code", "script", "style", "textarea",
];

thread_local! {
    static PARSES: Cell<usize> = const { Cell::new(0) };
    static SERIALIZATIONS: Cell<usize> = const { Cell::new(0) };
}

/// Parses and serializations performed on this thread so far.
pub fn counters() -> (usize, usize) {
    (PARSES.with(Cell::get), SERIALIZATIONS.with(Cell::get))
}

pub struct Document {
    root: NodeRef,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        PARSES.with(|c| c.set(c.get() + 1));
        let protected = entities::protect(html);
        let context = QualName::new(None, Namespace::from(HTML_NS), LocalName::from("body"));
        let document = kuchiki::parse_fragment(context, Vec::new()).one(protected);
        let root = document
            .children()
            .find(|n| tag_name(n) == Some("html"))
            .unwrap_or(document);
        Self { root }
    }

    /// Element holding the fragment's top-level nodes.
    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    pub fn serialize(&self) -> Result<String> {
        SERIALIZATIONS.with(|c| c.set(c.get() + 1));
        let mut buf = Vec::new();
        for child in self.root.children() {
            child.serialize(&mut buf)?;
        }
        let html = String::from_utf8_lossy(&buf);
        Ok(entities::restore(&html))
    }

    /// Every text node in document order, collected up front so callers can
    /// mutate the tree while working through the list.
    pub fn text_nodes(&self) -> Vec<NodeRef> {
        self.root
            .descendants()
            .filter(|n| n.as_text().is_some())
            .collect()
    }

    /// Elements matching `selector`, or `None` if it does not compile.
    pub fn select(&self, selector: &str) -> Option<Vec<NodeRef>> {
        let matches = self.root.select(selector).ok()?;
        Some(matches.map(|m| m.as_node().clone()).collect())
    }
}

pub(crate) fn tag_name(node: &NodeRef) -> Option<&str> {
    node.as_element().map(|el| &*el.name.local)
}

/// True if any ancestor of `node` is one of `tags`.
pub(crate) fn is_within(node: &NodeRef, tags: &[&str]) -> bool {
    node.ancestors()
        .any(|a| tag_name(&a).is_some_and(|t| tags.contains(&t)))
}

pub(crate) fn is_excluded(node: &NodeRef) -> bool {
    is_within(node, EXCLUDED)
}

pub(crate) fn new_element(tag: &str) -> NodeRef {
    let name = QualName::new(None, Namespace::from(HTML_NS), LocalName::from(tag));
    NodeRef::new_element(name, iter::empty::<(ExpandedName, Attribute)>())
}

/// `<a href="{href}">{label}</a>`; both values in placeholder form.
pub(crate) fn new_link(href: &str, label: &str) -> NodeRef {
    let link = new_element("a");
    if let Some(el) = link.as_element() {
        el.attributes.borrow_mut().insert("href", href.to_string());
    }
    link.append(NodeRef::new_text(label));
    link
}

pub(crate) fn text_of(node: &NodeRef) -> Option<String> {
    node.as_text().map(|t| t.borrow().clone())
}

pub(crate) fn set_text(node: &NodeRef, value: String) {
    if let Some(text) = node.as_text() {
        *text.borrow_mut() = value;
    }
}

/// Replace `node` with `parts`, in order. Returns false for a detached node.
pub(crate) fn replace_with(node: &NodeRef, parts: Vec<NodeRef>) -> bool {
    if node.parent().is_none() {
        log::trace!("skipping detached node");
        return false;
    }
    for part in parts {
        node.insert_before(part);
    }
    node.detach();
    true
}
