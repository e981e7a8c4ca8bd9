//! Shared test host: a [`domtree::Document`] behind the engine's adapter
//! trait.
//!
//! Direct lookups are only provided for tag names, so the id and class
//! fast paths exercise the engine's manual-walk fallback while the tag
//! fast path exercises the host-lookup route.

use css_selectors::ElementAdapter;
use domtree::{Document, NodeId};

pub struct Doc(pub Document);

impl Doc {
    pub fn new() -> Self {
        Self(Document::new())
    }
}

#[allow(dead_code, reason = "not every test binary uses every helper")]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

impl ElementAdapter for Doc {
    type Handle = NodeId;

    fn tag_name(&self, element: NodeId) -> &str {
        self.0.element(element).map_or("", |data| data.tag.as_str())
    }

    fn namespace(&self, element: NodeId) -> Option<&str> {
        self.0.element(element)?.namespace.as_deref()
    }

    fn attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        self.0.attr(element, name)
    }

    fn parent(&self, element: NodeId) -> Option<NodeId> {
        self.0.parent(element)
    }

    fn first_element_child(&self, element: NodeId) -> Option<NodeId> {
        self.0.first_element_child(element)
    }

    fn last_element_child(&self, element: NodeId) -> Option<NodeId> {
        self.0.last_element_child(element)
    }

    fn next_element_sibling(&self, element: NodeId) -> Option<NodeId> {
        self.0.next_element_sibling(element)
    }

    fn previous_element_sibling(&self, element: NodeId) -> Option<NodeId> {
        self.0.previous_element_sibling(element)
    }

    fn has_non_empty_text_child(&self, element: NodeId) -> bool {
        self.0.has_non_empty_text_child(element)
    }

    fn root(&self) -> NodeId {
        self.0.root().expect("test document has a root")
    }

    fn is_html_document(&self) -> bool {
        self.0.html
    }

    fn is_quirks_mode(&self) -> bool {
        self.0.quirks
    }

    fn elements_by_tag(&self, tag: &str) -> Option<Vec<NodeId>> {
        let root = self.0.root()?;
        let mut results = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if self
                .0
                .element(node)
                .is_some_and(|data| data.tag.eq_ignore_ascii_case(tag))
            {
                results.push(node);
            }
            for &child in self.0.children(node).iter().rev() {
                stack.push(child);
            }
        }
        Some(results)
    }

    fn focused_element(&self) -> Option<NodeId> {
        self.0.focused
    }

    fn document_has_focus(&self) -> bool {
        self.0.has_focus
    }

    fn hovered_element(&self) -> Option<NodeId> {
        self.0.hovered
    }

    fn pressed_element(&self) -> Option<NodeId> {
        self.0.pressed
    }

    fn target_element(&self) -> Option<NodeId> {
        self.0.fragment_target
    }

    fn is_visited(&self, element: NodeId) -> bool {
        self.0.element(element).is_some_and(|data| data.visited)
    }

    fn is_checked(&self, element: NodeId) -> bool {
        self.0.element(element).is_some_and(|data| data.checked)
    }

    fn is_indeterminate(&self, element: NodeId) -> bool {
        self.0
            .element(element)
            .is_some_and(|data| data.indeterminate)
    }

    fn validity(&self, element: NodeId) -> Option<bool> {
        self.0.element(element)?.validity
    }

    fn in_range(&self, element: NodeId) -> Option<bool> {
        self.0.element(element)?.in_range
    }
}

/// `<html><body>...</body></html>`, returning `(doc, html, body)`.
#[allow(dead_code, reason = "not every test binary uses every helper")]
pub fn page() -> (Doc, NodeId, NodeId) {
    let mut doc = Doc::new();
    let html = doc.0.new_element("html");
    let body = doc.0.append_element(html, "body");
    (doc, html, body)
}
