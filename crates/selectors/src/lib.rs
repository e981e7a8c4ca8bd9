//! Compile-once CSS selector engine over an abstract document tree.
//!
//! Selector text is normalized, validated, and compiled into an AST once
//! per distinct string; matching interprets that AST against a host tree
//! reached through the [`ElementAdapter`] trait. An [`Engine`] owns every
//! cache (compiled selectors, query resolver plans, sibling positions)
//! and the runtime extensibility registry, so independent engines never
//! interfere with each other.
//!
//! ```no_run
//! # use css_selectors::{Engine, ElementAdapter};
//! # fn demo<A: ElementAdapter>(adapter: &A, node: A::Handle) -> css_selectors::Result<()> {
//! let engine = Engine::new();
//! if engine.matches(adapter, "div.note > p:first-child", node, None)? {
//!     // ...
//! }
//! # Ok(())
//! # }
//! ```

mod ast;
mod collect;
mod engine;
mod error;
mod lexer;
mod matcher;
mod nth;
mod parser;
mod registry;

use core::hash::Hash;

pub use ast::{
    AttributeOperation, AttributeOperator, AttributeSelector, CaseSensitivity, Combinator,
    ComplexSelector, CompoundSelector, NamespacePrefix, Nth, PseudoClass, SelectorList,
    SimpleSelector,
};
pub use engine::{Config, ConfigOptions, Engine, MatchCallback};
pub use error::{Error, Result};
pub use registry::{CombinatorResolver, OperatorEval, Registry, SelectorEval};

/// The document capabilities the engine consumes. Implement this for your
/// DOM layer.
///
/// Navigation and naming methods are required; direct lookups and state
/// introspection have conservative defaults so a minimal tree still
/// matches structural selectors correctly.
pub trait ElementAdapter {
    /// Stable element identity. Equality and hashing must mean "same
    /// node", not "equal content".
    type Handle: Copy + Eq + Hash;

    /// Tag (local) name. HTML documents compare tag names ASCII
    /// case-insensitively, so any casing is acceptable here.
    fn tag_name(&self, element: Self::Handle) -> &str;

    /// Namespace of the element, if it has one.
    fn namespace(&self, element: Self::Handle) -> Option<&str>;

    /// Attribute value by name, ignoring attribute namespaces.
    fn attribute(&self, element: Self::Handle, name: &str) -> Option<&str>;

    /// Namespace-aware attribute read. `None` means "only attributes
    /// without a namespace". Defaults to ignoring the namespace.
    fn attribute_ns(
        &self,
        element: Self::Handle,
        namespace: Option<&str>,
        name: &str,
    ) -> Option<&str> {
        let _ = namespace;
        self.attribute(element, name)
    }

    /// Parent element, if any.
    fn parent(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// First child that is an element.
    fn first_element_child(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Last child that is an element.
    fn last_element_child(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Next sibling that is an element.
    fn next_element_sibling(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Previous sibling that is an element.
    fn previous_element_sibling(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Whether the element has a text child with non-empty content.
    /// Consulted by `:empty`.
    fn has_non_empty_text_child(&self, element: Self::Handle) -> bool;

    /// The document's root element.
    fn root(&self) -> Self::Handle;

    /// Whether the document is an HTML document. Drives case-insensitive
    /// tag comparison and the legacy case-insensitive attribute table.
    fn is_html_document(&self) -> bool;

    /// Whether the document is in quirks mode. Drives case-insensitive
    /// class and id comparison.
    fn is_quirks_mode(&self) -> bool {
        false
    }

    /// Direct id lookup, if the host indexes ids. May return multiple
    /// elements when the host does not enforce id uniqueness.
    fn elements_by_id(&self, id: &str) -> Option<Vec<Self::Handle>> {
        let _ = id;
        None
    }

    /// Direct class lookup, if the host indexes classes.
    fn elements_by_class(&self, class: &str) -> Option<Vec<Self::Handle>> {
        let _ = class;
        None
    }

    /// Direct tag lookup, if the host indexes tag names.
    fn elements_by_tag(&self, tag: &str) -> Option<Vec<Self::Handle>> {
        let _ = tag;
        None
    }

    /// The element holding focus, if any. Consulted by `:focus` and
    /// `:focus-within`.
    fn focused_element(&self) -> Option<Self::Handle> {
        None
    }

    /// Whether the document itself has focus.
    fn document_has_focus(&self) -> bool {
        false
    }

    /// The element under the pointer, if any. Consulted by `:hover`.
    fn hovered_element(&self) -> Option<Self::Handle> {
        None
    }

    /// The element being activated (e.g. mouse button held), if any.
    /// Consulted by `:active`.
    fn pressed_element(&self) -> Option<Self::Handle> {
        None
    }

    /// The element addressed by the fragment identifier, if any.
    /// Consulted by `:target`.
    fn target_element(&self) -> Option<Self::Handle> {
        None
    }

    /// Whether a link element has been visited.
    fn is_visited(&self, element: Self::Handle) -> bool {
        let _ = element;
        false
    }

    /// Current checkedness of a checkbox, radio button, or similar.
    fn is_checked(&self, element: Self::Handle) -> bool {
        let _ = element;
        false
    }

    /// Whether a checkbox is in the indeterminate state.
    fn is_indeterminate(&self, element: Self::Handle) -> bool {
        let _ = element;
        false
    }

    /// Constraint-validation result: `Some(true)` valid, `Some(false)`
    /// invalid, `None` when the element is not a candidate. Consulted by
    /// `:valid` and `:invalid`.
    fn validity(&self, element: Self::Handle) -> Option<bool> {
        let _ = element;
        None
    }

    /// Range-check result for range-limited inputs: `Some(true)` in
    /// range, `Some(false)` out of range, `None` when not range-limited.
    fn in_range(&self, element: Self::Handle) -> Option<bool> {
        let _ = element;
        None
    }
}

/// Parse and validate a selector list using the built-in grammar only.
///
/// Convenience for callers that want the AST without an [`Engine`];
/// runtime-registered productions are not visible here.
pub fn parse(text: &str) -> Result<SelectorList> {
    let normalized = lexer::normalize(text);
    parser::parse_selector_list(&normalized, &registry::Grammar::default())
}
