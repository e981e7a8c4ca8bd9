//! Candidate gathering and result ordering.
//!
//! Before a compiled matcher filters anything, a fast path narrows the
//! candidate set using the most specific simple selector of each
//! expression's rightmost compound. Host-provided direct lookups are used
//! opportunistically; everything falls back to a pre-order subtree walk.
//! Candidates only need to be a superset of the true matches, the matcher
//! re-checks every one.

use rustc_hash::FxHashSet;

use crate::ElementAdapter;
use crate::ast::{CompoundSelector, SimpleSelector};

/// Pre-order traversal of the element subtree rooted at `scope`.
pub(crate) struct Descendants<'a, A: ElementAdapter> {
    adapter: &'a A,
    scope: A::Handle,
    next: Option<A::Handle>,
}

impl<'a, A: ElementAdapter> Descendants<'a, A> {
    pub(crate) fn new(adapter: &'a A, scope: A::Handle, include_scope: bool) -> Self {
        let next = if include_scope {
            Some(scope)
        } else {
            adapter.first_element_child(scope)
        };
        Self {
            adapter,
            scope,
            next,
        }
    }
}

impl<A: ElementAdapter> Iterator for Descendants<'_, A> {
    type Item = A::Handle;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let mut upcoming = self.adapter.first_element_child(current);
        if upcoming.is_none() && current != self.scope {
            // Climb until a next sibling exists, stopping at the scope.
            let mut cursor = current;
            loop {
                if let Some(sibling) = self.adapter.next_element_sibling(cursor) {
                    upcoming = Some(sibling);
                    break;
                }
                match self.adapter.parent(cursor) {
                    Some(parent) if parent != self.scope => cursor = parent,
                    _ => break,
                }
            }
        }
        self.next = upcoming;
        Some(current)
    }
}

/// Candidate-gathering strategy, most specific criterion first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FastPath {
    Id(String),
    Class(String),
    Tag(String),
    Universal,
}

/// Pick the strategy from an expression's rightmost compound.
pub(crate) fn choose_fast_path(rightmost: &CompoundSelector) -> FastPath {
    let mut class = None;
    let mut tag = None;
    for simple in &rightmost.simples {
        match simple {
            SimpleSelector::Id(id) => return FastPath::Id(id.clone()),
            SimpleSelector::Class(name) => {
                if class.is_none() {
                    class = Some(name.clone());
                }
            }
            SimpleSelector::Type { name, .. } => {
                if tag.is_none() {
                    tag = Some(name.clone());
                }
            }
            _ => {}
        }
    }
    if let Some(name) = class {
        return FastPath::Class(name);
    }
    if let Some(name) = tag {
        return FastPath::Tag(name);
    }
    FastPath::Universal
}

/// Gather candidates for one expression within the `scope` subtree.
pub(crate) fn collect_candidates<A: ElementAdapter>(
    adapter: &A,
    path: &FastPath,
    scope: A::Handle,
    include_scope: bool,
    ids_dupes: bool,
    is_html: bool,
    quirks: bool,
) -> Vec<A::Handle> {
    match path {
        FastPath::Id(id) => {
            if let Some(found) = adapter.elements_by_id(id) {
                let mut results = restrict_to_scope(adapter, found, scope, include_scope);
                // Without `ids_dupes`, only the first element carrying the
                // id counts, no matter which route gathered it.
                if !ids_dupes {
                    results.truncate(1);
                }
                return results;
            }
            let mut results = Vec::new();
            for candidate in Descendants::new(adapter, scope, include_scope) {
                let matched = adapter.attribute(candidate, "id").is_some_and(|value| {
                    if quirks {
                        value.eq_ignore_ascii_case(id)
                    } else {
                        value == id.as_str()
                    }
                });
                if matched {
                    results.push(candidate);
                    if !ids_dupes {
                        break;
                    }
                }
            }
            results
        }
        FastPath::Class(class) => {
            if let Some(found) = adapter.elements_by_class(class) {
                return restrict_to_scope(adapter, found, scope, include_scope);
            }
            Descendants::new(adapter, scope, include_scope)
                .filter(|candidate| has_class_token(adapter, *candidate, class, quirks))
                .collect()
        }
        FastPath::Tag(tag) => {
            if let Some(found) = adapter.elements_by_tag(tag) {
                return restrict_to_scope(adapter, found, scope, include_scope);
            }
            Descendants::new(adapter, scope, include_scope)
                .filter(|candidate| {
                    let actual = adapter.tag_name(*candidate);
                    if is_html {
                        actual.eq_ignore_ascii_case(tag)
                    } else {
                        actual == tag.as_str()
                    }
                })
                .collect()
        }
        FastPath::Universal => Descendants::new(adapter, scope, include_scope).collect(),
    }
}

/// Drop direct-lookup results that fall outside the context subtree.
fn restrict_to_scope<A: ElementAdapter>(
    adapter: &A,
    found: Vec<A::Handle>,
    scope: A::Handle,
    include_scope: bool,
) -> Vec<A::Handle> {
    found
        .into_iter()
        .filter(|candidate| in_scope(adapter, *candidate, scope, include_scope))
        .collect()
}

fn in_scope<A: ElementAdapter>(
    adapter: &A,
    candidate: A::Handle,
    scope: A::Handle,
    include_scope: bool,
) -> bool {
    if candidate == scope {
        return include_scope;
    }
    let mut cursor = adapter.parent(candidate);
    while let Some(ancestor) = cursor {
        if ancestor == scope {
            return true;
        }
        cursor = adapter.parent(ancestor);
    }
    false
}

fn has_class_token<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    class: &str,
    quirks: bool,
) -> bool {
    adapter.attribute(element, "class").is_some_and(|value| {
        value.split_ascii_whitespace().any(|token| {
            if quirks {
                token.eq_ignore_ascii_case(class)
            } else {
                token == class
            }
        })
    })
}

/// Identity-dedup, then sort into pre-order document position.
pub(crate) fn sort_document_order<A: ElementAdapter>(adapter: &A, results: &mut Vec<A::Handle>) {
    let mut seen = FxHashSet::default();
    results.retain(|handle| seen.insert(*handle));
    results.sort_by_cached_key(|handle| tree_path(adapter, *handle));
}

/// Child-index path from the root down to `node`; lexicographic order on
/// these paths is document order.
fn tree_path<A: ElementAdapter>(adapter: &A, node: A::Handle) -> Vec<u32> {
    let mut path = Vec::new();
    let mut cursor = Some(node);
    while let Some(current) = cursor {
        let mut index = 0u32;
        let mut sibling = adapter.previous_element_sibling(current);
        while let Some(previous) = sibling {
            index = index.saturating_add(1);
            sibling = adapter.previous_element_sibling(previous);
        }
        path.push(index);
        cursor = adapter.parent(current);
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::{FastPath, choose_fast_path};
    use crate::ast::{CompoundSelector, NamespacePrefix, PseudoClass, SimpleSelector};

    #[test]
    fn id_beats_class_and_tag() {
        let compound = CompoundSelector {
            simples: smallvec![
                SimpleSelector::Type {
                    prefix: NamespacePrefix::Unprefixed,
                    name: "div".to_owned(),
                },
                SimpleSelector::Class("note".to_owned()),
                SimpleSelector::Id("main".to_owned()),
            ],
        };
        assert_eq!(choose_fast_path(&compound), FastPath::Id("main".to_owned()));
    }

    #[test]
    fn class_beats_tag() {
        let compound = CompoundSelector {
            simples: smallvec![
                SimpleSelector::Type {
                    prefix: NamespacePrefix::Unprefixed,
                    name: "div".to_owned(),
                },
                SimpleSelector::Class("note".to_owned()),
            ],
        };
        assert_eq!(
            choose_fast_path(&compound),
            FastPath::Class("note".to_owned())
        );
    }

    #[test]
    fn pseudo_only_compound_walks_everything() {
        let compound = CompoundSelector {
            simples: smallvec![SimpleSelector::PseudoClass(PseudoClass::FirstChild)],
        };
        assert_eq!(choose_fast_path(&compound), FastPath::Universal);
    }
}
