//! Sibling-position memoization for the `nth-*` pseudo-classes.
//!
//! Computing a node's 1-based position among its element siblings is
//! linear in the sibling count; a compiled matcher run tends to ask for
//! many positions under the same parent in a row. The cache keeps one
//! most-recently-used slot per flavor (plain element position, and
//! tag-filtered of-type position) so repeated queries under one parent
//! stay amortized O(1).
//!
//! The cache must be reset at the start of every top-level matching run:
//! sibling lists are snapshots and would otherwise leak between
//! independent queries across tree mutations.

use crate::ElementAdapter;

/// Cached sibling list for the plain element-position flavor.
struct Slot<H> {
    parent: H,
    list: Vec<H>,
    index: usize,
}

/// Cached sibling list for the of-type flavor, additionally keyed by tag
/// name.
struct TypedSlot<H> {
    parent: H,
    tag: String,
    list: Vec<H>,
    index: usize,
}

/// Most-recently-used sibling-position cache.
///
/// The two flavors hold separate slots, so interleaving of-type and
/// non-of-type queries against the same parent cannot evict each other.
pub(crate) struct NthCache<H> {
    element: Option<Slot<H>>,
    of_type: Option<TypedSlot<H>>,
}

impl<H> Default for NthCache<H> {
    fn default() -> Self {
        Self {
            element: None,
            of_type: None,
        }
    }
}

impl<H: Copy + Eq> NthCache<H> {
    /// Drop all cached state. Called at the start of each top-level run.
    pub(crate) fn reset(&mut self) {
        self.element = None;
        self.of_type = None;
    }

    /// 1-based position of `node` among its element siblings, counted from
    /// the start, or from the end when `from_end` is set.
    pub(crate) fn position<A>(&mut self, adapter: &A, node: H, from_end: bool) -> usize
    where
        A: ElementAdapter<Handle = H>,
    {
        let Some(parent) = adapter.parent(node) else {
            // Detached or root node: derive the position by walking
            // siblings directly, without caching.
            return uncached_position(adapter, node, from_end);
        };

        if let Some(slot) = self.element.as_mut()
            && slot.parent == parent
        {
            if slot.list.get(slot.index) != Some(&node) {
                match locate(&slot.list, node) {
                    Some(found) => slot.index = found,
                    None => {
                        // The tree changed under us: rebuild the snapshot.
                        slot.list = element_children(adapter, parent, None);
                        slot.index = locate(&slot.list, node).unwrap_or(0);
                    }
                }
            }
            return resolve(slot.list.len(), slot.index, from_end);
        }

        let list = element_children(adapter, parent, None);
        if list.len() <= 1 {
            // Trivial outcome; not worth a durable cache entry.
            return 1;
        }
        let index = locate(&list, node).unwrap_or(0);
        let length = list.len();
        self.element = Some(Slot {
            parent,
            list,
            index,
        });
        resolve(length, index, from_end)
    }

    /// 1-based position of `node` among element siblings sharing its tag
    /// name.
    pub(crate) fn position_of_type<A>(&mut self, adapter: &A, node: H, from_end: bool) -> usize
    where
        A: ElementAdapter<Handle = H>,
    {
        let tag = adapter.tag_name(node).to_ascii_lowercase();
        let Some(parent) = adapter.parent(node) else {
            return 1;
        };

        if let Some(slot) = self.of_type.as_mut()
            && slot.parent == parent
            && slot.tag == tag
        {
            if slot.list.get(slot.index) != Some(&node) {
                match locate(&slot.list, node) {
                    Some(found) => slot.index = found,
                    None => {
                        slot.list = element_children(adapter, parent, Some(&tag));
                        slot.index = locate(&slot.list, node).unwrap_or(0);
                    }
                }
            }
            return resolve(slot.list.len(), slot.index, from_end);
        }

        let list = element_children(adapter, parent, Some(&tag));
        if list.len() <= 1 {
            return 1;
        }
        let index = locate(&list, node).unwrap_or(0);
        let length = list.len();
        self.of_type = Some(TypedSlot {
            parent,
            tag,
            list,
            index,
        });
        resolve(length, index, from_end)
    }
}

/// Scan the list for `node` from both ends simultaneously.
fn locate<H: Copy + Eq>(list: &[H], node: H) -> Option<usize> {
    let mut front = 0usize;
    let mut back = list.len().checked_sub(1)?;
    loop {
        if list.get(front) == Some(&node) {
            return Some(front);
        }
        if list.get(back) == Some(&node) {
            return Some(back);
        }
        if front >= back {
            return None;
        }
        front = front.saturating_add(1);
        back = back.saturating_sub(1);
    }
}

/// Snapshot the element children of `parent`, optionally filtered by tag
/// name (ASCII case-insensitive).
fn element_children<A: ElementAdapter>(
    adapter: &A,
    parent: A::Handle,
    tag: Option<&str>,
) -> Vec<A::Handle> {
    let mut children = Vec::new();
    let mut cursor = adapter.first_element_child(parent);
    while let Some(child) = cursor {
        let keep = tag.is_none_or(|name| adapter.tag_name(child).eq_ignore_ascii_case(name));
        if keep {
            children.push(child);
        }
        cursor = adapter.next_element_sibling(child);
    }
    children
}

/// Convert a 0-based index into the requested 1-based position.
fn resolve(length: usize, index: usize, from_end: bool) -> usize {
    if from_end {
        length.saturating_sub(index)
    } else {
        index.saturating_add(1)
    }
}

/// Position without touching the cache, for parentless nodes.
fn uncached_position<A: ElementAdapter>(adapter: &A, node: A::Handle, from_end: bool) -> usize {
    let mut count = 0usize;
    let mut cursor = Some(node);
    while let Some(current) = cursor {
        count = count.saturating_add(1);
        cursor = if from_end {
            adapter.next_element_sibling(current)
        } else {
            adapter.previous_element_sibling(current)
        };
    }
    count
}
