//! Arena-based document tree used as the reference selector host.
//!
//! This crate is test tooling: it provides just enough of a document model
//! (elements, text, attributes, sibling navigation, and a handful of UI
//! state flags) to exercise every selector production. It knows nothing
//! about selectors themselves.

#![forbid(unsafe_code)]

use smallvec::SmallVec;

/// Stable handle to a node inside a [`Document`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Payload of a single arena node.
#[derive(Clone, Debug)]
pub enum NodeData {
    /// An element with a tag name and attributes.
    Element(ElementData),
    /// A text node.
    Text(String),
}

/// Element payload: tag name, optional namespace, attributes, and the
/// dynamic state bits selectors can observe.
#[derive(Clone, Debug, Default)]
pub struct ElementData {
    /// Tag name, stored lower-cased.
    pub tag: String,
    /// Optional namespace URI.
    pub namespace: Option<String>,
    /// Attribute name/value pairs, names stored lower-cased.
    pub attrs: SmallVec<(String, String), 4>,
    /// Checkedness, as toggled by user interaction.
    pub checked: bool,
    /// Indeterminate state of checkbox-like controls.
    pub indeterminate: bool,
    /// Constraint-validation verdict, if the element participates.
    pub validity: Option<bool>,
    /// Range verdict for range-limited controls, if applicable.
    pub in_range: Option<bool>,
    /// Whether a link element points at a visited location.
    pub visited: bool,
}

/// One node in the arena.
#[derive(Clone, Debug)]
pub struct Node {
    /// Node payload.
    pub data: NodeData,
    /// Parent node, if attached.
    pub parent: Option<NodeId>,
    /// Child nodes in document order.
    pub children: SmallVec<NodeId, 8>,
}

/// A document: an arena of nodes plus document-wide state.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    /// Whether this is an HTML document (drives case-insensitive tag match).
    pub html: bool,
    /// Whether the document is in quirks mode.
    pub quirks: bool,
    /// Element holding keyboard focus.
    pub focused: Option<NodeId>,
    /// Whether the document itself has focus.
    pub has_focus: bool,
    /// Element currently under the pointer.
    pub hovered: Option<NodeId>,
    /// Element currently being activated (e.g. mouse button held).
    pub pressed: Option<NodeId>,
    /// Element addressed by the URL fragment.
    pub fragment_target: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty HTML document.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            html: true,
            quirks: false,
            focused: None,
            has_focus: false,
            hovered: None,
            pressed: None,
            fragment_target: None,
        }
    }

    /// Create a detached element with the given tag name.
    pub fn new_element(&mut self, tag: &str) -> NodeId {
        let node_id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data: NodeData::Element(ElementData {
                tag: tag.to_ascii_lowercase(),
                ..ElementData::default()
            }),
            parent: None,
            children: SmallVec::new(),
        });
        if self.root.is_none() {
            self.root = Some(node_id);
        }
        node_id
    }

    /// Create an element and append it to `parent` in one step.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node_id = self.new_element(tag);
        self.append_child(parent, node_id);
        node_id
    }

    /// Create an element under `parent` with the given attributes.
    pub fn append_element_with(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> NodeId {
        let node_id = self.append_element(parent, tag);
        for (name, value) in attrs {
            self.set_attr(node_id, name, value);
        }
        node_id
    }

    /// Append a text node to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let node_id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data: NodeData::Text(text.to_owned()),
            parent: Some(parent),
            children: SmallVec::new(),
        });
        self.nodes[parent.0].children.push(node_id);
        node_id
    }

    /// Attach `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Detach `child` from `parent`. The node stays in the arena but is no
    /// longer reachable through traversal.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let children = &mut self.nodes[parent.0].children;
        if let Some(position) = children.iter().position(|&entry| entry == child) {
            children.remove(position);
            self.nodes[child.0].parent = None;
        }
    }

    /// The document root element, if any.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Override the document root element.
    pub fn set_root(&mut self, node_id: NodeId) {
        self.root = Some(node_id);
    }

    /// Borrow a node.
    pub fn node(&self, node_id: NodeId) -> &Node {
        &self.nodes[node_id.0]
    }

    /// Borrow the element payload of a node, if it is an element.
    pub fn element(&self, node_id: NodeId) -> Option<&ElementData> {
        match &self.nodes[node_id.0].data {
            NodeData::Element(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    /// Mutably borrow the element payload of a node.
    pub fn element_mut(&mut self, node_id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[node_id.0].data {
            NodeData::Element(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    /// Set (or replace) an attribute. Names are lower-cased on the way in.
    pub fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) {
        let lowered = name.to_ascii_lowercase();
        if let Some(element) = self.element_mut(node_id) {
            if let Some(entry) = element
                .attrs
                .iter_mut()
                .find(|(existing, _)| *existing == lowered)
            {
                entry.1 = value.to_owned();
            } else {
                element.attrs.push((lowered, value.to_owned()));
            }
        }
    }

    /// Read an attribute value.
    pub fn attr(&self, node_id: NodeId, name: &str) -> Option<&str> {
        let lowered = name.to_ascii_lowercase();
        self.element(node_id)?
            .attrs
            .iter()
            .find(|(existing, _)| *existing == lowered)
            .map(|(_, value)| value.as_str())
    }

    /// Parent node.
    pub fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes[node_id.0].parent
    }

    /// Child list in document order (elements and text).
    pub fn children(&self, node_id: NodeId) -> &[NodeId] {
        &self.nodes[node_id.0].children
    }

    /// Whether the node is an element.
    pub fn is_element(&self, node_id: NodeId) -> bool {
        matches!(self.nodes[node_id.0].data, NodeData::Element(_))
    }

    /// First child that is an element.
    pub fn first_element_child(&self, node_id: NodeId) -> Option<NodeId> {
        self.children(node_id)
            .iter()
            .copied()
            .find(|&child| self.is_element(child))
    }

    /// Last child that is an element.
    pub fn last_element_child(&self, node_id: NodeId) -> Option<NodeId> {
        self.children(node_id)
            .iter()
            .rev()
            .copied()
            .find(|&child| self.is_element(child))
    }

    /// Next sibling that is an element.
    pub fn next_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let parent = self.parent(node_id)?;
        let siblings = self.children(parent);
        let position = siblings.iter().position(|&entry| entry == node_id)?;
        siblings
            .iter()
            .skip(position.saturating_add(1))
            .copied()
            .find(|&sibling| self.is_element(sibling))
    }

    /// Previous sibling that is an element.
    pub fn previous_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let parent = self.parent(node_id)?;
        let siblings = self.children(parent);
        let position = siblings.iter().position(|&entry| entry == node_id)?;
        siblings
            .get(..position)?
            .iter()
            .rev()
            .copied()
            .find(|&sibling| self.is_element(sibling))
    }

    /// Whether the node has a text child with non-empty content.
    pub fn has_non_empty_text_child(&self, node_id: NodeId) -> bool {
        self.children(node_id).iter().any(|&child| {
            matches!(&self.nodes[child.0].data, NodeData::Text(text) if !text.is_empty())
        })
    }
}
