//! Arena-backed node tree.
//!
//! The editable content is a small DOM: element and text nodes stored in a flat arena and
//! addressed by [`NodeId`]. Every id carries the *epoch* of the arena that created it; when a
//! document is replaced wholesale (set content, undo/redo) a fresh arena with a new epoch is
//! built, so ids held across the replacement are detected as stale instead of silently pointing
//! at unrelated nodes.
//!
//! Text offsets are measured in characters (Unicode scalar values), never bytes.

use std::fmt;

/// Handle to a node in a [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    epoch: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.epoch)
    }
}

/// Element payload: lowercase tag name plus attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes as `(name, value)` pairs, names lowercase.
    pub attrs: Vec<(String, String)>,
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// An element node.
    Element(ElementData),
    /// A text node.
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Tags that never have children.
pub const VOID_TAGS: &[&str] = &[
    "br", "img", "hr", "input", "meta", "link", "wbr", "col", "source", "area", "base", "embed",
];

/// Tags treated as block-level units for reordering and per-paragraph styling.
pub const BLOCK_TAGS: &[&str] = &[
    "div",
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "ul",
    "ol",
    "li",
    "table",
    "blockquote",
    "pre",
    "hr",
    "section",
    "article",
    "header",
    "footer",
    "aside",
    "nav",
    "figure",
    "address",
    "dl",
    "dt",
    "dd",
    "main",
    "tr",
];

/// The node arena.
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
    epoch: u32,
    root: NodeId,
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub(crate) fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

impl Dom {
    /// Create an arena whose root is an element with the given tag and attributes.
    pub fn new(root_tag: &str, root_attrs: Vec<(String, String)>, epoch: u32) -> Self {
        let root = NodeId { index: 0, epoch };
        Self {
            nodes: vec![Node {
                data: NodeData::Element(ElementData {
                    tag: root_tag.to_ascii_lowercase(),
                    attrs: root_attrs,
                }),
                parent: None,
                children: Vec::new(),
            }],
            epoch,
            root,
        }
    }

    /// The root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Arena epoch; bumps every time the document is rebuilt.
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Returns `true` if `id` was created by this arena.
    pub fn contains(&self, id: NodeId) -> bool {
        id.epoch == self.epoch && (id.index as usize) < self.nodes.len()
    }

    /// Returns `true` if `id` belongs to this arena and is connected to the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.node(current).parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn node(&self, id: NodeId) -> &Node {
        debug_assert_eq!(id.epoch, self.epoch, "stale node id {id}");
        &self.nodes[id.index as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        debug_assert_eq!(id.epoch, self.epoch, "stale node id {id}");
        &mut self.nodes[id.index as usize]
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId {
            index: self.nodes.len() as u32,
            epoch: self.epoch,
        };
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }))
    }

    /// Create a detached element with attributes.
    pub fn create_element_with(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        self.alloc(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), (*v).to_string()))
                .collect(),
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    /// Shallow copy of an element (tag and attributes, no children), detached.
    pub fn clone_shallow(&mut self, id: NodeId) -> NodeId {
        let data = self.node(id).data.clone();
        match data {
            NodeData::Text(_) => self.alloc(NodeData::Text(String::new())),
            element => self.alloc(element),
        }
    }

    /// Node payload.
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.node(id).data
    }

    /// Parent of a node, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Children in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.last().copied()
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let idx = self.index_in_parent(id)?;
        self.children(parent).get(idx + 1).copied()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let idx = self.index_in_parent(id)?;
        idx.checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    /// Detach a node from its parent. The node and its subtree stay in the arena.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|&c| c != id);
            self.node_mut(id).parent = None;
        }
    }

    /// Insert `child` at `index` among `parent`'s children (clamped), detaching it first.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let children = &mut self.node_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child);
    }

    /// Insert `new` immediately before `reference`.
    pub fn insert_before(&mut self, reference: NodeId, new: NodeId) {
        self.detach(new);
        if let (Some(parent), Some(idx)) = (self.parent(reference), self.index_in_parent(reference))
        {
            self.insert_child(parent, idx, new);
        }
    }

    /// Insert `new` immediately after `reference`.
    pub fn insert_after(&mut self, reference: NodeId, new: NodeId) {
        self.detach(new);
        if let (Some(parent), Some(idx)) = (self.parent(reference), self.index_in_parent(reference))
        {
            self.insert_child(parent, idx + 1, new);
        }
    }

    /// Replace `old` with `new` in `old`'s parent.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        self.insert_before(old, new);
        self.detach(old);
    }

    /// Replace an element with its children.
    pub fn unwrap(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let Some(idx) = self.index_in_parent(id) else {
            return;
        };
        let kids = self.children(id).to_vec();
        for (offset, kid) in kids.into_iter().enumerate() {
            self.insert_child(parent, idx + offset, kid);
        }
        self.detach(id);
    }

    /// Put `wrapper` where `id` is and move `id` inside it.
    pub fn wrap(&mut self, id: NodeId, wrapper: NodeId) {
        self.insert_before(id, wrapper);
        self.append_child(wrapper, id);
    }

    /// Remove all children of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.detach(child);
        }
    }

    /// Text of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Text(_))
    }

    /// Replace the text of a text node; no-op on elements.
    pub fn set_text(&mut self, id: NodeId, value: &str) {
        if let NodeData::Text(text) = &mut self.node_mut(id).data {
            value.clone_into(text);
        }
    }

    /// Split a text node at `char_offset`. The node keeps the head; the returned new node
    /// holds the tail and is inserted right after it.
    pub fn split_text(&mut self, id: NodeId, char_offset: usize) -> NodeId {
        let tail = match &mut self.node_mut(id).data {
            NodeData::Text(text) => {
                let at = byte_index(text, char_offset);
                text.split_off(at)
            }
            NodeData::Element(_) => String::new(),
        };
        let new = self.create_text(&tail);
        if self.parent(id).is_some() {
            self.insert_after(id, new);
        }
        new
    }

    /// Element payload.
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id).data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.node_mut(id).data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    /// Lowercase tag name of an element.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn has_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id) == Some(tag)
    }

    /// Rename an element, keeping attributes and children.
    pub fn set_tag(&mut self, id: NodeId, tag: &str) {
        if let Some(el) = self.element_mut(id) {
            el.tag = tag.to_ascii_lowercase();
        }
    }

    pub fn is_block(&self, id: NodeId) -> bool {
        self.tag(id).is_some_and(|t| BLOCK_TAGS.contains(&t))
    }

    pub fn is_void(&self, id: NodeId) -> bool {
        self.tag(id).is_some_and(|t| VOID_TAGS.contains(&t))
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        match el.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => value.clone_into(v),
            None => el.attrs.push((name.to_ascii_lowercase(), value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.attrs.retain(|(k, _)| k != name);
        }
    }

    /// Whitespace-separated class names.
    pub fn classes(&self, id: NodeId) -> Vec<&str> {
        self.attr(id, "class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).contains(&class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let mut classes: Vec<String> = self.classes(id).into_iter().map(String::from).collect();
        classes.push(class.to_string());
        self.set_attr(id, "class", &classes.join(" "));
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let classes: Vec<String> = self
            .classes(id)
            .into_iter()
            .filter(|c| *c != class)
            .map(String::from)
            .collect();
        if classes.is_empty() {
            self.remove_attr(id, "class");
        } else {
            self.set_attr(id, "class", &classes.join(" "));
        }
    }

    /// Inline style declarations as `(property, value)` pairs.
    pub fn style_properties(&self, id: NodeId) -> Vec<(String, String)> {
        self.attr(id, "style")
            .map(parse_style)
            .unwrap_or_default()
    }

    /// Value of one inline style property.
    pub fn style(&self, id: NodeId, property: &str) -> Option<String> {
        self.style_properties(id)
            .into_iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v)
    }

    /// Set (or with an empty value, remove) an inline style property.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        let mut props = self.style_properties(id);
        props.retain(|(k, _)| k != property);
        if !value.is_empty() {
            props.push((property.to_ascii_lowercase(), value.to_string()));
        }
        if props.is_empty() {
            self.remove_attr(id, "style");
        } else {
            let style = props
                .iter()
                .map(|(k, v)| format!("{k}: {v};"))
                .collect::<Vec<_>>()
                .join(" ");
            self.set_attr(id, "style", &style);
        }
    }

    /// Ancestors of `id`, nearest first, up to and including the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            dom: self,
            next: self.parent(id),
        }
    }

    /// Returns `true` if `ancestor` strictly contains `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Nearest inclusive ancestor with the given tag.
    pub fn closest(&self, id: NodeId, tags: &[&str]) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| self.tag(n).is_some_and(|t| tags.contains(&t)))
    }

    /// All descendants of `id` in document (pre-)order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Descendant text nodes in document order.
    pub fn text_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.is_text(n))
            .collect()
    }

    /// Descendant elements with the given tag, in document order.
    pub fn elements_by_tag(&self, id: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.has_tag(n, tag))
            .collect()
    }

    /// Descendant elements carrying a class, in document order.
    pub fn elements_by_class(&self, id: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.has_class(n, class))
            .collect()
    }

    /// Concatenated text of all descendant text nodes (DOM `textContent`).
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.text_nodes(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Merge adjacent text nodes and drop empty ones below `id` (DOM `normalize`).
    pub fn normalize(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        let mut previous_text: Option<NodeId> = None;
        for child in children {
            match self.text(child).map(str::to_string) {
                Some(text) if text.is_empty() => self.detach(child),
                Some(text) => match previous_text {
                    Some(prev) => {
                        if let NodeData::Text(prev_text) = &mut self.node_mut(prev).data {
                            prev_text.push_str(&text);
                        }
                        self.detach(child);
                    }
                    None => previous_text = Some(child),
                },
                None => {
                    previous_text = None;
                    self.normalize(child);
                }
            }
        }
    }
}

/// Iterator over a node's ancestors.
pub struct Ancestors<'a> {
    dom: &'a Dom,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.dom.parent(current);
        Some(current)
    }
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let k = k.trim().to_ascii_lowercase();
            let v = v.trim();
            (!k.is_empty() && !v.is_empty()).then(|| (k, v.to_string()))
        })
        .collect()
}
