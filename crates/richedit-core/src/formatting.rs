//! Rich-text editing primitives.
//!
//! These functions are the engine's own implementation of the operations a contenteditable
//! surface normally gets from the browser: inline style toggles, font and colour runs, block
//! alignment, lists, indentation, text insertion and deletion, paragraph breaks, and the
//! derivation of the formatting state at the caret.
//!
//! Every primitive takes the tree, the editable root and a live [`Range`], and leaves the tree
//! structurally valid. Callers that need the selection afterwards should capture it as a
//! [`LogicalSelection`](crate::selection::LogicalSelection) first: text offsets are preserved by
//! every formatting primitive even though nodes are split and re-parented.

use serde::{Deserialize, Serialize};

use crate::dom::{Dom, NodeId, byte_index, char_len};
use crate::html;
use crate::selection::{self, Boundary, Range};

/// An inline character style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineStyle {
    /// `<b>`
    Bold,
    /// `<i>`
    Italic,
    /// `<u>`
    Underline,
    /// `<strike>`
    Strikethrough,
    /// `<sup>`
    Superscript,
    /// `<sub>`
    Subscript,
}

impl InlineStyle {
    /// Every inline style.
    pub const ALL: [InlineStyle; 6] = [
        InlineStyle::Bold,
        InlineStyle::Italic,
        InlineStyle::Underline,
        InlineStyle::Strikethrough,
        InlineStyle::Superscript,
        InlineStyle::Subscript,
    ];

    /// Tag used when applying the style.
    pub fn tag(self) -> &'static str {
        match self {
            InlineStyle::Bold => "b",
            InlineStyle::Italic => "i",
            InlineStyle::Underline => "u",
            InlineStyle::Strikethrough => "strike",
            InlineStyle::Superscript => "sup",
            InlineStyle::Subscript => "sub",
        }
    }

    /// Tags recognised as carrying the style.
    pub fn tags(self) -> &'static [&'static str] {
        match self {
            InlineStyle::Bold => &["b", "strong"],
            InlineStyle::Italic => &["i", "em"],
            InlineStyle::Underline => &["u"],
            InlineStyle::Strikethrough => &["s", "strike", "del"],
            InlineStyle::Superscript => &["sup"],
            InlineStyle::Subscript => &["sub"],
        }
    }

    fn in_css(self, dom: &Dom, id: NodeId) -> bool {
        match self {
            InlineStyle::Bold => dom.style(id, "font-weight").is_some_and(|w| {
                w == "bold" || w == "bolder" || w.parse::<u32>().is_ok_and(|n| n >= 600)
            }),
            InlineStyle::Italic => dom
                .style(id, "font-style")
                .is_some_and(|s| s == "italic" || s == "oblique"),
            InlineStyle::Underline => dom
                .style(id, "text-decoration")
                .is_some_and(|d| d.contains("underline")),
            InlineStyle::Strikethrough => dom
                .style(id, "text-decoration")
                .is_some_and(|d| d.contains("line-through")),
            InlineStyle::Superscript | InlineStyle::Subscript => false,
        }
    }
}

/// Horizontal text alignment of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left aligned.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
    /// Justified.
    Justify,
}

impl Alignment {
    /// CSS `text-align` value.
    pub fn css(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }

    /// Parse a CSS `text-align` value.
    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim() {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// List flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// `<ul>`
    Bullet,
    /// `<ol>`
    Numbered,
}

impl ListKind {
    /// List element tag.
    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "ul",
            ListKind::Numbered => "ol",
        }
    }
}

/// Formatting at the selection start, as reported to the host toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormatState {
    /// Bold active.
    pub bold: bool,
    /// Italic active.
    pub italic: bool,
    /// Underline active.
    pub underline: bool,
    /// Strikethrough active.
    pub strikethrough: bool,
    /// Superscript active.
    pub superscript: bool,
    /// Subscript active.
    pub subscript: bool,
    /// Block alignment.
    pub alignment: Alignment,
}

impl FormatState {
    /// Whether `style` is active.
    pub fn is_active(&self, style: InlineStyle) -> bool {
        match style {
            InlineStyle::Bold => self.bold,
            InlineStyle::Italic => self.italic,
            InlineStyle::Underline => self.underline,
            InlineStyle::Strikethrough => self.strikethrough,
            InlineStyle::Superscript => self.superscript,
            InlineStyle::Subscript => self.subscript,
        }
    }

    /// Set whether `style` is active.
    pub fn set(&mut self, style: InlineStyle, on: bool) {
        let flag = match style {
            InlineStyle::Bold => &mut self.bold,
            InlineStyle::Italic => &mut self.italic,
            InlineStyle::Underline => &mut self.underline,
            InlineStyle::Strikethrough => &mut self.strikethrough,
            InlineStyle::Superscript => &mut self.superscript,
            InlineStyle::Subscript => &mut self.subscript,
        };
        *flag = on;
    }

    /// JSON payload for the host bridge.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn is_block_container(dom: &Dom, id: NodeId) -> bool {
    dom.is_block(id) || dom.has_tag(id, "td") || dom.has_tag(id, "th")
}

fn is_cell(dom: &Dom, id: NodeId) -> bool {
    dom.has_tag(id, "td") || dom.has_tag(id, "th")
}

/// Elements that can directly hold typed text.
fn hosts_text(dom: &Dom, id: NodeId) -> bool {
    dom.element(id).is_some()
        && !dom.is_void(id)
        && !matches!(
            dom.tag(id),
            Some("table" | "thead" | "tbody" | "tfoot" | "tr" | "ul" | "ol")
        )
}

/// Character bounds of a range, ordered.
pub fn bounds(dom: &Dom, root: NodeId, range: &Range) -> (usize, usize) {
    let a = selection::offset_of(dom, root, range.start).unwrap_or(0);
    let b = selection::offset_of(dom, root, range.end).unwrap_or(a);
    (a.min(b), a.max(b))
}

/// The node a boundary points into: a text node, or the child at an element offset.
fn boundary_node(dom: &Dom, at: Boundary) -> NodeId {
    if dom.is_text(at.node) {
        return at.node;
    }
    let children = dom.children(at.node);
    match children.len() {
        0 => at.node,
        len => children[at.offset.min(len - 1)],
    }
}

/// Nearest block container of `node` strictly below `root`.
pub fn enclosing_block(dom: &Dom, root: NodeId, node: NodeId) -> Option<NodeId> {
    std::iter::once(node)
        .chain(dom.ancestors(node))
        .take_while(|&n| n != root)
        .find(|&n| is_block_container(dom, n))
}

/// Like [`enclosing_block`], but inline content sitting directly on the root is wrapped in a
/// new `<div>` first.
fn block_for_editing(dom: &mut Dom, root: NodeId, node: NodeId) -> Option<NodeId> {
    if node == root {
        return None;
    }
    if let Some(block) = enclosing_block(dom, root, node) {
        return Some(block);
    }
    let top = std::iter::once(node)
        .chain(dom.ancestors(node))
        .find(|&n| dom.parent(n) == Some(root))?;
    let div = dom.create_element("div");
    dom.wrap(top, div);
    Some(div)
}

/// Split text nodes so the characters in `[start, end)` are exactly covered by whole text
/// nodes, and return those nodes in document order.
pub fn isolate_text(dom: &mut Dom, root: NodeId, start: usize, end: usize) -> Vec<NodeId> {
    let mut out = Vec::new();
    if start >= end {
        return out;
    }
    let mut seen = 0;
    for node in dom.text_nodes(root) {
        let len = dom.text(node).map(char_len).unwrap_or(0);
        let (node_start, node_end) = (seen, seen + len);
        seen = node_end;
        if node_start >= end {
            break;
        }
        if len == 0 || node_end <= start {
            continue;
        }
        let local_start = start.saturating_sub(node_start);
        let local_end = end.min(node_end) - node_start;
        let target = if local_start > 0 {
            dom.split_text(node, local_start)
        } else {
            node
        };
        if local_end < len {
            dom.split_text(target, local_end - local_start);
        }
        out.push(target);
    }
    out
}

fn styled_ancestor(dom: &Dom, root: NodeId, node: NodeId, style: InlineStyle) -> Option<NodeId> {
    dom.ancestors(node)
        .take_while(|&a| a != root && !is_block_container(dom, a))
        .find(|&a| dom.tag(a).is_some_and(|t| style.tags().contains(&t)))
}

/// Split `parent` into up to three siblings so that the middle one holds only `child`.
fn split_around(dom: &mut Dom, parent: NodeId, child: NodeId) {
    let Some(idx) = dom.index_in_parent(child) else {
        return;
    };
    let kids = dom.children(parent).to_vec();
    let (before, after) = (&kids[..idx], &kids[idx + 1..]);
    if !before.is_empty() {
        let head = dom.clone_shallow(parent);
        dom.insert_before(parent, head);
        for &k in before {
            dom.append_child(head, k);
        }
    }
    if !after.is_empty() {
        let tail = dom.clone_shallow(parent);
        dom.insert_after(parent, tail);
        for &k in after {
            dom.append_child(tail, k);
        }
    }
}

/// Split every element from `node`'s parent up to `ancestor` so that `ancestor` holds nothing
/// but the path down to `node`.
fn isolate(dom: &mut Dom, node: NodeId, ancestor: NodeId) {
    let mut child = node;
    while let Some(parent) = dom.parent(child) {
        split_around(dom, parent, child);
        if parent == ancestor {
            break;
        }
        child = parent;
    }
}

/// Fold `wrapper` into its previous sibling when both are the same inline element.
fn merge_with_previous(dom: &mut Dom, wrapper: NodeId) {
    let Some(prev) = dom.prev_sibling(wrapper) else {
        return;
    };
    if dom.element(prev).is_none() || dom.element(prev) != dom.element(wrapper) {
        return;
    }
    for kid in dom.children(wrapper).to_vec() {
        dom.append_child(prev, kid);
    }
    dom.detach(wrapper);
}

fn remove_style_from(dom: &mut Dom, root: NodeId, node: NodeId, style: InlineStyle) {
    while let Some(ancestor) = styled_ancestor(dom, root, node, style) {
        isolate(dom, node, ancestor);
        dom.unwrap(ancestor);
    }
}

/// Toggle an inline style over a non-collapsed range.
///
/// When every selected character already carries the style it is removed, otherwise it is
/// applied to the characters lacking it. Returns `false` if nothing was selected.
pub fn toggle_inline(dom: &mut Dom, root: NodeId, range: &Range, style: InlineStyle) -> bool {
    let (start, end) = bounds(dom, root, range);
    let nodes = isolate_text(dom, root, start, end);
    if nodes.is_empty() {
        return false;
    }

    let all_styled = nodes
        .iter()
        .all(|&n| styled_ancestor(dom, root, n, style).is_some());
    if all_styled {
        for &node in &nodes {
            remove_style_from(dom, root, node, style);
        }
    } else {
        for &node in &nodes {
            if styled_ancestor(dom, root, node, style).is_none() {
                let wrapper = dom.create_element(style.tag());
                dom.wrap(node, wrapper);
                merge_with_previous(dom, wrapper);
            }
        }
    }
    dom.normalize(root);
    true
}

fn restyle_segments(
    dom: &mut Dom,
    root: NodeId,
    range: &Range,
    tag: &str,
    apply: &dyn Fn(&mut Dom, NodeId),
) -> bool {
    let (start, end) = bounds(dom, root, range);
    let nodes = isolate_text(dom, root, start, end);
    if nodes.is_empty() {
        return false;
    }
    for node in nodes {
        let reusable = dom.parent(node).filter(|&p| {
            p != root
                && dom.has_tag(p, tag)
                && dom.attr(p, "class").is_none()
                && dom.children(p).len() == 1
        });
        match reusable {
            Some(existing) => apply(dom, existing),
            None => {
                let wrapper = dom.create_element(tag);
                apply(dom, wrapper);
                dom.wrap(node, wrapper);
                merge_with_previous(dom, wrapper);
            }
        }
    }
    dom.normalize(root);
    true
}

/// Apply a `<font>` attribute (`face`, `size` or `color`) to the selected characters.
pub fn set_font_attribute(
    dom: &mut Dom,
    root: NodeId,
    range: &Range,
    name: &str,
    value: &str,
) -> bool {
    restyle_segments(dom, root, range, "font", &|dom, el| dom.set_attr(el, name, value))
}

/// Give the selected characters a background colour.
pub fn set_background(dom: &mut Dom, root: NodeId, range: &Range, color: &str) -> bool {
    restyle_segments(dom, root, range, "span", &|dom, el| {
        dom.set_style(el, "background-color", color)
    })
}

/// Block containers touched by a range, in document order.
///
/// Inline content found directly on the root is wrapped in a `<div>` so it can carry block
/// styles.
pub fn blocks_in_range(dom: &mut Dom, root: NodeId, range: &Range) -> Vec<NodeId> {
    let (start, end) = bounds(dom, root, range);
    let mut nodes = Vec::new();
    if start < end {
        let mut seen = 0;
        for node in dom.text_nodes(root) {
            let len = dom.text(node).map(char_len).unwrap_or(0);
            if seen < end && seen + len > start {
                nodes.push(node);
            }
            seen += len;
        }
    }
    if nodes.is_empty() && dom.contains(range.start.node) {
        nodes.push(boundary_node(dom, range.start));
    }

    let mut blocks: Vec<NodeId> = Vec::new();
    for node in nodes {
        if let Some(block) = block_for_editing(dom, root, node)
            && !blocks.contains(&block)
        {
            blocks.push(block);
        }
    }
    blocks
}

/// Set `text-align` on every block in the range.
pub fn set_alignment(dom: &mut Dom, root: NodeId, range: &Range, alignment: Alignment) -> bool {
    let blocks = blocks_in_range(dom, root, range);
    for &block in &blocks {
        dom.set_style(block, "text-align", alignment.css());
    }
    !blocks.is_empty()
}

/// Adjust `margin-left` of every block in the range by `delta_px`, never below zero.
pub fn indent(dom: &mut Dom, root: NodeId, range: &Range, delta_px: i64) -> bool {
    let blocks = blocks_in_range(dom, root, range);
    for &block in &blocks {
        let current = dom
            .style(block, "margin-left")
            .and_then(|m| m.trim().strip_suffix("px")?.trim().parse::<f64>().ok())
            .map_or(0, |px| px.round() as i64);
        let next = (current + delta_px).max(0);
        let value = if next == 0 {
            String::new()
        } else {
            format!("{next}px")
        };
        dom.set_style(block, "margin-left", &value);
    }
    !blocks.is_empty()
}

/// Toggle list wrapping for the blocks in the range.
///
/// Blocks outside a list become items of a new list; items of a list of the other kind switch
/// the list's type; items of a list of this kind are turned back into `<div>` blocks.
pub fn toggle_list(dom: &mut Dom, root: NodeId, range: &Range, kind: ListKind) -> bool {
    let blocks: Vec<NodeId> = blocks_in_range(dom, root, range)
        .into_iter()
        .filter(|&b| !is_cell(dom, b) && !dom.has_tag(b, "table"))
        .collect();
    let Some(&first) = blocks.first() else {
        return false;
    };

    let items: Vec<NodeId> = blocks
        .iter()
        .filter_map(|&b| dom.closest(b, &["li"]))
        .collect();
    if items.len() == blocks.len() {
        let mut lists: Vec<NodeId> = Vec::new();
        for &item in &items {
            if let Some(list) = dom.parent(item)
                && !lists.contains(&list)
            {
                lists.push(list);
            }
        }
        if lists.iter().all(|&l| dom.has_tag(l, kind.tag())) {
            for item in items {
                unlist_item(dom, item);
            }
        } else {
            for list in lists {
                dom.set_tag(list, kind.tag());
            }
        }
        return true;
    }

    let list = dom.create_element(kind.tag());
    dom.insert_before(first, list);
    for block in blocks {
        if dom.closest(block, &["li"]).is_some() {
            continue;
        }
        let item = dom.create_element("li");
        for kid in dom.children(block).to_vec() {
            dom.append_child(item, kid);
        }
        if let Some(align) = dom.style(block, "text-align") {
            dom.set_style(item, "text-align", &align);
        }
        dom.append_child(list, item);
        dom.detach(block);
    }
    true
}

fn unlist_item(dom: &mut Dom, item: NodeId) {
    let Some(list) = dom.parent(item) else {
        return;
    };
    split_around(dom, list, item);
    let div = dom.create_element("div");
    for kid in dom.children(item).to_vec() {
        dom.append_child(div, kid);
    }
    if dom.children(div).is_empty() {
        let br = dom.create_element("br");
        dom.append_child(div, br);
    }
    dom.replace(list, div);
}

/// All `p`/`div` blocks below `root` except table handles.
pub fn paragraph_blocks(dom: &Dom, root: NodeId) -> Vec<NodeId> {
    dom.descendants(root)
        .into_iter()
        .filter(|&n| dom.has_tag(n, "p") || dom.has_tag(n, "div"))
        .filter(|&n| {
            !dom.has_class(n, crate::table::RESIZE_HANDLE_CLASS)
                && !dom.has_class(n, crate::table::DRAG_HANDLE_CLASS)
        })
        .collect()
}

/// The block holding the start of `range`, wrapping root-level inline content if needed.
pub fn current_block(dom: &mut Dom, root: NodeId, range: &Range) -> Option<NodeId> {
    if !dom.contains(range.start.node) {
        return None;
    }
    let node = boundary_node(dom, range.start);
    block_for_editing(dom, root, node)
}

fn prune_empty_inlines(dom: &mut Dom, root: NodeId, from: NodeId) {
    let mut current = Some(from);
    while let Some(node) = current {
        if node == root
            || is_block_container(dom, node)
            || dom.is_text(node)
            || dom.is_void(node)
            || !dom.children(node).is_empty()
        {
            break;
        }
        current = dom.parent(node);
        dom.detach(node);
    }
}

fn ensure_placeholder(dom: &mut Dom, block: NodeId) {
    if dom.is_attached(block) && dom.children(block).is_empty() {
        let br = dom.create_element("br");
        dom.append_child(block, br);
    }
}

fn clamp_boundary(dom: &Dom, at: Boundary) -> Boundary {
    let limit = match dom.text(at.node) {
        Some(text) => char_len(text),
        None => dom.children(at.node).len(),
    };
    Boundary::new(at.node, at.offset.min(limit))
}

/// Remove the selected text and return the collapsed caret where it was.
///
/// Only text is removed; blocks are not merged and non-text nodes in the range are kept.
pub fn delete_contents(dom: &mut Dom, root: NodeId, range: &Range) -> Boundary {
    let (start, end) = bounds(dom, root, range);
    if start == end {
        return range.start;
    }
    let nodes = isolate_text(dom, root, start, end);
    let Some(&first) = nodes.first() else {
        return range.start;
    };

    let anchor = dom
        .prev_sibling(first)
        .and_then(|p| dom.text(p).map(|t| Boundary::new(p, char_len(t))));
    let fallback = dom
        .parent(first)
        .zip(dom.index_in_parent(first))
        .map(|(p, i)| Boundary::new(p, i));
    let parents: Vec<NodeId> = nodes.iter().filter_map(|&n| dom.parent(n)).collect();
    let blocks: Vec<NodeId> = parents
        .iter()
        .filter_map(|&p| enclosing_block(dom, root, p))
        .collect();

    for &node in &nodes {
        dom.detach(node);
    }
    for &parent in &parents {
        prune_empty_inlines(dom, root, parent);
    }
    for &block in &blocks {
        ensure_placeholder(dom, block);
    }

    anchor
        .or(fallback)
        .filter(|b| dom.is_attached(b.node))
        .map(|b| clamp_boundary(dom, b))
        .unwrap_or_else(|| selection::position_at(dom, root, start))
}

/// Move a caret that sits on the root or on a void element to a position that can hold text.
fn editable_caret(dom: &mut Dom, root: NodeId, caret: Boundary) -> Boundary {
    let mut caret = clamp_boundary(dom, caret);
    if dom.is_void(caret.node)
        && let (Some(parent), Some(idx)) = (dom.parent(caret.node), dom.index_in_parent(caret.node))
    {
        caret = Boundary::new(parent, idx + usize::from(caret.offset > 0));
    }
    if caret.node != root {
        return caret;
    }

    let children = dom.children(root).to_vec();
    let idx = caret.offset.min(children.len());
    if idx > 0 && hosts_text(dom, children[idx - 1]) {
        let block = children[idx - 1];
        return Boundary::new(block, dom.children(block).len());
    }
    if idx < children.len() && hosts_text(dom, children[idx]) {
        return Boundary::new(children[idx], 0);
    }
    let div = dom.create_element("div");
    dom.insert_child(root, idx, div);
    Boundary::new(div, 0)
}

/// Drop a lone `<br>` placeholder so typed content replaces it.
fn take_placeholder(dom: &mut Dom, host: NodeId) -> bool {
    let children = dom.children(host);
    if children.len() == 1 && dom.has_tag(children[0], "br") {
        let br = children[0];
        dom.detach(br);
        return true;
    }
    false
}

/// Turn a caret into an `(element, child index)` insertion point, splitting a text node if
/// needed.
fn insertion_point(dom: &mut Dom, caret: Boundary) -> (NodeId, usize) {
    if let Some(text) = dom.text(caret.node) {
        let len = char_len(text);
        let parent = dom.parent(caret.node).unwrap_or(caret.node);
        let idx = dom.index_in_parent(caret.node).unwrap_or(0);
        if caret.offset == 0 {
            return (parent, idx);
        }
        if caret.offset < len {
            dom.split_text(caret.node, caret.offset);
        }
        return (parent, idx + 1);
    }
    if take_placeholder(dom, caret.node) {
        return (caret.node, 0);
    }
    (caret.node, caret.offset.min(dom.children(caret.node).len()))
}

/// Insert `text` in place of the selection. `typing` styles are toggled on the inserted run.
///
/// Returns the collapsed caret after the inserted text.
pub fn insert_text(
    dom: &mut Dom,
    root: NodeId,
    range: &Range,
    text: &str,
    typing: &[InlineStyle],
) -> Range {
    let caret = if range.is_collapsed() {
        range.start
    } else {
        delete_contents(dom, root, range)
    };
    let caret = editable_caret(dom, root, caret);
    if text.is_empty() {
        return Range::collapsed(caret);
    }
    let inserted_len = char_len(text);

    if typing.is_empty() {
        if let Some(existing) = dom.text(caret.node).map(str::to_string) {
            let mut updated = existing;
            updated.insert_str(byte_index(&updated, caret.offset), text);
            dom.set_text(caret.node, &updated);
            return Range::collapsed(Boundary::new(caret.node, caret.offset + inserted_len));
        }
        take_placeholder(dom, caret.node);
        let children = dom.children(caret.node).to_vec();
        let idx = caret.offset.min(children.len());
        if idx > 0
            && let Some(prev) = dom.text(children[idx - 1]).map(str::to_string)
        {
            let offset = char_len(&prev) + inserted_len;
            dom.set_text(children[idx - 1], &format!("{prev}{text}"));
            return Range::collapsed(Boundary::new(children[idx - 1], offset));
        }
        if idx < children.len()
            && let Some(next) = dom.text(children[idx]).map(str::to_string)
        {
            dom.set_text(children[idx], &format!("{text}{next}"));
            return Range::collapsed(Boundary::new(children[idx], inserted_len));
        }
        let node = dom.create_text(text);
        dom.insert_child(caret.node, idx, node);
        return Range::collapsed(Boundary::new(node, inserted_len));
    }

    let (host, idx) = insertion_point(dom, caret);
    let node = dom.create_text(text);
    dom.insert_child(host, idx, node);
    for &style in typing {
        if styled_ancestor(dom, root, node, style).is_some() {
            remove_style_from(dom, root, node, style);
        } else {
            let wrapper = dom.create_element(style.tag());
            dom.wrap(node, wrapper);
        }
    }
    Range::collapsed(Boundary::new(node, inserted_len))
}

/// Parse `markup` into detached nodes.
pub fn parse_fragment(dom: &mut Dom, markup: &str) -> Vec<NodeId> {
    let holder = dom.create_element("div");
    html::parse_into(dom, holder, markup);
    let nodes = dom.children(holder).to_vec();
    for &node in &nodes {
        dom.detach(node);
    }
    nodes
}

/// Insert inline nodes at the caret (replacing the selection). Returns the caret after them.
pub fn insert_inline(dom: &mut Dom, root: NodeId, range: &Range, nodes: &[NodeId]) -> Range {
    let caret = if range.is_collapsed() {
        range.start
    } else {
        delete_contents(dom, root, range)
    };
    let caret = editable_caret(dom, root, caret);
    let (host, idx) = insertion_point(dom, caret);
    for (i, &node) in nodes.iter().enumerate() {
        dom.insert_child(host, idx + i, node);
    }
    Range::collapsed(Boundary::new(host, idx + nodes.len()))
}

/// Insert block nodes after the root-level block holding the caret (or at the end of the
/// document without a caret). Returns the caret at the start of the last inserted node.
pub fn insert_blocks(
    dom: &mut Dom,
    root: NodeId,
    range: Option<&Range>,
    nodes: &[NodeId],
) -> Range {
    let anchor = range.filter(|r| dom.is_attached(r.start.node)).and_then(|r| {
        let node = boundary_node(dom, r.start);
        if node == root {
            return dom.last_child(root);
        }
        std::iter::once(node)
            .chain(dom.ancestors(node))
            .find(|&n| dom.parent(n) == Some(root))
    });

    let mut previous = anchor;
    for &node in nodes {
        match previous {
            Some(prev) => dom.insert_after(prev, node),
            None => dom.append_child(root, node),
        }
        previous = Some(node);
    }
    match nodes.last() {
        Some(&last) => Range::collapsed(Boundary::new(last, 0)),
        None => Range::collapsed(Boundary::new(root, dom.children(root).len())),
    }
}

/// Split the block at `caret`; the returned clone holds everything after the caret.
fn split_block_at(dom: &mut Dom, block: NodeId, caret: Boundary) -> NodeId {
    let (mut parent, mut index) = insertion_point(dom, caret);
    loop {
        let clone = dom.clone_shallow(parent);
        for kid in dom.children(parent)[index..].to_vec() {
            dom.append_child(clone, kid);
        }
        dom.insert_after(parent, clone);
        if parent == block {
            return clone;
        }
        let Some(grand) = dom.parent(parent) else {
            return clone;
        };
        index = dom.index_in_parent(clone).unwrap_or(0);
        parent = grand;
    }
}

fn first_caret_in(dom: &Dom, block: NodeId) -> Boundary {
    dom.text_nodes(block)
        .first()
        .map(|&t| Boundary::new(t, 0))
        .unwrap_or(Boundary::new(block, 0))
}

/// Break the block at the caret (Enter).
///
/// At root level a new `<div><br></div>` is inserted; inside a table cell a `<br>` is inserted
/// instead of splitting the cell.
pub fn insert_paragraph(dom: &mut Dom, root: NodeId, range: &Range) -> Range {
    let caret = if range.is_collapsed() {
        clamp_boundary(dom, range.start)
    } else {
        delete_contents(dom, root, range)
    };

    let block = if caret.node == root {
        None
    } else {
        enclosing_block(dom, root, caret.node)
    };
    let Some(block) = block else {
        let idx = if caret.node == root {
            caret.offset.min(dom.children(root).len())
        } else {
            std::iter::once(caret.node)
                .chain(dom.ancestors(caret.node))
                .find(|&n| dom.parent(n) == Some(root))
                .and_then(|n| dom.index_in_parent(n))
                .map_or(dom.children(root).len(), |i| i + 1)
        };
        let div = dom.create_element("div");
        let br = dom.create_element("br");
        dom.append_child(div, br);
        dom.insert_child(root, idx, div);
        return Range::collapsed(Boundary::new(div, 0));
    };

    if is_cell(dom, block) {
        let (host, idx) = insertion_point(dom, caret);
        let br = dom.create_element("br");
        dom.insert_child(host, idx, br);
        return Range::collapsed(Boundary::new(host, idx + 1));
    }

    let tail = split_block_at(dom, block, caret);
    ensure_placeholder(dom, block);
    ensure_placeholder(dom, tail);
    Range::collapsed(first_caret_in(dom, tail))
}

/// Delete the character before the caret (Backspace), or the selection.
///
/// At the start of a block the block is merged into the previous sibling block.
pub fn delete_backward(dom: &mut Dom, root: NodeId, range: &Range) -> Range {
    if !range.is_collapsed() {
        return Range::collapsed(delete_contents(dom, root, range));
    }
    let caret = clamp_boundary(dom, range.start);
    let (offset, _) = bounds(dom, root, range);

    if let Some(text) = dom.text(caret.node)
        && caret.offset > 0
    {
        let mut updated = text.to_string();
        let from = byte_index(&updated, caret.offset - 1);
        let to = byte_index(&updated, caret.offset);
        updated.replace_range(from..to, "");
        dom.set_text(caret.node, &updated);
        return Range::collapsed(Boundary::new(caret.node, caret.offset - 1));
    }

    let block = if caret.node == root {
        None
    } else {
        enclosing_block(dom, root, caret.node)
    };
    if let Some(block) = block
        && !is_cell(dom, block)
        && selection::offset_of(dom, root, Boundary::new(block, 0)) == Some(offset)
    {
        let previous = dom
            .prev_sibling(block)
            .filter(|&p| hosts_text(dom, p) && !is_cell(dom, p));
        let Some(previous) = previous else {
            return Range::collapsed(caret);
        };
        take_placeholder(dom, previous);
        take_placeholder(dom, block);
        let join = dom.children(previous).len();
        for kid in dom.children(block).to_vec() {
            dom.append_child(previous, kid);
        }
        dom.detach(block);
        ensure_placeholder(dom, previous);
        dom.normalize(previous);
        let resolved = selection::position_at(dom, root, offset);
        if resolved.node == previous || dom.is_ancestor(previous, resolved.node) {
            return Range::collapsed(resolved);
        }
        let join = join.min(dom.children(previous).len());
        return Range::collapsed(Boundary::new(previous, join));
    }

    if offset == 0 {
        return Range::collapsed(caret);
    }
    let removed = isolate_text(dom, root, offset - 1, offset);
    let parents: Vec<NodeId> = removed.iter().filter_map(|&n| dom.parent(n)).collect();
    for &node in &removed {
        dom.detach(node);
    }
    for parent in parents {
        prune_empty_inlines(dom, root, parent);
    }
    Range::collapsed(selection::position_at(dom, root, offset - 1))
}

/// Formatting state at the start of `range`.
pub fn format_state(dom: &Dom, root: NodeId, range: Option<&Range>) -> FormatState {
    let mut state = FormatState::default();
    let Some(range) = range.filter(|r| dom.is_attached(r.start.node)) else {
        return state;
    };
    let node = boundary_node(dom, range.start);
    let chain: Vec<NodeId> = std::iter::once(node)
        .chain(dom.ancestors(node))
        .take_while(|&n| n != root)
        .collect();

    for &n in &chain {
        let Some(tag) = dom.tag(n) else {
            continue;
        };
        for style in InlineStyle::ALL {
            if style.tags().contains(&tag) || style.in_css(dom, n) {
                state.set(style, true);
            }
        }
    }
    state.alignment = chain
        .iter()
        .find_map(|&n| dom.style(n, "text-align").and_then(|v| Alignment::from_css(&v)))
        .unwrap_or_default();
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::{parse_into, serialize_children};
    use crate::selection::{LogicalSelection, restore};

    fn dom_of(markup: &str) -> Dom {
        let mut dom = Dom::new("div", Vec::new(), 0);
        let root = dom.root();
        parse_into(&mut dom, root, markup);
        dom
    }

    fn span(dom: &Dom, start: usize, end: usize) -> Range {
        restore(dom, dom.root(), &LogicalSelection::span(start, end))
    }

    fn markup(dom: &Dom) -> String {
        serialize_children(dom, dom.root())
    }

    #[test]
    fn test_toggle_bold_wraps_then_unwraps() {
        let mut dom = dom_of("<div>hello world</div>");
        let root = dom.root();
        let range = span(&dom, 0, 5);
        assert!(toggle_inline(&mut dom, root, &range, InlineStyle::Bold));
        assert_eq!(markup(&dom), "<div><b>hello</b> world</div>");

        let range = span(&dom, 0, 5);
        assert!(toggle_inline(&mut dom, root, &range, InlineStyle::Bold));
        assert_eq!(markup(&dom), "<div>hello world</div>");
    }

    #[test]
    fn test_unbold_middle_splits_element() {
        let mut dom = dom_of("<div><b>abcdef</b></div>");
        let root = dom.root();
        let range = span(&dom, 2, 4);
        toggle_inline(&mut dom, root, &range, InlineStyle::Bold);
        assert_eq!(markup(&dom), "<div><b>ab</b>cd<b>ef</b></div>");
    }

    #[test]
    fn test_partial_bold_extends_and_merges() {
        let mut dom = dom_of("<div><b>ab</b>cd</div>");
        let root = dom.root();
        let range = span(&dom, 0, 4);
        toggle_inline(&mut dom, root, &range, InlineStyle::Bold);
        assert_eq!(markup(&dom), "<div><b>abcd</b></div>");
        assert!(format_state(&dom, root, Some(&span(&dom, 3, 3))).bold);
    }

    #[test]
    fn test_lists_toggle_and_switch() {
        let mut dom = dom_of("<div>one</div><div>two</div>");
        let root = dom.root();
        let range = span(&dom, 0, 6);
        assert!(toggle_list(&mut dom, root, &range, ListKind::Bullet));
        assert_eq!(markup(&dom), "<ul><li>one</li><li>two</li></ul>");

        let range = span(&dom, 0, 6);
        toggle_list(&mut dom, root, &range, ListKind::Numbered);
        assert_eq!(markup(&dom), "<ol><li>one</li><li>two</li></ol>");

        let range = span(&dom, 0, 0);
        toggle_list(&mut dom, root, &range, ListKind::Numbered);
        assert_eq!(markup(&dom), "<div>one</div><ol><li>two</li></ol>");
    }

    #[test]
    fn test_indent_steps_and_floors_at_zero() {
        let mut dom = dom_of("<p>x</p>");
        let root = dom.root();
        let range = span(&dom, 0, 0);
        indent(&mut dom, root, &range, 40);
        indent(&mut dom, root, &range, 40);
        assert_eq!(markup(&dom), r#"<p style="margin-left: 80px;">x</p>"#);
        indent(&mut dom, root, &range, -40);
        indent(&mut dom, root, &range, -40);
        indent(&mut dom, root, &range, -40);
        assert_eq!(markup(&dom), "<p>x</p>");
    }

    #[test]
    fn test_insert_text_replaces_selection() {
        let mut dom = dom_of("<div>hello world</div>");
        let root = dom.root();
        let range = span(&dom, 6, 11);
        let caret = insert_text(&mut dom, root, &range, "there", &[]);
        assert_eq!(markup(&dom), "<div>hello there</div>");
        assert_eq!(bounds(&dom, root, &caret), (11, 11));
    }

    #[test]
    fn test_insert_text_into_empty_document() {
        let mut dom = dom_of("<div><br></div>");
        let root = dom.root();
        let caret = Range::collapsed(Boundary::new(root, 1));
        let caret = insert_text(&mut dom, root, &caret, "a", &[]);
        let caret = insert_text(&mut dom, root, &caret, "b", &[]);
        assert_eq!(markup(&dom), "<div>ab</div>");
        assert_eq!(bounds(&dom, root, &caret), (2, 2));
    }

    #[test]
    fn test_typing_style_wraps_inserted_run() {
        let mut dom = dom_of("<div>ab</div>");
        let root = dom.root();
        let caret = span(&dom, 1, 1);
        insert_text(&mut dom, root, &caret, "X", &[InlineStyle::Italic]);
        assert_eq!(markup(&dom), "<div>a<i>X</i>b</div>");
    }

    #[test]
    fn test_paragraph_split_and_backspace_merge() {
        let mut dom = dom_of("<div>abcd</div>");
        let root = dom.root();
        let caret = span(&dom, 2, 2);
        let after = insert_paragraph(&mut dom, root, &caret);
        assert_eq!(markup(&dom), "<div>ab</div><div>cd</div>");

        let merged = delete_backward(&mut dom, root, &after);
        assert_eq!(markup(&dom), "<div>abcd</div>");
        assert_eq!(bounds(&dom, root, &merged), (2, 2));

        let caret = delete_backward(&mut dom, root, &merged);
        assert_eq!(markup(&dom), "<div>acd</div>");
        assert_eq!(bounds(&dom, root, &caret), (1, 1));
    }

    #[test]
    fn test_enter_at_root_inserts_empty_block() {
        let mut dom = dom_of("<div>a</div>");
        let root = dom.root();
        let caret = Range::collapsed(Boundary::new(root, 1));
        insert_paragraph(&mut dom, root, &caret);
        assert_eq!(markup(&dom), "<div>a</div><div><br></div>");
    }

    #[test]
    fn test_format_state_reads_ancestors() {
        let dom = dom_of(r#"<div style="text-align: center;"><i><sup>x</sup></i></div>"#);
        let root = dom.root();
        let state = format_state(&dom, root, Some(&span(&dom, 1, 1)));
        assert!(state.italic && state.superscript);
        assert!(!state.bold);
        assert_eq!(state.alignment, Alignment::Center);
        assert_eq!(
            state.to_json(),
            r#"{"bold":false,"italic":true,"underline":false,"strikethrough":false,"superscript":true,"subscript":false,"alignment":"center"}"#
        );
    }
}
