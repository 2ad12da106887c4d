//! Selection Codec.
//!
//! Live selections reference nodes, and nodes do not survive a wholesale content replacement.
//! The codec converts a live [`Range`] into a [`LogicalSelection`] of character offsets over the
//! document's flattened text, and back again, so a selection can be carried across undo/redo.
//!
//! Offsets are counted in characters over the concatenation of all text nodes in document
//! order (see [`Document::text_content`](crate::document::Document::text_content)).

use serde::{Deserialize, Serialize};

use crate::dom::{Dom, NodeId, char_len};

/// A point in the tree.
///
/// For a text node `offset` counts characters; for an element it is a child index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    /// Container node.
    pub node: NodeId,
    /// Offset inside the container.
    pub offset: usize,
}

impl Boundary {
    /// Construct a boundary.
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A live selection: two boundaries with `start` not after `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    /// Start boundary.
    pub start: Boundary,
    /// End boundary.
    pub end: Boundary,
}

impl Range {
    /// A range spanning two boundaries.
    pub fn new(start: Boundary, end: Boundary) -> Self {
        Self { start, end }
    }

    /// A caret.
    pub fn collapsed(at: Boundary) -> Self {
        Self { start: at, end: at }
    }

    /// Returns `true` if both boundaries coincide.
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Node-independent selection: character offsets into the flattened text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalSelection {
    /// Start offset.
    pub start: usize,
    /// End offset.
    pub end: usize,
    /// Whether the selection was a caret.
    pub collapsed: bool,
}

impl LogicalSelection {
    /// A caret at `offset`.
    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
            collapsed: true,
        }
    }

    /// A span between two offsets, in either order.
    pub fn span(a: usize, b: usize) -> Self {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Self {
            start,
            end,
            collapsed: start == end,
        }
    }
}

/// Number of text characters that precede `boundary` under `root`.
///
/// Returns `None` if the boundary's node is not inside `root`.
pub fn offset_of(dom: &Dom, root: NodeId, boundary: Boundary) -> Option<usize> {
    if !dom.contains(boundary.node) {
        return None;
    }
    let mut count = 0;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node == boundary.node {
            if let Some(text) = dom.text(node) {
                return Some(count + boundary.offset.min(char_len(text)));
            }
            let children = dom.children(node);
            let upto = boundary.offset.min(children.len());
            for &child in &children[..upto] {
                count += char_len(&dom.text_content(child));
            }
            return Some(count);
        }
        if let Some(text) = dom.text(node) {
            count += char_len(text);
        }
        stack.extend(dom.children(node).iter().rev().copied());
    }
    None
}

/// Convert a live range into its logical form. `None` when there is no selection.
pub fn save(dom: &Dom, root: NodeId, range: Option<&Range>) -> Option<LogicalSelection> {
    let range = range?;
    let start = offset_of(dom, root, range.start)?;
    let end = offset_of(dom, root, range.end).unwrap_or(start);
    Some(LogicalSelection {
        start,
        end,
        collapsed: range.is_collapsed(),
    })
}

/// Resolve a character offset to a concrete position.
///
/// The first text node whose end reaches the offset wins, so an offset at the seam between two
/// text nodes resolves to the end of the earlier one. Without text nodes, falls back to the end
/// of the root's last child, or to the start of the root.
pub fn position_at(dom: &Dom, root: NodeId, char_offset: usize) -> Boundary {
    let mut seen = 0;
    for node in dom.text_nodes(root) {
        let len = dom.text(node).map(char_len).unwrap_or(0);
        if seen + len >= char_offset {
            return Boundary::new(node, char_offset - seen);
        }
        seen += len;
    }
    match dom.last_child(root) {
        Some(last) => match dom.text(last) {
            Some(text) => Boundary::new(last, char_len(text)),
            None => Boundary::new(root, dom.children(root).len()),
        },
        None => Boundary::new(root, 0),
    }
}

/// Rebuild a live range from a logical selection, clamping offsets to the text length.
pub fn restore(dom: &Dom, root: NodeId, selection: &LogicalSelection) -> Range {
    let text_len = char_len(&dom.text_content(root));
    let start = selection.start.min(text_len);
    let end = selection.end.min(text_len).max(start);
    let start_point = position_at(dom, root, start);
    if selection.collapsed || start == end {
        Range::collapsed(start_point)
    } else {
        Range::new(start_point, position_at(dom, root, end))
    }
}
