//! Content Model.
//!
//! A [`Document`] owns the editable root element and everything beneath it. It knows how to
//! accept markup from the host (with the normalization the editing surface relies on), how to
//! serialize itself back, and how to derive the plain-text views used for counting and for
//! selection offsets.
//!
//! # Invariant
//!
//! After [`Document::set_content`] the root always has at least one block-level child and no
//! direct text child with visible characters.

use serde::{Deserialize, Serialize};

use crate::dom::{Dom, NodeId};
use crate::html;

/// Markup used for an empty document.
pub const EMPTY_DOCUMENT: &str = "<div><br></div>";

const BLOCK_PREFIXES: &[&str] = &["<div", "<p", "<h", "<ul", "<ol", "<table"];

/// Word and character totals of the visible text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WordCount {
    /// Whitespace-delimited tokens.
    pub words: usize,
    /// Characters, including whitespace.
    pub chars: usize,
}

impl WordCount {
    /// JSON payload in the shape the host bridge expects (`{"words":..,"chars":..}`).
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// The editable document.
#[derive(Debug, Clone)]
pub struct Document {
    dom: Dom,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document (`<div><br></div>`).
    pub fn new() -> Self {
        let mut doc = Self {
            dom: Self::fresh_root(0, Vec::new()),
        };
        doc.set_markup(EMPTY_DOCUMENT);
        doc
    }

    fn fresh_root(epoch: u32, attrs: Vec<(String, String)>) -> Dom {
        let attrs = if attrs.is_empty() {
            vec![
                ("id".to_string(), "editor".to_string()),
                ("contenteditable".to_string(), "true".to_string()),
            ]
        } else {
            attrs
        };
        Dom::new("div", attrs, epoch)
    }

    /// The node tree.
    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// Mutable access to the node tree.
    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    /// The editable root element.
    pub fn root(&self) -> NodeId {
        self.dom.root()
    }

    /// Replace the document with host-supplied markup, normalizing it.
    ///
    /// Whitespace-only markup becomes [`EMPTY_DOCUMENT`]; markup that does not open with a
    /// recognized block tag is wrapped in a `<div>`; stray root-level text is wrapped afterwards.
    pub fn set_content(&mut self, markup: &str) {
        let trimmed = markup.trim();
        if trimmed.is_empty() {
            self.set_markup(EMPTY_DOCUMENT);
        } else if BLOCK_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
            self.set_markup(markup);
        } else {
            self.set_markup(&format!("<div>{markup}</div>"));
        }
        self.wrap_stray_text();
        self.ensure_block();
    }

    /// Refill a root left without content with [`EMPTY_DOCUMENT`].
    ///
    /// Whitespace-only text does not count as content. Returns `true` if the root was refilled.
    pub fn ensure_block(&mut self) -> bool {
        let root = self.root();
        let occupied = self.dom.children(root).iter().any(|&n| {
            self.dom.element(n).is_some()
                || self
                    .dom
                    .text(n)
                    .is_some_and(|t| t.chars().any(|c| !c.is_whitespace()))
        });
        if occupied {
            return false;
        }
        self.dom.clear_children(root);
        html::parse_into(&mut self.dom, root, EMPTY_DOCUMENT);
        true
    }

    /// Replace the root's children with `markup` exactly as given.
    ///
    /// Used by undo/redo, which must restore snapshots verbatim. Root attributes (such as the
    /// `rtl` class) survive; every previously issued [`NodeId`] becomes stale.
    pub fn set_markup(&mut self, markup: &str) {
        let root_attrs = self
            .dom
            .element(self.dom.root())
            .map(|el| el.attrs.clone())
            .unwrap_or_default();
        let mut dom = Self::fresh_root(self.dom.epoch().wrapping_add(1), root_attrs);
        let root = dom.root();
        html::parse_into(&mut dom, root, markup);
        self.dom = dom;
    }

    /// Serialized inner markup of the root.
    pub fn content(&self) -> String {
        html::serialize_children(&self.dom, self.root())
    }

    /// Wrap every root-level text node that has visible characters in its own `<div>`.
    ///
    /// Returns the number of nodes wrapped.
    pub fn wrap_stray_text(&mut self) -> usize {
        let root = self.root();
        let stray: Vec<NodeId> = self
            .dom
            .children(root)
            .iter()
            .copied()
            .filter(|&n| {
                self.dom
                    .text(n)
                    .is_some_and(|t| t.chars().any(|c| !c.is_whitespace()))
            })
            .collect();
        for &node in &stray {
            let div = self.dom.create_element("div");
            self.dom.wrap(node, div);
        }
        stray.len()
    }

    /// Flattened text of all text nodes in document order.
    ///
    /// This is the coordinate space of [`crate::selection::LogicalSelection`].
    pub fn text_content(&self) -> String {
        self.dom.text_content(self.root())
    }

    /// Visible text: blocks and `<br>` become line breaks, trailing breaks are dropped.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_visible(self.root(), &mut out);
        out.trim_end_matches('\n').to_string()
    }

    fn collect_visible(&self, id: NodeId, out: &mut String) {
        for &child in self.dom.children(id) {
            if let Some(text) = self.dom.text(child) {
                let mut last_space = out.ends_with(' ');
                for c in text.chars() {
                    if matches!(c, ' ' | '\t' | '\n' | '\r') {
                        if !last_space {
                            out.push(' ');
                        }
                        last_space = true;
                    } else {
                        out.push(c);
                        last_space = false;
                    }
                }
                continue;
            }
            match self.dom.tag(child) {
                Some("br") => out.push('\n'),
                Some("script" | "style") => {}
                Some("td" | "th") => {
                    self.collect_visible(child, out);
                    if self.dom.next_sibling(child).is_some() {
                        out.push('\t');
                    }
                }
                Some(_) if self.dom.is_block(child) => {
                    if !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    self.collect_visible(child, out);
                    if !out.ends_with('\n') {
                        out.push('\n');
                    }
                }
                _ => self.collect_visible(child, out),
            }
        }
    }

    /// Count words and characters of the visible text.
    pub fn word_count(&self) -> WordCount {
        let text = self.plain_text();
        WordCount {
            words: text.split_whitespace().count(),
            chars: text.chars().count(),
        }
    }

    /// Returns `true` if the root carries the `rtl` class.
    pub fn is_rtl(&self) -> bool {
        self.dom.has_class(self.root(), "rtl")
    }

    /// Flip the `rtl` class on the root and return the new state.
    pub fn toggle_rtl(&mut self) -> bool {
        let root = self.root();
        if self.is_rtl() {
            self.dom.remove_class(root, "rtl");
            false
        } else {
            self.dom.add_class(root, "rtl");
            true
        }
    }

    /// Root-level block children (candidates for table reordering).
    pub fn blocks(&self) -> Vec<NodeId> {
        self.dom
            .children(self.root())
            .iter()
            .copied()
            .filter(|&n| self.dom.is_block(n))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_is_empty_block() {
        let doc = Document::new();
        assert_eq!(doc.content(), EMPTY_DOCUMENT);
        assert_eq!(doc.word_count(), WordCount { words: 0, chars: 0 });
    }

    #[test]
    fn test_set_content_normalization() {
        let mut doc = Document::new();
        doc.set_content("   ");
        assert_eq!(doc.content(), EMPTY_DOCUMENT);

        doc.set_content("plain words");
        assert_eq!(doc.content(), "<div>plain words</div>");

        doc.set_content("<p>kept</p>");
        assert_eq!(doc.content(), "<p>kept</p>");

        doc.set_content("<div>a</div>stray<div>b</div>");
        assert_eq!(doc.content(), "<div>a</div><div>stray</div><div>b</div>");
    }

    #[test]
    fn test_ensure_block_refills_empty_root() {
        let mut doc = Document::new();
        doc.set_markup("");
        assert!(doc.ensure_block());
        assert_eq!(doc.content(), EMPTY_DOCUMENT);

        doc.set_markup("<table><tr><td>x</td></tr></table>");
        assert!(!doc.ensure_block());
        assert_eq!(doc.content(), "<table><tr><td>x</td></tr></table>");
    }

    #[test]
    fn test_word_count_uses_visible_text() {
        let mut doc = Document::new();
        doc.set_content("<div>Hello world</div>");
        assert_eq!(doc.word_count(), WordCount { words: 2, chars: 11 });

        doc.set_content("<div>one</div><div>two<br>three</div>");
        assert_eq!(doc.plain_text(), "one\ntwo\nthree");
        assert_eq!(doc.word_count().words, 3);
        assert_eq!(WordCount { words: 2, chars: 11 }.to_json(), r#"{"words":2,"chars":11}"#);
    }

    #[test]
    fn test_rtl_survives_content_replacement() {
        let mut doc = Document::new();
        assert!(doc.toggle_rtl());
        doc.set_content("<div>x</div>");
        assert!(doc.is_rtl());
        assert!(!doc.toggle_rtl());
    }
}
