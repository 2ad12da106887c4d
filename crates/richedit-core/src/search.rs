//! Search Engine.
//!
//! Literal, case-sensitive search over the document's text nodes. Every occurrence is wrapped in
//! a highlight element and kept in an ordered match list with a current index; navigation wraps
//! around at both ends.
//!
//! Matching works per text node, so an occurrence that straddles a formatting boundary
//! (`ca<b>t</b>`) is not found. Matches inside one text node never overlap.
//!
//! All offsets in this module are **character offsets** (not byte offsets).

use regex::{NoExpand, Regex, RegexBuilder};

use crate::dom::{Dom, NodeId};

/// A match expressed as a half-open character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
}

impl SearchMatch {
    /// Returns the length of the match in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the match is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

#[derive(Debug)]
pub(crate) struct CharIndex {
    char_to_byte: Vec<usize>,
    text_len: usize,
}

impl CharIndex {
    pub(crate) fn new(text: &str) -> Self {
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self {
            char_to_byte,
            text_len: text.len(),
        }
    }

    pub(crate) fn byte_to_char(&self, byte_offset: usize) -> usize {
        let clamped = byte_offset.min(self.text_len);
        match self.char_to_byte.binary_search(&clamped) {
            Ok(idx) => idx,
            Err(idx) => idx,
        }
    }
}

fn literal_regex(term: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(false)
        .build()
        .ok()
}

/// Find all non-overlapping occurrences of `term` in `text`, left to right.
///
/// Returns an empty list if `term` is empty.
pub fn find_all(text: &str, term: &str) -> Vec<SearchMatch> {
    if term.is_empty() {
        return Vec::new();
    }
    let Some(re) = literal_regex(term) else {
        return Vec::new();
    };
    let index = CharIndex::new(text);
    re.find_iter(text)
        .map(|m| SearchMatch {
            start: index.byte_to_char(m.start()),
            end: index.byte_to_char(m.end()),
        })
        .filter(|m| !m.is_empty())
        .collect()
}

/// Literally replace every occurrence of `term` in `haystack`.
///
/// `replacement` is inserted as-is (`$1` is not expanded). Returns the new string and the number
/// of replacements; an empty `term` replaces nothing.
///
/// This works on serialized markup, so a term that also occurs inside a tag name or an
/// attribute value is replaced there too.
pub fn replace_literal(haystack: &str, term: &str, replacement: &str) -> (String, usize) {
    if term.is_empty() {
        return (haystack.to_string(), 0);
    }
    let Some(re) = literal_regex(term) else {
        return (haystack.to_string(), 0);
    };
    let count = re.find_iter(haystack).count();
    if count == 0 {
        return (haystack.to_string(), 0);
    }
    (re.replace_all(haystack, NoExpand(replacement)).into_owned(), count)
}

/// Appearance of highlight wrappers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightStyle {
    /// Class that marks a wrapper as a search highlight.
    pub class: String,
    /// CSS background colour.
    pub color: String,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            class: "search-highlight".to_string(),
            color: "#FFFF00".to_string(),
        }
    }
}

/// Wrap every occurrence of `term` below `root` in a highlight span.
///
/// Returns the spans in document order.
pub fn highlight(dom: &mut Dom, root: NodeId, term: &str, style: &HighlightStyle) -> Vec<NodeId> {
    let mut spans = Vec::new();
    if term.is_empty() {
        return spans;
    }

    for node in dom.text_nodes(root) {
        let in_raw_text = dom
            .parent(node)
            .and_then(|p| dom.tag(p))
            .is_some_and(|t| t == "script" || t == "style");
        if in_raw_text {
            continue;
        }
        let Some(text) = dom.text(node) else {
            continue;
        };
        let matches = find_all(text, term);
        if matches.is_empty() {
            continue;
        }

        // Split from the back so earlier offsets stay valid in the head node.
        let mut node_spans = Vec::with_capacity(matches.len());
        for m in matches.iter().rev() {
            dom.split_text(node, m.end);
            let hit = dom.split_text(node, m.start);
            let span = dom.create_element_with(
                "span",
                &[
                    ("class", style.class.as_str()),
                    ("style", &format!("background-color: {};", style.color)),
                ],
            );
            dom.wrap(hit, span);
            node_spans.push(span);
        }
        node_spans.reverse();
        spans.extend(node_spans);
    }

    // Drop the empty fragments left behind by splitting at node edges.
    for node in dom.text_nodes(root) {
        if dom.text(node).is_some_and(str::is_empty) {
            dom.detach(node);
        }
    }
    spans
}

/// Replace every highlight span below `root` with its plain text and merge adjacent text nodes.
///
/// Returns the number of spans removed.
pub fn clear_highlights(dom: &mut Dom, root: NodeId, class: &str) -> usize {
    let spans = dom.elements_by_class(root, class);
    for &span in &spans {
        if !dom.is_attached(span) {
            continue;
        }
        let text = dom.text_content(span);
        let replacement = dom.create_text(&text);
        dom.replace(span, replacement);
    }
    dom.normalize(root);
    spans.len()
}

/// Search term, ordered match wrappers and the current match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    term: String,
    matches: Vec<NodeId>,
    current: Option<usize>,
}

impl SearchState {
    /// Install a fresh result set; the first match (if any) becomes current.
    pub fn set(&mut self, term: &str, matches: Vec<NodeId>) {
        self.term = term.to_string();
        self.current = (!matches.is_empty()).then_some(0);
        self.matches = matches;
    }

    /// Forget the term and every match.
    pub fn reset(&mut self) {
        self.term.clear();
        self.matches.clear();
        self.current = None;
    }

    /// Active search term (empty when idle).
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Match wrappers in document order.
    pub fn matches(&self) -> &[NodeId] {
        &self.matches
    }

    /// Number of matches.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Returns `true` if there are no matches.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Index of the current match.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Wrapper of the current match.
    pub fn current_match(&self) -> Option<NodeId> {
        self.matches.get(self.current?).copied()
    }

    /// Move to the next match, wrapping to the first.
    pub fn advance(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        let next = self.current.map_or(0, |i| (i + 1) % self.matches.len());
        self.current = Some(next);
        Some(next)
    }

    /// Move to the previous match, wrapping to the last.
    pub fn retreat(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        let len = self.matches.len();
        let prev = self.current.map_or(len - 1, |i| (i + len - 1) % len);
        self.current = Some(prev);
        Some(prev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::{parse_into, serialize_children};

    fn dom_of(markup: &str) -> Dom {
        let mut dom = Dom::new("div", Vec::new(), 0);
        let root = dom.root();
        parse_into(&mut dom, root, markup);
        dom
    }

    #[test]
    fn test_find_all_is_literal_and_non_overlapping() {
        assert_eq!(find_all("aaaa", "aa").len(), 2);
        assert_eq!(find_all("a.b axb", ".").len(), 1);
        assert_eq!(find_all("Cat cat", "cat"), vec![SearchMatch { start: 4, end: 7 }]);
        assert!(find_all("anything", "").is_empty());
        assert_eq!(find_all("héllo héllo", "llo")[1], SearchMatch { start: 8, end: 11 });
    }

    #[test]
    fn test_replace_literal_does_not_expand() {
        assert_eq!(replace_literal("a+b a+b", "a+b", "$0"), ("$0 $0".to_string(), 2));
        assert_eq!(replace_literal("abc", "x", "y"), ("abc".to_string(), 0));
    }

    #[test]
    fn test_highlight_and_clear() {
        let mut dom = dom_of("<div>cat cat dog</div>");
        let root = dom.root();
        let style = HighlightStyle::default();

        let spans = highlight(&mut dom, root, "cat", &style);
        assert_eq!(spans.len(), 2);
        assert_eq!(
            serialize_children(&dom, root),
            "<div><span class=\"search-highlight\" style=\"background-color: #FFFF00;\">cat</span> \
             <span class=\"search-highlight\" style=\"background-color: #FFFF00;\">cat</span> dog</div>"
        );

        assert_eq!(clear_highlights(&mut dom, root, &style.class), 2);
        assert_eq!(serialize_children(&dom, root), "<div>cat cat dog</div>");
        assert_eq!(dom.text_nodes(root).len(), 1);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut state = SearchState::default();
        assert_eq!(state.advance(), None);

        let mut dom = Dom::new("div", Vec::new(), 0);
        let ids = vec![dom.create_text("a"), dom.create_text("b"), dom.create_text("c")];
        state.set("x", ids);
        assert_eq!(state.current(), Some(0));
        assert_eq!(state.retreat(), Some(2));
        assert_eq!(state.advance(), Some(0));
        assert_eq!(state.advance(), Some(1));
    }
}
