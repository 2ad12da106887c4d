//! Conversions between files on disk and editor markup.

use std::sync::LazyLock;

use regex::Regex;

static BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body[^>]*>(.*?)</body>").expect("body pattern"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern"));

/// Markers that make a `<`-prefixed file count as HTML.
const HTML_MARKERS: [&str; 3] = ["<html", "<body", "<div"];

/// Returns `true` if `raw` should be treated as HTML rather than plain text.
pub fn looks_like_html(raw: &str) -> bool {
    let trimmed = raw.trim();
    if !trimmed.starts_with('<') {
        return false;
    }
    let lower = trimmed.to_lowercase();
    HTML_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Turn file contents into editor markup.
///
/// HTML is passed through, reduced to the `<body>` contents when a body is present. Anything
/// else is escaped, with line breaks becoming `<br>`.
pub fn import_text(raw: &str) -> String {
    if looks_like_html(raw) {
        return match BODY.captures(raw).and_then(|c| c.get(1)) {
            Some(body) => body.as_str().trim().to_string(),
            None => raw.to_string(),
        };
    }
    raw.replace("\r\n", "\n")
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\n', "<br>")
}

/// Wrap editor markup in a standalone HTML document.
pub fn export_html(content: &str, title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"UTF-8\">\n    <title>{title}</title>\n</head>\n<body>\n{content}\n</body>\n</html>\n",
        title = escape_title(title),
    )
}

/// Strip tags from editor markup and decode the common entities.
pub fn export_plain_text(content: &str) -> String {
    TAG.replace_all(content, "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .replace("&nbsp;", " ")
}

fn escape_title(title: &str) -> String {
    title
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detects_html() {
        assert!(looks_like_html("  <DIV>x</DIV>"));
        assert!(looks_like_html("<!DOCTYPE html><html></html>"));
        assert!(!looks_like_html("<p>only a paragraph</p>"));
        assert!(!looks_like_html("plain <div> later"));
    }

    #[test]
    fn test_import_plain_text_escapes() {
        assert_eq!(import_text("a < b & c\nnext"), "a &lt; b &amp; c<br>next");
        assert_eq!(import_text("one\r\ntwo"), "one<br>two");
    }

    #[test]
    fn test_import_extracts_body() {
        let page = "<html><head><title>t</title></head><BODY class=\"x\">\n  <div>hi</div>\n</BODY></html>";
        assert_eq!(import_text(page), "<div>hi</div>");
        assert_eq!(import_text("<div>frag</div>"), "<div>frag</div>");
    }

    #[test]
    fn test_export_html_wraps_fragment() {
        let html = export_html("<div>x</div>", "notes.html");
        assert!(html.starts_with("<!DOCTYPE html>\n<html>"));
        assert!(html.contains("<title>notes.html</title>"));
        assert!(html.contains("<body>\n<div>x</div>\n</body>"));
    }

    #[test]
    fn test_export_plain_text_strips_tags() {
        assert_eq!(
            export_plain_text("<div><b>a</b>&nbsp;&lt;b&gt; &amp;</div>"),
            "a <b> &"
        );
    }
}
