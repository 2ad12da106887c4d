//! Markup fragments in and out of the node tree.
//!
//! The parser is deliberately forgiving: it never fails. Unknown constructs are kept as text,
//! unbalanced end tags are ignored, and anything still open at end of input is closed
//! implicitly. The serializer produces the same shape a browser's `innerHTML` getter would.

use crate::dom::{Dom, NodeData, NodeId, VOID_TAGS};

const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Parse `markup` and append the resulting nodes to `parent`.
pub fn parse_into(dom: &mut Dom, parent: NodeId, markup: &str) {
    let mut parser = Parser {
        input: markup,
        pos: 0,
    };
    let mut stack = vec![parent];

    while parser.pos < markup.len() {
        let rest = parser.rest();
        let Some(lt) = rest.find('<') else {
            push_text(dom, current(&stack), &decode_entities(rest));
            break;
        };
        if lt > 0 {
            push_text(dom, current(&stack), &decode_entities(&rest[..lt]));
            parser.pos += lt;
            continue;
        }

        if rest.starts_with("<!--") {
            parser.skip_past("-->");
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            parser.skip_past(">");
        } else if rest.starts_with("</") {
            parser.pos += 2;
            let name = parser.take_name();
            parser.skip_past(">");
            if name.is_empty() {
                continue;
            }
            // Pop to the matching open element; a stray end tag is dropped.
            if let Some(depth) = stack
                .iter()
                .skip(1)
                .rposition(|&open| dom.has_tag(open, &name))
            {
                stack.truncate(depth + 1);
            }
        } else if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            parser.pos += 1;
            let name = parser.take_name();
            let (attrs, self_closing) = parser.take_attributes();
            close_implied(dom, &mut stack, &name);

            let element = dom.create_element(&name);
            for (key, value) in attrs {
                dom.set_attr(element, &key, &value);
            }
            dom.append_child(current(&stack), element);

            if RAW_TEXT_TAGS.contains(&name.as_str()) {
                let closing = format!("</{name}");
                let body_end = parser
                    .rest()
                    .to_ascii_lowercase()
                    .find(&closing)
                    .unwrap_or(parser.rest().len());
                let body = parser.rest()[..body_end].to_string();
                push_text(dom, element, &body);
                parser.pos += body_end;
                parser.skip_past(">");
            } else if !self_closing && !VOID_TAGS.contains(&name.as_str()) {
                stack.push(element);
            }
        } else {
            push_text(dom, current(&stack), "<");
            parser.pos += 1;
        }
    }
}

fn current(stack: &[NodeId]) -> NodeId {
    stack[stack.len() - 1]
}

fn push_text(dom: &mut Dom, parent: NodeId, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = dom.last_child(parent)
        && let Some(existing) = dom.text(last)
    {
        let merged = format!("{existing}{text}");
        dom.set_text(last, &merged);
        return;
    }
    let node = dom.create_text(text);
    dom.append_child(parent, node);
}

/// Close elements whose end tag browsers infer from the start of `name`.
fn close_implied(dom: &Dom, stack: &mut Vec<NodeId>, name: &str) {
    let closes: &[&str] = match name {
        "li" => &["li"],
        "tr" => &["tr", "td", "th"],
        "td" | "th" => &["td", "th"],
        "dt" | "dd" => &["dt", "dd"],
        "p" | "div" | "ul" | "ol" | "table" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
        | "blockquote" | "pre" => &["p"],
        _ => return,
    };
    if stack.len() > 1
        && let Some(tag) = dom.tag(current(stack))
        && closes.contains(&tag)
    {
        stack.pop();
        // `<tr>` inside an open cell closes the cell and its row.
        if name == "tr"
            && stack.len() > 1
            && dom.has_tag(current(stack), "tr")
        {
            stack.pop();
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_past(&mut self, needle: &str) {
        match self.rest().find(needle) {
            Some(idx) => self.pos += idx + needle.len(),
            None => self.pos = self.input.len(),
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn take_name(&mut self) -> String {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/' || c == '=')
            .unwrap_or(rest.len());
        self.pos += end;
        rest[..end].to_ascii_lowercase()
    }

    fn take_attributes(&mut self) -> (Vec<(String, String)>, bool) {
        let mut attrs = Vec::new();
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return (attrs, false);
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                return (attrs, true);
            }
            if rest.starts_with('>') {
                self.pos += 1;
                return (attrs, false);
            }
            if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }

            let name = self.take_name();
            if name.is_empty() {
                // Unparseable byte; skip one character.
                let step = rest.chars().next().map_or(1, char::len_utf8);
                self.pos += step;
                continue;
            }
            self.skip_whitespace();
            let value = if self.rest().starts_with('=') {
                self.pos += 1;
                self.skip_whitespace();
                self.take_attribute_value()
            } else {
                String::new()
            };
            if !attrs.iter().any(|(k, _)| *k == name) {
                attrs.push((name, value));
            }
        }
    }

    fn take_attribute_value(&mut self) -> String {
        let rest = self.rest();
        if let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') {
            let body = &rest[1..];
            let end = body.find(quote).unwrap_or(body.len());
            self.pos += 1 + end + usize::from(end < body.len());
            decode_entities(&body[..end])
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '>')
                .unwrap_or(rest.len());
            self.pos += end;
            decode_entities(&rest[..end])
        }
    }
}

/// Decode the character references the editor emits or commonly receives.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_reference(&rest[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Escape text content the way `innerHTML` serializes it.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\u{a0}', "&nbsp;")
}

/// Serialize the children of `id` (the `innerHTML` of an element).
pub fn serialize_children(dom: &Dom, id: NodeId) -> String {
    let mut out = String::new();
    for &child in dom.children(id) {
        write_node(dom, child, &mut out);
    }
    out
}

/// Serialize `id` itself, including its own tag (`outerHTML`).
pub fn serialize_node(dom: &Dom, id: NodeId) -> String {
    let mut out = String::new();
    write_node(dom, id, &mut out);
    out
}

fn write_node(dom: &Dom, id: NodeId, out: &mut String) {
    match dom.data(id) {
        NodeData::Text(text) => {
            let raw = dom
                .parent(id)
                .and_then(|p| dom.tag(p))
                .is_some_and(|t| RAW_TEXT_TAGS.contains(&t));
            if raw {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        NodeData::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (key, value) in &el.attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&escape_attribute(value));
                out.push('"');
            }
            out.push('>');
            if VOID_TAGS.contains(&el.tag.as_str()) {
                return;
            }
            for &child in dom.children(id) {
                write_node(dom, child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}
