//! HTML text form of the surface tree.
//!
//! The writer emits the minimal markup the editing surface uses. The
//! reader is the paste path: it accepts arbitrary HTML and is total —
//! unknown elements become transparent, mismatched close tags recover,
//! comments and doctypes are skipped, and entities decode. Whatever comes
//! in, some valid surface comes out.

use crate::surface::{Element, SurfaceNode, Tag};

/// Render a surface to its HTML text form.
pub fn write(nodes: &[SurfaceNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &SurfaceNode, out: &mut String) {
    match node {
        SurfaceNode::Text(text) => {
            out.push_str(&html_escape::encode_text(text));
        }
        SurfaceNode::Element(el) if el.tag == Tag::Break => out.push_str("<br>"),
        SurfaceNode::Element(el) => {
            out.push('<');
            out.push_str(el.tag.name());
            if el.tag == Tag::Anchor {
                if let Some(href) = &el.href {
                    out.push_str(" href=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(href));
                    out.push('"');
                }
            }
            out.push('>');
            for child in &el.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(el.tag.name());
            out.push('>');
        }
    }
}

/// Parse HTML text into a surface. Total: never fails.
pub fn read(input: &str) -> Vec<SurfaceNode> {
    let mut frames = vec![Frame::root()];
    let mut rest = input;

    while let Some(pos) = rest.find('<') {
        push_text(&mut frames, &rest[..pos]);
        rest = &rest[pos..];

        if let Some(after) = rest.strip_prefix("<!--") {
            rest = match after.find("-->") {
                Some(end) => &after[end + 3..],
                None => "",
            };
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            rest = match rest.find('>') {
                Some(end) => &rest[end + 1..],
                None => "",
            };
        } else if let Some(after) = rest.strip_prefix("</") {
            let (name, after_name) = scan_name(after);
            rest = match after_name.find('>') {
                Some(end) => &after_name[end + 1..],
                None => "",
            };
            if !name.is_empty() {
                close_named(&mut frames, &name);
            }
        } else {
            let (name, after_name) = scan_name(&rest[1..]);
            if name.is_empty() {
                // A stray '<' is just text.
                push_text(&mut frames, "<");
                rest = &rest[1..];
                continue;
            }
            let (open, after_tag) = scan_open_tag(after_name);
            rest = after_tag;
            handle_open(&mut frames, &name, open);
        }
    }
    push_text(&mut frames, rest);

    while frames.len() > 1 {
        finish_top(&mut frames);
    }
    frames.pop().map(|f| f.children).unwrap_or_default()
}

struct Frame {
    name: String,
    tag: Option<Tag>,
    href: Option<String>,
    children: Vec<SurfaceNode>,
}

impl Frame {
    fn root() -> Self {
        Self {
            name: String::new(),
            tag: None,
            href: None,
            children: Vec::new(),
        }
    }
}

struct OpenTag {
    href: Option<String>,
    self_closing: bool,
}

/// Elements with no surface meaning and no content worth keeping.
const IGNORED_VOIDS: &[&str] = &["img", "hr", "input", "meta", "link", "source", "wbr", "area"];

fn push_text(frames: &mut [Frame], raw: &str) {
    if raw.is_empty() {
        return;
    }
    let decoded = html_escape::decode_html_entities(raw);
    if let Some(frame) = frames.last_mut() {
        // Adjacent raw text coalesces into one node.
        if let Some(SurfaceNode::Text(prev)) = frame.children.last_mut() {
            prev.push_str(&decoded);
        } else {
            frame.children.push(SurfaceNode::Text(decoded.into_owned()));
        }
    }
}

fn scan_name(s: &str) -> (String, &str) {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_alphanumeric())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    (s[..end].to_ascii_lowercase(), &s[end..])
}

/// Scan the remainder of an open tag: attributes up to the closing `>`,
/// honoring quoted values (which may contain `>`). Returns what was
/// learned and the input after the tag.
fn scan_open_tag(s: &str) -> (OpenTag, &str) {
    let mut href = None;
    let mut self_closing = false;
    let mut chars = s.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '>' => {
                let open = OpenTag { href, self_closing };
                return (open, &s[i + 1..]);
            }
            '/' => self_closing = true,
            c if c.is_whitespace() => {}
            _ => {
                // Attribute name.
                let name_start = i;
                let mut name_end = s.len();
                let mut has_value = false;
                let mut break_char = None;
                for (j, c) in chars.by_ref() {
                    if c == '=' {
                        name_end = j;
                        has_value = true;
                        break;
                    }
                    if c.is_whitespace() || c == '>' || c == '/' {
                        name_end = j;
                        break_char = Some(c);
                        break;
                    }
                }
                let attr_name = s[name_start..name_end].to_ascii_lowercase();
                let mut value = String::new();
                if has_value {
                    value = scan_attr_value(s, &mut chars);
                }
                if attr_name == "href" && !value.is_empty() {
                    href = Some(value);
                }
                match break_char {
                    Some('>') => {
                        let open = OpenTag { href, self_closing };
                        return (open, &s[name_end + 1..]);
                    }
                    Some('/') => self_closing = true,
                    _ => {}
                }
            }
        }
    }
    (
        OpenTag {
            href,
            self_closing,
        },
        "",
    )
}

fn scan_attr_value(
    s: &str,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> String {
    // Skip whitespace after '='.
    while matches!(chars.peek(), Some((_, c)) if c.is_whitespace()) {
        chars.next();
    }
    match chars.peek().copied() {
        Some((start, quote)) if quote == '"' || quote == '\'' => {
            chars.next();
            let value_start = start + quote.len_utf8();
            let mut value_end = s.len();
            for (j, c) in chars.by_ref() {
                if c == quote {
                    value_end = j;
                    break;
                }
            }
            html_escape::decode_html_entities(&s[value_start..value_end]).into_owned()
        }
        Some((start, _)) => {
            let mut value_end = s.len();
            while let Some((j, c)) = chars.peek().copied() {
                if c.is_whitespace() || c == '>' || c == '/' {
                    value_end = j;
                    break;
                }
                chars.next();
            }
            html_escape::decode_html_entities(&s[start..value_end]).into_owned()
        }
        None => String::new(),
    }
}

fn handle_open(frames: &mut Vec<Frame>, name: &str, open: OpenTag) {
    if IGNORED_VOIDS.contains(&name) {
        return;
    }
    let tag = Tag::from_name(name);

    if tag == Some(Tag::Break) {
        if let Some(frame) = frames.last_mut() {
            frame.children.push(SurfaceNode::line_break());
        }
        return;
    }

    // Same-tag reopen closes the previous one, the way browsers recover
    // from `<p>a<p>b` and `<li>a<li>b`.
    if let Some(t) = tag {
        if frames.len() > 1 && frames.last().map(|f| f.tag) == Some(Some(t)) && t.is_structural() {
            finish_top(frames);
        }
    }

    if open.self_closing {
        if let (Some(t), Some(frame)) = (tag, frames.last_mut()) {
            frame.children.push(SurfaceNode::Element(Element {
                tag: t,
                href: open.href,
                children: Vec::new(),
            }));
        }
        return;
    }

    frames.push(Frame {
        name: name.to_string(),
        tag,
        href: open.href,
        children: Vec::new(),
    });
}

fn close_named(frames: &mut Vec<Frame>, name: &str) {
    let matching = frames
        .iter()
        .rposition(|f| f.name == name && !f.name.is_empty());
    let Some(index) = matching else {
        return; // Unmatched close tag: ignore.
    };
    while frames.len() > index {
        finish_top(frames);
    }
}

/// Close the innermost open frame, attaching its result to the parent.
/// Transparent (unknown-tag) frames splice their children through.
fn finish_top(frames: &mut Vec<Frame>) {
    if frames.len() <= 1 {
        return;
    }
    let frame = frames.pop().expect("frame stack is non-empty");
    let parent = frames.last_mut().expect("root frame always present");
    match frame.tag {
        Some(tag) => parent.children.push(SurfaceNode::Element(Element {
            tag,
            href: frame.href,
            children: frame.children,
        })),
        None => parent.children.extend(frame.children),
    }
}
