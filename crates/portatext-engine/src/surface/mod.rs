//! The editable surface: an explicit markup tree standing in for the
//! host's contenteditable DOM.
//!
//! Everything the conversion core needs from the live editing surface is
//! expressed here as plain values — nodes, tags, and an explicit
//! [`SelectionRange`] — so the whole pipeline runs headless. Offsets are
//! character offsets into the flattened surface text, which coincides with
//! the model's span-text concatenation by construction: consecutive
//! structural siblings flatten with a `\n\n` between them and a line break
//! flattens to `\n`.

pub mod html;

/// Tags the surface understands. A closed set: the reader maps everything
/// else onto these or treats it as transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    Blockquote,
    ListItem,
    BulletList,
    NumberedList,
    Strong,
    Em,
    Underline,
    Anchor,
    Break,
}

impl Tag {
    pub fn name(self) -> &'static str {
        match self {
            Tag::Paragraph => "p",
            Tag::Heading1 => "h1",
            Tag::Heading2 => "h2",
            Tag::Heading3 => "h3",
            Tag::Blockquote => "blockquote",
            Tag::ListItem => "li",
            Tag::BulletList => "ul",
            Tag::NumberedList => "ol",
            Tag::Strong => "strong",
            Tag::Em => "em",
            Tag::Underline => "u",
            Tag::Anchor => "a",
            Tag::Break => "br",
        }
    }

    /// Map an HTML tag name (lowercased) onto the closed set, folding the
    /// usual aliases: `b`/`i` for strong/em, `div` for paragraph, and deep
    /// heading levels onto h3.
    pub fn from_name(name: &str) -> Option<Tag> {
        let tag = match name {
            "p" | "div" => Tag::Paragraph,
            "h1" => Tag::Heading1,
            "h2" => Tag::Heading2,
            "h3" | "h4" | "h5" | "h6" => Tag::Heading3,
            "blockquote" => Tag::Blockquote,
            "li" => Tag::ListItem,
            "ul" => Tag::BulletList,
            "ol" => Tag::NumberedList,
            "strong" | "b" => Tag::Strong,
            "em" | "i" => Tag::Em,
            "u" => Tag::Underline,
            "a" => Tag::Anchor,
            "br" => Tag::Break,
            _ => return None,
        };
        Some(tag)
    }

    /// Paragraph-like elements that carry block structure.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            Tag::Paragraph
                | Tag::Heading1
                | Tag::Heading2
                | Tag::Heading3
                | Tag::Blockquote
                | Tag::ListItem
        )
    }

    pub fn is_list(self) -> bool {
        matches!(self, Tag::BulletList | Tag::NumberedList)
    }

    pub fn is_inline_mark(self) -> bool {
        matches!(self, Tag::Strong | Tag::Em | Tag::Underline | Tag::Anchor)
    }

    pub fn is_void(self) -> bool {
        matches!(self, Tag::Break)
    }
}

/// One element of the surface tree. `href` is meaningful only for
/// [`Tag::Anchor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: Tag,
    pub href: Option<String>,
    pub children: Vec<SurfaceNode>,
}

impl Element {
    pub fn new(tag: Tag, children: Vec<SurfaceNode>) -> Self {
        Self {
            tag,
            href: None,
            children,
        }
    }

    pub fn anchor(href: impl Into<String>, children: Vec<SurfaceNode>) -> Self {
        Self {
            tag: Tag::Anchor,
            href: Some(href.into()),
            children,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceNode {
    Element(Element),
    Text(String),
}

impl SurfaceNode {
    pub fn text(text: impl Into<String>) -> Self {
        SurfaceNode::Text(text.into())
    }

    pub fn element(tag: Tag, children: Vec<SurfaceNode>) -> Self {
        SurfaceNode::Element(Element::new(tag, children))
    }

    pub fn line_break() -> Self {
        Self::element(Tag::Break, Vec::new())
    }

    /// Length of this node in flattened-text characters.
    pub fn char_len(&self) -> usize {
        match self {
            SurfaceNode::Text(s) => s.chars().count(),
            SurfaceNode::Element(el) if el.tag == Tag::Break => 1,
            SurfaceNode::Element(el) if el.tag.is_list() => {
                // Items join with a single newline.
                let items: Vec<usize> = el.children.iter().map(SurfaceNode::char_len).collect();
                items.iter().sum::<usize>() + items.len().saturating_sub(1)
            }
            SurfaceNode::Element(el) => el.children.iter().map(SurfaceNode::char_len).sum(),
        }
    }

    /// Whether this node carries block structure at the top level.
    pub fn is_blockish(&self) -> bool {
        matches!(self, SurfaceNode::Element(el) if el.tag.is_structural() || el.tag.is_list())
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            SurfaceNode::Text(s) => out.push_str(s),
            SurfaceNode::Element(el) if el.tag == Tag::Break => out.push('\n'),
            SurfaceNode::Element(el) if el.tag.is_list() => {
                for (i, item) in el.children.iter().enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    item.collect_text(out);
                }
            }
            SurfaceNode::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// An explicit selection over the flattened surface text. Collapsed means
/// a bare caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub start: usize,
    pub end: usize,
}

impl SelectionRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn caret(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Flatten a surface to plain text. Structural siblings join with `\n\n`,
/// line breaks become `\n`, so the result equals the parsed block's
/// concatenated span text.
pub fn plain_text(nodes: &[SurfaceNode]) -> String {
    let mut out = String::new();
    let mut prev_blockish = false;
    for (i, node) in nodes.iter().enumerate() {
        let blockish = node.is_blockish();
        if i > 0 && prev_blockish && blockish {
            out.push_str("\n\n");
        }
        node.collect_text(&mut out);
        prev_blockish = blockish;
    }
    out
}

/// Total character length of the flattened surface.
pub fn text_len(nodes: &[SurfaceNode]) -> usize {
    plain_text(nodes).chars().count()
}

/// Whitespace-only surfaces, including the canonical empty-paragraph
/// marker, count as blank.
pub fn is_blank(nodes: &[SurfaceNode]) -> bool {
    plain_text(nodes).trim().is_empty()
}

/// The canonical empty-paragraph surface: `<p><br></p>`.
pub fn empty_paragraph() -> Vec<SurfaceNode> {
    vec![SurfaceNode::element(
        Tag::Paragraph,
        vec![SurfaceNode::line_break()],
    )]
}

/// Locate the structural element containing a flattened-text offset.
/// Returns the top-level child index and the offset local to that child;
/// offsets falling inside a `\n\n` separator clamp to the nearer edge.
pub fn structural_child_at(nodes: &[SurfaceNode], offset: usize) -> Option<(usize, usize)> {
    let mut acc = 0;
    let mut prev_blockish = false;
    for (i, node) in nodes.iter().enumerate() {
        let blockish = node.is_blockish();
        if i > 0 && prev_blockish && blockish {
            acc += 2;
        }
        let len = node.char_len();
        if blockish && offset <= acc + len {
            return Some((i, offset.saturating_sub(acc).min(len)));
        }
        acc += len;
        prev_blockish = blockish;
    }
    None
}

/// Split a surface into two valid surfaces at a flattened-text offset.
/// The containing structural element splits into two elements of the same
/// tag; nested inline wrappers split with it. An offset outside any
/// structural element puts everything in the left half.
pub fn split_at(nodes: &[SurfaceNode], offset: usize) -> (Vec<SurfaceNode>, Vec<SurfaceNode>) {
    let Some((index, local)) = structural_child_at(nodes, offset) else {
        return (nodes.to_vec(), Vec::new());
    };
    let SurfaceNode::Element(el) = &nodes[index] else {
        return (nodes.to_vec(), Vec::new());
    };

    let (left_children, right_children) = split_children(&el.children, local);
    let mut before: Vec<SurfaceNode> = nodes[..index].to_vec();
    before.push(SurfaceNode::Element(Element {
        tag: el.tag,
        href: el.href.clone(),
        children: left_children,
    }));
    let mut after: Vec<SurfaceNode> = vec![SurfaceNode::Element(Element {
        tag: el.tag,
        href: el.href.clone(),
        children: right_children,
    })];
    after.extend(nodes[index + 1..].iter().cloned());
    (before, after)
}

fn split_children(children: &[SurfaceNode], offset: usize) -> (Vec<SurfaceNode>, Vec<SurfaceNode>) {
    let mut remaining = offset;
    let mut before = Vec::new();
    let mut after = Vec::new();
    for child in children {
        if remaining == 0 {
            after.push(child.clone());
            continue;
        }
        let len = child.char_len();
        if len <= remaining {
            remaining -= len;
            before.push(child.clone());
            continue;
        }
        match child {
            SurfaceNode::Text(s) => {
                let byte = s
                    .char_indices()
                    .nth(remaining)
                    .map(|(b, _)| b)
                    .unwrap_or(s.len());
                before.push(SurfaceNode::Text(s[..byte].to_string()));
                after.push(SurfaceNode::Text(s[byte..].to_string()));
            }
            SurfaceNode::Element(el) => {
                let (l, r) = split_children(&el.children, remaining);
                if !l.is_empty() {
                    before.push(SurfaceNode::Element(Element {
                        tag: el.tag,
                        href: el.href.clone(),
                        children: l,
                    }));
                }
                if !r.is_empty() {
                    after.push(SurfaceNode::Element(Element {
                        tag: el.tag,
                        href: el.href.clone(),
                        children: r,
                    }));
                }
            }
        }
        remaining = 0;
    }
    (before, after)
}
