use std::collections::HashSet;

use crate::model::keys;
use crate::model::marks::{Mark, MarkDef, marks_equal, normalized_mark_names};

/// Paragraph-level presentation of a text block. Mutually exclusive with
/// list membership: list blocks force `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Normal,
    Heading1,
    Heading2,
    Heading3,
    Quote,
}

/// List membership kind of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Number,
}

/// A run of text sharing one exact set of marks.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub key: String,
    pub text: String,
    pub marks: Vec<Mark>,
}

impl Span {
    pub fn new(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Self {
            key: keys::generate(),
            text: text.into(),
            marks,
        }
    }

    /// A span with no marks.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }

    /// The single span an otherwise-empty block holds.
    pub fn empty() -> Self {
        Self::plain("")
    }
}

/// Merge adjacent spans whose mark sets are identical (order-insensitive).
/// Empty-text spans are dropped; an all-empty input collapses to the one
/// canonical empty span.
pub fn merge_spans(spans: Vec<Span>) -> Vec<Span> {
    let mut merged: Vec<Span> = Vec::new();
    for span in spans {
        if span.text.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if marks_equal(&last.marks, &span.marks) => {
                last.text.push_str(&span.text);
            }
            _ => merged.push(span),
        }
    }
    if merged.is_empty() {
        merged.push(Span::empty());
    }
    merged
}

/// The atomic content unit: one paragraph, heading, quote, or list item.
///
/// Invariants:
/// - `children` is never empty; an empty block holds exactly one empty span.
/// - Every `Mark::Def` key referenced by a span resolves through `mark_defs`
///   after a parse. Dangling definitions are permitted transiently and
///   pruned on save.
/// - `level` is meaningful only when `list_item` is set, and is at least 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub key: String,
    pub style: Style,
    pub list_item: Option<ListKind>,
    pub level: u32,
    pub children: Vec<Span>,
    pub mark_defs: Vec<MarkDef>,
}

impl Block {
    /// A fresh empty paragraph block.
    pub fn empty() -> Self {
        Self {
            key: keys::generate(),
            style: Style::Normal,
            list_item: None,
            level: 1,
            children: vec![Span::empty()],
            mark_defs: Vec::new(),
        }
    }

    /// A plain paragraph holding one unmarked span.
    pub fn paragraph(text: impl Into<String>) -> Self {
        let mut block = Self::empty();
        block.children = vec![Span::plain(text)];
        block
    }

    /// A list item of the given kind at nesting level 1.
    pub fn list_item(kind: ListKind, text: impl Into<String>) -> Self {
        let mut block = Self::paragraph(text);
        block.list_item = Some(kind);
        block
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// True iff every span's trimmed text is empty.
    pub fn is_empty(&self) -> bool {
        self.children.iter().all(|s| s.text.trim().is_empty())
    }

    /// Concatenation of all span texts.
    pub fn text(&self) -> String {
        self.children.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn mark_def(&self, key: &str) -> Option<&MarkDef> {
        self.mark_defs.iter().find(|d| d.key == key)
    }

    fn referenced_def_keys(&self) -> HashSet<&str> {
        self.children
            .iter()
            .flat_map(|s| s.marks.iter())
            .filter_map(|m| match m {
                Mark::Def(key) => Some(key.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Drop mark definitions no span references. Save-time normalization;
    /// transiently dangling defs are fine while editing.
    pub fn prune_mark_defs(&mut self) {
        let referenced: HashSet<String> = self
            .referenced_def_keys()
            .into_iter()
            .map(str::to_owned)
            .collect();
        self.mark_defs.retain(|d| referenced.contains(&d.key));
    }

    /// Structural equality ignoring every generated key: same style, list
    /// membership, level, span texts, and mark semantics (def keys compare
    /// through their resolved href). Parsing regenerates span and def keys,
    /// so tests compare through this.
    pub fn eq_ignoring_keys(&self, other: &Block) -> bool {
        if self.style != other.style
            || self.list_item != other.list_item
            || self.level != other.level
            || self.children.len() != other.children.len()
        {
            return false;
        }
        self.children
            .iter()
            .zip(other.children.iter())
            .all(|(a, b)| a.text == b.text && self.mark_shape(a) == other.mark_shape(b))
    }

    /// A span's marks with def keys replaced by their resolved targets.
    fn mark_shape(&self, span: &Span) -> Vec<String> {
        let mut shape: Vec<String> = normalized_mark_names(&span.marks)
            .into_iter()
            .map(|name| match self.mark_def(name) {
                Some(def) => format!("link:{}", def.href),
                None => name.to_string(),
            })
            .collect();
        shape.sort_unstable();
        shape
    }
}

/// A newsletter image component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlock {
    pub key: String,
    pub url: String,
    pub alt: Option<String>,
}

/// A horizontal divider component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DividerBlock {
    pub key: String,
}

/// A call-to-action button component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonBlock {
    pub key: String,
    pub text: String,
    pub url: String,
}

/// One unit of a hosted document: a rich-text block or one of the fixed
/// custom component kinds. A closed sum, so block handling is exhaustive
/// instead of switching on a runtime type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentBlock {
    Text(Block),
    Image(ImageBlock),
    Divider(DividerBlock),
    Button(ButtonBlock),
}

impl DocumentBlock {
    pub fn key(&self) -> &str {
        match self {
            DocumentBlock::Text(b) => &b.key,
            DocumentBlock::Image(b) => &b.key,
            DocumentBlock::Divider(b) => &b.key,
            DocumentBlock::Button(b) => &b.key,
        }
    }

    /// The text block inside, if this is one.
    pub fn as_text(&self) -> Option<&Block> {
        match self {
            DocumentBlock::Text(b) => Some(b),
            _ => None,
        }
    }
}
