//! Model → surface serialization.
//!
//! Renders one block into the markup the editing surface shows. List
//! items render as a bare `li` — grouping runs of them under `ul`/`ol`
//! is the view layer's job ([`crate::grouping`]), never the serializer's.

use crate::model::{Block, Mark, Style, marks_equal};
use crate::surface::{Element, SurfaceNode, Tag, empty_paragraph};

/// Serialize a block to its editable surface form.
///
/// - An all-empty block yields the canonical empty paragraph regardless
///   of style.
/// - A list item yields a single `li` whose inline content is the
///   mark-wrapped span sequence; embedded newlines become line breaks.
/// - Anything else splits on double-newline boundaries into paragraphs
///   wrapped in the element its style implies, with marks re-attached to
///   the matching sub-ranges.
pub fn render_block(block: &Block) -> Vec<SurfaceNode> {
    if block.list_item.is_some() && !block.is_empty() {
        let inline = render_pieces(&pieces(block, true), block);
        return vec![SurfaceNode::Element(Element::new(Tag::ListItem, inline))];
    }
    if block.is_empty() {
        return empty_paragraph();
    }

    let tag = style_tag(block.style);
    let mut out = Vec::new();
    for paragraph in split_paragraphs(pieces(block, false)) {
        // An empty paragraph between two breaks stays an empty element;
        // giving it a br would grow the text by one newline per cycle.
        let inline = render_pieces(&paragraph, block);
        out.push(SurfaceNode::Element(Element::new(tag, inline)));
    }
    if out.is_empty() {
        return empty_paragraph();
    }
    out
}

fn style_tag(style: Style) -> Tag {
    match style {
        Style::Normal => Tag::Paragraph,
        Style::Heading1 => Tag::Heading1,
        Style::Heading2 => Tag::Heading2,
        Style::Heading3 => Tag::Heading3,
        Style::Quote => Tag::Blockquote,
    }
}

/// Flat inline pieces of a block, with span marks carried onto the line
/// breaks inside each span so a break never escapes its mark wrappers.
#[derive(Debug, Clone)]
enum Piece {
    Run { text: String, marks: Vec<Mark> },
    LineBreak { marks: Vec<Mark> },
    ParagraphBreak,
}

impl Piece {
    fn marks(&self) -> Option<&[Mark]> {
        match self {
            Piece::Run { marks, .. } | Piece::LineBreak { marks } => Some(marks),
            Piece::ParagraphBreak => None,
        }
    }
}

fn pieces(block: &Block, list_mode: bool) -> Vec<Piece> {
    let mut out = Vec::new();
    for span in &block.children {
        let mut run = String::new();
        let mut chars = span.text.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '\n' {
                run.push(c);
                continue;
            }
            if !run.is_empty() {
                out.push(Piece::Run {
                    text: std::mem::take(&mut run),
                    marks: span.marks.clone(),
                });
            }
            if !list_mode && chars.peek() == Some(&'\n') {
                chars.next();
                out.push(Piece::ParagraphBreak);
            } else {
                out.push(Piece::LineBreak {
                    marks: span.marks.clone(),
                });
            }
        }
        if !run.is_empty() {
            out.push(Piece::Run {
                text: run,
                marks: span.marks.clone(),
            });
        }
    }
    out
}

fn split_paragraphs(pieces: Vec<Piece>) -> Vec<Vec<Piece>> {
    let mut paragraphs = vec![Vec::new()];
    for piece in pieces {
        match piece {
            Piece::ParagraphBreak => paragraphs.push(Vec::new()),
            piece => paragraphs
                .last_mut()
                .expect("paragraph list starts non-empty")
                .push(piece),
        }
    }
    paragraphs
}

/// Turn a run of pieces into inline nodes, wrapping each maximal group
/// sharing one mark set exactly once.
fn render_pieces(pieces: &[Piece], block: &Block) -> Vec<SurfaceNode> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < pieces.len() {
        let marks = pieces[i].marks().expect("paragraph breaks are split out");
        let mut inner = Vec::new();
        while i < pieces.len() {
            let piece_marks = pieces[i].marks().expect("paragraph breaks are split out");
            if !marks_equal(marks, piece_marks) {
                break;
            }
            match &pieces[i] {
                Piece::Run { text, .. } => inner.push(SurfaceNode::text(text.clone())),
                Piece::LineBreak { .. } => inner.push(SurfaceNode::line_break()),
                Piece::ParagraphBreak => unreachable!(),
            }
            i += 1;
        }
        out.extend(wrap_marks(inner, marks, block));
    }
    out
}

/// Wrap inline nodes in mark elements, reversed once so the first-listed
/// mark ends up outermost. Dangling def keys are dropped.
fn wrap_marks(inner: Vec<SurfaceNode>, marks: &[Mark], block: &Block) -> Vec<SurfaceNode> {
    let mut nodes = inner;
    for mark in marks.iter().rev() {
        let element = match mark {
            Mark::Strong => Element::new(Tag::Strong, nodes),
            Mark::Em => Element::new(Tag::Em, nodes),
            Mark::Underline => Element::new(Tag::Underline, nodes),
            Mark::Def(key) => match block.mark_def(key) {
                Some(def) => Element::anchor(def.href.clone(), nodes),
                None => continue,
            },
        };
        nodes = vec![SurfaceNode::Element(element)];
    }
    nodes
}
