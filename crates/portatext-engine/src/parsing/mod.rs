//! Surface → model parsing.
//!
//! [`parse_surface`] reconstructs a block from the live editing surface.
//! It is total: malformed or unexpected structure always degrades to some
//! valid block, worst case one empty span, because the conversion runs on
//! every keystroke and must never fail on arbitrary paste content.

mod fragments;
mod links;

use crate::model::{Block, ListKind, Mark, Span, Style, keys};
use crate::surface::{Element, SurfaceNode, Tag, is_blank, plain_text};
use fragments::{Fragment, coalesce};
use links::LinkRegistry;

/// Result of parsing one block's surface.
///
/// `list_siblings` holds list items extracted from embedded `ul`/`ol`
/// elements (a pasted list, typically). They are proper blocks of their
/// own that the host should insert directly after the primary block —
/// grouping back into one rendered list happens at the view layer.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub block: Block,
    pub list_siblings: Vec<Block>,
}

/// Parse an editable surface against the block it previously showed.
///
/// The result carries `previous.key` — identity is the caller's concern
/// and is never reassigned here. A blank surface (including the canonical
/// empty-paragraph marker) keeps everything about `previous` except its
/// content, so transient empty states do not lose styling context.
pub fn parse_surface(nodes: &[SurfaceNode], previous: &Block) -> ParseOutcome {
    if is_blank(nodes) {
        let mut block = previous.clone();
        block.children = vec![Span::empty()];
        return ParseOutcome {
            block,
            list_siblings: Vec::new(),
        };
    }

    let mut registry = LinkRegistry::seeded(&previous.mark_defs);
    let mut fragments: Vec<Fragment> = Vec::new();
    let mut list_siblings: Vec<Block> = Vec::new();

    let mut style = Style::Normal;
    let mut list_item = None;
    let mut level = 1;

    let children = top_children(nodes);
    let mut emitted = false;
    for (i, child) in children.iter().enumerate() {
        let first = i == 0;
        match child {
            TopChild::Structural(el) => {
                if first {
                    (style, list_item, level) = block_shape(el.tag, previous);
                }
                if emitted {
                    fragments.push(Fragment::paragraph_separator());
                }
                walk_children(&el.children, &[], &mut fragments, &mut registry);
                emitted = true;
            }
            TopChild::Inline(run) => {
                // Loose top-level inline content acts as a paragraph.
                if emitted {
                    fragments.push(Fragment::paragraph_separator());
                }
                for node in run {
                    walk(node, &[], &mut fragments, &mut registry);
                }
                emitted = true;
            }
            TopChild::List { kind, items } => {
                let mut items = items.iter();
                if first {
                    // A list-led surface: the first item becomes the
                    // primary block, keeping the caller's identity.
                    list_item = Some(*kind);
                    level = 1;
                    if let Some(li) = items.next() {
                        walk_children(&li.children, &[], &mut fragments, &mut registry);
                        emitted = true;
                    }
                }
                for li in items {
                    list_siblings.push(list_item_block(li, *kind, &mut registry));
                }
            }
        }
    }

    let spans = coalesce(fragments);
    let mark_defs = registry.defs_for(&spans);
    let block = Block {
        key: previous.key.clone(),
        // List membership is exclusive with styling.
        style: if list_item.is_some() {
            Style::Normal
        } else {
            style
        },
        list_item,
        level: if list_item.is_some() { level } else { 1 },
        children: spans,
        mark_defs,
    };
    ParseOutcome {
        block,
        list_siblings,
    }
}

enum TopChild<'a> {
    Structural(&'a Element),
    List {
        kind: ListKind,
        items: Vec<&'a Element>,
    },
    Inline(Vec<&'a SurfaceNode>),
}

/// Segment the top level of a surface into structural children, embedded
/// lists, and loose inline runs. Whitespace-only inline runs (reader
/// artifacts between elements) are dropped.
fn top_children(nodes: &[SurfaceNode]) -> Vec<TopChild<'_>> {
    let mut children = Vec::new();
    let mut run: Vec<&SurfaceNode> = Vec::new();
    for node in nodes {
        match node {
            SurfaceNode::Element(el) if el.tag.is_structural() => {
                flush_run(&mut run, &mut children);
                children.push(TopChild::Structural(el));
            }
            SurfaceNode::Element(el) if el.tag.is_list() => {
                flush_run(&mut run, &mut children);
                let kind = match el.tag {
                    Tag::NumberedList => ListKind::Number,
                    _ => ListKind::Bullet,
                };
                let items = el
                    .children
                    .iter()
                    .filter_map(|n| match n {
                        SurfaceNode::Element(li) if li.tag == Tag::ListItem => Some(li),
                        _ => None,
                    })
                    .collect();
                children.push(TopChild::List { kind, items });
            }
            other => run.push(other),
        }
    }
    flush_run(&mut run, &mut children);
    children
}

fn flush_run<'a>(run: &mut Vec<&'a SurfaceNode>, children: &mut Vec<TopChild<'a>>) {
    if run.is_empty() {
        return;
    }
    let nodes: Vec<SurfaceNode> = run.iter().map(|n| (*n).clone()).collect();
    if plain_text(&nodes).trim().is_empty() {
        run.clear();
        return;
    }
    children.push(TopChild::Inline(std::mem::take(run)));
}

/// Style and list shape a block takes from its first structural child.
/// A leading `li` keeps the previous block's list membership — the
/// surface of a split list item is a bare `li`.
fn block_shape(tag: Tag, previous: &Block) -> (Style, Option<ListKind>, u32) {
    match tag {
        Tag::Heading1 => (Style::Heading1, None, 1),
        Tag::Heading2 => (Style::Heading2, None, 1),
        Tag::Heading3 => (Style::Heading3, None, 1),
        Tag::Blockquote => (Style::Quote, None, 1),
        Tag::ListItem => (
            Style::Normal,
            previous.list_item.or(Some(ListKind::Bullet)),
            previous.level.max(1),
        ),
        _ => (Style::Normal, None, 1),
    }
}

fn walk_children(
    children: &[SurfaceNode],
    ctx: &[Mark],
    fragments: &mut Vec<Fragment>,
    registry: &mut LinkRegistry,
) {
    for child in children {
        walk(child, ctx, fragments, registry);
    }
}

/// Depth-first walk accumulating inherited mark context. Line breaks are
/// literal `\n` fragments carrying the current context; elements outside
/// the known set are transparent.
fn walk(
    node: &SurfaceNode,
    ctx: &[Mark],
    fragments: &mut Vec<Fragment>,
    registry: &mut LinkRegistry,
) {
    match node {
        SurfaceNode::Text(text) => {
            if !text.is_empty() {
                fragments.push(Fragment::new(text.clone(), ctx.to_vec()));
            }
        }
        SurfaceNode::Element(el) => match el.tag {
            Tag::Break => fragments.push(Fragment::new("\n", ctx.to_vec())),
            Tag::Strong => walk_marked(el, Mark::Strong, ctx, fragments, registry),
            Tag::Em => walk_marked(el, Mark::Em, ctx, fragments, registry),
            Tag::Underline => walk_marked(el, Mark::Underline, ctx, fragments, registry),
            Tag::Anchor => match el.href.as_deref().filter(|h| !h.is_empty()) {
                Some(href) => {
                    let key = registry.key_for(href);
                    walk_marked(el, Mark::Def(key), ctx, fragments, registry);
                }
                // An anchor with no target composes nothing.
                None => walk_children(&el.children, ctx, fragments, registry),
            },
            _ => walk_children(&el.children, ctx, fragments, registry),
        },
    }
}

fn walk_marked(
    el: &Element,
    mark: Mark,
    ctx: &[Mark],
    fragments: &mut Vec<Fragment>,
    registry: &mut LinkRegistry,
) {
    let mut inner = ctx.to_vec();
    if !inner.contains(&mark) {
        inner.push(mark);
    }
    walk_children(&el.children, &inner, fragments, registry);
}

/// Build a standalone list-item block from an embedded `li`.
fn list_item_block(li: &Element, kind: ListKind, registry: &mut LinkRegistry) -> Block {
    let mut fragments = Vec::new();
    walk_children(&li.children, &[], &mut fragments, registry);
    let spans = coalesce(fragments);
    let mark_defs = registry.defs_for(&spans);
    Block {
        key: keys::generate(),
        style: Style::Normal,
        list_item: Some(kind),
        level: 1,
        children: spans,
        mark_defs,
    }
}
