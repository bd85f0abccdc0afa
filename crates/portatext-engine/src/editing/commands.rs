use thiserror::Error;

use crate::model::{Block, ListKind, Mark, MarkDef, Span, Style, keys, merge_spans};
use crate::surface::SelectionRange;

/// Formatting commands the floating toolbar issues against the current
/// selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    ToggleMark(InlineMark),
    SetStyle(Style),
    ToggleList(ListKind),
    /// `Some` applies a link over the selection (reusing an existing
    /// definition for the same target); `None` removes link marks.
    SetLink(Option<String>),
}

/// The three built-in inline marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineMark {
    Strong,
    Em,
    Underline,
}

impl InlineMark {
    fn to_mark(self) -> Mark {
        match self {
            InlineMark::Strong => Mark::Strong,
            InlineMark::Em => Mark::Em,
            InlineMark::Underline => Mark::Underline,
        }
    }
}

impl Cmd {
    /// Translate the inline link prompt's result: cancellation is a
    /// no-op, an emptied field removes the link, anything else links to
    /// the given target.
    pub fn from_link_prompt(input: Option<&str>) -> Option<Cmd> {
        match input {
            None => None,
            Some(url) if url.trim().is_empty() => Some(Cmd::SetLink(None)),
            Some(url) => Some(Cmd::SetLink(Some(url.trim().to_string()))),
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("selection {start}..{end} is reversed")]
    ReversedSelection { start: usize, end: usize },
    #[error("selection {start}..{end} is outside the block text (length {len})")]
    SelectionOutOfBounds {
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("command requires a non-collapsed selection")]
    CollapsedSelection,
}

/// Apply a toolbar command to a block. Mark and link commands operate on
/// the selected character range, splitting spans at its edges; block
/// commands ignore the selection. The span-merge invariant holds on
/// return.
pub fn apply_command(
    block: &mut Block,
    cmd: &Cmd,
    selection: SelectionRange,
) -> Result<(), CommandError> {
    if selection.start > selection.end {
        return Err(CommandError::ReversedSelection {
            start: selection.start,
            end: selection.end,
        });
    }
    let len = block.text().chars().count();
    if selection.end > len {
        return Err(CommandError::SelectionOutOfBounds {
            start: selection.start,
            end: selection.end,
            len,
        });
    }

    match cmd {
        Cmd::SetStyle(style) => {
            // Reapplying the active style toggles back to normal.
            block.style = if block.style == *style {
                Style::Normal
            } else {
                *style
            };
            if block.style != Style::Normal {
                block.list_item = None;
                block.level = 1;
            }
        }
        Cmd::ToggleList(kind) => {
            if block.list_item == Some(*kind) {
                block.list_item = None;
            } else {
                block.list_item = Some(*kind);
                block.style = Style::Normal;
            }
            block.level = 1;
        }
        Cmd::ToggleMark(inline) => {
            require_range(selection)?;
            let mark = inline.to_mark();
            if range_fully_marked(block, selection, &mark) {
                mutate_range(block, selection, |span| {
                    span.marks.retain(|m| *m != mark);
                });
            } else {
                let mark = inline.to_mark();
                mutate_range(block, selection, move |span| {
                    if !span.marks.contains(&mark) {
                        span.marks.push(mark.clone());
                    }
                });
            }
        }
        Cmd::SetLink(Some(href)) => {
            require_range(selection)?;
            let key = match block.mark_defs.iter().find(|d| d.href == *href) {
                Some(def) => def.key.clone(),
                None => {
                    let def = MarkDef::link(keys::generate(), href.clone());
                    let key = def.key.clone();
                    block.mark_defs.push(def);
                    key
                }
            };
            mutate_range(block, selection, move |span| {
                span.marks.retain(|m| !matches!(m, Mark::Def(_)));
                span.marks.push(Mark::Def(key.clone()));
            });
            block.prune_mark_defs();
        }
        Cmd::SetLink(None) => {
            require_range(selection)?;
            mutate_range(block, selection, |span| {
                span.marks.retain(|m| !matches!(m, Mark::Def(_)));
            });
            block.prune_mark_defs();
        }
    }
    Ok(())
}

fn require_range(selection: SelectionRange) -> Result<(), CommandError> {
    if selection.is_collapsed() {
        return Err(CommandError::CollapsedSelection);
    }
    Ok(())
}

/// True iff every character in the range carries the mark.
fn range_fully_marked(block: &Block, range: SelectionRange, mark: &Mark) -> bool {
    let mut acc = 0;
    for span in &block.children {
        let span_len = span.text.chars().count();
        let overlap = acc.max(range.start) < (acc + span_len).min(range.end);
        if overlap && !span.marks.contains(mark) {
            return false;
        }
        acc += span_len;
    }
    true
}

/// Split spans at the range edges, apply `f` to every span fully inside,
/// then restore the merge invariant.
fn mutate_range(block: &mut Block, range: SelectionRange, mut f: impl FnMut(&mut Span)) {
    split_spans_at(&mut block.children, range.start);
    split_spans_at(&mut block.children, range.end);

    let mut acc = 0;
    for span in &mut block.children {
        let span_len = span.text.chars().count();
        if acc >= range.start && acc + span_len <= range.end && span_len > 0 {
            f(span);
        }
        acc += span_len;
    }

    block.children = merge_spans(std::mem::take(&mut block.children));
}

/// Split the span containing `offset` so a span boundary falls exactly
/// there. No-op when the offset already sits on a boundary.
fn split_spans_at(spans: &mut Vec<Span>, offset: usize) {
    let mut acc = 0;
    for i in 0..spans.len() {
        let span_len = spans[i].text.chars().count();
        if offset > acc && offset < acc + span_len {
            let local = offset - acc;
            let byte = spans[i]
                .text
                .char_indices()
                .nth(local)
                .map(|(b, _)| b)
                .unwrap_or(spans[i].text.len());
            let tail = spans[i].text.split_off(byte);
            let marks = spans[i].marks.clone();
            spans.insert(i + 1, Span::new(tail, marks));
            return;
        }
        acc += span_len;
    }
}
