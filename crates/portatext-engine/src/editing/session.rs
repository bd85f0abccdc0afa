use crate::editing::commands::{Cmd, apply_command};
use crate::editing::host::Host;
use crate::model::{Block, Style};
use crate::parsing::{ParseOutcome, parse_surface};
use crate::rendering::render_block;
use crate::surface::{
    SelectionRange, SurfaceNode, Tag, html, is_blank, plain_text, split_at, structural_child_at,
    text_len,
};

/// Whether the surface or the model currently holds the truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Surface mirrors the model; not focused.
    Viewing,
    /// Surface is the live, user-mutable truth; the model is re-derived
    /// from it on every input event.
    Editing,
}

/// The interactive controller for one block.
///
/// Holds the block's model value and its live surface, mediates focus and
/// selection, and turns structural key events into split/merge requests
/// against the [`Host`]. While editing, parses propagate the model upward
/// but are never reflected back into the surface — only blur runs a
/// synchronized re-serialize, and only when the canonical form actually
/// differs, so the caret never jumps mid-edit.
pub struct EditingSession {
    block: Block,
    surface: Vec<SurfaceNode>,
    state: SessionState,
    selection: Option<SelectionRange>,
    saved_selection: Option<SelectionRange>,
}

impl EditingSession {
    pub fn new(block: Block) -> Self {
        let surface = render_block(&block);
        Self {
            block,
            surface,
            state: SessionState::Viewing,
            selection: None,
            saved_selection: None,
        }
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn surface(&self) -> &[SurfaceNode] {
        &self.surface
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_editing(&self) -> bool {
        self.state == SessionState::Editing
    }

    pub fn selection(&self) -> Option<SelectionRange> {
        self.selection
    }

    /// Record the current surface selection. The previous value is kept
    /// so a failed formatting command can restore it.
    pub fn set_selection(&mut self, selection: Option<SelectionRange>) {
        self.saved_selection = self.selection;
        self.selection = selection;
    }

    /// The floating toolbar shows while a non-collapsed selection sits
    /// inside the editing surface.
    pub fn toolbar_visible(&self) -> bool {
        self.is_editing()
            && self
                .selection
                .is_some_and(|sel| !sel.is_collapsed() && sel.end <= text_len(&self.surface))
    }

    pub fn focus(&mut self, host: &mut dyn Host) {
        self.state = SessionState::Editing;
        host.on_focus();
    }

    /// Blur: one final parse-and-commit, then a synchronized re-serialize
    /// if the canonical surface differs from the live one.
    pub fn blur(&mut self, host: &mut dyn Host) {
        let outcome = parse_surface(&self.surface, &self.block);
        self.commit(outcome, host);
        let rendered = render_block(&self.block);
        if rendered != self.surface {
            self.surface = rendered;
        }
        self.state = SessionState::Viewing;
        self.selection = None;
        host.on_blur();
    }

    /// An input event replaced the surface. The surface stays as given
    /// (it is the truth while focused); the model re-derives from it and
    /// propagates so siblings like word counts and autosave stay current.
    pub fn input(&mut self, host: &mut dyn Host, new_surface: Vec<SurfaceNode>) {
        self.surface = new_surface;
        let outcome = parse_surface(&self.surface, &self.block);
        if !outcome.list_siblings.is_empty() {
            // Extracted list items leave the surface, or the next parse
            // would extract them again.
            self.block = outcome.block.clone();
            self.surface = render_block(&self.block);
        }
        self.commit(outcome, host);
    }

    /// Paste HTML over the current selection (or at the end when there is
    /// none): the clipboard markup is read forgivingly and spliced in.
    /// Purely inline content lands inside the paragraph the caret sits
    /// in; block-level content joins the surface as further structural
    /// children.
    pub fn paste_html(&mut self, host: &mut dyn Host, clipboard: &str) {
        let selection = self
            .selection
            .unwrap_or_else(|| SelectionRange::caret(text_len(&self.surface)));
        let (before, _) = split_at(&self.surface, selection.start);
        let (_, after) = split_at(&self.surface, selection.end);

        let pasted = html::read(clipboard);
        let caret = selection.start + text_len(&pasted);
        let spliced = splice(before, pasted, after);

        self.input(host, spliced);
        self.set_selection(Some(SelectionRange::caret(
            caret.min(text_len(&self.surface)),
        )));
    }

    /// Enter with no modifier: split at the caret, or promote an empty
    /// list item back to a paragraph.
    pub fn key_enter(&mut self, host: &mut dyn Host, caret: usize) {
        let containing = structural_child_at(&self.surface, caret);
        // An all-empty list item shows the canonical empty paragraph, so
        // list membership comes from the block as well as the surface.
        let in_list = self.block.list_item.is_some()
            || matches!(
                containing,
                Some((i, _)) if matches!(
                    &self.surface[i],
                    SurfaceNode::Element(el) if el.tag == Tag::ListItem
                )
            );

        if in_list && self.empty_before_caret(caret) && is_blank(&self.surface) {
            // An empty list item does not spawn another: it becomes a
            // plain paragraph with a fresh paragraph after it.
            self.block.list_item = None;
            self.block.level = 1;
            self.block.style = Style::Normal;
            self.surface = render_block(&self.block);
            host.on_add_new_block(self.block.clone(), Block::empty());
            return;
        }

        if !host.supports_block_insertion() {
            self.insert_paragraph_fallback(host, containing.map(|(i, _)| i));
            return;
        }

        let (before, after) = split_at(&self.surface, caret);
        let before_block = parse_surface(&before, &self.block).block;

        let mut template = Block::empty();
        template.mark_defs = self.block.mark_defs.clone();
        if in_list {
            template.list_item = self.block.list_item;
            template.level = self.block.level;
        } else {
            template.style = self.block.style;
        }
        let after_block = parse_surface(&after, &template).block;

        self.block = before_block;
        self.surface = render_block(&self.block);
        if in_list {
            host.on_add_new_list_item(self.block.clone(), after_block);
        } else {
            host.on_add_new_block(self.block.clone(), after_block);
        }
    }

    /// Backspace/Delete on an empty block removes the block outright.
    /// Returns whether the event was consumed.
    pub fn key_backspace(&mut self, host: &mut dyn Host) -> bool {
        if is_blank(&self.surface) {
            host.on_delete_block();
            return true;
        }
        false
    }

    /// Apply a toolbar command against the current selection and force an
    /// immediate parse-and-propagate, bypassing the blur-only sync. A
    /// failing command restores the previously saved selection and is
    /// swallowed after logging.
    pub fn apply(&mut self, host: &mut dyn Host, cmd: Cmd) {
        let selection = self.selection.unwrap_or(SelectionRange::caret(0));
        let mut updated = parse_surface(&self.surface, &self.block).block;
        match apply_command(&mut updated, &cmd, selection) {
            Ok(()) => {
                self.block = updated;
                self.surface = render_block(&self.block);
                host.on_change(self.block.clone());
            }
            Err(err) => {
                log::warn!("formatting command failed, restoring selection: {err}");
                self.selection = self.saved_selection;
            }
        }
    }

    fn commit(&mut self, outcome: ParseOutcome, host: &mut dyn Host) {
        // Span keys regenerate on every parse; compare semantically so an
        // unchanged block does not re-propagate.
        let changed = !(outcome.block.key == self.block.key
            && outcome.block.eq_ignoring_keys(&self.block));
        self.block = outcome.block;
        if changed {
            host.on_change(self.block.clone());
        }
        // Reverse order keeps insert-after semantics in document order.
        for sibling in outcome.list_siblings.into_iter().rev() {
            host.on_add_new_list_item(self.block.clone(), sibling);
        }
    }

    fn empty_before_caret(&self, caret: usize) -> bool {
        let text = plain_text(&self.surface);
        let before: String = text.chars().take(caret).collect();
        before.trim().is_empty()
    }

    /// Degraded Enter for hosts without block insertion: a plain new
    /// paragraph goes into the surface itself.
    fn insert_paragraph_fallback(&mut self, host: &mut dyn Host, after_index: Option<usize>) {
        let index = after_index.map(|i| i + 1).unwrap_or(self.surface.len());
        self.surface
            .insert(index, SurfaceNode::element(Tag::Paragraph, Vec::new()));
        let outcome = parse_surface(&self.surface, &self.block);
        self.commit(outcome, host);
    }
}

/// Join the two halves of a split surface around pasted content. Inline
/// paste goes into the structural element the split opened; the two half
/// elements then knit back together. Block paste keeps the halves apart.
fn splice(
    mut before: Vec<SurfaceNode>,
    pasted: Vec<SurfaceNode>,
    after: Vec<SurfaceNode>,
) -> Vec<SurfaceNode> {
    let inline_only = !pasted.is_empty() && pasted.iter().all(|n| !n.is_blockish());
    if !inline_only {
        before.extend(pasted);
        // A split at the very end leaves an empty right half; block
        // content pasted there replaces it rather than trailing it with
        // an empty paragraph.
        let after_is_empty = after.len() == 1
            && matches!(&after[0], SurfaceNode::Element(el) if el.children.is_empty());
        if !after_is_empty {
            before.extend(after);
        }
        return before;
    }

    let container_tag = match before.last() {
        Some(SurfaceNode::Element(el)) if el.tag.is_structural() => Some(el.tag),
        _ => None,
    };
    let Some(container_tag) = container_tag else {
        before.extend(pasted);
        before.extend(after);
        return before;
    };

    if let Some(SurfaceNode::Element(last)) = before.last_mut() {
        last.children.extend(pasted);
    }
    let mut rest = after.into_iter();
    match rest.next() {
        // The right half of the split element knits back together with
        // the left half around the pasted content.
        Some(SurfaceNode::Element(first)) if first.tag == container_tag => {
            if let Some(SurfaceNode::Element(last)) = before.last_mut() {
                last.children.extend(first.children);
            }
        }
        Some(other) => before.push(other),
        None => {}
    }
    before.extend(rest);
    before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::commands::InlineMark;
    use crate::model::{ListKind, Mark};
    use crate::surface::html;
    use pretty_assertions::assert_eq;

    /// Records every host callback for assertions.
    #[derive(Default)]
    struct RecordingHost {
        changes: Vec<Block>,
        deletions: usize,
        new_blocks: Vec<(Block, Block)>,
        new_list_items: Vec<(Block, Block)>,
        focus_events: usize,
        blur_events: usize,
        block_insertion: Option<bool>,
    }

    impl Host for RecordingHost {
        fn on_change(&mut self, block: Block) {
            self.changes.push(block);
        }

        fn on_delete_block(&mut self) {
            self.deletions += 1;
        }

        fn on_add_new_block(&mut self, before: Block, after: Block) {
            self.new_blocks.push((before, after));
        }

        fn on_add_new_list_item(&mut self, before: Block, after: Block) {
            self.new_list_items.push((before, after));
        }

        fn on_focus(&mut self) {
            self.focus_events += 1;
        }

        fn on_blur(&mut self) {
            self.blur_events += 1;
        }

        fn supports_block_insertion(&self) -> bool {
            self.block_insertion.unwrap_or(true)
        }
    }

    fn editing_session(block: Block) -> (EditingSession, RecordingHost) {
        let mut session = EditingSession::new(block);
        let mut host = RecordingHost::default();
        session.focus(&mut host);
        (session, host)
    }

    #[test]
    fn enter_at_end_of_paragraph_requests_an_empty_sibling() {
        let (mut session, mut host) = editing_session(Block::paragraph("Hello"));
        session.key_enter(&mut host, 5);

        assert_eq!(session.block().text(), "Hello");
        assert_eq!(host.new_blocks.len(), 1);
        let (before, after) = &host.new_blocks[0];
        assert_eq!(before.text(), "Hello");
        assert_eq!(after.text(), "");
        assert_ne!(after.key, before.key);
    }

    #[test]
    fn enter_mid_paragraph_splits_the_text() {
        let (mut session, mut host) = editing_session(Block::paragraph("Hello world"));
        session.key_enter(&mut host, 5);

        let (before, after) = &host.new_blocks[0];
        assert_eq!(before.text(), "Hello");
        assert_eq!(after.text(), " world");
        assert_eq!(before.key, session.block().key);
    }

    #[test]
    fn enter_keeps_the_style_on_both_halves() {
        let block = Block::paragraph("Heading text").with_style(Style::Heading2);
        let (mut session, mut host) = editing_session(block);
        session.key_enter(&mut host, 7);

        let (before, after) = &host.new_blocks[0];
        assert_eq!(before.style, Style::Heading2);
        assert_eq!(after.style, Style::Heading2);
    }

    #[test]
    fn enter_in_a_list_item_requests_a_sibling_item() {
        let block = Block::list_item(ListKind::Bullet, "apples");
        let (mut session, mut host) = editing_session(block);
        session.key_enter(&mut host, 6);

        assert!(host.new_blocks.is_empty());
        assert_eq!(host.new_list_items.len(), 1);
        let (before, after) = &host.new_list_items[0];
        assert_eq!(before.list_item, Some(ListKind::Bullet));
        assert_eq!(after.list_item, Some(ListKind::Bullet));
        assert_eq!(after.text(), "");
    }

    #[test]
    fn enter_in_an_empty_list_item_promotes_to_paragraph() {
        let block = Block::list_item(ListKind::Bullet, "");
        let (mut session, mut host) = editing_session(block);
        session.key_enter(&mut host, 0);

        assert!(host.new_list_items.is_empty());
        assert_eq!(host.new_blocks.len(), 1);
        let (before, after) = &host.new_blocks[0];
        assert_eq!(before.list_item, None);
        assert_eq!(before.style, Style::Normal);
        assert!(after.is_empty());
    }

    #[test]
    fn enter_without_block_insertion_grows_the_surface() {
        let (mut session, mut host) = editing_session(Block::paragraph("text"));
        host.block_insertion = Some(false);
        session.key_enter(&mut host, 4);

        assert!(host.new_blocks.is_empty());
        assert_eq!(session.surface().len(), 2);
        assert_eq!(session.block().text(), "text\n\n");
    }

    #[test]
    fn backspace_on_empty_block_requests_deletion() {
        let (mut session, mut host) = editing_session(Block::empty());
        assert!(session.key_backspace(&mut host));
        assert_eq!(host.deletions, 1);
    }

    #[test]
    fn backspace_on_non_empty_block_is_not_consumed() {
        let (mut session, mut host) = editing_session(Block::paragraph("x"));
        assert!(!session.key_backspace(&mut host));
        assert_eq!(host.deletions, 0);
    }

    #[test]
    fn input_propagates_without_rewriting_the_surface() {
        let (mut session, mut host) = editing_session(Block::paragraph("old"));
        let typed = html::read("<p>old and new</p>");
        session.input(&mut host, typed.clone());

        assert_eq!(session.surface(), typed.as_slice());
        assert_eq!(host.changes.len(), 1);
        assert_eq!(host.changes[0].text(), "old and new");
    }

    #[test]
    fn blur_commits_and_resynchronizes() {
        let (mut session, mut host) = editing_session(Block::paragraph("x"));
        // Surface drifts into a messy but equivalent-on-parse form.
        session.input(&mut host, html::read("<p>he<strong></strong>llo</p>"));
        session.blur(&mut host);

        assert_eq!(session.state(), SessionState::Viewing);
        assert_eq!(host.blur_events, 1);
        assert_eq!(html::write(session.surface()), "<p>hello</p>");
        assert_eq!(session.block().text(), "hello");
    }

    #[test]
    fn pasted_list_items_are_forwarded_and_leave_the_surface() {
        let (mut session, mut host) = editing_session(Block::paragraph("intro"));
        session.input(
            &mut host,
            html::read("<p>intro</p><ul><li>a</li><li>b</li></ul>"),
        );

        assert_eq!(host.new_list_items.len(), 2);
        // Reverse forwarding keeps document order under insert-after.
        assert_eq!(host.new_list_items[0].1.text(), "b");
        assert_eq!(host.new_list_items[1].1.text(), "a");
        assert_eq!(html::write(session.surface()), "<p>intro</p>");
    }

    #[test]
    fn toolbar_applies_marks_through_the_selection() {
        let (mut session, mut host) = editing_session(Block::paragraph("Hello world"));
        session.set_selection(Some(SelectionRange::new(6, 11)));
        session.apply(&mut host, Cmd::ToggleMark(InlineMark::Strong));

        assert_eq!(host.changes.len(), 1);
        let block = session.block();
        assert_eq!(block.children[1].text, "world");
        assert_eq!(block.children[1].marks, vec![Mark::Strong]);
        assert_eq!(
            html::write(session.surface()),
            "<p>Hello <strong>world</strong></p>"
        );
    }

    #[test]
    fn failed_command_restores_the_saved_selection_and_propagates_nothing() {
        let (mut session, mut host) = editing_session(Block::paragraph("short"));
        session.set_selection(Some(SelectionRange::new(0, 3)));
        session.set_selection(Some(SelectionRange::new(0, 99)));
        session.apply(&mut host, Cmd::ToggleMark(InlineMark::Strong));

        assert!(host.changes.is_empty());
        assert_eq!(session.selection(), Some(SelectionRange::new(0, 3)));
    }

    #[test]
    fn toolbar_visibility_follows_selection() {
        let (mut session, mut host) = editing_session(Block::paragraph("Hello"));
        assert!(!session.toolbar_visible());
        session.set_selection(Some(SelectionRange::new(1, 4)));
        assert!(session.toolbar_visible());
        session.set_selection(Some(SelectionRange::caret(2)));
        assert!(!session.toolbar_visible());

        session.set_selection(Some(SelectionRange::new(1, 4)));
        session.blur(&mut host);
        assert!(!session.toolbar_visible());
    }

    #[test]
    fn paste_splices_at_the_caret() {
        let (mut session, mut host) = editing_session(Block::paragraph("ab"));
        session.set_selection(Some(SelectionRange::caret(1)));
        session.paste_html(&mut host, "<strong>X</strong>");

        assert_eq!(session.block().text(), "aXb");
        let marked: Vec<_> = session
            .block()
            .children
            .iter()
            .filter(|s| s.marks.contains(&Mark::Strong))
            .collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].text, "X");
    }

    #[test]
    fn focus_and_blur_reach_the_host() {
        let mut session = EditingSession::new(Block::paragraph("x"));
        let mut host = RecordingHost::default();
        assert!(!session.is_editing());
        session.focus(&mut host);
        assert!(session.is_editing());
        session.blur(&mut host);
        assert_eq!(host.focus_events, 1);
        assert_eq!(host.blur_events, 1);
    }
}
