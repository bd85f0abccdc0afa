//! End-to-end editing flows through the public API: session lifecycle,
//! splitting, pasting, grouping for display, and persistence.

use portatext_engine::surface::html;
use portatext_engine::{
    Block, Cmd, ContentGroup, DocumentBlock, EditingSession, Host, InlineMark, ListKind, Mark,
    SelectionRange, Style, group, parse_surface, render_block, store,
};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct RecordingHost {
    changes: Vec<Block>,
    deletions: usize,
    new_blocks: Vec<(Block, Block)>,
    new_list_items: Vec<(Block, Block)>,
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
}

#[test]
fn type_bold_and_blur() {
    let mut host = RecordingHost::default();
    let mut session = EditingSession::new(Block::paragraph("Hello world"));

    session.focus(&mut host);
    assert!(session.is_editing());

    // Select "world" and embolden it.
    session.set_selection(Some(SelectionRange::new(6, 11)));
    assert!(session.toolbar_visible());
    session.apply(&mut host, Cmd::ToggleMark(InlineMark::Strong));

    let block = session.block();
    assert_eq!(block.children.len(), 2);
    assert_eq!(block.children[1].text, "world");
    assert_eq!(block.children[1].marks, vec![Mark::Strong]);
    assert_eq!(host.changes.len(), 1);
    assert_eq!(
        html::write(session.surface()),
        "<p>Hello <strong>world</strong></p>"
    );

    session.blur(&mut host);
    assert!(!session.is_editing());
}

#[test]
fn enter_splits_a_paragraph_into_two_blocks() {
    let mut host = RecordingHost::default();
    let mut session = EditingSession::new(Block::paragraph("onetwo"));
    session.focus(&mut host);

    session.key_enter(&mut host, 3);

    let (before, after) = host.new_blocks.pop().unwrap();
    assert_eq!(before.text(), "one");
    assert_eq!(after.text(), "two");
    assert_ne!(before.key, after.key);
}

#[test]
fn enter_in_a_list_item_adds_a_sibling_item() {
    let mut host = RecordingHost::default();
    let mut session = EditingSession::new(Block::list_item(ListKind::Bullet, "ab"));
    session.focus(&mut host);

    session.key_enter(&mut host, 1);

    let (before, after) = host.new_list_items.pop().unwrap();
    assert_eq!(before.text(), "a");
    assert_eq!(after.text(), "b");
    assert_eq!(after.list_item, Some(ListKind::Bullet));
}

#[test]
fn enter_on_an_empty_list_item_leaves_the_list() {
    let mut host = RecordingHost::default();
    let mut session = EditingSession::new(Block::list_item(ListKind::Bullet, ""));
    session.focus(&mut host);

    session.key_enter(&mut host, 0);

    // The item converts to a plain paragraph and a fresh block follows.
    let (converted, fresh) = host.new_blocks.pop().unwrap();
    assert_eq!(converted.list_item, None);
    assert_eq!(converted.style, Style::Normal);
    assert!(fresh.is_empty());
}

#[test]
fn backspace_on_an_empty_block_deletes_it() {
    let mut host = RecordingHost::default();
    let mut session = EditingSession::new(Block::empty());
    session.focus(&mut host);
    assert!(session.key_backspace(&mut host));
    assert_eq!(host.deletions, 1);
}

#[test]
fn pasting_a_list_spawns_sibling_items() {
    let mut host = RecordingHost::default();
    let mut session = EditingSession::new(Block::paragraph("intro"));
    session.focus(&mut host);
    session.set_selection(Some(SelectionRange::caret(5)));

    session.paste_html(&mut host, "<ul><li>one</li><li>two</li></ul>");

    // Siblings arrive through the list-item callback; the primary block
    // keeps its identity.
    assert_eq!(host.new_list_items.len(), 2);
    assert_eq!(host.new_list_items[0].1.text(), "two");
    assert_eq!(host.new_list_items[1].1.text(), "one");
    assert_eq!(session.block().text(), "intro");
}

#[test]
fn grouped_display_rebuilds_one_list_from_adjacent_items() {
    let blocks = vec![
        DocumentBlock::Text(Block::paragraph("intro")),
        DocumentBlock::Text(Block::list_item(ListKind::Bullet, "one")),
        DocumentBlock::Text(Block::list_item(ListKind::Bullet, "two")),
        DocumentBlock::Text(Block::list_item(ListKind::Number, "1st")),
    ];

    let groups = group(&blocks);
    assert_eq!(groups.len(), 3);
    assert!(matches!(groups[0], ContentGroup::Single(_)));
    match &groups[1] {
        ContentGroup::List { kind, items } => {
            assert_eq!(*kind, ListKind::Bullet);
            assert_eq!(items.len(), 2);
        }
        other => panic!("expected a bullet list group, got {other:?}"),
    }
    match &groups[2] {
        ContentGroup::List { kind, items } => {
            assert_eq!(*kind, ListKind::Number);
            assert_eq!(items.len(), 1);
        }
        other => panic!("expected a number list group, got {other:?}"),
    }
}

#[test]
fn edited_block_persists_and_reloads() {
    let mut host = RecordingHost::default();
    let mut session = EditingSession::new(Block::paragraph("read the docs"));
    session.focus(&mut host);
    session.set_selection(Some(SelectionRange::new(9, 13)));
    session.apply(&mut host, Cmd::SetLink(Some("https://docs.example".to_string())));
    session.blur(&mut host);

    let saved = DocumentBlock::Text(session.block().clone());
    let json = store::to_json(&saved).unwrap();
    let loaded = store::from_json(&json).unwrap();
    assert_eq!(loaded, saved);

    let DocumentBlock::Text(block) = loaded else {
        panic!("expected a text block");
    };
    assert_eq!(block.mark_defs.len(), 1);
    assert_eq!(block.mark_defs[0].href, "https://docs.example");
}

#[test]
fn reopening_a_saved_block_renders_the_same_surface() {
    let mut block = Block::paragraph("alpha beta").with_style(Style::Heading2);
    block.key = "h2".to_string();

    let json = store::to_json(&DocumentBlock::Text(block.clone())).unwrap();
    let DocumentBlock::Text(reloaded) = store::from_json(&json).unwrap() else {
        panic!("expected a text block");
    };

    assert_eq!(
        html::write(&render_block(&reloaded)),
        html::write(&render_block(&block))
    );
    let outcome = parse_surface(&render_block(&reloaded), &reloaded);
    assert_eq!(outcome.block.key, reloaded.key);
    assert!(outcome.block.eq_ignoring_keys(&reloaded));
}
