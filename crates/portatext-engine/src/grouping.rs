//! View-layer grouping of flat sibling blocks.
//!
//! The document stores list items as flat siblings; rendering wants one
//! `ul`/`ol` per run of same-kind items. [`group`] clusters consecutive
//! list items without touching the underlying sequence, so flattening the
//! groups back reproduces the input order exactly.

use crate::model::{Block, DocumentBlock, ListKind};

/// One renderable unit: a run of same-kind list items, or any other block
/// standing alone.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentGroup<'a> {
    List {
        kind: ListKind,
        items: Vec<&'a Block>,
    },
    Single(&'a DocumentBlock),
}

/// Cluster consecutive list-item blocks of the same kind. Any other block
/// — including a list item of the other kind or a non-text component —
/// closes the current group.
pub fn group(blocks: &[DocumentBlock]) -> Vec<ContentGroup<'_>> {
    let mut groups: Vec<ContentGroup<'_>> = Vec::new();
    for block in blocks {
        let list_kind = block.as_text().and_then(|b| b.list_item);
        match (list_kind, groups.last_mut()) {
            (Some(kind), Some(ContentGroup::List { kind: open, items })) if *open == kind => {
                items.push(block.as_text().expect("list kind implies a text block"));
            }
            (Some(kind), _) => {
                groups.push(ContentGroup::List {
                    kind,
                    items: vec![block.as_text().expect("list kind implies a text block")],
                });
            }
            (None, _) => groups.push(ContentGroup::Single(block)),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DividerBlock;
    use crate::model::keys;
    use pretty_assertions::assert_eq;

    fn bullet(text: &str) -> DocumentBlock {
        DocumentBlock::Text(Block::list_item(ListKind::Bullet, text))
    }

    fn numbered(text: &str) -> DocumentBlock {
        DocumentBlock::Text(Block::list_item(ListKind::Number, text))
    }

    fn para(text: &str) -> DocumentBlock {
        DocumentBlock::Text(Block::paragraph(text))
    }

    #[test]
    fn consecutive_same_kind_items_form_one_group() {
        let blocks = vec![para("intro"), bullet("a"), bullet("b"), para("outro")];
        let groups = group(&blocks);
        assert_eq!(groups.len(), 3);
        let ContentGroup::List { kind, items } = &groups[1] else {
            panic!("expected a list group");
        };
        assert_eq!(*kind, ListKind::Bullet);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn kind_change_closes_the_group() {
        let blocks = vec![bullet("a"), numbered("b"), bullet("c")];
        let groups = group(&blocks);
        assert_eq!(groups.len(), 3);
        assert!(matches!(
            groups[1],
            ContentGroup::List {
                kind: ListKind::Number,
                ..
            }
        ));
    }

    #[test]
    fn components_split_list_runs() {
        let divider = DocumentBlock::Divider(DividerBlock {
            key: keys::generate(),
        });
        let blocks = vec![bullet("a"), divider, bullet("b")];
        let groups = group(&blocks);
        assert_eq!(groups.len(), 3);
        assert!(matches!(groups[1], ContentGroup::Single(_)));
    }

    #[test]
    fn flattening_groups_reproduces_the_input_order() {
        let blocks = vec![
            para("p1"),
            bullet("a"),
            bullet("b"),
            numbered("1"),
            para("p2"),
            numbered("2"),
        ];
        let groups = group(&blocks);

        let mut flattened: Vec<&str> = Vec::new();
        for g in &groups {
            match g {
                ContentGroup::List { items, .. } => {
                    flattened.extend(items.iter().map(|b| b.key.as_str()));
                }
                ContentGroup::Single(block) => flattened.push(block.key()),
            }
        }
        let original: Vec<&str> = blocks.iter().map(DocumentBlock::key).collect();
        assert_eq!(flattened, original);
    }

    #[test]
    fn empty_input_groups_to_nothing() {
        assert!(group(&[]).is_empty());
    }
}
