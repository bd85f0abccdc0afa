use crate::model::Block;

/// Callbacks the hosting page editor provides to an editing session.
///
/// These are the only integration points: any host implementing them can
/// embed the engine. The `before`/`after` pairs follow insert-after
/// semantics — the host replaces the current block with `before` and
/// inserts `after` directly behind it.
pub trait Host {
    /// The current block's model value changed.
    fn on_change(&mut self, block: Block);

    /// The current block should be removed from the document.
    fn on_delete_block(&mut self);

    /// A structural split produced a plain sibling block.
    fn on_add_new_block(&mut self, before: Block, after: Block);

    /// A structural split inside a list produced a sibling list item.
    fn on_add_new_list_item(&mut self, before: Block, after: Block);

    fn on_focus(&mut self) {}

    fn on_blur(&mut self) {}

    /// Hosts that cannot splice sibling blocks return false; the session
    /// then degrades to inserting a plain paragraph into the surface
    /// itself so editing stays usable.
    fn supports_block_insertion(&self) -> bool {
        true
    }
}
