//! The portable document model: blocks of styled spans with out-of-line
//! mark definitions.
//!
//! This is the storage-side representation of rich text. A document is a
//! flat sequence of [`DocumentBlock`]s; text blocks hold ordered [`Span`]s
//! whose [`Mark`]s either name one of the built-in inline styles or
//! reference a [`MarkDef`] by key.

pub mod block;
pub mod keys;
pub mod marks;

pub use block::{
    Block, ButtonBlock, DividerBlock, DocumentBlock, ImageBlock, ListKind, Span, Style,
    merge_spans,
};
pub use marks::{Mark, MarkDef, marks_equal, normalized_mark_names};
