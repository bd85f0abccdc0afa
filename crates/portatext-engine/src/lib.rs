//! Portable-text editing engine for a block-based page editor.
//!
//! The engine converts between two representations of one rich-text
//! block: a structured model ([`model::Block`], the persisted form) and
//! an explicit markup tree ([`surface::SurfaceNode`], what an editable
//! region shows). [`rendering::render_block`] goes model → surface,
//! [`parsing::parse_surface`] goes back, and [`editing::EditingSession`]
//! drives the cycle across focus, input, commands, and blur, reporting
//! outcomes to the host through the [`editing::Host`] trait.
//!
//! The engine owns no I/O: hosts render the surface however they like
//! (a contenteditable region, typically) and persist documents through
//! the [`store`] wire shape.

pub mod editing;
pub mod grouping;
pub mod model;
pub mod parsing;
pub mod rendering;
pub mod store;
pub mod surface;

pub use editing::{Cmd, CommandError, EditingSession, Host, InlineMark, SessionState};
pub use grouping::{ContentGroup, group};
pub use model::{Block, DocumentBlock, ListKind, Mark, MarkDef, Span, Style};
pub use parsing::{ParseOutcome, parse_surface};
pub use rendering::render_block;
pub use surface::{Element, SelectionRange, SurfaceNode, Tag};
