//! The interactive editing layer.
//!
//! One [`EditingSession`] owns one block's live surface. While focused,
//! the surface is the truth and every input event re-parses it into the
//! model and propagates upward; structural key events split the surface
//! at the caret and hand new sibling blocks to the [`Host`]. Formatting
//! runs through [`Cmd`]s applied against an explicit selection, so the
//! whole loop is testable without a DOM.
//!
//! Everything here is synchronous and single-threaded: a structural
//! operation runs to completion before the next event dispatches, and all
//! persistence (debounced autosave, store writes) happens outside, behind
//! the host callbacks.

pub mod commands;
pub mod host;
pub mod session;

pub use commands::{Cmd, CommandError, InlineMark};
pub use host::Host;
pub use session::{EditingSession, SessionState};
