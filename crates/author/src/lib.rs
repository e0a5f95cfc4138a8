//! Block editing driven by raycasts, with undo/redo.
//!
//! # Invariants
//! - Every edit is reversible.
//! - A new edit clears the redo stack.
//! - A block is never placed where it would overlap the blocker box.

mod editor;

pub use editor::{BlockEditor, EditCommand, EditError, Pick};

pub fn crate_info() -> &'static str {
    "blockyard-author v0.1.0"
}
