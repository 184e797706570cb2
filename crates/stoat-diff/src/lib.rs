//! # Stoat Diff
//!
//! Structural diff and diagnostic rendering for assertion failures.
//!
//! The diff is a pure function from `(expected, actual)` JSON values to
//! a tree of field-level differences, independent of the mock layer so
//! it is separately testable. Rendering — ordinal call blocks, `-`/`+`
//! line output, optional ANSI color — is layered on top; color is a
//! renderer concern, never part of the tree.

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod render;
pub mod style;
pub mod tree;

pub use render::{DiffRenderer, RenderConfig, ordinal};
pub use style::RenderStyle;
pub use tree::{DiffTree, diff};
