//! Core tree definitions for the Partree engines.
//!
//! This module defines `TreePath`, `Branch` and the arena-backed `DataTree`
//! that every operation reads from and writes into.

/// Defines the `DataTree` arena.
pub mod core;
/// Defines the `Branch` slot list.
pub mod branch;
/// Defines the `TreePath` type.
pub mod path;

pub use branch::Branch;
pub use core::{DataTree, PathHasher};
pub use path::TreePath;
