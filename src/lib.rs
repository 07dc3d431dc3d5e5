//! # Partree
//!
//! Parallel higher-order operations over sparse, path-indexed data trees:
//! map, zip with broadcasting, and reduce.
//!
//! ## Overview
//!
//! A [`DataTree`] maps [`TreePath`]s such as `{0;2}` to [`Branch`]es, ordered
//! lists of values. Host applications that combine such trees element by
//! element usually do it on one thread. Partree does the same work with
//! rayon, while keeping the output identical to a single-threaded run.
//!
//! ### Key Features
//!
//! *   **Broadcasting Zip:** Trees of different shapes combine by clamping the
//!     shorter side, both across branches and within a branch.
//! *   **Structure-Preserving Map:** The output has the input's paths and
//!     branch lengths, always.
//! *   **Branch Reduce:** One value per branch, with work split by element
//!     count rather than branch count.
//! *   **Validation Without Errors:** An [`ErrorChecker`] gates every unit of
//!     work. A rejected unit leaves an absent slot and reports to a
//!     [`DiagnosticSink`](validation::DiagnosticSink); the run carries on.
//! *   **Selectable Execution:** Sequential, lazy, partitioned or nested
//!     execution, chosen per engine.
//!
//! ## Architecture
//!
//! Every operation runs in two phases:
//!
//! 1. **Topology:** the output paths are computed and registered on the
//!    calling thread. For zips, the topology comes from the first input whose
//!    deepest path is strictly longer than the others' ([`broadcast`]).
//! 2. **Fill:** the branch slice of the output is cut into disjoint
//!    partitions ([`partition`]) and every partition is filled on its own
//!    task ([`executor`]). Tasks can write to existing branches only.
//!
//! ## Usage
//!
//! ```rust
//! use partree::{DataTree, ErrorChecker, Partree};
//!
//! let a = DataTree::from_lists(vec![vec![1, 2], vec![3]]);
//! let b = DataTree::from_lists(vec![vec![10]]);
//!
//! let engine = Partree::new();
//! let sum = engine.zip(&a, &b, |x, y| x + y, &ErrorChecker::new());
//!
//! assert_eq!(sum, DataTree::from_lists(vec![vec![11, 12], vec![13]]));
//! ```
//!
//! ### Safety and Error Handling
//!
//! * **No Unsafe:** disjoint writes come from slice splitting, not raw pointers.
//! * **No Panics:** No `unwrap()` or `panic!()` calls in the library (enforced by clippy lints).
//! * **Comprehensive Errors:** Failures outside the engines correspond to a [`PartreeError`].

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

// --- PUBLIC API MODULES ---
pub mod api;
pub mod broadcast;
pub mod compose;
pub mod config;
pub mod error;
pub mod inspector;
pub mod partition;
pub mod snapshot;
pub mod tree;
pub mod validation;

// --- ENGINES ---
pub mod executor;
pub mod map;
pub mod reduce;
pub mod zip;

// --- RE-EXPORTS ---

pub use api::{Partree, PartreeBuilder};
pub use config::{EngineConfig, Strategy};
pub use error::{PartreeError, Result};
pub use executor::PartitionSettings;
pub use inspector::{TreeInspector, TreeReport};
pub use partition::{Granularity, Partition, PartitionPolicy};
pub use tree::{Branch, DataTree, TreePath};
pub use validation::{ErrorChecker, ErrorRule, Pair, Severity};
