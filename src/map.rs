//! The map engine: a structure-preserving one-tree transform.
//!
//! The output always has the input's paths, in the input's order, and every
//! output branch has exactly as many slots as its input branch. A unit that
//! fails validation (or an absent input slot) becomes an absent output slot
//! at the same position.

use log::debug;

use crate::executor::{run_partitioned, PartitionSettings};
use crate::tree::{Branch, DataTree};
use crate::validation::ErrorChecker;

fn map_branch<T, R, F>(input: &Branch<T>, f: &F, checker: &ErrorChecker<T>) -> Branch<R>
where
    F: Fn(&T) -> R,
{
    input
        .iter()
        .map(|slot| {
            let value = slot.as_ref()?;
            checker.validate(value).then(|| f(value))
        })
        .collect()
}

/// Maps every element on the calling thread, branch by branch.
pub fn map_sequential<T, R, F>(tree: &DataTree<T>, f: F, checker: &ErrorChecker<T>) -> DataTree<R>
where
    F: Fn(&T) -> R,
{
    debug!("map (sequential): {} branches", tree.branch_count());
    let mut out = DataTree::with_topology(tree.paths().iter().cloned());
    for (branch, input) in out.slots_mut().iter_mut().zip(tree.branches()) {
        *branch = map_branch(input, &f, checker);
    }
    out
}

/// Maps partitions of branches on rayon tasks, weighted by branch length.
///
/// Paths of branches the partitioning does not cover stay registered but
/// empty.
pub fn map_partitioned<T, R, F>(
    tree: &DataTree<T>,
    f: F,
    checker: &ErrorChecker<T>,
    settings: PartitionSettings,
) -> DataTree<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let mut out = DataTree::with_topology(tree.paths().iter().cloned());
    let weights = tree.branch_lengths();
    run_partitioned("map", out.slots_mut(), &weights, settings, |i, branch| {
        if let Some(input) = tree.branch(i) {
            *branch = map_branch(input, &f, checker);
        }
    });
    out
}
