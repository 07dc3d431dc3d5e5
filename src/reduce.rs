//! The reduce engine: one value per branch.
//!
//! Every input path gets an output path, registered before any work starts.
//! A branch that passes validation receives its reduction as the single
//! slot of its output branch; a rejected branch leaves its path empty.
//! Partitions are sized by element count rather than branch count so that
//! one long branch does not end up sharing a task with many others.

use log::debug;

use crate::executor::{run_partitioned, PartitionSettings};
use crate::tree::{Branch, DataTree};
use crate::validation::ErrorChecker;

fn reduce_branch<T, R, F>(
    input: &Branch<T>,
    f: &F,
    checker: &ErrorChecker<Branch<T>>,
    out: &mut Branch<R>,
) where
    F: Fn(&Branch<T>) -> R,
{
    if checker.validate(input) {
        out.push(f(input));
    }
}

/// Reduces partitions of branches on rayon tasks.
pub fn reduce_partitioned<T, R, F>(
    tree: &DataTree<T>,
    f: F,
    checker: &ErrorChecker<Branch<T>>,
    settings: PartitionSettings,
) -> DataTree<R>
where
    T: Sync,
    R: Send,
    F: Fn(&Branch<T>) -> R + Sync,
{
    let mut out = DataTree::with_topology(tree.paths().iter().cloned());
    let weights = tree.branch_lengths();
    run_partitioned("reduce", out.slots_mut(), &weights, settings, |i, branch| {
        if let Some(input) = tree.branch(i) {
            reduce_branch(input, &f, checker, branch);
        }
    });
    out
}

/// Single-threaded reduce over every branch, in order.
pub fn reduce_sequential<T, R, F>(
    tree: &DataTree<T>,
    f: F,
    checker: &ErrorChecker<Branch<T>>,
) -> DataTree<R>
where
    F: Fn(&Branch<T>) -> R,
{
    debug!("reduce (sequential): {} branches", tree.branch_count());
    let mut out = DataTree::with_topology(tree.paths().iter().cloned());
    for (branch, input) in out.slots_mut().iter_mut().zip(tree.branches()) {
        reduce_branch(input, &f, checker, branch);
    }
    out
}
