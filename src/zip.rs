//! The zip engine: combining two trees element by element.
//!
//! # Broadcasting
//!
//! The output has `max(|A|, |B|)` branches. Output branch `i` reads
//! `A[min(i, |A| - 1)]` and `B[min(i, |B| - 1)]`; element `j` is clamped the
//! same way inside those branches, so a tree with a single branch holding a
//! single value is applied to every element of the other tree. If either
//! source branch is empty the output path is registered with no content.
//! Paths come from [`broadcast::path_list`](crate::broadcast::path_list).
//!
//! # Strategies
//!
//! All broadcasting variants return the same tree:
//!
//! - [`zip_sequential`]: one pre-sized slot vector per branch, filled in order.
//! - [`zip_lazy`]: each branch collected from a [`BroadcastPairs`] iterator.
//! - [`zip_partitioned`]: partitions of branches on rayon tasks.
//! - [`zip_nested`]: every branch and every element on its own task. This
//!   variant skips validation entirely.
//!
//! [`zip_strict`] does no broadcasting at all.

use std::collections::HashSet;

use log::debug;
use rayon::prelude::*;

use crate::broadcast::{clamped_branch, path_at, path_list, BroadcastPairs, Topology};
use crate::executor::{run_partitioned, PartitionSettings};
use crate::tree::{Branch, DataTree, TreePath};
use crate::validation::{ErrorChecker, Pair};

/// Output topology of a broadcasting zip.
///
/// Synthesized paths that collide with a path already in the list (possible
/// when the winning tree's paths are not ascending) are stepped past so that
/// the output keeps exactly one branch per index.
pub fn zip_topology<T, Q>(a: &DataTree<T>, b: &DataTree<Q>) -> Vec<TreePath> {
    let count = a.branch_count().max(b.branch_count());
    let inputs: [&dyn Topology; 2] = [a, b];
    let paths = path_list(&inputs);

    let mut used: HashSet<TreePath> = paths.iter().cloned().collect();
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        if let Some(path) = paths.get(i) {
            out.push(path.clone());
            continue;
        }
        let mut path = path_at(paths, i);
        while used.contains(&path) {
            path = path.increment_last(1);
        }
        used.insert(path.clone());
        out.push(path);
    }
    out
}

/// One output slot: absent if either input is absent or validation fails.
#[inline]
fn zip_slot<'a, T, Q, R, F>(
    x: Option<&'a T>,
    y: Option<&'a Q>,
    f: &F,
    checker: &ErrorChecker<Pair<'a, T, Q>>,
) -> Option<R>
where
    F: Fn(&T, &Q) -> R,
{
    let (x, y) = (x?, y?);
    if checker.validate(&(x, y)) {
        Some(f(x, y))
    } else {
        None
    }
}

/// Source branches for output index `i`, `None` if either is missing or empty.
#[inline]
fn sources<'a, T, Q>(
    a: &'a DataTree<T>,
    b: &'a DataTree<Q>,
    i: usize,
) -> Option<(&'a Branch<T>, &'a Branch<Q>)> {
    let ba = clamped_branch(a, i)?;
    let bb = clamped_branch(b, i)?;
    if ba.is_empty() || bb.is_empty() {
        return None;
    }
    Some((ba, bb))
}

fn fill_manual<'a, T, Q, R, F>(
    a: &'a DataTree<T>,
    b: &'a DataTree<Q>,
    i: usize,
    f: &F,
    checker: &ErrorChecker<Pair<'a, T, Q>>,
    out: &mut Branch<R>,
) where
    F: Fn(&T, &Q) -> R,
{
    let Some((ba, bb)) = sources(a, b, i) else {
        return;
    };
    let len = ba.len().max(bb.len());
    let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(len).collect();
    for (j, slot) in slots.iter_mut().enumerate() {
        *slot = zip_slot(ba.get_clamped(j), bb.get_clamped(j), f, checker);
    }
    out.replace_slots(slots);
}

/// Broadcasting zip, single-threaded, pre-sized branches.
pub fn zip_sequential<'a, T, Q, R, F>(
    a: &'a DataTree<T>,
    b: &'a DataTree<Q>,
    f: F,
    checker: &ErrorChecker<Pair<'a, T, Q>>,
) -> DataTree<R>
where
    F: Fn(&T, &Q) -> R,
{
    let mut out = DataTree::with_topology(zip_topology(a, b));
    debug!("zip (sequential): {} output branches", out.branch_count());
    for (i, branch) in out.slots_mut().iter_mut().enumerate() {
        fill_manual(a, b, i, &f, checker, branch);
    }
    out
}

/// Broadcasting zip, single-threaded, branches built from lazy pair iterators.
pub fn zip_lazy<'a, T, Q, R, F>(
    a: &'a DataTree<T>,
    b: &'a DataTree<Q>,
    f: F,
    checker: &ErrorChecker<Pair<'a, T, Q>>,
) -> DataTree<R>
where
    F: Fn(&T, &Q) -> R,
{
    let mut out = DataTree::with_topology(zip_topology(a, b));
    debug!("zip (lazy): {} output branches", out.branch_count());
    for (i, branch) in out.slots_mut().iter_mut().enumerate() {
        if let Some((ba, bb)) = sources(a, b, i) {
            *branch = BroadcastPairs::new(ba, bb)
                .map(|(x, y)| zip_slot(x, y, &f, checker))
                .collect();
        }
    }
    out
}

/// Broadcasting zip over partitions of branches on rayon tasks.
///
/// A branch's weight is the longer of its two source branches.
pub fn zip_partitioned<'a, T, Q, R, F>(
    a: &'a DataTree<T>,
    b: &'a DataTree<Q>,
    f: F,
    checker: &ErrorChecker<Pair<'a, T, Q>>,
    settings: PartitionSettings,
) -> DataTree<R>
where
    T: Sync,
    Q: Sync,
    R: Send,
    F: Fn(&T, &Q) -> R + Sync,
{
    let mut out = DataTree::with_topology(zip_topology(a, b));
    let weights: Vec<usize> = (0..out.branch_count())
        .map(|i| {
            let la = clamped_branch(a, i).map_or(0, Branch::len);
            let lb = clamped_branch(b, i).map_or(0, Branch::len);
            la.max(lb)
        })
        .collect();

    run_partitioned("zip", out.slots_mut(), &weights, settings, |i, branch| {
        fill_manual(a, b, i, &f, checker, branch);
    });
    out
}

/// Broadcasting zip with a task per branch and a task per element.
///
/// No validation is applied: every pair with both inputs present is
/// transformed.
pub fn zip_nested<T, Q, R, F>(a: &DataTree<T>, b: &DataTree<Q>, f: F) -> DataTree<R>
where
    T: Sync,
    Q: Sync,
    R: Send,
    F: Fn(&T, &Q) -> R + Sync,
{
    let mut out = DataTree::with_topology(zip_topology(a, b));
    debug!("zip (nested): {} output branches", out.branch_count());
    let f = &f;
    out.slots_mut()
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, branch)| {
            let Some((ba, bb)) = sources(a, b, i) else {
                return;
            };
            let len = ba.len().max(bb.len());
            let slots: Vec<Option<R>> = (0..len)
                .into_par_iter()
                .map(|j| match (ba.get_clamped(j), bb.get_clamped(j)) {
                    (Some(x), Some(y)) => Some(f(x, y)),
                    _ => None,
                })
                .collect();
            branch.replace_slots(slots);
        });
    out
}

/// Positional zip without broadcasting.
///
/// The output has `min(|A|, |B|)` branches at A's paths; each is truncated to
/// the shorter source branch. Extra branches are dropped, not registered.
pub fn zip_strict<T, Q, R, F>(a: &DataTree<T>, b: &DataTree<Q>, f: F) -> DataTree<R>
where
    F: Fn(&T, &Q) -> R,
{
    let count = a.branch_count().min(b.branch_count());
    let mut out = DataTree::with_topology(a.paths().iter().take(count).cloned());
    debug!("zip (strict): {count} output branches");
    for ((branch, ba), bb) in out
        .slots_mut()
        .iter_mut()
        .zip(a.branches())
        .zip(b.branches())
    {
        *branch = ba
            .iter()
            .zip(bb.iter())
            .map(|(x, y)| match (x, y) {
                (Some(x), Some(y)) => Some(f(x, y)),
                _ => None,
            })
            .collect();
    }
    out
}
