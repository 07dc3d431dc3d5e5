//! Path broadcasting.
//!
//! When two trees of different shapes are combined, the output topology is
//! inherited wholesale from one of them: the first tree (in argument order)
//! whose deepest path is strictly longer than every earlier one. The other
//! tree is aligned by branch *index* only, its own paths are ignored.
//! Indices past the end of the winning path list get synthesized paths.

use crate::tree::{Branch, DataTree, TreePath};

/// Depth and path list of one input, independent of its element type.
pub trait Topology {
    /// Length of the deepest path, `None` if there are no paths.
    fn depth(&self) -> Option<usize>;
    /// Registered paths in order.
    fn path_slice(&self) -> &[TreePath];
}

impl<T> Topology for DataTree<T> {
    fn depth(&self) -> Option<usize> {
        DataTree::depth(self)
    }

    fn path_slice(&self) -> &[TreePath] {
        self.paths()
    }
}

/// Selects the broadcast topology from `trees`.
///
/// Ties keep the earlier tree; an empty tree never wins over a non-empty one.
pub fn path_list<'a>(trees: &[&'a dyn Topology]) -> &'a [TreePath] {
    let mut winner: &'a [TreePath] = &[];
    let mut max_depth: Option<usize> = None;
    for tree in trees {
        let depth = tree.depth();
        if depth > max_depth {
            max_depth = depth;
            winner = tree.path_slice();
        }
    }
    winner
}

/// Path for output index `i`.
///
/// In range this is `paths[i]`; past the end the last path has its final
/// component raised by `i - count + 1`, so synthesized paths keep increasing.
pub fn path_at(paths: &[TreePath], i: usize) -> TreePath {
    if let Some(path) = paths.get(i) {
        return path.clone();
    }
    let offset = u32::try_from(i - paths.len() + 1).unwrap_or(u32::MAX);
    match paths.last() {
        Some(last) => last.increment_last(offset),
        None => TreePath::new([offset]),
    }
}

/// Full output topology for `count` branches.
pub fn broadcast_paths(paths: &[TreePath], count: usize) -> Vec<TreePath> {
    (0..count).map(|i| path_at(paths, i)).collect()
}

/// `min(i, len - 1)`; `None` when `len == 0`.
#[inline]
pub fn clamp(i: usize, len: usize) -> Option<usize> {
    len.checked_sub(1).map(|last| i.min(last))
}

/// Branch at clamped index `i`.
#[inline]
pub fn clamped_branch<T>(tree: &DataTree<T>, i: usize) -> Option<&Branch<T>> {
    clamp(i, tree.branch_count()).and_then(|c| tree.branch(c))
}

/// Lazy element pairs over two branches with clamp broadcasting.
///
/// Yields `max(len_a, len_b)` items; nothing when either branch is empty.
#[derive(Debug, Clone)]
pub struct BroadcastPairs<'a, T, Q> {
    a: &'a Branch<T>,
    b: &'a Branch<Q>,
    next: usize,
    len: usize,
}

impl<'a, T, Q> BroadcastPairs<'a, T, Q> {
    /// Creates the iterator.
    pub fn new(a: &'a Branch<T>, b: &'a Branch<Q>) -> Self {
        let len = if a.is_empty() || b.is_empty() {
            0
        } else {
            a.len().max(b.len())
        };
        Self { a, b, next: 0, len }
    }
}

impl<'a, T, Q> Iterator for BroadcastPairs<'a, T, Q> {
    type Item = (Option<&'a T>, Option<&'a Q>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.len {
            return None;
        }
        let j = self.next;
        self.next += 1;
        Some((self.a.get_clamped(j), self.b.get_clamped(j)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.len - self.next;
        (rest, Some(rest))
    }
}

impl<T, Q> ExactSizeIterator for BroadcastPairs<'_, T, Q> {}
