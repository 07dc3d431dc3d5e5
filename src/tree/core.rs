use std::collections::HashMap;
use std::hash::BuildHasher;

use serde::{Deserialize, Serialize};
use twox_hash::XxHash64;

use super::branch::Branch;
use super::path::TreePath;

/// Hasher for the path index. Fixed seed, so lookups are stable across runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathHasher;

impl BuildHasher for PathHasher {
    type Hasher = XxHash64;

    fn build_hasher(&self) -> XxHash64 {
        XxHash64::with_seed(0)
    }
}

/// A sparse, path-indexed tree of branches.
///
/// Acts as an arena: branches live in a `Vec` addressed by registration
/// index, and a hashed index maps each [`TreePath`] to its slot. Iteration
/// follows registration order, not path order.
///
/// Every engine builds its output in two phases. The topology phase
/// registers all output paths on the calling thread
/// ([`DataTree::with_topology`]). The fill phase hands out
/// [`DataTree::slots_mut`], a plain slice of branches: worker tasks can write
/// into existing branches but have no way to register a new path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawTree<T>")]
pub struct DataTree<T> {
    paths: Vec<TreePath>,
    branches: Vec<Branch<T>>,
    #[serde(skip_serializing)]
    index: HashMap<TreePath, usize, PathHasher>,
}

/// Wire shape of a tree; the index is rebuilt on load.
#[derive(Deserialize)]
struct RawTree<T> {
    paths: Vec<TreePath>,
    branches: Vec<Branch<T>>,
}

impl<T> TryFrom<RawTree<T>> for DataTree<T> {
    type Error = String;

    fn try_from(raw: RawTree<T>) -> std::result::Result<Self, Self::Error> {
        if raw.paths.len() != raw.branches.len() {
            return Err(format!(
                "{} paths but {} branches",
                raw.paths.len(),
                raw.branches.len()
            ));
        }
        let mut index = HashMap::with_capacity_and_hasher(raw.paths.len(), PathHasher);
        for (i, path) in raw.paths.iter().enumerate() {
            if index.insert(path.clone(), i).is_some() {
                return Err(format!("duplicate path {path}"));
            }
        }
        Ok(Self {
            paths: raw.paths,
            branches: raw.branches,
            index,
        })
    }
}

impl<T> DataTree<T> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            paths: Vec::new(),
            branches: Vec::new(),
            index: HashMap::with_hasher(PathHasher),
        }
    }

    /// Topology phase: registers every path with an empty branch.
    ///
    /// Repeated paths are registered once, at their first position.
    pub fn with_topology<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = TreePath>,
    {
        let mut tree = Self::new();
        for path in paths {
            tree.add_path(path);
        }
        tree
    }

    /// Builds a tree from `(path, branch)` pairs. A repeated path has its
    /// slots appended to the earlier branch.
    pub fn from_branches<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (TreePath, Branch<T>)>,
    {
        let mut tree = Self::new();
        for (path, branch) in entries {
            tree.append(path, branch);
        }
        tree
    }

    /// Builds a flat tree `{0}`, `{1}`, ... from plain value lists.
    pub fn from_lists<I, B>(lists: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: IntoIterator<Item = T>,
    {
        Self::from_branches(lists.into_iter().enumerate().map(|(i, list)| {
            let index = u32::try_from(i).unwrap_or(u32::MAX);
            let branch: Branch<T> = list.into_iter().map(Some).collect();
            (TreePath::new([index]), branch)
        }))
    }

    /// Registers `path` if it is new and returns its branch index.
    pub fn add_path(&mut self, path: TreePath) -> usize {
        if let Some(&i) = self.index.get(&path) {
            return i;
        }
        let i = self.paths.len();
        self.index.insert(path.clone(), i);
        self.paths.push(path);
        self.branches.push(Branch::new());
        i
    }

    /// Appends a present value to the branch at `path`, registering it if needed.
    pub fn push(&mut self, path: TreePath, value: T) {
        let i = self.add_path(path);
        self.branches[i].push(value);
    }

    /// Appends a raw slot to the branch at `path`, registering it if needed.
    pub fn push_slot(&mut self, path: TreePath, slot: Option<T>) {
        let i = self.add_path(path);
        self.branches[i].push_slot(slot);
    }

    /// Appends every slot of `branch` to the branch at `path`.
    pub fn append(&mut self, path: TreePath, branch: Branch<T>) {
        let i = self.add_path(path);
        let target = &mut self.branches[i];
        if target.is_empty() {
            *target = branch;
        } else {
            for slot in branch.into_slots() {
                target.push_slot(slot);
            }
        }
    }

    /// Number of registered paths.
    pub fn branch_count(&self) -> usize {
        self.paths.len()
    }

    /// Returns true if no path is registered.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Total number of slots across all branches.
    pub fn item_count(&self) -> usize {
        self.branches.iter().map(Branch::len).sum()
    }

    /// Registered paths, in registration order.
    pub fn paths(&self) -> &[TreePath] {
        &self.paths
    }

    /// Branches, in registration order.
    pub fn branches(&self) -> &[Branch<T>] {
        &self.branches
    }

    /// Length of every branch, in registration order.
    pub fn branch_lengths(&self) -> Vec<usize> {
        self.branches.iter().map(Branch::len).collect()
    }

    /// Path at branch index `i`.
    pub fn path(&self, i: usize) -> Option<&TreePath> {
        self.paths.get(i)
    }

    /// Branch at index `i`.
    pub fn branch(&self, i: usize) -> Option<&Branch<T>> {
        self.branches.get(i)
    }

    /// Branch registered under `path`.
    pub fn get(&self, path: &TreePath) -> Option<&Branch<T>> {
        self.index.get(path).and_then(|&i| self.branches.get(i))
    }

    /// Branch index of `path`.
    pub fn index_of(&self, path: &TreePath) -> Option<usize> {
        self.index.get(path).copied()
    }

    /// Index of the first path with the greatest length.
    pub fn longest_path_index(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (i, path) in self.paths.iter().enumerate() {
            match best {
                Some((_, len)) if path.len() <= len => {}
                _ => best = Some((i, path.len())),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Length of the deepest path, `None` for an empty tree.
    pub fn depth(&self) -> Option<usize> {
        self.longest_path_index()
            .and_then(|i| self.paths.get(i))
            .map(TreePath::len)
    }

    /// Iterates over `(path, branch)` in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&TreePath, &Branch<T>)> + '_ {
        self.paths.iter().zip(self.branches.iter())
    }

    /// Same topology, every slot borrowed.
    ///
    /// Element references then live as long as `self`, which lets
    /// transforms hand them on (see [`compose`](crate::compose)).
    pub fn as_refs(&self) -> DataTree<&T> {
        DataTree {
            paths: self.paths.clone(),
            branches: self
                .branches
                .iter()
                .map(|branch| branch.iter().map(Option::as_ref).collect())
                .collect(),
            index: self.index.clone(),
        }
    }

    /// Fill phase: mutable access to the branches without access to the
    /// key set.
    pub fn slots_mut(&mut self) -> &mut [Branch<T>] {
        &mut self.branches
    }

    /// Splits the tree into its paths and branches.
    pub fn into_parts(self) -> (Vec<TreePath>, Vec<Branch<T>>) {
        (self.paths, self.branches)
    }
}

impl<T> Default for DataTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for DataTree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.paths == other.paths && self.branches == other.branches
    }
}

impl<T: Eq> Eq for DataTree<T> {}
