// src/inspector.rs

//! Tools for inspecting the shape of a tree.
//! Useful when checking what broadcasting produced or why a branch is empty.

use serde::Serialize;

use crate::tree::DataTree;

/// A structural report of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeReport {
    /// Number of registered paths.
    pub branch_count: usize,
    /// Total slots across all branches.
    pub item_count: usize,
    /// Absent slots across all branches.
    pub absent_count: usize,
    /// Length of the deepest path.
    pub depth: Option<usize>,
    /// Number of branches without any slot.
    pub empty_branches: usize,
    /// One entry per branch, in registration order.
    pub branches: Vec<BranchInfo>,
}

/// Metadata for a single branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchInfo {
    /// Path in `{a;b;c}` form.
    pub path: String,
    /// Slot count.
    pub len: usize,
    /// Absent slot count.
    pub absent: usize,
}

/// The tree inspector.
#[derive(Debug)]
pub struct TreeInspector;

impl TreeInspector {
    /// Analyzes a tree and returns a structural report.
    pub fn inspect<T>(tree: &DataTree<T>) -> TreeReport {
        let branches: Vec<BranchInfo> = tree
            .iter()
            .map(|(path, branch)| BranchInfo {
                path: path.to_string(),
                len: branch.len(),
                absent: branch.absent_count(),
            })
            .collect();

        TreeReport {
            branch_count: tree.branch_count(),
            item_count: tree.item_count(),
            absent_count: branches.iter().map(|b| b.absent).sum(),
            depth: tree.depth(),
            empty_branches: branches.iter().filter(|b| b.len == 0).count(),
            branches,
        }
    }
}

impl std::fmt::Display for TreeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== PARTREE INSPECTOR REPORT ===")?;
        writeln!(
            f,
            "Branches: {} | Items: {} | Absent: {} | Empty branches: {}",
            self.branch_count, self.item_count, self.absent_count, self.empty_branches
        )?;
        writeln!(f, "\n[TOPOLOGY]")?;
        for (i, branch) in self.branches.iter().enumerate() {
            let connector = if i + 1 == self.branches.len() {
                "└── "
            } else {
                "├── "
            };
            writeln!(
                f,
                "{connector}{} Items: {} | Absent: {}",
                branch.path, branch.len, branch.absent
            )?;
        }
        Ok(())
    }
}
