//! Load-balanced partitioning of branch indices.
//!
//! # Strategy
//!
//! Parallel runs do not spawn one task per branch. Branch indices are walked
//! in order while their weights (item counts) accumulate; as soon as the
//! running sum exceeds the granularity budget the range seen so far becomes
//! one partition. Every partition is then one task, so tasks carry roughly
//! the same amount of work regardless of how uneven the branches are.
//!
//! # Trailing gap
//!
//! The default [`PartitionPolicy::Complete`] covers every index. The opt-in
//! [`PartitionPolicy::Compatible`] only closes the remainder when more than
//! one index is left after the last budget break, so a trailing single index
//! (and the only index of a one-branch input) is not covered. Callers keep
//! those paths registered but empty; see [`uncovered`] for the indices
//! affected.

use serde::{Deserialize, Serialize};

use crate::tree::Branch;

/// Multiplier over the worker count. With 8 workers we want at least 32
/// tasks so that rayon's work stealing has something to balance.
pub const TASKS_PER_CORE: usize = 4;

/// Lower bound for the automatic budget.
pub const MIN_GRANULARITY: usize = 64;

/// Closed range `[lo, hi]` of branch indices processed as one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    /// First index.
    pub lo: usize,
    /// Last index (inclusive).
    pub hi: usize,
}

impl Partition {
    /// Creates `[lo, hi]`.
    pub fn new(lo: usize, hi: usize) -> Self {
        Self { lo, hi }
    }

    /// Number of indices covered; zero for an inverted range.
    pub fn len(&self) -> usize {
        (self.hi + 1).saturating_sub(self.lo)
    }

    /// Returns true for an inverted range (`lo > hi`).
    pub fn is_empty(&self) -> bool {
        self.lo > self.hi
    }

    /// Half-open range for slicing.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.lo..self.hi + 1
    }

    /// Returns true if `i` lies inside.
    pub fn contains(&self, i: usize) -> bool {
        self.lo <= i && i <= self.hi
    }
}

impl From<(usize, usize)> for Partition {
    fn from((lo, hi): (usize, usize)) -> Self {
        Self::new(lo, hi)
    }
}

/// How the remainder after the last budget break is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionPolicy {
    /// Emit the remainder only if it spans more than one index.
    Compatible,
    /// Always emit the remainder, covering every index.
    #[default]
    Complete,
}

/// Budget per partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Derived from the total weight and the number of workers.
    #[default]
    Auto,
    /// Fixed element-count budget.
    Fixed(usize),
}

impl Granularity {
    /// Resolves the budget for `total` weight spread over `workers` threads.
    pub fn budget(&self, total: usize, workers: usize) -> usize {
        match *self {
            Self::Fixed(n) => n,
            Self::Auto => {
                let tasks = workers.max(1) * TASKS_PER_CORE;
                (total / tasks).max(MIN_GRANULARITY)
            }
        }
    }
}

/// Splits indices `0..weights.len()` into budget-bounded partitions.
pub fn partition_weights(
    weights: &[usize],
    granularity: usize,
    policy: PartitionPolicy,
) -> Vec<Partition> {
    let count = weights.len();
    let mut partitions = Vec::new();
    let mut prev = 0usize;
    let mut sum = 0usize;

    for (i, &weight) in weights.iter().enumerate() {
        sum = sum.saturating_add(weight);
        if sum > granularity {
            partitions.push(Partition::new(prev, i));
            prev = i + 1;
            sum = 0;
        }
    }

    let emit_rest = match policy {
        PartitionPolicy::Compatible => prev + 1 < count,
        PartitionPolicy::Complete => prev < count,
    };
    if emit_rest {
        partitions.push(Partition::new(prev, count - 1));
    }
    partitions
}

/// Indices in `0..count` that no partition covers.
pub fn uncovered(partitions: &[Partition], count: usize) -> Vec<usize> {
    let mut covered = vec![false; count];
    for partition in partitions {
        for i in partition.range() {
            if let Some(flag) = covered.get_mut(i) {
                *flag = true;
            }
        }
    }
    covered
        .iter()
        .enumerate()
        .filter(|(_, &flag)| !flag)
        .map(|(i, _)| i)
        .collect()
}

/// Hands out one disjoint sub-slice of `slots` per partition.
///
/// `partitions` must be ascending and non-overlapping, which is what
/// [`partition_weights`] produces. Gaps between them are skipped, and so are
/// inverted, overlapping or out-of-bounds ranges.
pub fn split_slots<'s, T>(
    slots: &'s mut [Branch<T>],
    partitions: &[Partition],
) -> Vec<(Partition, &'s mut [Branch<T>])> {
    let mut out = Vec::with_capacity(partitions.len());
    let mut rest = slots;
    let mut offset = 0usize;

    for &partition in partitions {
        if partition.is_empty() || partition.lo < offset || partition.hi >= offset + rest.len() {
            log::error!("partition {partition:?} inverted, out of order or out of bounds, skipped");
            continue;
        }
        let tail = std::mem::take(&mut rest);
        let (_, tail) = tail.split_at_mut(partition.lo - offset);
        let (chunk, tail) = tail.split_at_mut(partition.len());
        out.push((partition, chunk));
        rest = tail;
        offset = partition.hi + 1;
    }
    out
}
