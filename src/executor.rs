//! The partitioned parallel executor.
//!
//! Shared by the map, zip and reduce engines. The output tree's topology is
//! already frozen when this runs: the executor only receives the branch
//! slice, cuts it into one disjoint sub-slice per partition and fills every
//! sub-slice on its own rayon task. Within a task branches are processed in
//! index order.

use log::{debug, trace, warn};

use crate::partition::{partition_weights, split_slots, uncovered, Granularity, PartitionPolicy};
use crate::tree::Branch;

/// Partitioning knobs for one parallel run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartitionSettings {
    /// Budget per partition.
    pub granularity: Granularity,
    /// Handling of the remainder after the last budget break.
    pub policy: PartitionPolicy,
}

impl PartitionSettings {
    /// Settings with a fixed budget and the default (complete) policy.
    pub fn fixed(granularity: usize) -> Self {
        Self {
            granularity: Granularity::Fixed(granularity),
            policy: PartitionPolicy::default(),
        }
    }

    /// Same settings with another policy.
    pub fn with_policy(mut self, policy: PartitionPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Fills `slots` in parallel, one task per partition of `weights`.
///
/// `work(i, branch)` receives the global branch index and the output branch
/// at that index. Indices the partitioning does not cover are left untouched.
pub fn run_partitioned<R, W>(
    op: &str,
    slots: &mut [Branch<R>],
    weights: &[usize],
    settings: PartitionSettings,
    work: W,
) where
    R: Send,
    W: Fn(usize, &mut Branch<R>) + Sync,
{
    let total: usize = weights.iter().sum();
    let budget = settings
        .granularity
        .budget(total, rayon::current_num_threads());
    let partitions = partition_weights(weights, budget, settings.policy);

    debug!(
        "{op}: {} branches, {total} items, budget {budget}, {} partitions",
        weights.len(),
        partitions.len()
    );

    let skipped = uncovered(&partitions, weights.len());
    if !skipped.is_empty() {
        warn!(
            "{op}: partitioning left branch indices {skipped:?} out; their paths stay empty"
        );
    }

    let work = &work;
    rayon::scope(|s| {
        for (partition, chunk) in split_slots(slots, &partitions) {
            s.spawn(move |_| {
                trace!("{op}: partition [{}, {}]", partition.lo, partition.hi);
                for (offset, branch) in chunk.iter_mut().enumerate() {
                    work(partition.lo + offset, branch);
                }
            });
        }
    });
}
