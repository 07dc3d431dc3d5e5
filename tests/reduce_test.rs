#![allow(missing_docs)]

use std::sync::Arc;

use partree::executor::PartitionSettings;
use partree::reduce::{reduce_partitioned, reduce_sequential};
use partree::validation::{CollectingSink, Severity};
use partree::{Branch, DataTree, ErrorChecker, ErrorRule, Partree, PartitionPolicy, Strategy};
use proptest::prelude::{prop, prop_assert_eq, proptest};

fn sum(branch: &Branch<i32>) -> i32 {
    branch.values().sum()
}

fn reject_empty() -> ErrorChecker<Branch<i32>> {
    ErrorChecker::new().with_rule(ErrorRule::new(|b: &Branch<i32>| !b.is_empty(), |_: &Branch<i32>| {}))
}

// --- SCENARIOS ---

#[test]
fn test_sum_with_empty_branch_rejected() {
    let _ = env_logger::builder().is_test(true).try_init();
    let tree = DataTree::from_lists(vec![vec![1, 2, 3], vec![], vec![4]]);

    for strategy in [Strategy::Sequential, Strategy::Partitioned] {
        let engine = Partree::builder().strategy(strategy).build().expect("engine");
        let out = engine.reduce(&tree, sum, &reject_empty());

        assert_eq!(out.paths(), tree.paths(), "{strategy:?}");
        assert_eq!(out.branch(0).expect("branch").as_slots(), &[Some(6)]);
        assert!(out.branch(1).expect("branch").is_empty());
        assert_eq!(out.branch(2).expect("branch").as_slots(), &[Some(4)]);
    }
}

#[test]
fn test_fine_partitions_cover_every_branch() {
    // Weights [3, 0, 1] with budget 1 give [0, 0] and [1, 2].
    let tree = DataTree::from_lists(vec![vec![1, 2, 3], vec![], vec![4]]);
    let out = reduce_partitioned(&tree, sum, &reject_empty(), PartitionSettings::fixed(1));
    assert_eq!(out.branch(0).expect("branch").as_slots(), &[Some(6)]);
    assert!(out.branch(1).expect("branch").is_empty());
    assert_eq!(out.branch(2).expect("branch").as_slots(), &[Some(4)]);
}

#[test]
fn test_rejections_reach_the_sink() {
    let tree = DataTree::from_lists(vec![vec![1], vec![], vec![], vec![2, 3]]);
    let sink = Arc::new(CollectingSink::new());
    let checker = ErrorChecker::new().with_rule(ErrorRule::reporting(
        |b: &Branch<i32>| !b.is_empty(),
        sink.clone(),
        Severity::Remark,
        |_| "empty branch skipped".to_string(),
    ));

    let out = reduce_sequential(&tree, |b: &Branch<i32>| b.len(), &checker);
    assert_eq!(sink.count(Severity::Remark), 2);
    assert_eq!(out.item_count(), 2);
    assert_eq!(out.branch(3).expect("branch").get(0), Some(&2));
}

#[test]
fn test_reduce_sees_absent_slots() {
    let tree = DataTree::from_branches(vec![(
        "{0}".parse().expect("path"),
        Branch::from_slots(vec![Some(1), None, Some(2)]),
    )]);
    let out = Partree::new().reduce(&tree, |b: &Branch<i32>| b.absent_count(), &ErrorChecker::new());
    assert_eq!(out.branch(0).expect("branch").get(0), Some(&1));
}

#[test]
fn test_default_engine_matches_sequential_with_trailing_branch() {
    // Weights [70, 1]: under the automatic budget the last branch trails alone.
    let tree = DataTree::from_lists(vec![(0..70).collect::<Vec<i32>>(), vec![5]]);

    let parallel = Partree::new().reduce(&tree, sum, &ErrorChecker::new());
    let sequential = reduce_sequential(&tree, sum, &ErrorChecker::new());

    assert_eq!(parallel, sequential);
    assert_eq!(parallel.branch_lengths(), vec![1, 1]);
    assert_eq!(parallel.branch(1).expect("branch").get(0), Some(&5));

    let single = DataTree::from_lists(vec![vec![4, 5]]);
    let out = Partree::default().reduce(&single, sum, &ErrorChecker::new());
    assert_eq!(out.branch(0).expect("branch").as_slots(), &[Some(9)]);
}

// --- PROPERTIES ---

proptest! {
    #[test]
    fn prop_partitioned_matches_sequential(
        lists in prop::collection::vec(prop::collection::vec(-100i32..100, 0..10), 0..16),
        granularity in 1usize..25,
    ) {
        let tree = DataTree::from_lists(lists);
        let checker = reject_empty();
        let settings = PartitionSettings::fixed(granularity).with_policy(PartitionPolicy::Complete);

        let sequential = reduce_sequential(&tree, sum, &checker);
        let partitioned = reduce_partitioned(&tree, sum, &checker, settings);
        prop_assert_eq!(&partitioned, &sequential);
        prop_assert_eq!(sequential.paths(), tree.paths());
    }
}
