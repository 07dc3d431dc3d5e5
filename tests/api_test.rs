#![allow(missing_docs)]

use std::fs::File;
use std::io::Write;

use partree::snapshot::{self, HEADER_SIZE, MAGIC_BYTES};
use partree::{
    Branch, DataTree, EngineConfig, Granularity, Partree, PartitionPolicy, PartreeError, Strategy,
    TreeInspector, TreePath,
};
use tempfile::tempdir;

fn sample() -> DataTree<i32> {
    DataTree::from_branches(vec![
        (TreePath::new([0, 0]), Branch::from(vec![1, 2, 3])),
        (TreePath::new([0, 1]), Branch::from_slots(vec![Some(4), None])),
        (TreePath::new([1, 0]), Branch::new()),
    ])
}

// --- ENGINE ---

#[test]
fn test_builder_sets_config() -> partree::Result<()> {
    let engine = Partree::builder()
        .strategy(Strategy::Lazy)
        .granularity(512)
        .partition_policy(PartitionPolicy::Complete)
        .threads(2)
        .build()?;

    let config = engine.config();
    assert_eq!(config.strategy, Strategy::Lazy);
    assert_eq!(config.granularity, Granularity::Fixed(512));
    assert_eq!(config.partition_policy, PartitionPolicy::Complete);
    assert_eq!(config.threads, Some(2));

    let auto = Partree::builder().granularity(8).auto_granularity().build()?;
    assert_eq!(auto.config().granularity, Granularity::Auto);
    Ok(())
}

#[test]
fn test_default_engine() {
    let engine = Partree::default();
    assert_eq!(engine.strategy(), Strategy::Partitioned);
    assert_eq!(engine.config(), &EngineConfig::default());
    assert_eq!(engine.config().partition_policy, PartitionPolicy::Complete);
    assert_eq!(
        engine.config().partition_settings(),
        partree::PartitionSettings::default()
    );
}

#[test]
fn test_compatible_policy_is_opt_in() -> partree::Result<()> {
    let config = EngineConfig::from_toml_str("partition_policy = \"compatible\"")?;
    assert_eq!(config.partition_policy, PartitionPolicy::Compatible);

    let engine = Partree::builder()
        .partition_policy(PartitionPolicy::Compatible)
        .build()?;
    let tree = DataTree::from_lists(vec![vec![1, 2, 3]]);
    let out = engine.map(&tree, |x: &i32| x + 1, &partree::ErrorChecker::new());
    assert_eq!(out.paths(), tree.paths());
    assert!(out.branch(0).is_some_and(Branch::is_empty));
    Ok(())
}

#[test]
fn test_zero_threads_rejected() {
    let err = Partree::builder().threads(0).build().expect_err("zero threads");
    assert!(matches!(err, PartreeError::Config(_)), "{err}");
}

// --- CONFIG ---

#[test]
fn test_config_from_toml() -> partree::Result<()> {
    let config = EngineConfig::from_toml_str(
        r#"
        strategy = "nested"
        granularity = { fixed = 2048 }
        partition_policy = "complete"
        threads = 3
        "#,
    )?;
    assert_eq!(config.strategy, Strategy::Nested);
    assert_eq!(config.granularity, Granularity::Fixed(2048));
    assert_eq!(config.partition_policy, PartitionPolicy::Complete);
    assert_eq!(config.threads, Some(3));

    let engine = Partree::from_config(config)?;
    assert_eq!(engine.strategy(), Strategy::Nested);
    Ok(())
}

#[test]
fn test_config_defaults_for_missing_keys() -> partree::Result<()> {
    let config = EngineConfig::from_toml_str("strategy = \"sequential\"")?;
    assert_eq!(config.granularity, Granularity::Auto);
    assert_eq!(config.threads, None);
    assert_eq!(EngineConfig::from_toml_str("")?, EngineConfig::default());
    Ok(())
}

#[test]
fn test_config_rejects_bad_input() {
    for text in [
        "strategy = \"turbo\"",
        "unknown_key = 1",
        "threads = 0",
        "granularity = \"huge\"",
    ] {
        let err = EngineConfig::from_toml_str(text).expect_err(text);
        assert!(matches!(err, PartreeError::Config(_)), "{text}: {err}");
    }
}

#[test]
fn test_config_file_round_trip() -> partree::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("partree.toml");

    let config = EngineConfig {
        strategy: Strategy::Lazy,
        partition_policy: PartitionPolicy::Complete,
        threads: Some(4),
        ..EngineConfig::default()
    };
    let mut file = File::create(&path)?;
    file.write_all(config.to_toml_string()?.as_bytes())?;
    drop(file);

    assert_eq!(EngineConfig::load(&path)?, config);

    let missing = EngineConfig::load(dir.path().join("missing.toml"));
    assert!(matches!(missing, Err(PartreeError::Io(_))));
    Ok(())
}

// --- SNAPSHOTS ---

#[test]
fn test_snapshot_file_round_trip() -> partree::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("tree.ptre");
    let tree = sample();

    snapshot::save(&path, &tree)?;
    let loaded: DataTree<i32> = snapshot::open(&path)?;

    assert_eq!(loaded, tree);
    // The path index is rebuilt on load.
    assert_eq!(loaded.index_of(&TreePath::new([0, 1])), Some(1));
    assert_eq!(
        loaded.get(&TreePath::new([0, 1])).map(Branch::absent_count),
        Some(1)
    );
    Ok(())
}

#[test]
fn test_snapshot_of_engine_output() -> partree::Result<()> {
    let a = DataTree::from_lists(vec![vec![1.0f64, 2.0], vec![3.0]]);
    let b = DataTree::from_lists(vec![vec![0.5f64]]);
    let out = Partree::new().zip(&a, &b, |x, y| x * y, &partree::ErrorChecker::new());

    let bytes = snapshot::to_bytes(&out)?;
    assert_eq!(&bytes[..4], &MAGIC_BYTES);
    let back: DataTree<f64> = snapshot::from_bytes(&bytes)?;
    assert_eq!(back, out);
    Ok(())
}

#[test]
fn test_snapshot_rejects_foreign_data() -> partree::Result<()> {
    let mut bytes = snapshot::to_bytes(&sample())?;

    let short = snapshot::from_bytes::<i32>(&bytes[..HEADER_SIZE - 1]);
    assert!(matches!(short, Err(PartreeError::Format(_))));

    let mut bad_version = bytes.clone();
    bad_version[4] = 9;
    let err = snapshot::from_bytes::<i32>(&bad_version).expect_err("version");
    assert!(matches!(err, PartreeError::Format(_)), "{err}");

    bytes[0] = b'X';
    let err = snapshot::from_bytes::<i32>(&bytes).expect_err("magic");
    assert!(matches!(err, PartreeError::Format(_)), "{err}");
    Ok(())
}

#[test]
fn test_snapshot_rejects_truncated_payload() -> partree::Result<()> {
    let bytes = snapshot::to_bytes(&sample())?;
    let err = snapshot::from_bytes::<i32>(&bytes[..bytes.len() - 2]).expect_err("truncated");
    assert!(matches!(err, PartreeError::Serialization(_)), "{err}");
    Ok(())
}

// --- INSPECTOR ---

#[test]
fn test_inspector_report() {
    let report = TreeInspector::inspect(&sample());

    assert_eq!(report.branch_count, 3);
    assert_eq!(report.item_count, 5);
    assert_eq!(report.absent_count, 1);
    assert_eq!(report.empty_branches, 1);
    assert_eq!(report.depth, Some(2));
    assert_eq!(report.branches[1].path, "{0;1}");

    let text = report.to_string();
    assert!(text.starts_with("=== PARTREE INSPECTOR REPORT ==="));
    assert!(text.contains("├── {0;0} Items: 3 | Absent: 0"));
    assert!(text.contains("└── {1;0} Items: 0 | Absent: 0"));
}

#[test]
fn test_inspector_on_empty_tree() {
    let report = TreeInspector::inspect(&DataTree::<u8>::new());
    assert_eq!(report.branch_count, 0);
    assert_eq!(report.depth, None);
    assert!(report.branches.is_empty());
}
