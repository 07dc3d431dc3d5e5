#![allow(missing_docs)]

use partree::snapshot;
use partree::{Branch, DataTree, PartreeError, TreePath};

fn p(text: &str) -> TreePath {
    text.parse().expect("valid path")
}

// --- REGISTRATION ---

#[test]
fn test_repeated_path_appends() {
    let tree = DataTree::from_branches(vec![
        (p("{0}"), Branch::from(vec![1, 2])),
        (p("{1}"), Branch::from(vec![3])),
        (p("{0}"), Branch::from_slots(vec![None, Some(4)])),
    ]);

    assert_eq!(tree.branch_count(), 2);
    assert_eq!(
        tree.get(&p("{0}")).map(Branch::as_slots),
        Some(&[Some(1), Some(2), None, Some(4)][..])
    );
    assert_eq!(tree.index_of(&p("{1}")), Some(1));
    assert_eq!(tree.get(&p("{9}")), None);
}

#[test]
fn test_push_keeps_registration_order() {
    let mut tree = DataTree::new();
    tree.push(p("{3}"), 'c');
    tree.push(p("{1}"), 'a');
    tree.push_slot(p("{3}"), None);
    tree.append(p("{2}"), Branch::from(vec!['b']));

    assert_eq!(tree.paths(), &[p("{3}"), p("{1}"), p("{2}")]);
    assert_eq!(tree.branch_lengths(), vec![2, 1, 1]);
    assert_eq!(tree.item_count(), 4);

    let order: Vec<String> = tree.iter().map(|(path, _)| path.to_string()).collect();
    assert_eq!(order, vec!["{3}", "{1}", "{2}"]);
}

#[test]
fn test_topology_phase_registers_once() {
    let tree: DataTree<u8> = DataTree::with_topology(vec![p("{0}"), p("{1}"), p("{0}")]);
    assert_eq!(tree.paths(), &[p("{0}"), p("{1}")]);
    assert!(tree.branches().iter().all(Branch::is_empty));
}

#[test]
fn test_fill_phase_writes_in_place() {
    let mut tree: DataTree<u32> = DataTree::with_topology(vec![p("{0}"), p("{1}")]);
    for (i, branch) in tree.slots_mut().iter_mut().enumerate() {
        branch.push(i as u32 * 10);
        branch.push_absent();
    }
    assert_eq!(tree.branch(1).map(Branch::as_slots), Some(&[Some(10), None][..]));
    assert_eq!(tree.branch(1).map(Branch::absent_count), Some(1));
}

// --- SHAPE ---

#[test]
fn test_longest_path_is_first_maximum() {
    let tree: DataTree<u8> =
        DataTree::with_topology(vec![p("{0}"), p("{0;1}"), p("{4;4}"), p("{1}")]);
    assert_eq!(tree.longest_path_index(), Some(1));
    assert_eq!(tree.depth(), Some(2));

    let root: DataTree<u8> = DataTree::with_topology(vec![TreePath::root()]);
    assert_eq!(root.depth(), Some(0));
    assert_eq!(DataTree::<u8>::new().longest_path_index(), None);
}

#[test]
fn test_as_refs_keeps_topology() {
    let tree = DataTree::from_branches(vec![
        (p("{0;0}"), Branch::from_slots(vec![Some(7), None])),
        (p("{0;1}"), Branch::new()),
    ]);
    let refs = tree.as_refs();
    assert_eq!(refs.paths(), tree.paths());
    assert_eq!(refs.branch(0).map(Branch::as_slots), Some(&[Some(&7), None][..]));
    assert_eq!(refs.get(&p("{0;1}")).map(Branch::len), Some(0));
}

#[test]
fn test_branch_clamped_lookup() {
    let branch = Branch::from_slots(vec![Some(1), None, Some(3)]);
    assert_eq!(branch.get_clamped(0), Some(&1));
    assert_eq!(branch.get_clamped(1), None);
    assert_eq!(branch.get_clamped(50), Some(&3));
    assert_eq!(Branch::<i32>::new().get_clamped(0), None);

    let values: Vec<i32> = branch.values().copied().collect();
    assert_eq!(values, vec![1, 3]);
}

#[test]
fn test_equality_follows_registration_order() {
    let a = DataTree::from_lists(vec![vec![1], vec![2]]);
    let b = DataTree::from_branches(vec![
        (p("{0}"), Branch::from(vec![1])),
        (p("{1}"), Branch::from(vec![2])),
    ]);
    assert_eq!(a, b);

    let reordered = DataTree::from_branches(vec![
        (p("{1}"), Branch::from(vec![2])),
        (p("{0}"), Branch::from(vec![1])),
    ]);
    assert_ne!(a, reordered);
}

// --- DECODING ---

#[test]
fn test_decoding_rejects_duplicate_paths() -> partree::Result<()> {
    // Two snapshots that differ only in the second path.
    let good = DataTree::from_branches(vec![
        (p("{0}"), Branch::from(vec![1u8])),
        (p("{1}"), Branch::from(vec![2u8])),
    ]);
    let dup = DataTree::from_branches(vec![
        (p("{0}"), Branch::from(vec![1u8])),
        (p("{2}"), Branch::from(vec![2u8])),
    ]);
    let mut bytes = snapshot::to_bytes(&dup)?;
    let good_bytes = snapshot::to_bytes(&good)?;
    assert_eq!(bytes.len(), good_bytes.len());

    // Rewrite `{2}` as `{0}` so the decoded key set has a duplicate.
    let pos = bytes
        .iter()
        .zip(good_bytes.iter())
        .position(|(x, y)| x != y)
        .expect("snapshots differ");
    bytes[pos] = 0;

    let err = snapshot::from_bytes::<u8>(&bytes).expect_err("duplicate path");
    assert!(matches!(err, PartreeError::Serialization(_)), "{err}");
    Ok(())
}
