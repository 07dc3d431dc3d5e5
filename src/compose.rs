//! N-ary zips built from the 2-ary primitive.
//!
//! There is no separate three-input engine. A 3-way zip tuples the first two
//! trees into a tree of element references, then zips that with the third.
//! Because broadcasting picks topology with a first-strictly-deeper rule and
//! clamps at both branch and element level, the two-step result equals a
//! direct 3-way broadcast.

use crate::api::Partree;
use crate::config::Strategy;
use crate::tree::{Branch, DataTree};
use crate::validation::ErrorChecker;

/// Unit validated by a 3-way zip.
pub type Triple<'a, T, Q, U> = (&'a T, &'a Q, &'a U);

/// Zips `a` and `b` into a tree of element reference pairs.
///
/// Uses the same broadcasting as every other zip and never validates.
pub fn tuple<'a, T, Q>(engine: &Partree, a: &'a DataTree<T>, b: &'a DataTree<Q>) -> DataTree<(&'a T, &'a Q)>
where
    T: Sync,
    Q: Sync,
{
    let (ar, br) = (a.as_refs(), b.as_refs());
    // A local, not a temporary: it must be dropped before the views.
    let unchecked = ErrorChecker::new();
    engine.zip(&ar, &br, |&x, &y| (x, y), &unchecked)
}

/// Drops one level of `Option` from every slot.
pub fn flatten<R>(tree: DataTree<Option<R>>) -> DataTree<R> {
    let (paths, branches) = tree.into_parts();
    DataTree::from_branches(paths.into_iter().zip(branches).map(|(path, branch)| {
        let flat: Branch<R> = branch.into_slots().into_iter().map(Option::flatten).collect();
        (path, flat)
    }))
}

/// Broadcasting zip of three trees.
///
/// Validation runs on the full triple in the second step, except under
/// [`Strategy::Nested`], which stays unchecked like the 2-ary nested zip.
///
/// Both steps are partitioned with the engine's settings. Under
/// [`PartitionPolicy::Compatible`](crate::PartitionPolicy::Compatible) each
/// step can leave its own trailing branch out, so the gaps of the two steps
/// add up; the default policy covers every branch in both.
pub fn zip3<'a, T, Q, U, R, F>(
    engine: &Partree,
    a: &'a DataTree<T>,
    b: &'a DataTree<Q>,
    c: &'a DataTree<U>,
    f: F,
    checker: &ErrorChecker<Triple<'a, T, Q, U>>,
) -> DataTree<R>
where
    T: Sync,
    Q: Sync,
    U: Sync,
    R: Send,
    F: Fn(&T, &Q, &U) -> R + Send + Sync,
{
    let checked = engine.strategy() != Strategy::Nested;
    let ab = tuple(engine, a, b);
    let cr = c.as_refs();
    let combined = engine.zip(
        &ab,
        &cr,
        |&(x, y), &z| {
            if !checked || checker.validate(&(x, y, z)) {
                Some(f(x, y, z))
            } else {
                None
            }
        },
        &ErrorChecker::new(),
    );
    flatten(combined)
}
