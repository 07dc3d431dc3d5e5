use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PartreeError, Result};

/// Address of one branch inside a [`DataTree`](super::DataTree).
///
/// Paths compare by length first, then lexicographically, so `{5}` sorts
/// before `{0;0}`. The text form is `{0;1;2}`; the root path is `{}`.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TreePath(Box<[u32]>);

impl TreePath {
    /// Creates a path from its components.
    pub fn new(indices: impl Into<Vec<u32>>) -> Self {
        Self(indices.into().into_boxed_slice())
    }

    /// The zero-length path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Components of the path.
    pub fn indices(&self) -> &[u32] {
        &self.0
    }

    /// Last component, if any.
    pub fn last(&self) -> Option<u32> {
        self.0.last().copied()
    }

    /// Returns a new path with `index` appended.
    pub fn child(&self, index: u32) -> Self {
        let mut indices = self.0.to_vec();
        indices.push(index);
        Self::new(indices)
    }

    /// Returns a new path whose final component is raised by `offset`.
    ///
    /// A root path has no final component; the result is then `{offset}`.
    pub fn increment_last(&self, offset: u32) -> Self {
        let mut indices = self.0.to_vec();
        match indices.last_mut() {
            Some(last) => *last = last.saturating_add(offset),
            None => indices.push(offset),
        }
        Self::new(indices)
    }
}

impl Ord for TreePath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.len()
            .cmp(&other.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for TreePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<Vec<u32>> for TreePath {
    fn from(indices: Vec<u32>) -> Self {
        Self::new(indices)
    }
}

impl<const N: usize> From<[u32; N]> for TreePath {
    fn from(indices: [u32; N]) -> Self {
        Self::new(indices.to_vec())
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{index}")?;
        }
        f.write_str("}")
    }
}

impl fmt::Debug for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreePath{self}")
    }
}

impl FromStr for TreePath {
    type Err = PartreeError;

    fn from_str(s: &str) -> Result<Self> {
        let inner = s
            .trim()
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| PartreeError::Path(format!("expected `{{a;b;c}}`, got `{s}`")))?;

        if inner.trim().is_empty() {
            return Ok(Self::root());
        }

        inner
            .split(';')
            .map(|part| {
                part.trim()
                    .parse::<u32>()
                    .map_err(|e| PartreeError::Path(format!("bad component `{part}` in `{s}`: {e}")))
            })
            .collect::<Result<Vec<u32>>>()
            .map(Self::new)
    }
}
