use serde::{Deserialize, Serialize};

/// An ordered list of slots stored at one path.
///
/// A slot is either a present value or absent. Absent slots are what a
/// failed validation leaves behind; they keep their position so that
/// element indices line up with the inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch<T> {
    slots: Vec<Option<T>>,
}

impl<T> Branch<T> {
    /// Creates an empty branch.
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Creates an empty branch with room for `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Wraps already-built slots.
    pub fn from_slots(slots: Vec<Option<T>>) -> Self {
        Self { slots }
    }

    /// Number of slots, absent ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the branch holds no slots at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of absent slots.
    pub fn absent_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    /// The value at `index`, or `None` if out of range or absent.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Raw slot access.
    pub fn slot(&self, index: usize) -> Option<&Option<T>> {
        self.slots.get(index)
    }

    /// Broadcasting lookup: `index` is clamped to the last slot.
    ///
    /// Returns `None` for an empty branch or an absent slot.
    pub fn get_clamped(&self, index: usize) -> Option<&T> {
        let last = self.slots.len().checked_sub(1)?;
        self.get(index.min(last))
    }

    /// Appends a present value.
    pub fn push(&mut self, value: T) {
        self.slots.push(Some(value));
    }

    /// Appends an absent slot.
    pub fn push_absent(&mut self) {
        self.slots.push(None);
    }

    /// Appends a raw slot.
    pub fn push_slot(&mut self, slot: Option<T>) {
        self.slots.push(slot);
    }

    /// Iterates over all slots in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Option<T>> {
        self.slots.iter()
    }

    /// Iterates over present values only.
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.slots.iter().flatten()
    }

    /// Slots as a slice.
    pub fn as_slots(&self) -> &[Option<T>] {
        &self.slots
    }

    /// Consumes the branch, returning its slots.
    pub fn into_slots(self) -> Vec<Option<T>> {
        self.slots
    }

    pub(crate) fn replace_slots(&mut self, slots: Vec<Option<T>>) {
        self.slots = slots;
    }
}

impl<T> Default for Branch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<Option<T>> for Branch<T> {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

impl<T> From<Vec<T>> for Branch<T> {
    fn from(values: Vec<T>) -> Self {
        Self {
            slots: values.into_iter().map(Some).collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Branch<T> {
    type Item = &'a Option<T>;
    type IntoIter = std::slice::Iter<'a, Option<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
