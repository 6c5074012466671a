//! Fixed-size slot sequence used during placement

use crate::gap_fill::GapFiller;

/// An output sequence under construction: `len` slots, each empty or holding
/// one item.
#[derive(Debug)]
pub struct SlotArray<T> {
    slots: Vec<Option<T>>,
}

impl<T> SlotArray<T> {
    /// Create `len` empty slots
    #[must_use]
    pub fn new(len: usize) -> Self {
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || None);
        Self { slots }
    }

    /// Number of slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the sequence has no slots at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of occupied slots
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Place `items` one-to-one at `positions`, in order.
    ///
    /// An item whose position is missing, out of range or already taken is
    /// returned as a leftover, in input order.
    pub fn place_at_positions<I>(&mut self, items: I, positions: &[usize]) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
    {
        let mut leftovers = Vec::new();
        for (i, item) in items.into_iter().enumerate() {
            match positions.get(i).and_then(|&pos| self.slots.get_mut(pos)) {
                Some(slot) if slot.is_none() => *slot = Some(item),
                _ => leftovers.push(item),
            }
        }
        leftovers
    }

    /// Indices of empty slots, ascending
    #[must_use]
    pub fn empty_positions(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.is_none().then_some(i))
            .collect()
    }

    /// Run `filler` over every empty slot; returns how many were filled
    pub fn fill_gaps(&mut self, filler: &mut GapFiller<T>) -> usize {
        let empty = self.empty_positions();
        filler.fill_gaps(&mut self.slots, &empty)
    }

    /// Drop empty slots and return the items in slot order
    #[must_use]
    pub fn into_compacted(self) -> Vec<T> {
        self.slots.into_iter().flatten().collect()
    }
}
