//! Gap filling strategies
//!
//! After primary placement, a slot sequence may still hold empty slots and
//! some items may still be waiting in per-type leftover queues. A gap filler
//! walks the empty slots in the order given and pulls items from the queues.
//!
//! Running out of items is not an error: the remaining slots stay empty and
//! are dropped when the sequence is compacted.

use std::collections::VecDeque;
use typebalancer_common::GapFillKind;

/// Round-robin filler over any number of leftover groups.
///
/// For each empty slot it takes the next item from the queue under the
/// cursor, or from the first non-empty queue after it, then moves the cursor
/// to the next queue that still has items.
#[derive(Debug)]
pub struct SequentialFiller<T> {
    queues: Vec<VecDeque<T>>,
}

impl<T> SequentialFiller<T> {
    /// Create a filler from leftover groups (empty groups are ignored)
    #[must_use]
    pub fn new(groups: Vec<Vec<T>>) -> Self {
        let queues = groups
            .into_iter()
            .filter(|g| !g.is_empty())
            .map(VecDeque::from)
            .collect();
        Self { queues }
    }

    /// Items not yet placed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    /// Fill every empty slot at `positions`; returns how many were filled
    pub fn fill_gaps(&mut self, slots: &mut [Option<T>], positions: &[usize]) -> usize {
        if self.queues.is_empty() {
            return 0;
        }

        let mut cursor = 0;
        let mut filled = 0;
        for &pos in positions {
            let Some(slot) = slots.get_mut(pos) else {
                continue;
            };
            if slot.is_some() {
                continue;
            }

            match self.take_from(cursor) {
                Some(item) => {
                    *slot = Some(item);
                    filled += 1;
                }
                None => break,
            }
            cursor = self.next_cursor(cursor);
        }
        filled
    }

    fn take_from(&mut self, start: usize) -> Option<T> {
        let n = self.queues.len();
        (0..n)
            .map(|offset| (start + offset) % n)
            .find_map(|idx| self.queues[idx].pop_front())
    }

    fn next_cursor(&self, current: usize) -> usize {
        let n = self.queues.len();
        (0..n)
            .map(|offset| (current + 1 + offset) % n)
            .find(|&idx| !self.queues[idx].is_empty())
            .unwrap_or(current)
    }
}

/// Strict two-way alternation between a primary and a secondary queue.
///
/// The first filled slot takes from the primary queue; once either queue is
/// empty the filler continues with the other one alone.
#[derive(Debug)]
pub struct AlternatingFiller<T> {
    primary: VecDeque<T>,
    secondary: VecDeque<T>,
}

impl<T> AlternatingFiller<T> {
    /// Create a filler from its two queues
    #[must_use]
    pub fn new(primary: Vec<T>, secondary: Vec<T>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }

    /// Items not yet placed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.primary.len() + self.secondary.len()
    }

    /// Fill every empty slot at `positions`; returns how many were filled
    pub fn fill_gaps(&mut self, slots: &mut [Option<T>], positions: &[usize]) -> usize {
        let mut use_primary = true;
        let mut filled = 0;
        for &pos in positions {
            let Some(slot) = slots.get_mut(pos) else {
                continue;
            };
            if slot.is_some() {
                continue;
            }

            let (first, second) = if use_primary {
                (&mut self.primary, &mut self.secondary)
            } else {
                (&mut self.secondary, &mut self.primary)
            };
            match first.pop_front().or_else(|| second.pop_front()) {
                Some(item) => {
                    *slot = Some(item);
                    filled += 1;
                }
                None => break,
            }
            use_primary = !use_primary;
        }
        filled
    }
}

/// Closed set of gap fillers
#[derive(Debug)]
pub enum GapFiller<T> {
    /// Round-robin across all groups
    Sequential(SequentialFiller<T>),
    /// Primary/secondary alternation
    Alternating(AlternatingFiller<T>),
}

impl<T> GapFiller<T> {
    /// Build the filler selected by `kind` from leftover groups in type order.
    ///
    /// The alternating filler uses the first non-empty group as primary and
    /// the rest, concatenated in order, as secondary.
    #[must_use]
    pub fn from_groups(kind: GapFillKind, groups: Vec<Vec<T>>) -> Self {
        match kind {
            GapFillKind::Sequential => Self::Sequential(SequentialFiller::new(groups)),
            GapFillKind::Alternating => {
                let mut groups = groups.into_iter().filter(|g| !g.is_empty());
                let primary = groups.next().unwrap_or_default();
                let secondary = groups.flatten().collect();
                Self::Alternating(AlternatingFiller::new(primary, secondary))
            }
        }
    }

    /// Fill every empty slot at `positions`; returns how many were filled
    pub fn fill_gaps(&mut self, slots: &mut [Option<T>], positions: &[usize]) -> usize {
        match self {
            Self::Sequential(filler) => filler.fill_gaps(slots, positions),
            Self::Alternating(filler) => filler.fill_gaps(slots, positions),
        }
    }

    /// Items not yet placed
    #[must_use]
    pub fn remaining(&self) -> usize {
        match self {
            Self::Sequential(filler) => filler.remaining(),
            Self::Alternating(filler) => filler.remaining(),
        }
    }
}
