//! Global ratio placement
//!
//! Each type, in priority order, claims evenly spaced slots out of the slots
//! still free, in proportion to its normalized ratio. Earlier types claim
//! first. Items that did not get a slot are handed to a gap filler, which
//! places them in the remaining empty slots.

use crate::extract::TypeAccessor;
use crate::gap_fill::GapFiller;
use crate::grouping::TypeGroups;
use crate::position::{spread_positions, target_count};
use crate::ratio::RatioCalculator;
use crate::slots::SlotArray;
use tracing::debug;
use typebalancer_common::config::DEFAULT_MIN_RATIO;
use typebalancer_common::{Error, GapFillKind, Result};

/// Balancer that places every type over the whole sequence at once
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Distributor {
    ratios: RatioCalculator,
    gap_fill: GapFillKind,
}

impl Default for Distributor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_RATIO, GapFillKind::default())
    }
}

impl Distributor {
    /// Create a distributor with the given ratio floor and leftover filler
    #[must_use]
    pub fn new(min_ratio: f64, gap_fill: GapFillKind) -> Self {
        Self {
            ratios: RatioCalculator::new(min_ratio),
            gap_fill,
        }
    }

    /// Gap filler used for leftovers
    #[must_use]
    pub const fn gap_fill(&self) -> GapFillKind {
        self.gap_fill
    }

    /// Balance `items`.
    ///
    /// The output is a permutation of the input. A single-type input is
    /// returned unchanged.
    ///
    /// # Errors
    /// `EmptyCollection`, `MissingType` or `UnknownType`; see
    /// [`TypeGroups::build`].
    pub fn balance<T, A>(
        &self,
        items: Vec<T>,
        accessor: &A,
        type_order: Option<&[String]>,
    ) -> Result<Vec<T>>
    where
        A: TypeAccessor<T> + ?Sized,
    {
        if items.is_empty() {
            return Err(Error::EmptyCollection);
        }
        let groups = TypeGroups::build(items, accessor, type_order)?;
        Ok(self.place(groups))
    }

    /// Place already grouped items
    #[must_use]
    pub fn place<T>(&self, groups: TypeGroups<T>) -> Vec<T> {
        if groups.type_count() <= 1 {
            let (_, parts) = groups.into_parts();
            return parts.into_iter().flatten().collect();
        }

        let layout = self.layout(&groups.counts());
        debug!(types = ?groups.names(), slots = layout.len(), "arranging items");
        groups.arrange(&layout)
    }

    /// Decide which type occupies each slot.
    ///
    /// `counts` holds the item count per type in priority order. The result
    /// has one entry per item: the index into `counts` of the type that owns
    /// that slot.
    #[must_use]
    pub fn layout(&self, counts: &[usize]) -> Vec<usize> {
        let total: usize = counts.iter().sum();
        let ratios = self.ratios.ratios(counts);
        debug!(total, ?counts, ?ratios, "computing layout");

        let mut slots = SlotArray::new(total);
        let mut free: Vec<u64> = (0..total as u64).collect();
        let mut leftovers = Vec::with_capacity(counts.len());

        for (type_idx, (&count, &ratio)) in counts.iter().zip(&ratios).enumerate() {
            let wanted = target_count(total as u64, ratio);
            let cap = wanted.min(count as u64).min(free.len() as u64);

            // Nothing claimed yet: spread over the full range so the
            // three-slot packing applies
            let available = (free.len() < total).then_some(free.as_slice());
            let picked = spread_positions(total as u64, cap, available);

            #[allow(clippy::cast_possible_truncation)]
            let positions: Vec<usize> = picked.iter().map(|&p| p as usize).collect();
            let left = slots.place_at_positions(std::iter::repeat_n(type_idx, count), &positions);

            debug!(
                type_idx,
                ratio,
                wanted,
                placed = positions.len(),
                leftover = left.len(),
                "placed type"
            );

            free.retain(|p| picked.binary_search(p).is_err());
            leftovers.push(left);
        }

        let mut filler = GapFiller::from_groups(self.gap_fill, leftovers);
        let filled = slots.fill_gaps(&mut filler);
        debug!(filled, unplaced = filler.remaining(), filler = %self.gap_fill, "filled gaps");

        slots.into_compacted()
    }
}
