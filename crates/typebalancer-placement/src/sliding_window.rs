//! Windowed balancing for long sequences
//!
//! The input is cut into contiguous batches of `batch_size` items and every
//! batch is balanced on its own. Inside a batch the output is built one window
//! of `window_size` slots at a time. Each window gets integer per-type
//! targets from the batch proportions and is filled greedily, always taking
//! the type that lags its share the most. Per-type cursors only move forward,
//! so an item is consumed exactly once.

use crate::extract::TypeAccessor;
use crate::grouping::TypeGroups;
use crate::ratio::window_targets;
use tracing::{debug, trace};
use typebalancer_common::config::{DEFAULT_BATCH_SIZE, DEFAULT_WINDOW_SIZE};
use typebalancer_common::{Error, Result};

/// Balancer that works window by window inside fixed-size batches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlidingWindow {
    window_size: usize,
    batch_size: usize,
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE, DEFAULT_BATCH_SIZE)
    }
}

impl SlidingWindow {
    /// Create a windowed balancer. Both sizes are raised to at least 1.
    #[must_use]
    pub fn new(window_size: usize, batch_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            batch_size: batch_size.max(1),
        }
    }

    /// Slots per window
    #[must_use]
    pub const fn window_size(&self) -> usize {
        self.window_size
    }

    /// Items per batch
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Balance `items` batch by batch.
    ///
    /// Error indices refer to the position in `items`, not in the batch.
    ///
    /// # Errors
    /// `EmptyCollection`, `MissingType` or `UnknownType`.
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

        let total = items.len();
        let mut output = Vec::with_capacity(total);
        let mut rest = items.into_iter();
        let mut offset = 0;
        let mut batches = 0;

        loop {
            let batch: Vec<T> = rest.by_ref().take(self.batch_size).collect();
            if batch.is_empty() {
                break;
            }
            let len = batch.len();
            let groups = TypeGroups::build(batch, accessor, type_order)
                .map_err(|e| e.offset_index(offset))?;
            output.extend(self.place(groups));
            offset += len;
            batches += 1;
        }

        debug!(
            total,
            batches,
            window_size = self.window_size,
            batch_size = self.batch_size,
            "windowed balance complete"
        );
        Ok(output)
    }

    /// Balance one batch of already grouped items
    #[must_use]
    pub fn place<T>(&self, groups: TypeGroups<T>) -> Vec<T> {
        if groups.type_count() <= 1 {
            let (_, parts) = groups.into_parts();
            return parts.into_iter().flatten().collect();
        }

        let layout = self.layout(&groups.counts());
        debug!(types = ?groups.names(), slots = layout.len(), "arranging batch");
        groups.arrange(&layout)
    }

    /// Type index for every slot of one batch.
    ///
    /// `counts` holds the item count per type in priority order; the result
    /// uses each type index exactly `counts[i]` times.
    #[must_use]
    pub fn layout(&self, counts: &[usize]) -> Vec<usize> {
        let total: usize = counts.iter().sum();
        if total == 0 {
            return Vec::new();
        }

        #[allow(clippy::cast_precision_loss)]
        let ratios: Vec<f64> = counts.iter().map(|&c| c as f64 / total as f64).collect();

        let mut remaining = counts.to_vec();
        let mut layout = Vec::with_capacity(total);
        let mut windows = 0usize;
        let mut backfilled = 0usize;

        while layout.len() < total {
            let size = self.window_size.min(total - layout.len()).max(1);
            let targets = window_targets(&ratios, size);
            let mut current = vec![0usize; counts.len()];

            for filled in 0..size {
                let pick = match lagging_type(&ratios, &targets, &current, &remaining, filled, size) {
                    Some(type_idx) => type_idx,
                    None => match least_represented(&current, &remaining) {
                        Some(type_idx) => {
                            backfilled += 1;
                            type_idx
                        }
                        None => break,
                    },
                };
                current[pick] += 1;
                remaining[pick] -= 1;
                layout.push(pick);
            }

            trace!(window = windows, size, ?targets, ?current, "filled window");
            windows += 1;
        }

        debug!(total, windows, backfilled, ?counts, "laid out batch");
        layout
    }
}

/// Type under its window target whose share of the window so far falls
/// furthest below its ratio. Ties go to the earlier type.
///
/// A type that holds every earlier slot of the window may not take the last
/// one.
fn lagging_type(
    ratios: &[f64],
    targets: &[usize],
    current: &[usize],
    remaining: &[usize],
    filled: usize,
    size: usize,
) -> Option<usize> {
    let sole = if filled > 0 && filled + 1 == size {
        current.iter().position(|&c| c == filled)
    } else {
        None
    };

    let mut best: Option<(usize, f64)> = None;
    for type_idx in 0..ratios.len() {
        if remaining[type_idx] == 0 || current[type_idx] >= targets[type_idx] || sole == Some(type_idx) {
            continue;
        }

        #[allow(clippy::cast_precision_loss)]
        let score = if filled == 0 {
            0.0
        } else {
            current[type_idx] as f64 / filled as f64 - ratios[type_idx]
        };
        if best.is_none_or(|(_, s)| score < s) {
            best = Some((type_idx, score));
        }
    }
    best.map(|(type_idx, _)| type_idx)
}

/// Type with items left that has the fewest slots in the current window
fn least_represented(current: &[usize], remaining: &[usize]) -> Option<usize> {
    (0..current.len())
        .filter(|&type_idx| remaining[type_idx] > 0)
        .min_by_key(|&type_idx| current[type_idx])
}
