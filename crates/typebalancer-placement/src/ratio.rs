//! Ratio normalization and per-window target counts

use tracing::trace;
use typebalancer_common::config::DEFAULT_MIN_RATIO;

/// Turns per-type item counts into target shares.
///
/// Every type with at least one item receives `min_ratio`; the remaining mass
/// is split in proportion to item counts, so a rare type is never starved by a
/// frequent one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RatioCalculator {
    min_ratio: f64,
}

impl Default for RatioCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_RATIO)
    }
}

impl RatioCalculator {
    /// Create a calculator with the given floor (clamped to `[0, 1]`)
    #[must_use]
    pub fn new(min_ratio: f64) -> Self {
        let min_ratio = if min_ratio.is_nan() {
            0.0
        } else {
            min_ratio.clamp(0.0, 1.0)
        };
        Self { min_ratio }
    }

    /// Floor applied to each present type
    #[must_use]
    pub const fn min_ratio(&self) -> f64 {
        self.min_ratio
    }

    /// Ratios aligned with `counts`. Zero-count entries get `0.0` and do not
    /// take part in the floor; the non-zero entries sum to 1.0.
    #[must_use]
    pub fn ratios(&self, counts: &[usize]) -> Vec<f64> {
        let present = counts.iter().filter(|&&c| c > 0).count();
        let total: usize = counts.iter().sum();

        match present {
            0 => return vec![0.0; counts.len()],
            1 => {
                return counts
                    .iter()
                    .map(|&c| if c > 0 { 1.0 } else { 0.0 })
                    .collect();
            }
            _ => {}
        }

        #[allow(clippy::cast_precision_loss)]
        let (present_f, total_f) = (present as f64, total as f64);
        let floor_mass = self.min_ratio * present_f;

        #[allow(clippy::cast_precision_loss)]
        let raw: Vec<f64> = if floor_mass >= 1.0 {
            // Floors alone exhaust the mass: split evenly
            counts
                .iter()
                .map(|&c| if c > 0 { 1.0 / present_f } else { 0.0 })
                .collect()
        } else {
            let spread = 1.0 - floor_mass;
            counts
                .iter()
                .map(|&c| {
                    if c > 0 {
                        self.min_ratio + spread * (c as f64 / total_f)
                    } else {
                        0.0
                    }
                })
                .collect()
        };

        let sum: f64 = raw.iter().sum();
        let ratios: Vec<f64> = raw.into_iter().map(|r| r / sum).collect();
        trace!(?counts, ?ratios, "normalized type ratios");
        ratios
    }

    /// Keyed variant of [`ratios`](Self::ratios). Types with zero items are
    /// dropped from the output; order follows the input.
    #[must_use]
    pub fn normalize<K: Clone>(&self, counts: &[(K, usize)]) -> Vec<(K, f64)> {
        let plain: Vec<usize> = counts.iter().map(|(_, c)| *c).collect();
        counts
            .iter()
            .zip(self.ratios(&plain))
            .filter(|((_, count), _)| *count > 0)
            .map(|((key, _), ratio)| (key.clone(), ratio))
            .collect()
    }
}

/// Integer slot targets per type for one window of `window_size` slots.
///
/// 1. `floor(window_size * ratio)` per type
/// 2. every type with a positive ratio gets at least one slot
/// 3. if that overshoots the window, all targets are scaled down
///    proportionally (flooring)
/// 4. leftover slots go to the highest-ratio types first, cycling in
///    descending ratio order (ties keep type order)
#[must_use]
pub fn window_targets(ratios: &[f64], window_size: usize) -> Vec<usize> {
    #[allow(clippy::cast_precision_loss)]
    let window_f = window_size as f64;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mut targets: Vec<usize> = ratios
        .iter()
        .map(|&r| {
            if r > 0.0 {
                ((window_f * r).floor() as usize).max(1)
            } else {
                0
            }
        })
        .collect();

    let total: usize = targets.iter().sum();
    if total > window_size {
        #[allow(clippy::cast_precision_loss)]
        let scale = window_f / total as f64;
        for target in &mut targets {
            #[allow(
                clippy::cast_precision_loss,
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss
            )]
            let scaled = (*target as f64 * scale).floor() as usize;
            *target = scaled;
        }
    }

    let assigned: usize = targets.iter().sum();
    let mut by_ratio: Vec<usize> = (0..ratios.len()).filter(|&i| ratios[i] > 0.0).collect();
    by_ratio.sort_by(|&a, &b| ratios[b].total_cmp(&ratios[a]));

    if !by_ratio.is_empty() {
        for slot in 0..window_size.saturating_sub(assigned) {
            targets[by_ratio[slot % by_ratio.len()]] += 1;
        }
    }

    targets
}
