//! Position spacing
//!
//! Maps a slot count and a target ratio to the indices a type should occupy.
//! Indices are spread proportionally over the slot range (or over a restricted
//! set of free slots), which keeps the gaps between consecutive picks as even
//! as integer positions allow: the first pick is always the lowest slot and,
//! with two or more picks, the last pick is always the highest slot.
//!
//! A three-slot sequence is a special case. Its target count comes from a fixed
//! threshold table and the picks are packed from slot 0, which is what existing
//! callers observe for `(3, 0.67) -> [0, 1]`.

use std::collections::BTreeSet;
use typebalancer_common::{Error, Result};

/// Tolerance, in ulps of `total_count * ratio`, for snapping the product onto
/// an integer before taking its ceiling (`10 * 0.3` must give 3, not 4)
const CEIL_SNAP_ULPS: f64 = 16.0;

/// Slot count that uses the quantized threshold table
const THREE_SLOTS: u64 = 3;

/// `(ratio upper bound, target count)` for a three-slot sequence; anything
/// above the last bound takes all three slots
const THREE_SLOT_THRESHOLDS: [(f64, u64); 2] = [(0.34, 1), (0.67, 2)];

/// Calculate the positions a type with the given `ratio` should occupy in a
/// sequence of `total_count` slots.
///
/// When `available` is given, positions are chosen only from those slots.
/// The slots may be unsorted and may repeat; every slot must be below
/// `total_count`.
///
/// Returns a strictly increasing list. A zero `total_count` or zero `ratio`
/// gives an empty list.
///
/// # Errors
/// `InvalidArgument` if `ratio` is NaN or outside `[0, 1]`, or if an
/// available slot is out of range.
pub fn calculate_positions(
    total_count: u64,
    ratio: f64,
    available: Option<&[u64]>,
) -> Result<Vec<u64>> {
    validate_ratio(ratio)?;
    if total_count == 0 || ratio <= 0.0 {
        return Ok(Vec::new());
    }

    let available = available
        .map(|slots| normalize_available(total_count, slots))
        .transpose()?;

    let mut target = target_count(total_count, ratio);
    if let Some(slots) = &available {
        target = target.min(slots.len() as u64);
    }

    Ok(spread_positions(total_count, target, available.as_deref()))
}

/// Check that `ratio` is a finite share in `[0, 1]`
///
/// # Errors
/// `InvalidArgument` describing the offending value.
pub fn validate_ratio(ratio: f64) -> Result<()> {
    if ratio.is_nan() || !(0.0..=1.0).contains(&ratio) {
        return Err(Error::invalid_argument(format!(
            "ratio must be in [0, 1], got {ratio}"
        )));
    }
    Ok(())
}

/// Number of slots a type with `ratio` should receive out of `total_count`:
/// `ceil(total_count * ratio)` clamped to `[0, total_count]`, except for the
/// three-slot table.
#[must_use]
pub fn target_count(total_count: u64, ratio: f64) -> u64 {
    if total_count == 0 || ratio.is_nan() || ratio <= 0.0 {
        return 0;
    }

    if total_count == THREE_SLOTS {
        return THREE_SLOT_THRESHOLDS
            .iter()
            .find(|(limit, _)| ratio <= *limit)
            .map_or(THREE_SLOTS, |(_, count)| *count);
    }

    #[allow(clippy::cast_precision_loss)]
    let raw = total_count as f64 * ratio;
    let nearest = raw.round();
    // Relative to the integer being snapped to; a positive product never
    // snaps down to zero
    let snapped = if nearest >= 1.0 && (raw - nearest).abs() <= nearest * f64::EPSILON * CEIL_SNAP_ULPS {
        nearest
    } else {
        raw.ceil()
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = snapped as u64;
    count.min(total_count)
}

/// Spread `target_count` picks over the slot range `[0, total_count)`, or over
/// `available` when given.
///
/// `available` must be sorted ascending without duplicates. If it holds no
/// more slots than `target_count`, all of it is returned.
#[must_use]
pub fn spread_positions(total_count: u64, target_count: u64, available: Option<&[u64]>) -> Vec<u64> {
    match available {
        Some(slots) => spread_over_slots(slots, target_count),
        None => spread_over_range(total_count, target_count),
    }
}

fn spread_over_range(total_count: u64, target_count: u64) -> Vec<u64> {
    let target = target_count.min(total_count);
    match target {
        0 => return Vec::new(),
        1 => return vec![0],
        _ => {}
    }
    if total_count == THREE_SLOTS || target == total_count {
        return (0..target).collect();
    }

    let mut positions = Vec::with_capacity(usize::try_from(target).unwrap_or_default());
    let mut next_free = 0;
    for i in 0..target {
        let pos = proportional_index(total_count, target, i).max(next_free);
        positions.push(pos);
        next_free = pos + 1;
    }
    positions
}

fn spread_over_slots(slots: &[u64], target_count: u64) -> Vec<u64> {
    let len = slots.len() as u64;
    let target = target_count.min(len);
    if target == 0 {
        return Vec::new();
    }
    if target == len {
        return slots.to_vec();
    }
    if target == 1 {
        return vec![slots[0]];
    }

    let mut positions = Vec::with_capacity(usize::try_from(target).unwrap_or_default());
    let mut next_free = 0;
    for i in 0..target {
        let idx = proportional_index(len, target, i).max(next_free);
        #[allow(clippy::cast_possible_truncation)]
        let slot = slots[idx as usize];
        positions.push(slot);
        next_free = idx + 1;
    }
    positions
}

/// `round((len - 1) * i / (target - 1))` in exact integer arithmetic,
/// rounding halves up. Requires `target >= 2`.
#[allow(clippy::cast_possible_truncation)]
fn proportional_index(len: u64, target: u64, i: u64) -> u64 {
    let span = u128::from(len - 1);
    let steps = u128::from(target - 1);
    ((2 * span * u128::from(i) + steps) / (2 * steps)) as u64
}

/// Sort and deduplicate caller-supplied slots, rejecting any outside the
/// sequence
fn normalize_available(total_count: u64, slots: &[u64]) -> Result<Vec<u64>> {
    let sorted: BTreeSet<u64> = slots.iter().copied().collect();
    if let Some(&last) = sorted.last() {
        if last >= total_count {
            return Err(Error::invalid_argument(format!(
                "available position {last} is outside 0..{total_count}"
            )));
        }
    }
    Ok(sorted.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_evenly_spaced_positions() {
        assert_eq!(calculate_positions(10, 0.3, None).unwrap(), vec![0, 5, 9]);
        assert_eq!(calculate_positions(10, 0.5, None).unwrap(), vec![0, 2, 5, 7, 9]);
        assert_eq!(calculate_positions(5, 1.0, None).unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_boundary_cases() {
        assert_eq!(calculate_positions(1, 1.0, None).unwrap(), vec![0]);
        assert!(calculate_positions(100, 0.0, None).unwrap().is_empty());
        assert!(calculate_positions(0, 0.5, None).unwrap().is_empty());
        assert_eq!(calculate_positions(100, 0.01, None).unwrap(), vec![0]);
    }

    #[test]
    fn test_three_slot_table() {
        assert_eq!(calculate_positions(3, 0.67, None).unwrap(), vec![0, 1]);
        assert_eq!(calculate_positions(3, 0.34, None).unwrap(), vec![0]);
        assert_eq!(calculate_positions(3, 0.2, None).unwrap(), vec![0]);
        assert_eq!(calculate_positions(3, 0.5, None).unwrap(), vec![0, 1]);
        assert_eq!(calculate_positions(3, 0.68, None).unwrap(), vec![0, 1, 2]);

        // Plain ceiling would give 2 and 3 here
        assert_eq!(target_count(3, 0.34), 1);
        assert_eq!(target_count(3, 0.67), 2);
    }

    #[test]
    fn test_available_slots() {
        // Oversubscribed: everything available is used
        assert_eq!(
            calculate_positions(10, 0.5, Some(&[0, 1, 2][..])).unwrap(),
            vec![0, 1, 2]
        );
        assert_eq!(
            calculate_positions(10, 0.3, Some(&[2, 4, 6][..])).unwrap(),
            vec![2, 4, 6]
        );

        // Single pick takes the earliest slot
        assert_eq!(calculate_positions(5, 0.2, Some(&[1, 2, 3][..])).unwrap(), vec![1]);

        // Two picks take the first and last slot
        assert_eq!(calculate_positions(10, 0.2, Some(&[1, 3, 5][..])).unwrap(), vec![1, 5]);

        // Unsorted input with duplicates
        assert_eq!(
            calculate_positions(10, 0.3, Some(&[6, 2, 4, 2][..])).unwrap(),
            vec![2, 4, 6]
        );

        assert!(calculate_positions(10, 0.5, Some(&[][..])).unwrap().is_empty());
    }

    #[test]
    fn test_available_proportional_spread() {
        let slots: Vec<u64> = (0..20).filter(|s| s % 2 == 1).collect();
        // ceil(20 * 0.2) = 4 picks over 10 odd slots -> slot indices 0, 3, 6, 9
        assert_eq!(
            calculate_positions(20, 0.2, Some(slots.as_slice())).unwrap(),
            vec![1, 7, 13, 19]
        );
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(matches!(
            calculate_positions(10, -0.1, None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            calculate_positions(10, 1.1, None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            calculate_positions(10, f64::NAN, None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            calculate_positions(5, 0.4, Some(&[0, 5, 6][..])),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_float_product_is_snapped() {
        // 10 * 0.3 == 3.0000000000000004 in binary floating point
        assert_eq!(target_count(10, 0.3), 3);
        assert_eq!(target_count(10, 0.7), 7);
        assert_eq!(target_count(10, 0.31), 4);
        assert_eq!(target_count(1_000_000, 1e-9), 1);
    }

    #[test]
    fn test_tiny_ratio_still_gets_a_slot() {
        assert_eq!(target_count(10, 1e-16), 1);
        assert_eq!(target_count(3_000_000, 1e-300), 1);
        assert_eq!(calculate_positions(10, 1e-16, None).unwrap(), vec![0]);
        assert_eq!(calculate_positions(1, f64::MIN_POSITIVE, None).unwrap(), vec![0]);
    }

    #[test]
    fn test_spread_with_capped_target() {
        assert_eq!(spread_positions(10, 2, None), vec![0, 9]);
        assert_eq!(spread_positions(10, 0, None), Vec::<u64>::new());
        assert_eq!(spread_positions(4, 9, None), vec![0, 1, 2, 3]);
        assert_eq!(spread_positions(10, 2, Some(&[3, 4, 8][..])), vec![3, 8]);
    }

    #[test]
    fn test_random_position_invariants() {
        let mut rng = StdRng::seed_from_u64(0x7b41);

        for _ in 0..2000 {
            let total: u64 = rng.gen_range(1..500);
            let ratio: f64 = rng.gen_range(0.0..=1.0);

            let positions = calculate_positions(total, ratio, None).unwrap();
            assert_eq!(positions.len() as u64, target_count(total, ratio));
            assert!(positions.windows(2).all(|w| w[0] < w[1]), "not increasing: {positions:?}");
            assert!(positions.iter().all(|&p| p < total));

            if total != THREE_SLOTS {
                #[allow(clippy::cast_precision_loss)]
                let expected = total as f64 * ratio;
                assert!((positions.len() as f64 - expected).abs() < 1.0 + 1e-9);
                if positions.len() >= 2 {
                    assert_eq!(positions.first(), Some(&0));
                    assert_eq!(positions.last(), Some(&(total - 1)));
                }
            }
        }
    }

    #[test]
    fn test_random_available_invariants() {
        let mut rng = StdRng::seed_from_u64(0x51de);

        for _ in 0..1000 {
            let total: u64 = rng.gen_range(1..200);
            let ratio: f64 = rng.gen_range(0.0..=1.0);
            let available: Vec<u64> = (0..total).filter(|_| rng.gen_bool(0.4)).collect();

            let positions = calculate_positions(total, ratio, Some(available.as_slice())).unwrap();
            let expected_len = target_count(total, ratio).min(available.len() as u64);
            assert_eq!(positions.len() as u64, expected_len);
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
            assert!(positions.iter().all(|p| available.contains(p)));
        }
    }
}
