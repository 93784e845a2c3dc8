//! Star (proportional) track resolution.
//!
//! Both resolvers work on [`StarSlot`]s, a flat view of the star tracks of
//! one axis, so the same code serves measure (against the available size)
//! and arrange (against the final size).

use crate::span::is_zero;

/// Weights are clipped here so that sums stay finite.
const STAR_CLIP: f64 = 1e298;

/// A star track as seen by a resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct StarSlot {
    /// Index of the track in its axis
    pub(crate) index: usize,
    pub(crate) weight: f64,
    pub(crate) min: f64,
    pub(crate) max: f64,
    /// Resolved size
    pub(crate) size: f64,
    resolved: bool,
    /// Sort key or partial weight sum, depending on the phase
    scratch: f64,
}

impl StarSlot {
    pub(crate) const fn new(index: usize, weight: f64, min: f64, max: f64) -> Self {
        Self {
            index,
            weight,
            min,
            max,
            size: 0.0,
            resolved: false,
            scratch: 0.0,
        }
    }

    fn effective_max(&self) -> f64 {
        self.min.max(self.max)
    }

    fn clamp(&self, size: f64) -> f64 {
        size.min(self.max).max(self.min)
    }
}

/// Single-pass resolver in order of tightest `max / weight` first.
///
/// Each track takes its weight's share of what is left at the time it is
/// reached, so a track pinned early can skew the shares of later ones.
pub(crate) fn resolve_legacy(slots: &mut [StarSlot], taken: f64, available: f64) {
    if slots.is_empty() {
        return;
    }

    for slot in slots.iter_mut() {
        if is_zero(slot.weight) {
            slot.weight = 0.0;
            slot.scratch = 0.0;
        } else {
            slot.weight = slot.weight.min(STAR_CLIP);
            slot.scratch = slot.effective_max().min(STAR_CLIP) / slot.weight;
        }
    }
    slots.sort_by(|a, b| a.scratch.total_cmp(&b.scratch));

    let mut partial = 0.0;
    for slot in slots.iter_mut().rev() {
        partial += slot.weight;
        slot.scratch = partial;
    }

    let mut taken = taken;
    for slot in slots.iter_mut() {
        let size = if slot.weight == 0.0 {
            slot.min
        } else {
            slot.clamp((available - taken).max(0.0) * (slot.weight / slot.scratch))
        };
        slot.size = size;
        slot.resolved = true;
        taken += size;
    }
}

/// Work lists of the max-discrepancy resolver, kept between passes.
#[derive(Debug, Default)]
pub(crate) struct StarBuffers {
    min_list: Vec<Option<(usize, f64)>>,
    max_list: Vec<Option<(usize, f64)>>,
    rest: Vec<usize>,
    partials: Vec<f64>,
}

/// Resolver that pins the track whose proportional share disagrees most
/// with its min or max, then repeats with what is left.
///
/// Slots keep their order; only `size` is written.
pub(crate) fn resolve_max_discrepancy(
    slots: &mut [StarSlot],
    taken_fixed: f64,
    available: f64,
    buffers: &mut StarBuffers,
) {
    let count = slots.len();
    if count == 0 {
        return;
    }

    let scale = weight_scale(slots);
    for slot in slots.iter_mut() {
        slot.resolved = false;
        slot.scratch = scaled_weight(slot.weight, scale);
    }

    let StarBuffers {
        min_list,
        max_list,
        rest,
        partials,
    } = buffers;
    let mut unresolved = count;
    let mut taken;
    let mut reruns = 0;

    loop {
        // Phase A: constraint lists for the unresolved tracks.
        taken = taken_fixed;
        let mut total_weight = 0.0;
        min_list.clear();
        max_list.clear();
        for (i, slot) in slots.iter().enumerate() {
            if slot.resolved {
                taken += slot.size;
                continue;
            }
            let weight = slot.scratch;
            total_weight += weight;
            if slot.min > 0.0 {
                min_list.push(Some((i, weight / slot.min)));
            }
            let effective_max = slot.effective_max();
            if effective_max.is_finite() {
                max_list.push(Some((i, weight / effective_max)));
            }
        }
        // Tightest constraint sits at the end of each list.
        min_list.sort_by(|a, b| ratio(*b).total_cmp(&ratio(*a)));
        max_list.sort_by(|a, b| ratio(*a).total_cmp(&ratio(*b)));

        // Phase B: pin tracks while a constraint conflicts with the proportion.
        let min_initial = min_list.len();
        let max_initial = max_list.len();
        let mut min_len = min_initial;
        let mut max_len = max_initial;
        let mut remaining_weight = total_weight;

        while min_len > 0 || max_len > 0 {
            if remaining_weight < total_weight / 256.0 {
                // Precision guard: start the running sum over.
                remaining_weight = slots
                    .iter()
                    .filter(|slot| !slot.resolved)
                    .map(|slot| slot.scratch)
                    .sum();
                total_weight = remaining_weight;
            }

            let min_ratio = top(min_list, min_len).map_or(f64::INFINITY, |(_, r)| r);
            let max_ratio = top(max_list, max_len).map_or(-1.0, |(_, r)| r);
            let proportion = remaining_weight / (available - taken).max(0.0);

            let Some(pin_min) = choose_min(min_ratio, max_ratio, proportion) else {
                break;
            };

            let (index, size) = if pin_min {
                min_len -= 1;
                let (index, _) = entry(min_list, min_len);
                (index, slots[index].min)
            } else {
                max_len -= 1;
                let (index, _) = entry(max_list, max_len);
                (index, slots[index].effective_max())
            };

            let slot = &mut slots[index];
            slot.size = size;
            slot.resolved = true;
            unresolved -= 1;
            taken += size;
            remaining_weight -= slot.scratch;

            pop_resolved(min_list, &mut min_len, slots);
            pop_resolved(max_list, &mut max_len, slots);
        }

        // Pinned tracks may be reconsidered once the pool has changed.
        let mut reopened = 0;
        if unresolved == 0 && taken < available {
            reopened += reopen(&min_list[min_len..min_initial], slots);
        }
        if taken > available {
            reopened += reopen(&max_list[max_len..max_initial], slots);
        }
        unresolved += reopened;
        if reopened == 0 || reruns >= count {
            break;
        }
        reruns += 1;
    }

    // Phase C: the unconstrained rest, heaviest first.
    if unresolved > 0 {
        rest.clear();
        rest.extend((0..count).filter(|&i| !slots[i].resolved));
        rest.sort_by(|&a, &b| slots[a].scratch.total_cmp(&slots[b].scratch));

        partials.clear();
        let mut partial = 0.0;
        for &i in rest.iter() {
            partial += slots[i].scratch;
            partials.push(partial);
        }

        for (&i, &partial) in rest.iter().zip(partials.iter()).rev() {
            let slot = &mut slots[i];
            let weight = slot.scratch;
            let size = if weight > 0.0 {
                (available - taken).max(0.0) * (weight / partial)
            } else {
                0.0
            };
            slot.size = slot.clamp(size);
            slot.resolved = true;
            taken += slot.size;
        }
    }
}

/// Factor keeping the weight sum finite; `-1` means infinite weights split
/// everything equally and finite weights get nothing.
fn weight_scale(slots: &[StarSlot]) -> f64 {
    let mut max_weight = 0.0_f64;
    for slot in slots {
        if slot.weight.is_infinite() {
            return -1.0;
        }
        max_weight = max_weight.max(slot.weight);
    }
    if max_weight > 0.0 {
        let power = (f64::MAX / max_weight / slots.len() as f64).log2().floor();
        if power < 0.0 {
            return 2.0_f64.powf(power - 4.0);
        }
    }
    1.0
}

fn scaled_weight(weight: f64, scale: f64) -> f64 {
    if scale < 0.0 {
        if weight.is_infinite() {
            1.0
        } else {
            0.0
        }
    } else {
        weight * scale
    }
}

/// Which constraint to pin next: `Some(true)` for the min list, `Some(false)`
/// for the max list, `None` when neither conflicts with `proportion`.
fn choose_min(min_ratio: f64, max_ratio: f64, proportion: f64) -> Option<bool> {
    if min_ratio < proportion {
        if max_ratio > proportion {
            if min_ratio == 0.0 {
                return Some(true);
            }
            if max_ratio.is_infinite() {
                return Some(false);
            }
            // proportion^2 > min * max, scaled by a power of two near the
            // geometric mean so neither side overflows.
            let min_power = min_ratio.log2().floor();
            let max_power = max_ratio.log2().floor();
            let f = 2.0_f64.powf(((min_power + max_power) / 2.0).floor());
            Some((proportion / f) * (proportion / f) > (min_ratio / f) * (max_ratio / f))
        } else {
            Some(true)
        }
    } else if max_ratio > proportion {
        Some(false)
    } else {
        None
    }
}

fn ratio(entry: Option<(usize, f64)>) -> f64 {
    entry.map_or(0.0, |(_, r)| r)
}

fn top(list: &[Option<(usize, f64)>], len: usize) -> Option<(usize, f64)> {
    len.checked_sub(1).and_then(|i| list[i])
}

fn entry(list: &[Option<(usize, f64)>], at: usize) -> (usize, f64) {
    // Entries below the live length are never cleared.
    list[at].unwrap_or((0, 0.0))
}

fn pop_resolved(list: &mut [Option<(usize, f64)>], len: &mut usize, slots: &[StarSlot]) {
    while *len > 0 {
        match list[*len - 1] {
            Some((index, _)) if slots[index].resolved => {
                list[*len - 1] = None;
                *len -= 1;
            }
            _ => break,
        }
    }
}

fn reopen(pinned: &[Option<(usize, f64)>], slots: &mut [StarSlot]) -> usize {
    let mut reopened = 0;
    for &(index, _) in pinned.iter().flatten() {
        if slots[index].resolved {
            slots[index].resolved = false;
            reopened += 1;
        }
    }
    reopened
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn max_discrepancy(slots: &mut [StarSlot], taken: f64, available: f64) {
        resolve_max_discrepancy(slots, taken, available, &mut StarBuffers::default());
    }

    fn slot(index: usize, weight: f64) -> StarSlot {
        StarSlot::new(index, weight, 0.0, f64::INFINITY)
    }

    fn sizes_by_index(slots: &[StarSlot]) -> Vec<f64> {
        let mut sorted = slots.to_vec();
        sorted.sort_by_key(|s| s.index);
        sorted.iter().map(|s| s.size).collect()
    }

    fn approx(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    // =========================================================================
    // Proportional Split Tests
    // =========================================================================

    #[test]
    fn test_one_and_two_star() {
        for resolve in [resolve_legacy, max_discrepancy] {
            let mut slots = [slot(0, 1.0), slot(1, 2.0)];
            resolve(&mut slots, 0.0, 300.0);
            assert!(approx(&sizes_by_index(&slots), &[100.0, 200.0]));
        }
    }

    #[test]
    fn test_taken_space_is_excluded() {
        for resolve in [resolve_legacy, max_discrepancy] {
            let mut slots = [slot(0, 1.0), slot(1, 1.0)];
            resolve(&mut slots, 40.0, 240.0);
            assert!(approx(&sizes_by_index(&slots), &[100.0, 100.0]));
        }
    }

    #[test]
    fn test_empty_is_noop() {
        resolve_legacy(&mut [], 0.0, 10.0);
        max_discrepancy(&mut [], 0.0, 10.0);
    }

    // =========================================================================
    // Constraint Tests
    // =========================================================================

    #[test]
    fn test_max_discrepancy_pins_min() {
        let mut slots = [StarSlot::new(0, 1.0, 80.0, f64::INFINITY), slot(1, 3.0)];
        max_discrepancy(&mut slots, 0.0, 100.0);
        assert!(approx(&sizes_by_index(&slots), &[80.0, 20.0]));
    }

    #[test]
    fn test_legacy_gives_unconstrained_share_first() {
        let mut slots = [StarSlot::new(0, 1.0, 80.0, f64::INFINITY), slot(1, 3.0)];
        resolve_legacy(&mut slots, 0.0, 100.0);
        assert!(approx(&sizes_by_index(&slots), &[80.0, 75.0]));
    }

    #[test]
    fn test_max_pins_and_rest_gets_remainder() {
        for resolve in [resolve_legacy, max_discrepancy] {
            let mut slots = [StarSlot::new(0, 1.0, 0.0, 50.0), slot(1, 1.0)];
            resolve(&mut slots, 0.0, 300.0);
            assert!(approx(&sizes_by_index(&slots), &[50.0, 250.0]));
        }
    }

    #[test]
    fn test_zero_weight_gets_min() {
        for resolve in [resolve_legacy, max_discrepancy] {
            let mut slots = [StarSlot::new(0, 0.0, 15.0, f64::INFINITY), slot(1, 1.0)];
            resolve(&mut slots, 0.0, 100.0);
            let sizes = sizes_by_index(&slots);
            assert_eq!(sizes[0], 15.0);
            assert!((sizes[1] - 85.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_infinite_weight_takes_everything() {
        let mut slots = [slot(0, f64::INFINITY), slot(1, 1.0), slot(2, f64::INFINITY)];
        max_discrepancy(&mut slots, 0.0, 90.0);
        assert!(approx(&sizes_by_index(&slots), &[45.0, 0.0, 45.0]));
    }

    #[test]
    fn test_no_space_left_gives_mins() {
        for resolve in [resolve_legacy, max_discrepancy] {
            let mut slots = [
                StarSlot::new(0, 1.0, 10.0, f64::INFINITY),
                StarSlot::new(1, 2.0, 5.0, f64::INFINITY),
            ];
            resolve(&mut slots, 400.0, 300.0);
            assert!(approx(&sizes_by_index(&slots), &[10.0, 5.0]));
        }
    }

    #[test]
    fn test_min_pinned_track_reopened_when_space_remains() {
        // The min pins first, then the heavy track hits its max and leaves
        // 10 unclaimed, which the min-pinned track takes on the second round.
        let mut slots = [
            StarSlot::new(0, 1.0, 60.0, f64::INFINITY),
            StarSlot::new(1, 100.0, 0.0, 30.0),
        ];
        max_discrepancy(&mut slots, 0.0, 100.0);
        assert!(approx(&sizes_by_index(&slots), &[70.0, 30.0]));
    }

    #[test]
    fn test_all_pinned_to_max_leaves_space() {
        let mut slots = [
            StarSlot::new(0, 1.0, 30.0, 40.0),
            StarSlot::new(1, 1.0, 0.0, 10.0),
        ];
        max_discrepancy(&mut slots, 0.0, 200.0);
        assert!(approx(&sizes_by_index(&slots), &[40.0, 10.0]));
    }

    #[test]
    fn test_huge_weights_do_not_overflow() {
        let mut slots = [slot(0, 1e300), slot(1, 1e300), slot(2, 2e300)];
        max_discrepancy(&mut slots, 0.0, 400.0);
        assert!(approx(&sizes_by_index(&slots), &[100.0, 100.0, 200.0]));
    }

    #[test]
    fn test_dominant_weight_pinned_then_rest_split() {
        // Pinning the heavy track leaves under 1/256 of the weight live, so
        // the sums restart before the next max is pinned.
        let mut slots = [
            StarSlot::new(0, 1000.0, 0.0, 10.0),
            StarSlot::new(1, 1.0, 0.0, 5.0),
            slot(2, 1.0),
        ];
        max_discrepancy(&mut slots, 0.0, 110.0);
        assert!(approx(&sizes_by_index(&slots), &[10.0, 5.0, 95.0]));
    }

    #[test]
    fn test_buffers_reused_across_calls() {
        let mut buffers = StarBuffers::default();
        let mut first = [
            StarSlot::new(0, 1.0, 80.0, f64::INFINITY),
            slot(1, 3.0),
            slot(2, 1.0),
        ];
        resolve_max_discrepancy(&mut first, 0.0, 100.0, &mut buffers);
        assert!(approx(&sizes_by_index(&first), &[80.0, 15.0, 5.0]));

        let mut second = [slot(0, 1.0), slot(1, 2.0)];
        resolve_max_discrepancy(&mut second, 0.0, 300.0, &mut buffers);
        assert!(approx(&sizes_by_index(&second), &[100.0, 200.0]));
    }

    // =========================================================================
    // Choice Tests
    // =========================================================================

    #[test]
    fn test_choose_min_cases() {
        assert_eq!(choose_min(0.5, -1.0, 1.0), Some(true));
        assert_eq!(choose_min(f64::INFINITY, 2.0, 1.0), Some(false));
        assert_eq!(choose_min(2.0, 0.5, 1.0), None);
        // min discrepancy 1/0.25 = 4 beats max discrepancy 2
        assert_eq!(choose_min(0.25, 2.0, 1.0), Some(true));
        // max discrepancy 8 beats min discrepancy 2
        assert_eq!(choose_min(0.5, 8.0, 1.0), Some(false));
        assert_eq!(choose_min(0.0, 8.0, 1.0), Some(true));
    }

    #[test]
    fn test_weight_scale() {
        assert_eq!(weight_scale(&[slot(0, 1.0), slot(1, 5.0)]), 1.0);
        assert_eq!(weight_scale(&[slot(0, f64::INFINITY)]), -1.0);
        assert!(weight_scale(&[slot(0, f64::MAX), slot(1, f64::MAX)]) < 1.0);
    }

    proptest! {
        #[test]
        fn prop_resolvers_agree_without_constraints(
            weights in proptest::collection::vec(0.1f64..10.0, 1..6),
            available in 0.0f64..2000.0,
        ) {
            let mut legacy: Vec<_> = weights.iter().enumerate().map(|(i, &w)| slot(i, w)).collect();
            let mut md = legacy.clone();
            resolve_legacy(&mut legacy, 0.0, available);
            max_discrepancy(&mut md, 0.0, available);
            let a = sizes_by_index(&legacy);
            let b = sizes_by_index(&md);
            for (x, y) in a.iter().zip(&b) {
                prop_assert!((x - y).abs() < 1e-6);
            }
            let total: f64 = b.iter().sum();
            prop_assert!((total - available).abs() < 1e-6);
        }

        #[test]
        fn prop_max_discrepancy_respects_bounds(
            tracks in proptest::collection::vec((0.0f64..10.0, 0.0f64..100.0, 0.0f64..300.0), 1..6),
            available in 0.0f64..1000.0,
        ) {
            let mut slots: Vec<_> = tracks
                .iter()
                .enumerate()
                .map(|(i, &(w, min, max))| StarSlot::new(i, w, min, max))
                .collect();
            max_discrepancy(&mut slots, 0.0, available);
            for s in &slots {
                prop_assert!(s.size >= s.min - 1e-9);
                prop_assert!(s.size <= s.min.max(s.max) + 1e-9);
            }
        }
    }
}
