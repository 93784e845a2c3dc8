//! Spreading a spanning cell's desired size across the tracks it covers.

use crate::definition::{Axis, Track};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Identifies a run of tracks covered by at least one spanning cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct SpanKey {
    pub(crate) axis: Axis,
    pub(crate) start: usize,
    pub(crate) count: usize,
}

/// Largest size requested per span during one group measurement.
#[derive(Debug, Default)]
pub(crate) struct SpanRequests(BTreeMap<SpanKey, f64>);

impl SpanRequests {
    pub(crate) fn register(&mut self, key: SpanKey, requested: f64) {
        self.0
            .entry(key)
            .and_modify(|size| *size = size.max(requested))
            .or_insert(requested);
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (SpanKey, f64)> + '_ {
        std::mem::take(&mut self.0).into_iter()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, key: &SpanKey) -> Option<f64> {
        self.0.get(key).copied()
    }
}

/// Raise the min sizes of `tracks[start..start + count]` so that together
/// they can hold `requested`.
///
/// Preferred sizes are filled before max sizes, auto tracks are grown last,
/// and past the sum of max sizes every track grows toward an equal share.
pub(crate) fn ensure_min_size_in_range(
    tracks: &mut [Track],
    start: usize,
    count: usize,
    requested: f64,
    order: &mut Vec<usize>,
) {
    debug_assert!(count > 1 && start + count <= tracks.len());
    if is_zero(requested) {
        return;
    }

    let mut range_min = 0.0;
    let mut range_preferred = 0.0;
    let mut range_max = 0.0;
    let mut max_max = 0.0_f64;
    let mut auto_count = 0;

    order.clear();
    for index in start..start + count {
        let track = &mut tracks[index];
        let min = track.min_size();
        let max = track.user_max.max(min);
        range_min += min;
        range_preferred += track.preferred_size();
        range_max += max;
        track.size_cache = max;
        max_max = max_max.max(max);
        if track.size.is_auto() {
            auto_count += 1;
        }
        order.push(index);
    }

    if requested <= range_min {
        return;
    }

    if requested <= range_preferred {
        order.sort_by(|&a, &b| preferred_order(&tracks[a], &tracks[b]));

        let mut to_distribute = requested;
        for &index in &order[..auto_count] {
            to_distribute -= tracks[index].min_size();
        }
        for (i, &index) in order.iter().enumerate().skip(auto_count) {
            let track = &mut tracks[index];
            let new_min = (to_distribute / (count - i) as f64).min(track.preferred_size());
            if new_min > track.min_size() {
                track.update_min(new_min);
            }
            to_distribute -= new_min;
        }
    } else if requested <= range_max {
        order.sort_by(|&a, &b| max_order(&tracks[a], &tracks[b]));

        let non_auto = count - auto_count;
        let mut to_distribute = requested - range_preferred;
        for (i, &index) in order.iter().enumerate() {
            let track = &mut tracks[index];
            let (base, remaining) = if i < non_auto {
                (track.preferred_size(), non_auto - i)
            } else {
                (track.min_size(), count - i)
            };
            let new_min = base + to_distribute / remaining as f64;
            track.update_min(new_min.min(track.size_cache));
            to_distribute -= track.min_size() - base;
        }
    } else {
        let equal = requested / count as f64;
        if equal < max_max && !are_close(equal, max_max) {
            let total_remaining = max_max * count as f64 - range_max;
            let to_distribute = requested - range_max;
            for &index in order.iter() {
                let track = &mut tracks[index];
                let delta = (max_max - track.size_cache) * to_distribute / total_remaining;
                track.update_min(track.size_cache + delta);
            }
        } else {
            for &index in order.iter() {
                tracks[index].update_min(equal);
            }
        }
    }
}

/// Auto tracks first by min size, then the rest by preferred size.
fn preferred_order(a: &Track, b: &Track) -> Ordering {
    match (a.size.is_auto(), b.size.is_auto()) {
        (true, true) => a.min_size().total_cmp(&b.min_size()),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.preferred_size().total_cmp(&b.preferred_size()),
    }
}

/// Non-auto tracks first, each part by effective max size.
fn max_order(a: &Track, b: &Track) -> Ordering {
    match (a.size.is_auto(), b.size.is_auto()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => a.size_cache.total_cmp(&b.size_cache),
    }
}

const EPSILON: f64 = 1e-5;

pub(crate) fn is_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// Fixed-epsilon comparison used inside the solver.
pub(crate) fn are_close(a: f64, b: f64) -> bool {
    is_zero(a - b)
}
