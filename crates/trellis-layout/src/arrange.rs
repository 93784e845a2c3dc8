//! The arrange pass: final track sizes, pixel rounding, and offsets.

use crate::definition::Track;
use crate::grid::Scratch;
use crate::length::GridLength;
use crate::options::StarAlgorithm;
use crate::span::are_close;
use crate::star::{resolve_legacy, resolve_max_discrepancy, StarSlot};
use tracing::trace;
use trellis_core::round_layout_value;

/// Rounding settings for one axis.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Rounding {
    pub(crate) dpi: f64,
}

/// Distribute `final_size` over the tracks of one axis and lay out offsets.
///
/// Returns the sum of the final track sizes.
pub(crate) fn set_final_size(
    tracks: &mut [Track],
    final_size: f64,
    algorithm: StarAlgorithm,
    rounding: Option<Rounding>,
    scratch: &mut Scratch,
) -> f64 {
    let slots = &mut scratch.slots;
    slots.clear();
    let mut taken = 0.0;
    for (index, track) in tracks.iter_mut().enumerate() {
        let min = track.min_size();
        match track.size {
            GridLength::Star(weight) => {
                slots.push(StarSlot::new(index, weight, min, track.user_max));
            }
            size => {
                let user_size = match size {
                    GridLength::Fixed(value) => value,
                    _ => min,
                };
                // Shared tracks never grow past what their content asked for.
                let user_max = if track.is_shared() { user_size } else { track.user_max };
                track.final_size = min.max(user_size.min(user_max));
                taken += track.final_size;
            }
        }
    }

    match algorithm {
        StarAlgorithm::MaxDiscrepancy => {
            resolve_max_discrepancy(slots, taken, final_size, &mut scratch.star);
        }
        StarAlgorithm::Legacy => resolve_legacy(slots, taken, final_size),
    }
    for slot in slots.iter() {
        tracks[slot.index].final_size = slot.size;
    }

    if algorithm == StarAlgorithm::Legacy {
        shrink_by_headroom(tracks, final_size, &mut scratch.order);
    }

    if let Some(rounding) = rounding {
        let increment = match algorithm {
            StarAlgorithm::MaxDiscrepancy => 1.0 / rounding.dpi,
            StarAlgorithm::Legacy => round_layout_value(1.0, rounding.dpi),
        };
        round_and_nudge(tracks, final_size, rounding.dpi, increment, scratch);
    }

    let total = set_offsets(tracks);
    trace!(final_size, total, tracks = tracks.len(), "arranged tracks");
    total
}

/// When the tracks overflow `final_size`, take the excess back, starting
/// with the tracks that have the least room above their minimum.
fn shrink_by_headroom(tracks: &mut [Track], final_size: f64, order: &mut Vec<usize>) {
    let allocated: f64 = tracks.iter().map(|t| t.final_size).sum();
    if allocated <= final_size || are_close(allocated, final_size) {
        return;
    }

    order.clear();
    order.extend(0..tracks.len());
    order.sort_by(|&a, &b| headroom(&tracks[a]).total_cmp(&headroom(&tracks[b])));

    let count = tracks.len();
    let mut to_distribute = final_size - allocated;
    for (i, &index) in order.iter().enumerate() {
        let track = &mut tracks[index];
        let size = (track.final_size + to_distribute / (count - i) as f64)
            .max(track.min_size())
            .min(track.final_size);
        to_distribute -= size - track.final_size;
        track.final_size = size;
    }
}

fn headroom(track: &Track) -> f64 {
    track.final_size - track.min_size()
}

/// Snap every track to the device-pixel grid, then move single pixels
/// between tracks until the rounded sizes add up to the rounded total.
///
/// Tracks rounded up the most give up pixels first; tracks rounded down
/// the most receive them first. Only whole increments move, and never past
/// a track's min or max.
fn round_and_nudge(
    tracks: &mut [Track],
    final_size: f64,
    dpi: f64,
    increment: f64,
    scratch: &mut Scratch,
) {
    let errors = &mut scratch.errors;
    errors.clear();
    let mut rounded_total = 0.0;
    for track in tracks.iter_mut() {
        let rounded = round_layout_value(track.final_size, dpi);
        errors.push(rounded - track.final_size);
        track.final_size = rounded;
        rounded_total += rounded;
    }

    if are_close(rounded_total, final_size) {
        return;
    }

    let order = &mut scratch.order;
    order.clear();
    order.extend(0..tracks.len());
    order.sort_by(|&a, &b| errors[a].total_cmp(&errors[b]));

    let mut adjusted = rounded_total;
    if rounded_total > final_size {
        for &index in order.iter().rev() {
            if adjusted <= final_size || are_close(adjusted, final_size) {
                break;
            }
            let track = &mut tracks[index];
            let size = track.final_size - increment;
            let min = track.min_size();
            if size >= min || are_close(size, min) {
                adjusted -= increment;
                track.final_size = size;
            }
        }
    } else {
        for &index in order.iter() {
            if adjusted >= final_size || are_close(adjusted, final_size) {
                break;
            }
            let track = &mut tracks[index];
            let limit = track.user_max.max(track.min_size());
            let size = track.final_size + increment;
            if size <= limit || are_close(size, limit) {
                adjusted += increment;
                track.final_size = size;
            }
        }
    }
}

/// Offsets are prefix sums of the final sizes, starting at zero.
fn set_offsets(tracks: &mut [Track]) -> f64 {
    let mut offset = 0.0;
    for track in tracks.iter_mut() {
        track.offset = offset;
        offset += track.final_size;
    }
    offset
}
