//! Match predicates between an object of an older frame and one of a newer frame.

use crate::tracker::object::TrackedObject;
use crate::tracker::track::TrackArena;

/// Match on movement: both objects need a defined speed and the speeds must
/// differ by less than `momentum_scale`.
pub fn momentum_match(
    a: &TrackedObject,
    b: &TrackedObject,
    arena: &TrackArena,
    momentum_scale: f64,
) -> bool {
    match (a.speed(arena), b.speed(arena)) {
        (Some(speed_a), Some(speed_b)) => (speed_a - speed_b).abs() < momentum_scale,
        _ => false,
    }
}

/// Match on location: overlap must be strictly above `iou_threshold`.
/// Degenerate boxes never match.
pub fn location_match(a: &TrackedObject, b: &TrackedObject, iou_threshold: f64) -> bool {
    a.coords
        .iou(&b.coords)
        .is_some_and(|iou| exceeds_threshold(iou, iou_threshold))
}

#[inline]
pub(crate) fn exceeds_threshold(iou: f64, iou_threshold: f64) -> bool {
    iou > iou_threshold
}
