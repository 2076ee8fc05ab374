//! Pairwise path conflict test.
//!
//! Two paths conflict when, at some shared step index, their positions are
//! closer than the safety distance.  The shorter path is held at its last
//! position for the remaining steps, so an agent that has already arrived
//! still counts as an obstacle.

use fleet_core::Vec2;

/// Position of `path` at `step`, clamped to the last point.  `None` only for
/// an empty path.
#[inline]
pub fn position_at_step(path: &[Vec2], step: usize) -> Option<Vec2> {
    path.get(step).or_else(|| path.last()).copied()
}

/// First step at which `a` and `b` come closer than `safe_distance`.
pub fn first_conflict(a: &[Vec2], b: &[Vec2], safe_distance: f64) -> Option<usize> {
    let steps = a.len().max(b.len());
    (0..steps).find(|&t| match (position_at_step(a, t), position_at_step(b, t)) {
        (Some(pa), Some(pb)) => pa.distance(pb) < safe_distance,
        _ => false,
    })
}

/// `true` when the two paths conflict at any step.
#[inline]
pub fn paths_conflict(a: &[Vec2], b: &[Vec2], safe_distance: f64) -> bool {
    first_conflict(a, b, safe_distance).is_some()
}
