//! Short-range collision prediction.
//!
//! The predictor casts a segment ahead of a moving agent, from
//! `near × semi_major` to `far × semi_major` along its velocity, and walks it
//! at grid resolution:
//!
//! ```text
//! steps   = floor(len / cell_size) + 1
//! samples = steps + 1   (both ends included)
//! ```
//!
//! The first sample that lands in a cell painted by another agent is the
//! obstacle.  The agent's own cells and the target's zone never count.

use fleet_core::{AgentId, ThrottleConfig, Vec2};

use crate::grid::{CellState, FootprintGrid, Owner};

/// Result of one lookahead cast.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Lookahead {
    /// The whole segment is free.
    Clear,
    /// The cast left the grid before finding anything.
    OffGrid,
    /// Another agent's cell was hit; `distance` is from the agent's position
    /// to the offending sample.
    Obstacle { distance: f64, owner: Owner },
}

impl Lookahead {
    /// Distance to the predicted obstacle, if any.
    #[inline]
    pub fn distance(&self) -> Option<f64> {
        match *self {
            Lookahead::Obstacle { distance, .. } => Some(distance),
            _ => None,
        }
    }

    #[inline]
    pub fn is_obstacle(&self) -> bool {
        matches!(self, Lookahead::Obstacle { .. })
    }
}

/// What the predictor needs to know about one agent.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sweep {
    pub agent:      AgentId,
    pub pos:        Vec2,
    pub velocity:   Vec2,
    pub semi_major: f64,
}

/// Stateless ray-caster.  `Copy + Sync`, so one instance is shared by every
/// agent (and every rayon worker) in a tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollisionPredictor {
    near: f64,
    far:  f64,
}

impl Default for CollisionPredictor {
    fn default() -> Self {
        Self::from_config(&ThrottleConfig::default())
    }
}

impl CollisionPredictor {
    pub fn new(near: f64, far: f64) -> Self {
        Self { near, far }
    }

    pub fn from_config(cfg: &ThrottleConfig) -> Self {
        Self::new(cfg.lookahead_near, cfg.lookahead_far)
    }

    /// Cast ahead of `sweep` through `grid`.  A zero or non-finite velocity
    /// yields `Clear`.
    pub fn predict(&self, sweep: &Sweep, grid: &FootprintGrid) -> Lookahead {
        let dir = sweep.velocity.normalize_or_zero();
        if dir == Vec2::ZERO || !dir.is_finite() {
            return Lookahead::Clear;
        }

        let start = sweep.pos + dir * (self.near * sweep.semi_major);
        let end = sweep.pos + dir * (self.far * sweep.semi_major);
        let span = end - start;
        let steps = (span.length() / grid.cell_size()).floor() as usize + 1;

        for i in 0..=steps {
            let sample = start + span * (i as f64 / steps as f64);
            match grid.state_at(sample) {
                None => return Lookahead::OffGrid,
                Some(CellState::Agent(id)) if id != sweep.agent => {
                    return Lookahead::Obstacle {
                        distance: sweep.pos.distance(sample),
                        owner:    Owner::Agent(id),
                    };
                }
                Some(_) => {}
            }
        }
        Lookahead::Clear
    }
}
