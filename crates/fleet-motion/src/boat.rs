//! One boat's kinematic and footprint state.

use fleet_core::{AgentId, Destination, FootprintConfig, Heading, Vec2, Waypoint};
use fleet_grid::{Footprint, Lookahead, Sweep};

use crate::MotionState;

/// A single agent.
///
/// Every field is owned by the boat; the grid and the planner only see it
/// through [`Boat::footprint`], [`Boat::sweep`] and plan requests built by
/// the engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Boat {
    pub id:          AgentId,
    pub pos:         Vec2,
    /// Compass heading in degrees, see [`fleet_core::geo`].
    pub heading:     f64,
    /// Displacement applied this tick.
    pub velocity:    Vec2,
    /// Cruise speed in world units per tick.
    pub base_speed:  f64,
    /// Magnitude of `velocity`.
    pub speed:       f64,
    pub semi_major:  f64,
    pub semi_minor:  f64,
    /// Throttle factor in `[0, 1]`.
    pub spadjust:    f64,
    pub destination: Option<Destination>,
    /// Destination sent with the boat's last plan request.  A plan is only
    /// installed while this still equals `destination`.
    pub plan_goal:   Option<Destination>,
    pub path:        Vec<Waypoint>,
    /// Index of the waypoint currently steered toward.
    pub cursor:      usize,
    pub state:       MotionState,
    /// Most recent prediction, kept for observers.
    #[cfg_attr(feature = "serde", serde(skip, default = "clear"))]
    pub lookahead:   Lookahead,
}

#[cfg(feature = "serde")]
fn clear() -> Lookahead {
    Lookahead::Clear
}

impl Boat {
    /// An idle boat at `pos` with the resting (minimum) footprint.
    pub fn new(id: AgentId, pos: Vec2, base_speed: f64, footprint: &FootprintConfig) -> Self {
        Self {
            id,
            pos,
            heading:     0.0,
            velocity:    Vec2::ZERO,
            base_speed,
            speed:       0.0,
            semi_major:  footprint.min_semi_major,
            semi_minor:  footprint.min_semi_minor,
            spadjust:    1.0,
            destination: None,
            plan_goal:   None,
            path:        Vec::new(),
            cursor:      0,
            state:       MotionState::Idle,
            lookahead:   Lookahead::Clear,
        }
    }

    /// The safety envelope painted into the grid, with the boat at the
    /// trailing focus.
    #[inline]
    pub fn footprint(&self) -> Footprint {
        Footprint {
            agent:      self.id,
            focus:      self.pos,
            heading:    self.heading,
            semi_major: self.semi_major,
            semi_minor: self.semi_minor,
        }
    }

    /// Predictor input.  Uses the velocity applied last tick.
    #[inline]
    pub fn sweep(&self) -> Sweep {
        Sweep {
            agent:      self.id,
            pos:        self.pos,
            velocity:   self.velocity,
            semi_major: self.semi_major,
        }
    }

    /// Waypoint currently steered toward, if any.
    #[inline]
    pub fn current_waypoint(&self) -> Option<&Waypoint> {
        self.path.get(self.cursor)
    }

    /// Distance to the destination, or `None` without one.
    #[inline]
    pub fn distance_to_destination(&self) -> Option<f64> {
        self.destination.map(|d| self.pos.distance(d.point()))
    }

    /// Apply `velocity` for one tick, turning the bow along it.  A zero
    /// velocity keeps the previous heading.
    pub fn advance(&mut self, velocity: Vec2) {
        self.velocity = velocity;
        self.speed = velocity.length();
        self.pos += velocity;
        if let Some(h) = velocity.heading() {
            self.heading = h;
        }
    }

    /// Stop in place.
    #[inline]
    pub fn hold(&mut self) {
        self.velocity = Vec2::ZERO;
        self.speed = 0.0;
    }

    /// Shrink the footprint to its resting shape.
    #[inline]
    pub fn rest_footprint(&mut self, footprint: &FootprintConfig) {
        self.semi_major = footprint.min_semi_major;
        self.semi_minor = footprint.min_semi_minor;
    }

    /// Drop any assigned path, and with it the claim on any plan still in
    /// flight.
    #[inline]
    pub fn clear_path(&mut self) {
        self.path.clear();
        self.cursor = 0;
        self.plan_goal = None;
    }
}
