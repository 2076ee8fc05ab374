//! The moving target the fleet converges on.

use fleet_core::{Destination, TargetConfig, Vec2};
use fleet_grid::Circle;

/// The one non-agent obstacle.  Its defended zone
/// ([`TargetConfig::keep_out_radius`]) is painted into the grid every tick and
/// blocked for every plan.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Target {
    pos:       Destination,
    /// Displacement applied every tick.  Zero for a stationary target.
    pub drift: Vec2,
    pub zone:  TargetConfig,
}

impl Target {
    pub fn new(at: Destination, config: &TargetConfig) -> Self {
        Self { pos: at, drift: Vec2::ZERO, zone: *config }
    }

    pub fn with_drift(mut self, drift: Vec2) -> Self {
        self.drift = drift;
        self
    }

    #[inline]
    pub fn position(&self) -> Destination {
        self.pos
    }

    #[inline]
    pub fn point(&self) -> Vec2 {
        self.pos.point()
    }

    #[inline]
    pub fn move_to(&mut self, to: Destination) {
        self.pos = to;
    }

    /// Apply one tick of drift.  A step that would leave finite space is
    /// ignored.
    pub fn drift_once(&mut self) {
        if let Ok(next) = Destination::try_from(self.pos.point() + self.drift) {
            self.pos = next;
        }
    }

    /// The defended zone.
    #[inline]
    pub fn keep_out(&self) -> Circle {
        Circle::new(self.point(), self.zone.keep_out_radius())
    }
}
