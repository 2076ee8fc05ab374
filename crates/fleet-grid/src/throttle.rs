//! Throttle feedback.
//!
//! Each agent carries a throttle factor `spadjust ∈ [0, 1]`.  Every tick the
//! factor moves one `rate` step toward 0 when an obstacle is predicted and
//! one step toward 1 otherwise.  The factor then scales both the velocity
//! magnitude and the footprint axes, so a slowing boat also claims less
//! space.

use fleet_core::{FootprintConfig, ThrottleConfig, Vec2};

use crate::grid::clamp_axes;
use crate::predict::Lookahead;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpeedAdjuster {
    rate: f64,
}

impl Default for SpeedAdjuster {
    fn default() -> Self {
        Self::from_config(&ThrottleConfig::default())
    }
}

impl SpeedAdjuster {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    pub fn from_config(cfg: &ThrottleConfig) -> Self {
        Self::new(cfg.rate)
    }

    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Next throttle factor.  `OffGrid` counts as clear.
    pub fn update(&self, spadjust: f64, lookahead: &Lookahead) -> f64 {
        let current = if spadjust.is_finite() { spadjust } else { 0.0 };
        let next = if lookahead.is_obstacle() {
            current - self.rate
        } else {
            current + self.rate
        };
        next.clamp(0.0, 1.0)
    }

    /// `desired` with its magnitude scaled by `spadjust`.
    #[inline]
    pub fn scale_velocity(&self, desired: Vec2, spadjust: f64) -> Vec2 {
        desired * spadjust
    }

    /// Footprint axes at throttle `spadjust`, floored at the minimum shape.
    pub fn scale_footprint(&self, footprint: &FootprintConfig, spadjust: f64) -> (f64, f64) {
        clamp_axes(
            footprint.semi_major * spadjust,
            footprint.semi_minor * spadjust,
            footprint.min_semi_major,
            footprint.min_semi_minor,
        )
    }
}
