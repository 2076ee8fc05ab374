//! Per-simulation configuration.
//!
//! `FleetConfig` is the single configuration object threaded through every
//! subsystem; there is no module-level mutable state anywhere in the engine.
//! Each section has `Default` values tuned for a 1200 × 800 world with boats
//! moving a few units per tick.
//!
//! With the `serde` feature every section is `#[serde(default)]`, so a TOML
//! file only needs to name the keys it overrides:
//!
//! ```toml
//! [throttle]
//! rate = 0.02
//!
//! [planner]
//! smoothing = { method = "spline", factor = 0.5 }
//! ```

use crate::{CoreError, CoreResult};

// ── Top level ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FleetConfig {
    pub world:     WorldConfig,
    pub footprint: FootprintConfig,
    pub throttle:  ThrottleConfig,
    pub motion:    MotionConfig,
    pub target:    TargetConfig,
    pub planner:   PlannerConfig,
    pub sim:       SimConfig,
}

impl FleetConfig {
    /// Check every numeric field; the error names the first offending key.
    pub fn validate(&self) -> CoreResult<()> {
        let w = &self.world;
        positive("world.width", w.width)?;
        positive("world.height", w.height)?;
        positive("world.cell_size", w.cell_size)?;

        let fp = &self.footprint;
        positive("footprint.min_semi_minor", fp.min_semi_minor)?;
        positive("footprint.min_semi_major", fp.min_semi_major)?;
        if fp.min_semi_major < fp.min_semi_minor {
            return Err(CoreError::Config(
                "footprint.min_semi_major must be >= footprint.min_semi_minor".into(),
            ));
        }
        positive("footprint.semi_major", fp.semi_major)?;
        positive("footprint.semi_minor", fp.semi_minor)?;

        let th = &self.throttle;
        non_negative("throttle.rate", th.rate)?;
        positive("throttle.lookahead_near", th.lookahead_near)?;
        if th.lookahead_far < th.lookahead_near {
            return Err(CoreError::Config(
                "throttle.lookahead_far must be >= throttle.lookahead_near".into(),
            ));
        }

        let m = &self.motion;
        non_negative("motion.base_speed", m.base_speed)?;
        positive("motion.arrival_tolerance", m.arrival_tolerance)?;
        positive("motion.waypoint_tolerance", m.waypoint_tolerance)?;
        positive("motion.activation_radius", m.activation_radius)?;
        positive("motion.ring_radius", m.ring_radius)?;
        non_negative("motion.replan_threshold", m.replan_threshold)?;
        if m.waypoint_stride == 0 {
            return Err(CoreError::Config("motion.waypoint_stride must be >= 1".into()));
        }

        non_negative("target.radius", self.target.radius)?;
        non_negative("target.margin", self.target.margin)?;

        let p = &self.planner;
        positive("planner.planning_scale", p.planning_scale)?;
        positive("planner.grid_scale", p.grid_scale)?;
        non_negative("planner.safe_distance", p.safe_distance)?;
        non_negative("planner.margin", p.margin)?;
        if p.max_iterations == 0 {
            return Err(CoreError::Config("planner.max_iterations must be >= 1".into()));
        }
        match p.smoothing {
            Smoothing::None => {}
            Smoothing::MovingAverage { window } if window == 0 => {
                return Err(CoreError::Config("planner.smoothing.window must be >= 1".into()));
            }
            Smoothing::MovingAverage { .. } => {}
            Smoothing::Spline { factor } => non_negative("planner.smoothing.factor", factor)?,
        }

        if self.sim.tick_rate_hz == 0 {
            return Err(CoreError::Config("sim.tick_rate_hz must be >= 1".into()));
        }
        Ok(())
    }
}

fn positive(key: &str, v: f64) -> CoreResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{key} must be a finite value > 0, got {v}")))
    }
}

fn non_negative(key: &str, v: f64) -> CoreResult<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{key} must be a finite value >= 0, got {v}")))
    }
}

// ── Sections ──────────────────────────────────────────────────────────────────

/// Extent and resolution of the occupancy grid.  The grid covers
/// `[0, width) × [0, height)` in world units.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    pub width:     f64,
    pub height:    f64,
    pub cell_size: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self { width: 1200.0, height: 800.0, cell_size: 10.0 }
    }
}

/// Safety-envelope geometry.  `semi_major`/`semi_minor` are the full-speed
/// axes; throttling scales them down but never below the `min_*` floor.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FootprintConfig {
    pub semi_major:     f64,
    pub semi_minor:     f64,
    pub min_semi_major: f64,
    pub min_semi_minor: f64,
}

impl Default for FootprintConfig {
    fn default() -> Self {
        Self { semi_major: 20.0, semi_minor: 10.0, min_semi_major: 1.0, min_semi_minor: 0.5 }
    }
}

/// Collision-prediction lookahead and throttle feedback.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThrottleConfig {
    /// Change of `spadjust` per tick, shared by every motion state.
    pub rate:           f64,
    /// Near end of the lookahead segment, in multiples of the semi-major axis.
    pub lookahead_near: f64,
    /// Far end of the lookahead segment, in multiples of the semi-major axis.
    pub lookahead_far:  f64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self { rate: 0.015, lookahead_near: 1.0, lookahead_far: 2.5 }
    }
}

/// Motion state machine tuning.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionConfig {
    /// Unthrottled speed, world units per tick.
    pub base_speed:         f64,
    /// Distance at which the final waypoint counts as reached.
    pub arrival_tolerance:  f64,
    /// Distance at which an intermediate waypoint counts as reached.
    pub waypoint_tolerance: f64,
    /// Cursor advance on reaching an intermediate waypoint.
    pub waypoint_stride:    usize,
    /// Lead-to-target distance that switches the fleet to path following.
    pub activation_radius:  f64,
    /// Radius of the ring of final destinations around the target.
    pub ring_radius:        f64,
    /// Target displacement (since the last accepted plan) that triggers a re-plan.
    pub replan_threshold:   f64,
    /// Ticks a path-following boat may wait without a path before a retry.
    pub retry_ticks:        u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            base_speed:         2.0,
            arrival_tolerance:  5.0,
            waypoint_tolerance: 1.5,
            waypoint_stride:    3,
            activation_radius:  600.0,
            ring_radius:        300.0,
            replan_threshold:   1e-3,
            retry_ticks:        50,
        }
    }
}

/// The target's defended zone: a circle of `radius + margin` around it.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TargetConfig {
    pub radius: f64,
    pub margin: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self { radius: 60.0, margin: 10.0 }
    }
}

impl TargetConfig {
    /// Radius actually marked on the grid and blocked for the planner.
    #[inline]
    pub fn keep_out_radius(&self) -> f64 {
        self.radius + self.margin
    }
}

/// Path-smoothing strategy applied once to all finalized paths.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "method", rename_all = "snake_case"))]
pub enum Smoothing {
    None,
    MovingAverage { window: usize },
    Spline { factor: f64 },
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing::MovingAverage { window: 4 }
    }
}

/// Multi-agent planner settings.  Distances are in planning units.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    /// Planning units per world unit.
    pub planning_scale: f64,
    /// Kernel grid cell size.
    pub grid_scale:     f64,
    /// Minimum separation between two agents at the same step.
    pub safe_distance:  f64,
    /// Padding around the bounding box of all starts and goals.
    pub margin:         f64,
    /// Re-plan attempts per agent before its path is finalized anyway.
    pub max_iterations: usize,
    /// Trailing window of the A* heading smoothing pass.
    pub heading_window: usize,
    pub smoothing:      Smoothing,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            planning_scale: 0.05,
            grid_scale:     0.2,
            safe_distance:  1.0,
            margin:         3.0,
            max_iterations: 16,
            heading_window: 3,
            smoothing:      Smoothing::default(),
        }
    }
}

/// Run length and reporting cadence.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    pub tick_rate_hz:      u32,
    /// `Sim::run` stops after this many ticks.
    pub total_ticks:       u64,
    /// Master RNG seed for scenario setup.
    pub seed:              u64,
    /// Call `SimObserver::on_snapshot` every N ticks; 0 disables snapshots.
    pub snapshot_interval: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { tick_rate_hz: 50, total_ticks: 3_000, seed: 42, snapshot_interval: 1 }
    }
}
