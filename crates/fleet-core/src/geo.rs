//! Planar geometry and the engine-wide heading convention.
//!
//! # Heading convention
//!
//! The world frame has x to the right and y up.  A heading is a compass
//! bearing in degrees: 0° points along +y, angles grow clockwise, and every
//! heading the engine produces is normalized into `[0, 360)`.
//!
//! ```text
//!            0°
//!            ↑
//!   270° ←   ·   → 90°
//!            ↓
//!           180°
//! ```
//!
//! The A* search, the path smoother, the collision predictor, the ellipse
//! rasterizer, and the motion controllers all use [`heading_of`] and
//! [`Heading::from_heading`], so there is exactly one place that defines it.

use crate::{CoreError, CoreResult};

// ── Vec2 ──────────────────────────────────────────────────────────────────────

/// A 2-D point or vector in world (or planning) units.
pub use glam::DVec2 as Vec2;

/// Compass-bearing view of a [`Vec2`].  Bring it into scope to call
/// `Vec2::from_heading` and `v.heading()`.
pub trait Heading: Sized {
    /// Unit vector pointing along `heading_deg`.
    fn from_heading(heading_deg: f64) -> Self;

    /// Heading of this vector, or `None` for a zero-length vector.
    fn heading(self) -> Option<f64>;
}

impl Heading for Vec2 {
    #[inline]
    fn from_heading(heading_deg: f64) -> Self {
        let (sin, cos) = heading_deg.to_radians().sin_cos();
        Vec2::new(sin, cos)
    }

    #[inline]
    fn heading(self) -> Option<f64> {
        (self.length_squared() > 0.0).then(|| heading_of(self.x, self.y))
    }
}

// ── Heading helpers ───────────────────────────────────────────────────────────

/// Heading in degrees of the direction `(dx, dy)`, in `[0, 360)`.
///
/// `(0, 0)` maps to 0°; callers that must distinguish "no direction" use
/// [`Heading::heading`].
#[inline]
pub fn heading_of(dx: f64, dy: f64) -> f64 {
    normalize_heading(dx.atan2(dy).to_degrees())
}

/// Wrap any angle in degrees into `[0, 360)`.
#[inline]
pub fn normalize_heading(deg: f64) -> f64 {
    let h = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if h >= 360.0 { 0.0 } else { h }
}

// ── Destination ───────────────────────────────────────────────────────────────

/// A validated, finite world point used wherever a caller hands the engine a
/// place to go.
///
/// The field is private: the only way to obtain a `Destination` is through
/// [`Destination::new`] / [`Destination::try_from`], which reject NaN and
/// infinite coordinates.  Commands carrying a `Destination` therefore never
/// need a runtime shape check.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec2", into = "Vec2"))]
pub struct Destination(Vec2);

impl Destination {
    pub fn new(x: f64, y: f64) -> CoreResult<Self> {
        Self::try_from(Vec2::new(x, y))
    }

    #[inline]
    pub fn point(self) -> Vec2 {
        self.0
    }
}

impl TryFrom<Vec2> for Destination {
    type Error = CoreError;

    fn try_from(p: Vec2) -> CoreResult<Self> {
        if p.is_finite() {
            Ok(Destination(p))
        } else {
            Err(CoreError::InvalidPoint { x: p.x, y: p.y })
        }
    }
}

impl From<Destination> for Vec2 {
    fn from(d: Destination) -> Vec2 {
        d.0
    }
}

// ── Waypoint ──────────────────────────────────────────────────────────────────

/// One step of a planned path: where to be, at which discrete step, facing
/// which way.
///
/// Paths are `Vec<Waypoint>` produced once per plan and replaced wholesale on
/// re-plan; nothing mutates a waypoint after the plan is delivered.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    pub pos:     Vec2,
    pub step:    u32,
    pub heading: f64,
}

impl Waypoint {
    #[inline]
    pub fn new(pos: Vec2, step: u32, heading: f64) -> Self {
        Self { pos, step, heading }
    }
}
