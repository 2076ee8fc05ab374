//! Per-boat motion state.

use std::fmt;

/// Which controller drives a boat this tick.
///
/// ```text
///  Idle ──Start──▶ DirectApproach ──lead within activation radius──▶ PathFollowing
///   ▲                                                                     │
///   └──────────────── Reset (from any state) ◀──── Docked ◀──path exhausted┘
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MotionState {
    /// No destination; stationary.
    #[default]
    Idle,
    /// Straight line toward the target, mirroring the lead boat's velocity.
    DirectApproach,
    /// Consuming an assigned waypoint sequence.  Holds position until the
    /// first plan arrives.
    PathFollowing,
    /// Snapped to the destination.  Terminal until the next reset.
    Docked,
}

impl MotionState {
    /// `true` for the two states in which a boat is under way.
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, MotionState::DirectApproach | MotionState::PathFollowing)
    }

    /// Stable lowercase name, used in trace output.
    pub fn as_str(self) -> &'static str {
        match self {
            MotionState::Idle           => "idle",
            MotionState::DirectApproach => "direct_approach",
            MotionState::PathFollowing  => "path_following",
            MotionState::Docked         => "docked",
        }
    }
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
