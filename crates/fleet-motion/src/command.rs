//! Motion commands: the only way outside code changes what boats do.

use fleet_core::{AgentId, Destination};

/// A request applied by [`MotionEngine::apply`][crate::MotionEngine::apply].
///
/// Destinations are already validated [`Destination`]s, so the only runtime
/// rejections are unknown agents and docking without a destination.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MotionCommand {
    /// Every idle boat heads for the target; the lead boat is chosen.
    Start,

    /// Every boat returns to idle where it is.
    Reset,

    /// Replace one boat's destination.  A path-following boat drops its path
    /// and waits for the next plan.
    SetDestination { agent: AgentId, to: Destination },

    /// Snap one boat to `at`, or to its current destination when `None`.
    Dock { agent: AgentId, at: Option<Destination> },

    /// Move the target.
    MoveTarget { to: Destination },
}
