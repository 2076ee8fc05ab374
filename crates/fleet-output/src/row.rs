//! Plain data row types written by output backends.

use fleet_core::Tick;
use fleet_motion::Boat;
use fleet_sim::TickSummary;

/// One boat at one snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoatSnapshotRow {
    pub tick:       u64,
    pub agent_id:   u32,
    /// `MotionState::as_str`, e.g. `"path_following"`.
    pub state:      &'static str,
    pub x:          f64,
    pub y:          f64,
    /// Degrees, clockwise from +y.
    pub heading:    f64,
    pub speed:      f64,
    pub spadjust:   f64,
    pub semi_major: f64,
    pub semi_minor: f64,
    /// Index of the waypoint being steered to; 0 without a path.
    pub cursor:     usize,
    pub path_len:   usize,
}

impl BoatSnapshotRow {
    pub fn from_boat(tick: Tick, boat: &Boat) -> Self {
        Self {
            tick:       tick.0,
            agent_id:   boat.id.0,
            state:      boat.state.as_str(),
            x:          boat.pos.x,
            y:          boat.pos.y,
            heading:    boat.heading,
            speed:      boat.speed,
            spadjust:   boat.spadjust,
            semi_major: boat.semi_major,
            semi_minor: boat.semi_minor,
            cursor:     boat.cursor,
            path_len:   boat.path.len(),
        }
    }
}

/// Fleet-wide counts at the end of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:        u64,
    pub approaching: u32,
    pub following:   u32,
    pub docked:      u32,
    pub planning:    bool,
}

impl TickSummaryRow {
    pub fn from_summary(tick: Tick, summary: &TickSummary) -> Self {
        Self {
            tick:        tick.0,
            approaching: summary.approaching as u32,
            following:   summary.following as u32,
            docked:      summary.docked as u32,
            planning:    summary.planning,
        }
    }
}
