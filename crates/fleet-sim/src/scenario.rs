//! CSV fleet loader.
//!
//! # CSV format
//!
//! One row per boat.  Ids must cover `0..n` exactly once; row order does not
//! matter.  An empty `base_speed` (or a missing column) takes
//! `FleetConfig::motion.base_speed`.
//!
//! ```csv
//! agent_id,x,y,base_speed
//! 0,100.0,400.0,2.0
//! 1,120.0,520.0,2.0
//! 2,90.0,280.0,1.8
//! ```
//!
//! Every boat starts idle with the resting footprint from
//! `FleetConfig::footprint`.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use fleet_core::{AgentId, FleetConfig, Vec2};
use fleet_motion::Boat;

use crate::{SimError, SimResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct FleetRecord {
    agent_id:   u32,
    x:          f64,
    y:          f64,
    #[serde(default)]
    base_speed: Option<f64>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the fleet from a CSV file.  Returns boats in ascending `AgentId`
/// order.
pub fn load_fleet_csv(path: &Path, config: &FleetConfig) -> SimResult<Vec<Boat>> {
    let file = std::fs::File::open(path)?;
    load_fleet_reader(file, config)
}

/// Like [`load_fleet_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or embedding scenarios.
pub fn load_fleet_reader<R: Read>(reader: R, config: &FleetConfig) -> SimResult<Vec<Boat>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows: Vec<(FleetRecord, f64)> = Vec::new();
    for result in csv_reader.deserialize::<FleetRecord>() {
        let row = result.map_err(|e| SimError::Scenario(e.to_string()))?;
        let base_speed = row.base_speed.unwrap_or(config.motion.base_speed);
        if !(row.x.is_finite() && row.y.is_finite()) {
            return Err(SimError::Scenario(format!(
                "agent {}: position ({}, {}) is not finite",
                row.agent_id, row.x, row.y
            )));
        }
        if !(base_speed.is_finite() && base_speed >= 0.0) {
            return Err(SimError::Scenario(format!(
                "agent {}: base_speed {base_speed} must be finite and >= 0",
                row.agent_id
            )));
        }
        rows.push((row, base_speed));
    }

    rows.sort_by_key(|(r, _)| r.agent_id);
    for (i, (row, _)) in rows.iter().enumerate() {
        if row.agent_id as usize != i {
            return Err(SimError::Scenario(format!(
                "agent ids must be dense from 0: expected {i}, found {}",
                row.agent_id
            )));
        }
    }

    Ok(rows
        .into_iter()
        .map(|(r, speed)| Boat::new(AgentId(r.agent_id), Vec2::new(r.x, r.y), speed, &config.footprint))
        .collect())
}
