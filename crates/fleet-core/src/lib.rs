//! `fleet-core` — foundational types for the fleet convergence engine.
//!
//! This crate is a dependency of every other `fleet-*` crate.  It intentionally
//! has no `fleet-*` dependencies and minimal external ones (`glam`, `rand`
//! and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `PlanId`                                       |
//! | [`geo`]         | `Vec2` (glam), `Heading`, `Destination`, `Waypoint`       |
//! | [`time`]        | `Tick`, `SimClock`                                        |
//! | [`config`]      | `FleetConfig` and its per-subsystem sections             |
//! | [`rng`]         | `SimRng` (seeded, deterministic)                          |
//! | [`error`]       | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required for loading `FleetConfig` from TOML.              |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    FleetConfig, FootprintConfig, MotionConfig, PlannerConfig, SimConfig, Smoothing,
    TargetConfig, ThrottleConfig, WorldConfig,
};
pub use error::{CoreError, CoreResult};
pub use geo::{Destination, Heading, Vec2, Waypoint, heading_of, normalize_heading};
pub use ids::{AgentId, PlanId};
pub use rng::SimRng;
pub use time::{SimClock, Tick};
