//! `fleet-motion` — boats, the target, and the per-tick motion state machine.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | [`state`]   | `MotionState` — which controller drives a boat                    |
//! | [`boat`]    | `Boat` — one agent's kinematic and footprint state                |
//! | [`target`]  | `Target` — the moving point the fleet encircles                   |
//! | [`fleet`]   | `Fleet` — `Vec<Boat>` indexed by `AgentId`                        |
//! | [`command`] | `MotionCommand` — start, reset, destination, dock, target moves   |
//! | [`engine`]  | `MotionEngine` — grid rebuild, throttle, integration, plan hand-off |
//! | [`error`]   | `MotionError`, `MotionResult<T>`                                  |
//!
//! # Motion model
//!
//! Every boat moves by its velocity once per tick:
//!
//! 1. On `Start`, idle boats enter **direct approach**.  The boat nearest the
//!    target is the lead; every approaching boat applies the lead's
//!    `base_speed`-toward-target velocity, scaled by its own throttle.
//! 2. When the lead comes within `motion.activation_radius` of the target,
//!    the whole group switches to **path following** toward evenly spaced
//!    slots on a ring around the target and a plan is requested.
//! 3. Path-following boats steer waypoint to waypoint and **dock** once the
//!    last waypoint is within `motion.arrival_tolerance`.
//!
//! Throttling runs in every state: a predicted obstacle lowers `spadjust`,
//! clear water raises it, and the factor scales both speed and footprint.

pub mod boat;
pub mod command;
pub mod engine;
pub mod error;
pub mod fleet;
pub mod state;
pub mod target;


pub use boat::Boat;
pub use command::MotionCommand;
pub use engine::{MotionEngine, ReplanReason};
pub use error::{MotionError, MotionResult};
pub use fleet::Fleet;
pub use state::MotionState;
pub use target::Target;
