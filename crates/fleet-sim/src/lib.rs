//! `fleet-sim` — tick loop orchestrator for the fleet convergence engine.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.sim.total_ticks:
//!   ① Mailbox    — install a finished plan, or report "no plan produced".
//!   ② Grid       — repaint every footprint, then the target's zone.
//!   ③ Predict    — one lookahead per boat (parallel with the `parallel` feature).
//!   ④ Throttle   — spadjust ± throttle.rate per prediction.
//!   ⑤ Integrate  — move boats; on a plan trigger with an idle worker,
//!                  snapshot a PlanRequest and submit it.
//! ```
//!
//! Planning is the only work off the loop.  One plan is in flight at a time
//! ([`worker`]); the loop never waits for it unless built with
//! [`SimBuilder::lockstep`].
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the prediction phase on Rayon's thread pool.      |
//! | `serde`    | Serde derives on every fleet crate's public types.     |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use fleet_core::{Destination, FleetConfig};
//! use fleet_motion::Target;
//! use fleet_sim::{NoopObserver, SimBuilder, load_fleet_csv};
//!
//! let config = FleetConfig::default();
//! let boats = load_fleet_csv(Path::new("fleet.csv"), &config)?;
//! let target = Target::new(Destination::new(600.0, 400.0)?, &config.target);
//! let mut sim = SimBuilder::new(config, boats, target).started().build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod scenario;
pub mod sim;
pub mod worker;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, TickSummary};
pub use scenario::{load_fleet_csv, load_fleet_reader};
pub use sim::Sim;
pub use worker::{PlanFailure, PlanOutcome, PlanWorker};
