//! `fleet-plan` — single-agent search and multi-agent conflict resolution.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`astar`]    | `PathSearch` trait, `SearchGrid`, `TimeHeadingAStar`         |
//! | [`smooth`]   | `PathSmoother`, moving average, penalized spline             |
//! | [`conflict`] | `position_at_step`, `paths_conflict`                         |
//! | [`multi`]    | `MultiAgentPlanner`, `PlanRequest`, `PlanResponse`           |
//! | [`error`]    | `PlanError`, `PlanResult<T>`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on request/response types. |

pub mod astar;
pub mod conflict;
pub mod error;
pub mod multi;
pub mod smooth;

#[cfg(test)]
mod tests;

pub use astar::{PathSearch, SearchGrid, SearchOutcome, SearchQuery, TimeHeadingAStar, octile};
pub use conflict::{first_conflict, paths_conflict, position_at_step};
pub use error::{PlanError, PlanResult};
pub use multi::{
    AgentPlanRequest, MultiAgentPlanner, PlanDiagnostics, PlanRequest, PlanResponse, PlannedPath,
};
pub use smooth::PathSmoother;
