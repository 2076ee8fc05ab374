//! `fleet-grid` — footprint occupancy grid and the per-tick throttle loop.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`grid`]     | `FootprintGrid`, `Cell`, `CellState`, `Owner`, `Footprint` |
//! | [`predict`]  | `CollisionPredictor`, `Sweep`, `Lookahead`                 |
//! | [`throttle`] | `SpeedAdjuster`                                            |
//! | [`error`]    | `GridError`, `GridResult<T>`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod grid;
pub mod predict;
pub mod throttle;


pub use error::{GridError, GridResult};
pub use grid::{Cell, CellState, Circle, Footprint, FootprintGrid, Owner, clamp_axes};
pub use predict::{CollisionPredictor, Lookahead, Sweep};
pub use throttle::SpeedAdjuster;
