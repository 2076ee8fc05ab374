//! Fluent builder for constructing a [`Sim`].

use fleet_core::{FleetConfig, SimClock};
use fleet_motion::{Boat, MotionCommand, MotionEngine, Target};
use fleet_plan::{MultiAgentPlanner, PathSearch, TimeHeadingAStar};

use crate::worker::PlanWorker;
use crate::{Sim, SimResult};

/// Fluent builder for [`Sim<S>`].
///
/// # Required inputs
///
/// - [`FleetConfig`]: world, footprint, throttle, motion, planner, run length
/// - `Vec<Boat>`: numbered densely from 0 (see [`crate::load_fleet_csv`])
/// - [`Target`]: the point the fleet converges on
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                               |
/// |-------------------|---------------------------------------|
/// | `.search(s)`      | `TimeHeadingAStar` with `planner.heading_window` |
/// | `.lockstep(b)`    | `false` (plans land whenever ready)   |
/// | `.started()`      | boats stay idle until `Start`         |
///
/// # Example
///
/// ```rust,ignore
/// let boats = load_fleet_csv(Path::new("fleet.csv"), &config)?;
/// let mut sim = SimBuilder::new(config, boats, target)
///     .started()
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<S: PathSearch + 'static = TimeHeadingAStar> {
    config:   FleetConfig,
    boats:    Vec<Boat>,
    target:   Target,
    search:   S,
    lockstep: bool,
    started:  bool,
}

impl SimBuilder<TimeHeadingAStar> {
    /// Create a builder with all required inputs.
    pub fn new(config: FleetConfig, boats: Vec<Boat>, target: Target) -> Self {
        let search = TimeHeadingAStar::new(config.planner.heading_window);
        Self { config, boats, target, search, lockstep: false, started: false }
    }
}

impl<S: PathSearch + 'static> SimBuilder<S> {
    /// Replace the single-agent search used by the planner.
    pub fn search<T: PathSearch + 'static>(self, search: T) -> SimBuilder<T> {
        SimBuilder {
            config:   self.config,
            boats:    self.boats,
            target:   self.target,
            search,
            lockstep: self.lockstep,
            started:  self.started,
        }
    }

    /// Apply each plan at the start of the tick after its request, blocking
    /// if the worker hasn't finished.  Makes runs reproducible.
    pub fn lockstep(mut self, on: bool) -> Self {
        self.lockstep = on;
        self
    }

    /// Issue `MotionCommand::Start` before the first tick.
    pub fn started(mut self) -> Self {
        self.started = true;
        self
    }

    /// Validate inputs and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<S>> {
        let mut engine = MotionEngine::new(self.config.clone(), self.boats, self.target)?;
        if self.started {
            engine.apply(MotionCommand::Start)?;
        }
        let planner = MultiAgentPlanner::with_search(self.search, self.config.planner);

        tracing::debug!(
            boats = engine.fleet().len(),
            lockstep = self.lockstep,
            search = std::any::type_name::<S>(),
            "Simulation built"
        );
        Ok(Sim {
            clock:    SimClock::new(self.config.sim.tick_rate_hz),
            config:   self.config,
            engine,
            worker:   PlanWorker::new(planner),
            lockstep: self.lockstep,
        })
    }
}
