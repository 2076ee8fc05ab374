//! The `Sim` struct and its tick loop.

use fleet_core::{FleetConfig, SimClock, Tick};
use fleet_grid::Lookahead;
use fleet_motion::{MotionCommand, MotionEngine};
use fleet_plan::{PathSearch, TimeHeadingAStar};

use crate::observer::TickSummary;
use crate::worker::{PlanOutcome, PlanWorker};
use crate::{SimObserver, SimResult};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<S>` owns every boat, the grid and the clock, and drives the tick loop
/// on one logical thread:
///
/// 1. **Mailbox**: a finished plan (if any) is installed or reported failed.
/// 2. **Grid**: every footprint is repainted.
/// 3. **Predict** (optionally parallel with the `parallel` feature): one
///    lookahead per boat against the fresh grid.
/// 4. **Throttle**: each prediction updates its boat's `spadjust`.
/// 5. **Integrate**: every boat moves; a plan trigger, if raised and the
///    worker is idle, is snapshotted and submitted.  Triggers raised while a
///    plan is in flight are dropped.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<S: PathSearch + 'static = TimeHeadingAStar> {
    /// Full configuration; `config.sim` sets run length and snapshot cadence.
    pub config: FleetConfig,

    /// Simulation clock.
    pub clock: SimClock,

    /// Boats, target and grid.
    pub engine: MotionEngine,

    pub(crate) worker: PlanWorker<S>,

    /// Wait for each plan at the start of the following tick instead of
    /// polling, so runs are reproducible regardless of worker timing.
    pub(crate) lockstep: bool,
}

impl<S: PathSearch + 'static> Sim<S> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.sim.total_ticks`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let end = Tick(self.config.sim.total_ticks);
        while self.clock.current_tick < end {
            self.tick(observer);
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores
    /// `total_ticks`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.tick(observer);
        }
        Ok(())
    }

    /// Apply a motion command between ticks.
    pub fn command(&mut self, cmd: MotionCommand) -> SimResult<()> {
        self.engine.apply(cmd)?;
        Ok(())
    }

    /// `true` while a plan is in flight.
    #[inline]
    pub fn is_planning(&self) -> bool {
        self.worker.is_busy()
    }

    /// Block until the in-flight plan lands and install it.  Returns `false`
    /// if nothing was in flight.  Intended for tests and demos.
    pub fn wait_for_plan<O: SimObserver>(&mut self, observer: &mut O) -> bool {
        match self.worker.wait() {
            Some(outcome) => {
                self.deliver(outcome, observer);
                true
            }
            None => false,
        }
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn tick<O: SimObserver>(&mut self, observer: &mut O) {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        self.process_tick(now, observer);

        let summary = TickSummary::collect(&self.engine, self.worker.is_busy());
        observer.on_tick_end(now, &summary);
        let interval = self.config.sim.snapshot_interval;
        if interval > 0 && now.0.is_multiple_of(interval) {
            observer.on_snapshot(now, self.engine.boats(), self.engine.target());
        }
        self.clock.advance();
    }

    fn process_tick<O: SimObserver>(&mut self, now: Tick, observer: &mut O) {
        // ── Phase 1: mailbox ──────────────────────────────────────────────
        let landed = if self.lockstep { self.worker.wait() } else { self.worker.poll() };
        if let Some(outcome) = landed {
            self.deliver(outcome, observer);
        }

        // ── Phase 2–4: grid, prediction, throttle ─────────────────────────
        self.engine.rebuild_grid();
        let lookaheads = self.predict_phase();
        self.engine.throttle(&lookaheads);

        // ── Phase 5: integrate and maybe request a plan ───────────────────
        let Some(reason) = self.engine.integrate(now) else {
            return;
        };
        if self.worker.is_busy() {
            tracing::debug!(tick = now.0, reason = %reason, "Plan trigger dropped: worker busy");
            return;
        }
        let request = self.engine.begin_plan(now, reason);
        let agents = request.agents.len();
        if let Some(id) = self.worker.submit(request, now) {
            tracing::debug!(tick = now.0, plan = %id, agents, reason = %reason, "Plan requested");
            observer.on_plan_requested(now, id, reason);
        }
    }

    /// Collision prediction for every boat, in `AgentId` order.
    fn predict_phase(&self) -> Vec<Lookahead> {
        #[cfg(not(feature = "parallel"))]
        {
            self.engine.predict_all()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let engine = &self.engine;
            engine
                .boats()
                .par_iter()
                .map(|b| engine.predictor().predict(&b.sweep(), engine.grid()))
                .collect()
        }
    }

    fn deliver<O: SimObserver>(&mut self, outcome: PlanOutcome, observer: &mut O) {
        let now = self.clock.current_tick;
        match outcome.result {
            Ok(response) => {
                let applied = self.engine.apply_plan(&response);
                tracing::info!(
                    tick = now.0,
                    plan = %outcome.id,
                    requested_at = outcome.requested_at.0,
                    applied,
                    "Plan applied"
                );
                observer.on_plan_applied(now, outcome.id, &response);
            }
            Err(failure) => {
                tracing::warn!(tick = now.0, plan = %outcome.id, error = %failure, "No plan produced");
                observer.on_plan_failed(now, outcome.id, &failure);
            }
        }
    }
}
