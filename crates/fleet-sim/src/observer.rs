//! Simulation observer trait for progress reporting and data collection.

use fleet_core::{PlanId, Tick};
use fleet_motion::{Boat, MotionEngine, MotionState, ReplanReason, Target};
use fleet_plan::PlanResponse;

use crate::worker::PlanFailure;

/// Per-tick state counts handed to [`SimObserver::on_tick_end`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub idle:        usize,
    pub approaching: usize,
    pub following:   usize,
    pub docked:      usize,
    /// A plan was in flight when the tick ended.
    pub planning:    bool,
}

impl TickSummary {
    pub(crate) fn collect(engine: &MotionEngine, planning: bool) -> Self {
        let fleet = engine.fleet();
        Self {
            idle:        fleet.count_in(MotionState::Idle),
            approaching: fleet.count_in(MotionState::DirectApproach),
            following:   fleet.count_in(MotionState::PathFollowing),
            docked:      fleet.count_in(MotionState::Docked),
            planning,
        }
    }

    /// `true` once every boat has docked.
    #[inline]
    pub fn all_docked(&self) -> bool {
        self.docked > 0 && self.idle + self.approaching + self.following == 0
    }
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  This is also the rendering boundary: the
/// engine never draws, it only hands out read-only views.
///
/// # Example: docking watcher
///
/// ```rust,ignore
/// struct DockWatcher { done_at: Option<Tick> }
///
/// impl SimObserver for DockWatcher {
///     fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
///         if summary.all_docked() && self.done_at.is_none() {
///             self.done_at = Some(tick);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick with the state counts after motion.
    fn on_tick_end(&mut self, _tick: Tick, _summary: &TickSummary) {}

    /// Called every `sim.snapshot_interval` ticks with every boat (position,
    /// heading, footprint, current path) and the target.
    fn on_snapshot(&mut self, _tick: Tick, _boats: &[Boat], _target: &Target) {}

    /// A plan request was handed to the worker.
    fn on_plan_requested(&mut self, _tick: Tick, _id: PlanId, _reason: ReplanReason) {}

    /// A finished plan was installed on the boats.
    fn on_plan_applied(&mut self, _tick: Tick, _id: PlanId, _response: &PlanResponse) {}

    /// The worker produced no plan.  Boats keep their state.
    fn on_plan_failed(&mut self, _tick: Tick, _id: PlanId, _failure: &PlanFailure) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
