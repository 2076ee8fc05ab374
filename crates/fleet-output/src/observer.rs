//! `TraceObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use fleet_core::{PlanId, Tick};
use fleet_motion::{Boat, Target};
use fleet_sim::{PlanFailure, SimObserver, TickSummary};

use crate::row::{BoatSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes boat snapshots and tick summaries to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct TraceObserver<W: OutputWriter> {
    writer:        W,
    plan_failures: u64,
    last_error:    Option<OutputError>,
}

impl<W: OutputWriter> TraceObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, plan_failures: 0, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Plans that produced no result during the run.
    pub fn plan_failures(&self) -> u64 {
        self.plan_failures
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                tracing::warn!(error = %e, "Trace write failed; further rows may be missing");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for TraceObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        let row = TickSummaryRow::from_summary(tick, summary);
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, boats: &[Boat], _target: &Target) {
        if boats.is_empty() {
            return;
        }
        let rows: Vec<BoatSnapshotRow> = boats.iter().map(|b| BoatSnapshotRow::from_boat(tick, b)).collect();
        let result = self.writer.write_snapshots(&rows);
        self.store_err(result);
    }

    fn on_plan_failed(&mut self, _tick: Tick, _id: PlanId, _failure: &PlanFailure) {
        self.plan_failures += 1;
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
