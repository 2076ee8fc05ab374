//! Background planner worker with a single-slot mailbox.
//!
//! At most one plan is in flight.  [`PlanWorker::submit`] snapshots the
//! request onto Rayon's global pool and returns immediately; the tick loop
//! calls [`PlanWorker::poll`] once per tick, which never blocks.  The hand-off
//! is a `tokio::sync::oneshot` channel read with `try_recv`, so no async
//! runtime is involved.
//!
//! ```text
//!   Idle ──submit──▶ Busy ──poll: result ready──▶ Idle   (outcome returned once)
//!                     │
//!                     └──poll: sender dropped──▶ Idle    (PlanFailure::Disconnected)
//! ```

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use fleet_core::{PlanId, Tick};
use fleet_plan::{MultiAgentPlanner, PathSearch, PlanError, PlanRequest, PlanResponse, TimeHeadingAStar};

/// Why a submitted plan produced nothing.
#[derive(Clone, Debug, PartialEq)]
pub enum PlanFailure {
    /// The planner rejected the request.
    Planner(PlanError),
    /// The planning job panicked; the payload message is kept.
    Panicked(String),
    /// The job ended without sending a result.
    Disconnected,
}

impl fmt::Display for PlanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanFailure::Planner(e)   => write!(f, "planner error: {e}"),
            PlanFailure::Panicked(m)  => write!(f, "planner panicked: {m}"),
            PlanFailure::Disconnected => f.write_str("planner worker disconnected"),
        }
    }
}

type JobResult = Result<PlanResponse, PlanFailure>;

/// A delivered result, tagged with the request it answers.
#[derive(Debug)]
pub struct PlanOutcome {
    pub id:           PlanId,
    pub requested_at: Tick,
    pub result:       JobResult,
}

enum Mailbox {
    Idle,
    Busy {
        id:           PlanId,
        requested_at: Tick,
        rx:           oneshot::Receiver<JobResult>,
    },
}

/// Runs [`MultiAgentPlanner::plan`] off the tick loop.
pub struct PlanWorker<S: PathSearch + 'static = TimeHeadingAStar> {
    planner: Arc<MultiAgentPlanner<S>>,
    mailbox: Mailbox,
    next_id: PlanId,
}

impl<S: PathSearch + 'static> PlanWorker<S> {
    pub fn new(planner: MultiAgentPlanner<S>) -> Self {
        Self { planner: Arc::new(planner), mailbox: Mailbox::Idle, next_id: PlanId(0) }
    }

    #[inline]
    pub fn planner(&self) -> &MultiAgentPlanner<S> {
        &self.planner
    }

    /// `true` while a plan is in flight.
    #[inline]
    pub fn is_busy(&self) -> bool {
        matches!(self.mailbox, Mailbox::Busy { .. })
    }

    /// Id of the in-flight plan, if any.
    pub fn in_flight(&self) -> Option<PlanId> {
        match self.mailbox {
            Mailbox::Busy { id, .. } => Some(id),
            Mailbox::Idle => None,
        }
    }

    /// Start planning `request`.  Returns `None` (and drops the request)
    /// while another plan is in flight.
    pub fn submit(&mut self, request: PlanRequest, now: Tick) -> Option<PlanId> {
        if self.is_busy() {
            return None;
        }
        let id = self.next_id;
        self.next_id = id.next();

        let (tx, rx) = oneshot::channel();
        let planner = Arc::clone(&self.planner);
        rayon::spawn(move || {
            let result = match catch_unwind(AssertUnwindSafe(|| planner.plan(&request))) {
                Ok(Ok(response)) => Ok(response),
                Ok(Err(err)) => Err(PlanFailure::Planner(err)),
                Err(payload) => Err(PlanFailure::Panicked(panic_message(payload.as_ref()))),
            };
            // The receiver is gone only if the worker itself was dropped.
            let _ = tx.send(result);
        });

        self.mailbox = Mailbox::Busy { id, requested_at: now, rx };
        Some(id)
    }

    /// Non-blocking check of the mailbox.  Returns the outcome exactly once.
    pub fn poll(&mut self) -> Option<PlanOutcome> {
        let Mailbox::Busy { rx, .. } = &mut self.mailbox else {
            return None;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err(PlanFailure::Disconnected),
        };
        self.take(result)
    }

    /// Block until the in-flight plan lands.  `None` when idle.
    pub fn wait(&mut self) -> Option<PlanOutcome> {
        let Mailbox::Busy { id, requested_at, rx } = std::mem::replace(&mut self.mailbox, Mailbox::Idle) else {
            return None;
        };
        let result = rx.blocking_recv().unwrap_or(Err(PlanFailure::Disconnected));
        Some(PlanOutcome { id, requested_at, result })
    }

    fn take(&mut self, result: JobResult) -> Option<PlanOutcome> {
        match std::mem::replace(&mut self.mailbox, Mailbox::Idle) {
            Mailbox::Busy { id, requested_at, .. } => Some(PlanOutcome { id, requested_at, result }),
            Mailbox::Idle => None,
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
