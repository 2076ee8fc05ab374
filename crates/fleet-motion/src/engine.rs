//! The per-tick motion state machine.
//!
//! # Tick phases
//!
//! The engine exposes each phase separately so the simulation loop can run
//! the read-only prediction phase in parallel; [`MotionEngine::step`] runs
//! them in order for callers that don't care:
//!
//! 1. [`rebuild_grid`][MotionEngine::rebuild_grid]: repaint every footprint
//!    in ascending `AgentId` order, then the target's zone.
//! 2. [`predict_all`][MotionEngine::predict_all]: one lookahead per boat.
//! 3. [`throttle`][MotionEngine::throttle]: update `spadjust` and rescale
//!    the footprints of boats under way.
//! 4. [`integrate`][MotionEngine::integrate]: move every boat with the
//!    controller for its state, then report whether a plan is wanted.
//!
//! # Planning hand-off
//!
//! The engine never plans.  When `integrate` returns a [`ReplanReason`] and
//! the caller has a free worker, it calls [`begin_plan`][MotionEngine::begin_plan]
//! for an immutable [`PlanRequest`] in planning units, and later hands the
//! result to [`apply_plan`][MotionEngine::apply_plan].  A dropped trigger
//! simply fires again on a later tick.

use std::fmt;

use fleet_core::{AgentId, Destination, FleetConfig, FootprintConfig, Heading, MotionConfig, Tick, Vec2};
use fleet_grid::{CellState, Circle, CollisionPredictor, FootprintGrid, Lookahead, SpeedAdjuster};
use fleet_plan::{AgentPlanRequest, PlanRequest, PlanResponse};

use crate::{Boat, Fleet, MotionCommand, MotionError, MotionResult, MotionState, Target};

/// Why the engine wants a new plan.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReplanReason {
    /// The lead boat crossed the activation radius this tick.
    Activated,
    /// The target moved since the last accepted request.
    TargetMoved,
    /// A path-following boat has waited `retry_ticks` without a path.
    Retry,
}

impl fmt::Display for ReplanReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReplanReason::Activated   => "activated",
            ReplanReason::TargetMoved => "target_moved",
            ReplanReason::Retry       => "retry",
        })
    }
}

/// Owns the fleet, the target, and the footprint grid, and drives every boat
/// through [`MotionState`].
#[derive(Clone, Debug)]
pub struct MotionEngine {
    config:         FleetConfig,
    fleet:          Fleet,
    target:         Target,
    grid:           FootprintGrid,
    predictor:      CollisionPredictor,
    adjuster:       SpeedAdjuster,
    lead:           Option<AgentId>,
    /// Target position at the last accepted plan request.
    planned_target: Option<Vec2>,
    last_request:   Option<Tick>,
}

impl MotionEngine {
    /// Validate `config` and take ownership of `boats` and `target`.
    pub fn new(config: FleetConfig, boats: Vec<Boat>, target: Target) -> MotionResult<Self> {
        config.validate()?;
        let fleet = Fleet::new(boats)?;
        let grid = FootprintGrid::from_config(&config)?;
        Ok(Self {
            predictor: CollisionPredictor::from_config(&config.throttle),
            adjuster: SpeedAdjuster::from_config(&config.throttle),
            config,
            fleet,
            target,
            grid,
            lead: None,
            planned_target: None,
            last_request: None,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    #[inline]
    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    /// Direct access to the boats, for external drivers of idle boats and
    /// for tests.  Callers must keep `boats[i].id == AgentId(i)`.
    #[inline]
    pub fn fleet_mut(&mut self) -> &mut Fleet {
        &mut self.fleet
    }

    #[inline]
    pub fn boats(&self) -> &[Boat] {
        self.fleet.as_slice()
    }

    #[inline]
    pub fn boat(&self, id: AgentId) -> MotionResult<&Boat> {
        self.fleet.get(id)
    }

    #[inline]
    pub fn target(&self) -> &Target {
        &self.target
    }

    #[inline]
    pub fn grid(&self) -> &FootprintGrid {
        &self.grid
    }

    #[inline]
    pub fn predictor(&self) -> &CollisionPredictor {
        &self.predictor
    }

    /// The boat every direct-approach boat mirrors, once started.
    #[inline]
    pub fn lead(&self) -> Option<AgentId> {
        self.lead
    }

    /// Tick of the last accepted plan request.
    #[inline]
    pub fn last_request(&self) -> Option<Tick> {
        self.last_request
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Apply `cmd`.  On error nothing changes and a warning is logged.
    pub fn apply(&mut self, cmd: MotionCommand) -> MotionResult<()> {
        let result = match cmd {
            MotionCommand::Start => {
                self.start();
                Ok(())
            }
            MotionCommand::Reset => {
                self.reset();
                Ok(())
            }
            MotionCommand::SetDestination { agent, to } => self.set_destination(agent, to),
            MotionCommand::Dock { agent, at } => self.dock_command(agent, at),
            MotionCommand::MoveTarget { to } => {
                self.target.move_to(to);
                Ok(())
            }
        };
        if let Err(err) = &result {
            tracing::warn!(command = ?cmd, error = %err, "Motion command rejected");
        }
        result
    }

    fn start(&mut self) {
        let target = self.target.position();
        let mut started = 0usize;
        for boat in self.fleet.iter_mut().filter(|b| b.state == MotionState::Idle) {
            boat.state = MotionState::DirectApproach;
            boat.destination = Some(target);
            boat.clear_path();
            started += 1;
        }
        if started == 0 {
            tracing::debug!("Start ignored: no idle boats");
            return;
        }

        self.lead = self.choose_lead();
        // Give every boat its first velocity now so the first prediction sees
        // motion.
        let desired = self.lead_velocity();
        for boat in self.fleet.iter_mut().filter(|b| b.state == MotionState::DirectApproach) {
            boat.velocity = self.adjuster.scale_velocity(desired, boat.spadjust);
            boat.speed = boat.velocity.length();
            if let Some(h) = desired.heading() {
                boat.heading = h;
            }
        }
        tracing::info!(boats = started, lead = ?self.lead, "Fleet started toward target");
    }

    fn reset(&mut self) {
        let footprint = self.config.footprint;
        for boat in self.fleet.iter_mut() {
            boat.state = MotionState::Idle;
            boat.destination = None;
            boat.clear_path();
            boat.hold();
            boat.spadjust = 1.0;
            boat.rest_footprint(&footprint);
            boat.lookahead = Lookahead::Clear;
        }
        self.lead = None;
        self.planned_target = None;
        self.last_request = None;
        tracing::info!(boats = self.fleet.len(), "Fleet reset to idle");
    }

    fn set_destination(&mut self, agent: AgentId, to: Destination) -> MotionResult<()> {
        let boat = self.fleet.get_mut(agent)?;
        boat.destination = Some(to);
        if boat.state == MotionState::PathFollowing {
            boat.clear_path();
            boat.hold();
        }
        tracing::debug!(agent = %agent, to = %to.point(), "Destination set");
        Ok(())
    }

    fn dock_command(&mut self, agent: AgentId, at: Option<Destination>) -> MotionResult<()> {
        let footprint = self.config.footprint;
        let boat = self.fleet.get_mut(agent)?;
        let Some(dest) = at.or(boat.destination) else {
            return Err(MotionError::NoDestination(agent));
        };
        boat.destination = Some(dest);
        dock(boat, &footprint);
        Ok(())
    }

    // ── Tick phases ───────────────────────────────────────────────────────

    /// Run all four phases for tick `now`.
    pub fn step(&mut self, now: Tick) -> Option<ReplanReason> {
        self.rebuild_grid();
        let lookaheads = self.predict_all();
        self.throttle(&lookaheads);
        self.integrate(now)
    }

    /// Phase 1: repaint the grid from the current footprints.
    pub fn rebuild_grid(&mut self) {
        let footprints = self.fleet.iter().map(Boat::footprint);
        self.grid.rebuild(footprints, Some(self.target.keep_out()));
    }

    /// Phase 2: one prediction per boat, in `AgentId` order.
    pub fn predict_all(&self) -> Vec<Lookahead> {
        self.fleet
            .iter()
            .map(|b| self.predictor.predict(&b.sweep(), &self.grid))
            .collect()
    }

    /// Phase 3: feed each boat's prediction into its throttle.  Boats under
    /// way get a footprint scaled by the new `spadjust`; idle and docked boats
    /// keep the resting shape.
    pub fn throttle(&mut self, lookaheads: &[Lookahead]) {
        let footprint = self.config.footprint;
        for (boat, lookahead) in self.fleet.iter_mut().zip(lookaheads) {
            boat.lookahead = *lookahead;
            boat.spadjust = self.adjuster.update(boat.spadjust, lookahead);
            if boat.state.is_active() {
                let (a, b) = self.adjuster.scale_footprint(&footprint, boat.spadjust);
                boat.semi_major = a;
                boat.semi_minor = b;
            } else {
                boat.rest_footprint(&footprint);
            }
        }
    }

    /// Phase 4: move the target and every boat, then decide whether a plan
    /// is wanted.
    pub fn integrate(&mut self, now: Tick) -> Option<ReplanReason> {
        self.target.drift_once();
        let activated = self.integrate_direct();
        self.integrate_paths();

        if activated {
            return Some(ReplanReason::Activated);
        }
        self.replan_trigger(now)
    }

    /// Direct approach: every approaching boat applies the lead's desired
    /// velocity, scaled by its own throttle.  Returns `true` when the lead
    /// crossed the activation radius and the fleet switched to path following.
    fn integrate_direct(&mut self) -> bool {
        if !self.fleet.any_in(MotionState::DirectApproach) {
            return false;
        }
        let desired = self.lead_velocity();
        let target = self.target.position();
        for boat in self.fleet.iter_mut().filter(|b| b.state == MotionState::DirectApproach) {
            boat.destination = Some(target);
            let velocity = self.adjuster.scale_velocity(desired, boat.spadjust);
            boat.advance(velocity);
        }

        let lead_distance = self
            .lead
            .and_then(|id| self.fleet.get(id).ok())
            .filter(|b| b.state == MotionState::DirectApproach)
            .map(|b| b.pos.distance(target.point()));
        match lead_distance {
            Some(d) if d < self.config.motion.activation_radius => {
                self.activate();
                true
            }
            _ => false,
        }
    }

    /// Switch every approaching boat to path following with its ring slot as
    /// destination.  Boats hold position until the plan lands.
    fn activate(&mut self) {
        let ring = self.ring_slots();
        let mut switched = 0usize;
        for (boat, slot) in self.fleet.iter_mut().zip(ring) {
            if boat.state != MotionState::DirectApproach {
                continue;
            }
            boat.state = MotionState::PathFollowing;
            boat.destination = slot;
            boat.clear_path();
            boat.hold();
            switched += 1;
        }
        tracing::info!(boats = switched, lead = ?self.lead, "Lead inside activation radius; switching to path following");
    }

    fn integrate_paths(&mut self) {
        let motion = self.config.motion;
        let footprint = self.config.footprint;
        for boat in self.fleet.iter_mut().filter(|b| b.state == MotionState::PathFollowing) {
            match follow_path(boat, &motion) {
                PathStep::Hold => boat.hold(),
                PathStep::Steer(to) => {
                    let offset = to - boat.pos;
                    let step = (boat.base_speed * boat.spadjust).min(offset.length());
                    let velocity = offset.normalize_or_zero() * step;
                    boat.advance(velocity);
                }
                PathStep::Dock => dock(boat, &footprint),
            }
        }
    }

    fn replan_trigger(&self, now: Tick) -> Option<ReplanReason> {
        if !self.fleet.any_in(MotionState::PathFollowing) {
            return None;
        }
        let moved = self
            .planned_target
            .is_some_and(|p| p.distance(self.target.point()) > self.config.motion.replan_threshold);
        if moved {
            return Some(ReplanReason::TargetMoved);
        }
        let waiting = self
            .fleet
            .iter()
            .any(|b| b.state == MotionState::PathFollowing && b.path.is_empty());
        let due = self
            .last_request
            .is_none_or(|t| now.since(t) >= self.config.motion.retry_ticks);
        (waiting && due).then_some(ReplanReason::Retry)
    }

    // ── Planning hand-off ─────────────────────────────────────────────────

    /// Accept a plan trigger at tick `now` and snapshot the request in
    /// planning units.  When the target moved, every path-following boat's
    /// ring slot is first recomputed around its new position.
    ///
    /// Keep-out circles cover the target's zone, docked boats, and every
    /// grid cell painted by a boat that is not part of the request.
    pub fn begin_plan(&mut self, now: Tick, reason: ReplanReason) -> PlanRequest {
        if reason == ReplanReason::TargetMoved {
            let ring = self.ring_slots();
            for (boat, slot) in self.fleet.iter_mut().zip(ring) {
                if boat.state == MotionState::PathFollowing {
                    boat.destination = slot;
                }
            }
        }
        self.planned_target = Some(self.target.point());
        self.last_request = Some(now);

        let scale = self.config.planner.planning_scale;
        let mut agents = Vec::new();
        for boat in self.fleet.iter_mut().filter(|b| b.state == MotionState::PathFollowing) {
            let Some(goal) = boat.destination else {
                continue;
            };
            boat.plan_goal = Some(goal);
            agents.push(AgentPlanRequest {
                id:            boat.id,
                start:         boat.pos * scale,
                start_heading: boat.heading,
                goal:          goal.point() * scale,
            });
        }

        let zone = self.target.keep_out();
        let mut keep_out = vec![Circle::new(zone.center * scale, zone.radius * scale)];
        keep_out.extend(
            self.fleet
                .iter()
                .filter(|b| b.state == MotionState::Docked)
                .map(|b| Circle::new(b.pos * scale, b.semi_major * scale)),
        );
        keep_out.extend(self.foreign_cells(&agents).map(|c| Circle::new(c.center * scale, c.radius * scale)));
        PlanRequest { agents, keep_out }
    }

    /// Install finalized paths.  Only boats still path following toward the
    /// destination they were planned for take a path; the rest keep their
    /// state and wait for a retry.  An empty path leaves the boat holding.
    /// Returns the number of boats that received a path.
    pub fn apply_plan(&mut self, response: &PlanResponse) -> usize {
        let to_world = 1.0 / self.config.planner.planning_scale;
        let mut applied = 0usize;
        for boat in self.fleet.iter_mut().filter(|b| b.state == MotionState::PathFollowing) {
            let Some(planned) = response.get(&boat.id) else {
                continue;
            };
            if boat.plan_goal.is_none() || boat.plan_goal != boat.destination {
                tracing::debug!(agent = %boat.id, "Stale path dropped: destination changed since request");
                continue;
            }
            if planned.is_empty() {
                tracing::warn!(agent = %boat.id, iterations = planned.diagnostics.iterations, "No path found; holding for retry");
                boat.clear_path();
                boat.hold();
                continue;
            }
            boat.path = planned.clone().scaled(to_world).waypoints;
            // Waypoint 0 is the start cell.
            boat.cursor = 1.min(boat.path.len() - 1);
            applied += 1;
        }
        applied
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Minimal distance to the target among approaching boats; ties go to
    /// the lower `AgentId`.
    fn choose_lead(&self) -> Option<AgentId> {
        let target = self.target.point();
        self.fleet
            .iter()
            .filter(|b| b.state == MotionState::DirectApproach)
            .map(|b| (b.pos.distance(target), b.id))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, id)| id)
    }

    /// Grid cells painted by boats outside `agents`, as circles covering
    /// each cell, in world units.  Lets the planner avoid boats it does not
    /// move, whatever drives them.
    fn foreign_cells<'a>(&'a self, agents: &'a [AgentPlanRequest]) -> impl Iterator<Item = Circle> + 'a {
        let half_diagonal = self.grid.cell_size() * std::f64::consts::FRAC_1_SQRT_2;
        self.grid
            .blocked_cells(None)
            .filter(move |&cell| match self.grid.state(cell) {
                CellState::Agent(id) => agents.iter().all(|a| a.id != id),
                _ => false,
            })
            .map(move |cell| Circle::new(self.grid.center_of(cell), half_diagonal))
    }

    /// `base_speed` from the lead toward the target, or zero without a lead.
    fn lead_velocity(&self) -> Vec2 {
        self.lead
            .and_then(|id| self.fleet.get(id).ok())
            .map(|lead| (self.target.point() - lead.pos).normalize_or_zero() * lead.base_speed)
            .unwrap_or(Vec2::ZERO)
    }

    /// Ring slot of every boat, indexed by `AgentId`:
    /// `target + ring_radius · (sin θᵢ, cos θᵢ)` with `θᵢ = 360° · i / N`.
    fn ring_slots(&self) -> Vec<Option<Destination>> {
        let n = self.fleet.len().max(1) as f64;
        let center = self.target.point();
        let radius = self.config.motion.ring_radius;
        (0..self.fleet.len())
            .map(|i| {
                let theta = 360.0 * i as f64 / n;
                Destination::try_from(center + Vec2::from_heading(theta) * radius).ok()
            })
            .collect()
    }
}

// ── Path following ────────────────────────────────────────────────────────────

enum PathStep {
    Hold,
    Steer(Vec2),
    Dock,
}

/// Advance `boat.cursor` past reached and backtracking waypoints and pick
/// this tick's action.
///
/// - The final waypoint counts as reached within `arrival_tolerance`.
/// - An intermediate waypoint is reached within `waypoint_tolerance`; the
///   cursor then jumps `waypoint_stride` ahead, clamped to the final one.
/// - An intermediate waypoint farther from the destination than the boat is
///   skipped.
fn follow_path(boat: &mut Boat, motion: &MotionConfig) -> PathStep {
    if boat.path.is_empty() {
        return PathStep::Hold;
    }
    let last = boat.path.len() - 1;
    let dest = boat.destination.map(Destination::point);
    loop {
        if boat.cursor > last {
            return PathStep::Dock;
        }
        let wp = boat.path[boat.cursor].pos;
        let dist = boat.pos.distance(wp);
        if boat.cursor == last {
            return if dist < motion.arrival_tolerance {
                PathStep::Dock
            } else {
                PathStep::Steer(wp)
            };
        }
        if let Some(d) = dest {
            if wp.distance(d) > boat.pos.distance(d) {
                boat.cursor += 1;
                continue;
            }
        }
        if dist < motion.waypoint_tolerance {
            boat.cursor = (boat.cursor + motion.waypoint_stride.max(1)).min(last);
            continue;
        }
        return PathStep::Steer(wp);
    }
}

/// Snap `boat` onto its destination and stop it for good.
fn dock(boat: &mut Boat, footprint: &FootprintConfig) {
    if let Some(dest) = boat.destination {
        boat.pos = dest.point();
    }
    boat.hold();
    boat.rest_footprint(footprint);
    boat.spadjust = 1.0;
    boat.clear_path();
    boat.state = MotionState::Docked;
    tracing::info!(agent = %boat.id, at = %boat.pos, "Boat docked");
}
