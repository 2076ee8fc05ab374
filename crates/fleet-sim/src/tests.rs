//! Integration tests for fleet-sim.

use std::io::Cursor;
use std::time::{Duration, Instant};

use fleet_core::{AgentId, Destination, FleetConfig, PlanId, Tick, Vec2};
use fleet_motion::{Boat, MotionCommand, MotionError, MotionState, ReplanReason, Target};
use fleet_plan::{
    AgentPlanRequest, MultiAgentPlanner, PathSearch, PlanError, PlanRequest, PlanResponse, SearchGrid,
    SearchOutcome, SearchQuery,
};

use crate::{
    NoopObserver, PlanFailure, PlanWorker, SimBuilder, SimError, SimObserver, TickSummary, load_fleet_reader,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(total_ticks: u64) -> FleetConfig {
    let mut config = FleetConfig::default();
    config.sim.total_ticks = total_ticks;
    config
}

fn two_boats(config: &FleetConfig) -> Vec<Boat> {
    vec![
        Boat::new(AgentId(0), Vec2::new(300.0, 400.0), 2.0, &config.footprint),
        Boat::new(AgentId(1), Vec2::new(100.0, 400.0), 2.0, &config.footprint),
    ]
}

fn target(config: &FleetConfig) -> Target {
    Target::new(Destination::new(600.0, 400.0).unwrap(), &config.target)
}

/// Planning-unit request for two agents far apart.
fn small_request() -> PlanRequest {
    PlanRequest {
        agents: vec![
            AgentPlanRequest {
                id:            AgentId(0),
                start:         Vec2::new(0.0, 0.0),
                start_heading: 0.0,
                goal:          Vec2::new(4.0, 0.0),
            },
            AgentPlanRequest {
                id:            AgentId(1),
                start:         Vec2::new(0.0, 6.0),
                start_heading: 0.0,
                goal:          Vec2::new(4.0, 6.0),
            },
        ],
        keep_out: Vec::new(),
    }
}

#[derive(Debug)]
struct ExplodingSearch;

impl PathSearch for ExplodingSearch {
    fn search(&self, _grid: &SearchGrid, _query: &SearchQuery<'_>) -> SearchOutcome {
        panic!("search exploded")
    }
}

/// Observer that records every hook.
#[derive(Default)]
struct Recorder {
    starts:    u64,
    ends:      u64,
    snapshots: Vec<Tick>,
    requested: Vec<(Tick, PlanId, ReplanReason)>,
    applied:   Vec<(Tick, PlanId)>,
    failed:    Vec<(Tick, PlanFailure)>,
    sim_end:   Vec<Tick>,
    last:      TickSummary,
}

impl SimObserver for Recorder {
    fn on_tick_start(&mut self, _tick: Tick) {
        self.starts += 1;
    }
    fn on_tick_end(&mut self, _tick: Tick, summary: &TickSummary) {
        self.ends += 1;
        self.last = *summary;
    }
    fn on_snapshot(&mut self, tick: Tick, _boats: &[Boat], _target: &Target) {
        self.snapshots.push(tick);
    }
    fn on_plan_requested(&mut self, tick: Tick, id: PlanId, reason: ReplanReason) {
        self.requested.push((tick, id, reason));
    }
    fn on_plan_applied(&mut self, tick: Tick, id: PlanId, _response: &PlanResponse) {
        self.applied.push((tick, id));
    }
    fn on_plan_failed(&mut self, tick: Tick, _id: PlanId, failure: &PlanFailure) {
        self.failed.push((tick, failure.clone()));
    }
    fn on_sim_end(&mut self, final_tick: Tick) {
        self.sim_end.push(final_tick);
    }
}

// ── Scenario loader ───────────────────────────────────────────────────────────

#[cfg(test)]
mod scenario {
    use super::*;

    fn load(csv: &str) -> Result<Vec<Boat>, SimError> {
        load_fleet_reader(Cursor::new(csv.to_owned()), &FleetConfig::default())
    }

    #[test]
    fn rows_in_any_order() {
        let boats = load("agent_id,x,y,base_speed\n1,10,20,1.5\n0,0,0,2\n").unwrap();
        assert_eq!(boats.len(), 2);
        assert_eq!(boats[0].id, AgentId(0));
        assert_eq!(boats[0].pos, Vec2::ZERO);
        assert_eq!(boats[1].pos, Vec2::new(10.0, 20.0));
        assert_eq!(boats[1].base_speed, 1.5);
        assert!(boats.iter().all(|b| b.state == MotionState::Idle));
    }

    #[test]
    fn blank_speed_takes_config_default() {
        let mut config = FleetConfig::default();
        config.motion.base_speed = 3.25;
        let boats = load_fleet_reader(Cursor::new("agent_id,x,y,base_speed\n0,1,1,\n1,2,2,1.5\n"), &config).unwrap();
        assert_eq!(boats[0].base_speed, 3.25);
        assert_eq!(boats[1].base_speed, 1.5);

        let boats = load_fleet_reader(Cursor::new("agent_id,x,y\n0,1,1\n"), &config).unwrap();
        assert_eq!(boats[0].base_speed, 3.25);
    }

    #[test]
    fn gap_in_ids_rejected() {
        let err = load("agent_id,x,y,base_speed\n0,0,0,2\n2,1,1,2\n").unwrap_err();
        assert!(matches!(err, SimError::Scenario(_)), "{err}");
    }

    #[test]
    fn duplicate_id_rejected() {
        let err = load("agent_id,x,y,base_speed\n0,0,0,2\n0,1,1,2\n").unwrap_err();
        assert!(matches!(err, SimError::Scenario(_)));
    }

    #[test]
    fn non_finite_position_rejected() {
        let err = load("agent_id,x,y,base_speed\n0,NaN,0,2\n").unwrap_err();
        assert!(matches!(err, SimError::Scenario(_)));
    }

    #[test]
    fn negative_speed_rejected() {
        let err = load("agent_id,x,y,base_speed\n0,0,0,-1\n").unwrap_err();
        assert!(matches!(err, SimError::Scenario(_)));
    }

    #[test]
    fn malformed_number_rejected() {
        let err = load("agent_id,x,y,base_speed\n0,abc,0,2\n").unwrap_err();
        assert!(matches!(err, SimError::Scenario(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = crate::load_fleet_csv(
            std::path::Path::new("/definitely/not/here/fleet.csv"),
            &FleetConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
    }
}

// ── Planner worker ────────────────────────────────────────────────────────────

#[cfg(test)]
mod worker {
    use super::*;

    fn worker() -> PlanWorker {
        PlanWorker::new(MultiAgentPlanner::new(FleetConfig::default().planner))
    }

    #[test]
    fn submit_then_wait_delivers_once() {
        let mut w = worker();
        let id = w.submit(small_request(), Tick(3)).unwrap();
        assert_eq!(id, PlanId(0));
        assert!(w.is_busy());
        assert_eq!(w.in_flight(), Some(id));

        let outcome = w.wait().unwrap();
        assert_eq!(outcome.id, id);
        assert_eq!(outcome.requested_at, Tick(3));
        let response = outcome.result.unwrap();
        assert_eq!(response.len(), 2);
        assert!(response.values().all(|p| p.diagnostics.found));

        assert!(!w.is_busy());
        assert!(w.wait().is_none());
        assert!(w.poll().is_none());
    }

    #[test]
    fn busy_worker_drops_new_requests() {
        let mut w = worker();
        assert!(w.submit(small_request(), Tick(0)).is_some());
        assert!(w.submit(small_request(), Tick(1)).is_none());
        let outcome = w.wait().unwrap();
        assert_eq!(outcome.requested_at, Tick(0));

        // Ids keep counting after the mailbox frees up.
        assert_eq!(w.submit(small_request(), Tick(2)), Some(PlanId(1)));
        w.wait();
    }

    #[test]
    fn poll_never_blocks_and_eventually_delivers() {
        let mut w = worker();
        w.submit(small_request(), Tick(0));
        let deadline = Instant::now() + Duration::from_secs(30);
        let outcome = loop {
            if let Some(o) = w.poll() {
                break o;
            }
            assert!(Instant::now() < deadline, "plan never landed");
            std::thread::sleep(Duration::from_millis(1));
        };
        assert!(outcome.result.is_ok());
        assert!(w.poll().is_none());
    }

    #[test]
    fn planner_panic_becomes_failure() {
        let planner = MultiAgentPlanner::with_search(ExplodingSearch, FleetConfig::default().planner);
        let mut w = PlanWorker::new(planner);
        w.submit(small_request(), Tick(0));
        let outcome = w.wait().unwrap();
        assert_eq!(outcome.result.unwrap_err(), PlanFailure::Panicked("search exploded".into()));
        assert!(!w.is_busy());
    }

    #[test]
    fn invalid_request_becomes_failure() {
        let mut w = worker();
        let mut req = small_request();
        req.agents[1].id = AgentId(0);
        w.submit(req, Tick(0));
        let failure = w.wait().unwrap().result.unwrap_err();
        assert!(matches!(failure, PlanFailure::Planner(PlanError::InvalidRequest(_))));
    }
}

// ── Tick loop ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run {
    use super::*;

    #[test]
    fn runs_to_total_ticks() {
        let config = test_config(10);
        let mut sim = SimBuilder::new(config.clone(), two_boats(&config), target(&config))
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        assert_eq!(sim.clock.current_tick, Tick(10));
        assert_eq!(rec.starts, 10);
        assert_eq!(rec.ends, 10);
        assert_eq!(rec.sim_end, vec![Tick(10)]);
        // Never started: nothing moves, nothing is planned.
        assert!(rec.requested.is_empty());
        assert_eq!(rec.last.idle, 2);
    }

    #[test]
    fn run_ticks_advances_clock() {
        let config = test_config(100);
        let mut sim = SimBuilder::new(config.clone(), two_boats(&config), target(&config))
            .build()
            .unwrap();
        sim.run_ticks(5, &mut NoopObserver).unwrap();
        assert_eq!(sim.clock.current_tick, Tick(5));
        sim.run_ticks(3, &mut NoopObserver).unwrap();
        assert_eq!(sim.clock.current_tick, Tick(8));
    }

    #[test]
    fn snapshots_follow_interval() {
        let mut config = test_config(20);
        config.sim.snapshot_interval = 5;
        let mut sim = SimBuilder::new(config.clone(), two_boats(&config), target(&config))
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        assert_eq!(rec.snapshots, vec![Tick(0), Tick(5), Tick(10), Tick(15)]);
    }

    #[test]
    fn invalid_config_fails_build() {
        let mut config = test_config(10);
        config.world.cell_size = 0.0;
        let result = SimBuilder::new(config.clone(), two_boats(&config), target(&config)).build();
        assert!(matches!(result, Err(SimError::Motion(MotionError::Core(_)))));
    }

    #[test]
    fn rejected_command_surfaces_error() {
        let config = test_config(10);
        let mut sim = SimBuilder::new(config.clone(), two_boats(&config), target(&config))
            .build()
            .unwrap();
        let err = sim
            .command(MotionCommand::Dock { agent: AgentId(5), at: None })
            .unwrap_err();
        assert!(matches!(err, SimError::Motion(MotionError::UnknownAgent(AgentId(5)))));
    }

    #[test]
    fn tick_summary_all_docked() {
        let done = TickSummary { docked: 3, ..TickSummary::default() };
        assert!(done.all_docked());
        let not_yet = TickSummary { docked: 2, following: 1, ..TickSummary::default() };
        assert!(!not_yet.all_docked());
        assert!(!TickSummary::default().all_docked());
    }
}

// ── Convergence ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod convergence {
    use super::*;

    fn lockstep_sim(total: u64) -> crate::Sim {
        let config = test_config(total);
        SimBuilder::new(config.clone(), two_boats(&config), target(&config))
            .started()
            .lockstep(true)
            .build()
            .unwrap()
    }

    #[test]
    fn fleet_docks_on_ring() {
        let mut sim = lockstep_sim(1500);
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        assert_eq!(rec.requested.first().map(|r| (r.0, r.2)), Some((Tick(0), ReplanReason::Activated)));
        assert_eq!(rec.applied.first(), Some(&(Tick(1), PlanId(0))));
        assert!(rec.failed.is_empty());
        assert!(rec.last.all_docked());

        let slots = [Vec2::new(600.0, 700.0), Vec2::new(600.0, 100.0)];
        for (b, slot) in sim.engine.boats().iter().zip(slots) {
            assert_eq!(b.state, MotionState::Docked);
            assert!(b.pos.distance(slot) < 1e-9);
        }
    }

    #[test]
    fn lockstep_runs_are_reproducible() {
        let mut a = lockstep_sim(400);
        let mut b = lockstep_sim(400);
        a.run(&mut NoopObserver).unwrap();
        b.run(&mut NoopObserver).unwrap();
        assert_eq!(a.engine.boats(), b.engine.boats());
    }

    #[test]
    fn wait_for_plan_installs_in_flight_plan() {
        let config = test_config(100);
        let mut sim = SimBuilder::new(config.clone(), two_boats(&config), target(&config))
            .started()
            .build()
            .unwrap();
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert!(sim.is_planning());

        let mut rec = Recorder::default();
        assert!(sim.wait_for_plan(&mut rec));
        assert!(!sim.is_planning());
        assert_eq!(rec.applied.len(), 1);
        assert!(sim.engine.boats().iter().all(|b| !b.path.is_empty()));
        assert!(!sim.wait_for_plan(&mut rec));
    }

    #[test]
    fn planner_failure_leaves_boats_holding_and_retries() {
        let config = test_config(60);
        let mut sim = SimBuilder::new(config.clone(), two_boats(&config), target(&config))
            .search(ExplodingSearch)
            .started()
            .lockstep(true)
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        // Request at tick 0, retry once retry_ticks (50) have passed.
        let reasons: Vec<_> = rec.requested.iter().map(|r| (r.0, r.2)).collect();
        assert_eq!(reasons, vec![(Tick(0), ReplanReason::Activated), (Tick(50), ReplanReason::Retry)]);
        assert_eq!(rec.failed.len(), 2);
        assert!(matches!(rec.failed[0].1, PlanFailure::Panicked(_)));
        assert!(rec.applied.is_empty());

        // At most one direct-approach step before activation, then held.
        let b0 = sim.engine.boat(AgentId(0)).unwrap();
        assert_eq!(b0.state, MotionState::PathFollowing);
        assert!(b0.pos.x > 300.0 && b0.pos.x <= 302.0 + 1e-9);
        assert_eq!(b0.pos.y, 400.0);
        assert_eq!(b0.velocity, Vec2::ZERO);
    }
}
