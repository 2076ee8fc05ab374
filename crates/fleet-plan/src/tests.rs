//! Unit tests for fleet-plan.
//!
//! Search tests use small hand-built grids with unit cells; planner tests use
//! planning-unit coordinates with the default 0.2 kernel cell.

#[cfg(test)]
mod helpers {
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;
    use std::f64::consts::SQRT_2;

    use fleet_core::Vec2;
    use fleet_grid::Cell;
    use ordered_float::OrderedFloat;

    use crate::SearchGrid;

    /// `cols × rows` unit cells anchored at the origin, nothing blocked.
    pub fn open(cols: u32, rows: u32) -> SearchGrid {
        SearchGrid::new(cols, rows, Vec2::ZERO, 1.0).unwrap()
    }

    /// Exact 8-connected shortest-path cost from every cell to `goal`.
    /// `f64::INFINITY` for unreachable or blocked cells.
    pub fn dijkstra_to(grid: &SearchGrid, goal: Cell) -> Vec<f64> {
        let cols = grid.cols() as i64;
        let n = grid.len();
        let mut dist = vec![f64::INFINITY; n];
        let idx = |c: i64, r: i64| (r * cols + c) as usize;

        dist[idx(goal.col as i64, goal.row as i64)] = 0.0;
        let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, i64, i64)>> = BinaryHeap::new();
        heap.push(Reverse((OrderedFloat(0.0), goal.col as i64, goal.row as i64)));

        while let Some(Reverse((OrderedFloat(d), c, r))) = heap.pop() {
            if d > dist[idx(c, r)] {
                continue;
            }
            for dc in -1..=1 {
                for dr in -1..=1 {
                    if dc == 0 && dr == 0 {
                        continue;
                    }
                    let (nc, nr) = (c + dc, r + dr);
                    if !grid.contains(nc, nr) || grid.is_blocked(Cell::new(nc as u32, nr as u32)) {
                        continue;
                    }
                    let step = if dc != 0 && dr != 0 { SQRT_2 } else { 1.0 };
                    if d + step < dist[idx(nc, nr)] {
                        dist[idx(nc, nr)] = d + step;
                        heap.push(Reverse((OrderedFloat(d + step), nc, nr)));
                    }
                }
            }
        }
        dist
    }
}

// ── Search grid ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod grid {
    use fleet_core::Vec2;
    use fleet_grid::{Cell, Circle};

    use super::helpers::*;
    use crate::{PlanError, SearchGrid};

    #[test]
    fn rejects_bad_dimensions() {
        assert!(matches!(SearchGrid::new(0, 4, Vec2::ZERO, 1.0), Err(PlanError::Grid(_))));
        assert!(SearchGrid::new(4, 4, Vec2::ZERO, -1.0).is_err());
    }

    #[test]
    fn block_circle_uses_cell_centers() {
        let mut g = open(10, 10);
        g.block_circle(Circle::new(Vec2::new(5.0, 5.0), 1.0));
        assert_eq!(g.blocked_count(), 4);
        assert!(g.is_blocked(Cell::new(4, 4)));
        assert!(!g.is_blocked(Cell::new(6, 5)));
    }

    #[test]
    fn from_blocked_ignores_out_of_range() {
        let g = SearchGrid::from_blocked(3, 3, Vec2::ZERO, 1.0, [Cell::new(1, 1), Cell::new(7, 7)]).unwrap();
        assert_eq!(g.blocked_count(), 1);
        assert!(!g.is_blocked(Cell::new(7, 7)));
    }

    #[test]
    fn cell_of_respects_origin() {
        let g = SearchGrid::new(10, 10, Vec2::new(-1.0, -1.0), 0.2).unwrap();
        assert_eq!(g.cell_of(Vec2::new(-1.0, -1.0)), Some(Cell::new(0, 0)));
        assert_eq!(g.cell_of(Vec2::new(0.05, -0.5)), Some(Cell::new(5, 2)));
        assert_eq!(g.cell_of(Vec2::new(1.5, 0.0)), None);
    }
}

// ── A* ──────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod astar {
    use std::f64::consts::SQRT_2;

    use fleet_core::Vec2;
    use fleet_grid::Cell;

    use super::helpers::*;
    use crate::astar::trailing_headings;
    use crate::{PathSearch, SearchGrid, SearchQuery, TimeHeadingAStar, octile};

    fn search(grid: &SearchGrid, from: Cell, to: Cell) -> crate::SearchOutcome {
        TimeHeadingAStar::default().search(grid, &SearchQuery::new(from, 0.0, to))
    }

    #[test]
    fn open_diagonal_10x10() {
        let g = open(10, 10);
        let out = search(&g, Cell::new(0, 0), Cell::new(9, 9));
        assert_eq!(out.waypoints.len(), 10);
        assert!((out.cost - 9.0 * SQRT_2).abs() < 1e-9, "cost {}", out.cost);
        for (i, w) in out.waypoints.iter().enumerate() {
            assert_eq!(w.step, i as u32);
            assert_eq!(w.pos, Vec2::new(i as f64 + 0.5, i as f64 + 0.5));
        }
        assert_eq!(out.waypoints[0].heading, 0.0);
        assert!(out.waypoints[1..].iter().all(|w| (w.heading - 45.0).abs() < 1e-9));
    }

    #[test]
    fn start_equals_goal() {
        let g = open(5, 5);
        let out = search(&g, Cell::new(2, 2), Cell::new(2, 2));
        assert_eq!(out.waypoints.len(), 1);
        assert_eq!(out.cost, 0.0);
        assert_eq!(out.expanded, 1);
    }

    #[test]
    fn solid_wall_yields_empty_path() {
        let wall = (0..10).map(|r| Cell::new(5, r));
        let g = SearchGrid::from_blocked(10, 10, Vec2::ZERO, 1.0, wall).unwrap();
        let out = search(&g, Cell::new(0, 0), Cell::new(9, 9));
        assert!(!out.found());
        assert!(out.waypoints.is_empty());
        assert!(out.expanded > 0);
    }

    #[test]
    fn wall_with_gap_routes_through_gap() {
        let wall = (0..10).filter(|&r| r != 7).map(|r| Cell::new(5, r));
        let g = SearchGrid::from_blocked(10, 10, Vec2::ZERO, 1.0, wall).unwrap();
        let out = search(&g, Cell::new(0, 0), Cell::new(9, 0));
        assert!(out.found());
        assert!(out.waypoints.iter().any(|w| w.pos == Vec2::new(5.5, 7.5)));
    }

    #[test]
    fn blocked_goal_is_unreachable() {
        let g = SearchGrid::from_blocked(6, 6, Vec2::ZERO, 1.0, [Cell::new(5, 5)]).unwrap();
        assert!(!search(&g, Cell::new(0, 0), Cell::new(5, 5)).found());
    }

    #[test]
    fn out_of_bounds_endpoints() {
        let g = open(4, 4);
        let out = search(&g, Cell::new(0, 0), Cell::new(4, 0));
        assert!(!out.found());
        assert_eq!(out.expanded, 0);
    }

    #[test]
    fn identical_queries_identical_paths() {
        let wall = (2..8).map(|r| Cell::new(4, r));
        let g = SearchGrid::from_blocked(10, 10, Vec2::ZERO, 1.0, wall).unwrap();
        let a = search(&g, Cell::new(0, 5), Cell::new(9, 5));
        let b = search(&g, Cell::new(0, 5), Cell::new(9, 5));
        assert_eq!(a, b);
    }

    #[test]
    fn moving_obstacle_forces_detour() {
        let g = open(10, 3);
        // Parked in the middle of the straight corridor for every step.
        let parked = [Vec2::new(5.5, 1.5)];
        let moving: [&[Vec2]; 1] = [&parked];
        let query = SearchQuery {
            start:         Cell::new(0, 1),
            start_heading: 90.0,
            goal:          Cell::new(9, 1),
            moving:        &moving,
            clearance:     1.0,
        };
        let out = TimeHeadingAStar::default().search(&g, &query);
        assert!(out.found());
        assert!(out.waypoints.iter().all(|w| w.pos != Vec2::new(5.5, 1.5)));
        assert!((out.cost - (7.0 + 2.0 * SQRT_2)).abs() < 1e-9, "cost {}", out.cost);

        // Without the obstacle the corridor is straight.
        let plain = search(&g, Cell::new(0, 1), Cell::new(9, 1));
        assert!((plain.cost - 9.0).abs() < 1e-9);
    }

    #[test]
    fn obstacle_only_blocks_its_own_step() {
        let g = open(10, 1);
        // Sits on cell 5 at step 2 only, then moves away past the end.
        let track = [Vec2::new(9.5, 0.5), Vec2::new(9.5, 0.5), Vec2::new(5.5, 0.5), Vec2::new(100.0, 0.5)];
        let moving: [&[Vec2]; 1] = [&track];
        let query = SearchQuery {
            start:         Cell::new(0, 0),
            start_heading: 90.0,
            goal:          Cell::new(8, 0),
            moving:        &moving,
            clearance:     0.5,
        };
        // The agent reaches cell 5 at step 5, long after the obstacle left.
        let out = TimeHeadingAStar::default().search(&g, &query);
        assert_eq!(out.waypoints.len(), 9);
    }

    #[test]
    fn start_cell_never_rejected() {
        let g = open(5, 5);
        let parked = [Vec2::new(0.5, 0.5)];
        let moving: [&[Vec2]; 1] = [&parked];
        let query = SearchQuery {
            start:         Cell::new(0, 0),
            start_heading: 0.0,
            goal:          Cell::new(4, 4),
            moving:        &moving,
            clearance:     0.9,
        };
        assert!(TimeHeadingAStar::default().search(&g, &query).found());
    }

    #[test]
    fn zero_window_keeps_raw_bearings() {
        let g = open(6, 1);
        let out = TimeHeadingAStar::new(0).search(&g, &SearchQuery::new(Cell::new(0, 0), 12.0, Cell::new(5, 0)));
        assert_eq!(out.waypoints[0].heading, 12.0);
        assert!(out.waypoints[1..].iter().all(|w| (w.heading - 90.0).abs() < 1e-9));
    }

    #[test]
    fn trailing_window_repeats_on_zero_displacement() {
        let pts = [Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0)];
        let h = trailing_headings(&pts, 1, 33.0);
        assert_eq!(h[0], 33.0);
        assert!((h[1] - 0.0).abs() < 1e-9);
        assert!((h[2] - 0.0).abs() < 1e-9);
        assert!((h[3] - 90.0).abs() < 1e-9);
    }

    #[test]
    fn octile_values() {
        assert_eq!(octile(Cell::new(0, 0), Cell::new(3, 0)), 3.0);
        assert!((octile(Cell::new(0, 0), Cell::new(3, 3)) - 3.0 * SQRT_2).abs() < 1e-12);
        assert!((octile(Cell::new(0, 0), Cell::new(4, 1)) - (3.0 + SQRT_2)).abs() < 1e-12);
    }
}

// ── Heuristic properties ────────────────────────────────────────────────────────

#[cfg(test)]
mod heuristic {
    use fleet_core::Vec2;
    use fleet_grid::Cell;
    use proptest::prelude::*;

    use super::helpers::*;
    use crate::{PathSearch, SearchGrid, SearchQuery, TimeHeadingAStar, octile};

    const N: u32 = 12;

    fn scenario() -> impl Strategy<Value = (Vec<bool>, (u32, u32), (u32, u32))> {
        (
            proptest::collection::vec(proptest::bool::weighted(0.25), (N * N) as usize),
            (0..N, 0..N),
            (0..N, 0..N),
        )
    }

    fn build(bits: &[bool], start: Cell, goal: Cell) -> SearchGrid {
        let cells = bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(|(i, _)| Cell::new(i as u32 % N, i as u32 / N))
            .filter(|c| *c != start && *c != goal);
        SearchGrid::from_blocked(N, N, Vec2::ZERO, 1.0, cells).unwrap()
    }

    proptest! {
        #[test]
        fn octile_never_overestimates((bits, s, t) in scenario()) {
            let (start, goal) = (Cell::new(s.0, s.1), Cell::new(t.0, t.1));
            let grid = build(&bits, start, goal);
            let dist = dijkstra_to(&grid, goal);
            for (i, d) in dist.iter().enumerate() {
                if d.is_finite() {
                    let c = Cell::new(i as u32 % N, i as u32 / N);
                    prop_assert!(octile(c, goal) <= d + 1e-9);
                }
            }
        }

        #[test]
        fn astar_cost_matches_exact_shortest_path((bits, s, t) in scenario()) {
            let (start, goal) = (Cell::new(s.0, s.1), Cell::new(t.0, t.1));
            let grid = build(&bits, start, goal);
            let exact = dijkstra_to(&grid, goal)[(start.row * N + start.col) as usize];
            let out = TimeHeadingAStar::default().search(&grid, &SearchQuery::new(start, 0.0, goal));
            if exact.is_finite() {
                prop_assert!(out.found());
                prop_assert!((out.cost - exact).abs() < 1e-9);
            } else {
                prop_assert!(!out.found());
            }
        }
    }
}

// ── Smoothing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod smooth {
    use fleet_core::{Smoothing, Vec2, Waypoint};

    use crate::PathSmoother;
    use crate::smooth::{forward_headings, moving_average, spline};

    fn zigzag(n: usize) -> Vec<Vec2> {
        (0..n).map(|i| Vec2::new(i as f64, if i % 2 == 0 { 0.0 } else { 1.0 })).collect()
    }

    fn line(n: usize) -> Vec<Vec2> {
        (0..n).map(|i| Vec2::new(i as f64, 2.0 * i as f64)).collect()
    }

    fn amplitude(points: &[Vec2]) -> f64 {
        let inner = &points[2..points.len() - 2];
        let max = inner.iter().map(|p| p.y).fold(f64::MIN, f64::max);
        let min = inner.iter().map(|p| p.y).fold(f64::MAX, f64::min);
        max - min
    }

    #[test]
    fn moving_average_short_path_unchanged() {
        let pts = zigzag(3);
        assert_eq!(moving_average(&pts, 4), pts);
    }

    #[test]
    fn moving_average_preserves_length_and_damps() {
        let pts = zigzag(12);
        let out = moving_average(&pts, 4);
        assert_eq!(out.len(), pts.len());
        assert!(amplitude(&out) < amplitude(&pts));
    }

    #[test]
    fn moving_average_keeps_interior_of_a_line() {
        let pts = line(10);
        let out = moving_average(&pts, 4);
        for i in 2..8 {
            assert!((out[i].x - pts[i].x).abs() < 1e-12);
            assert!((out[i].y - pts[i].y).abs() < 1e-12);
        }
    }

    #[test]
    fn spline_reproduces_a_line() {
        let pts = line(15);
        let out = spline(&pts, 5.0);
        assert_eq!(out.len(), pts.len());
        for (a, b) in out.iter().zip(&pts) {
            assert!(a.distance(*b) < 1e-6, "{a} vs {b}");
        }
    }

    #[test]
    fn spline_damps_zigzag() {
        let pts = zigzag(20);
        let out = spline(&pts, 5.0);
        assert_eq!(out.len(), pts.len());
        assert!(amplitude(&out) < 0.5 * amplitude(&pts));
    }

    #[test]
    fn spline_short_path_unchanged() {
        let pts = zigzag(2);
        assert_eq!(spline(&pts, 1.0), pts);
    }

    #[test]
    fn forward_heading_rules() {
        assert_eq!(forward_headings(&[]), Vec::<f64>::new());
        assert_eq!(forward_headings(&[Vec2::new(3.0, 3.0)]), vec![0.0]);
        let h = forward_headings(&[Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(1.0, -1.0)]);
        assert!((h[0] - 90.0).abs() < 1e-9);
        assert!((h[1] - 180.0).abs() < 1e-9);
        assert_eq!(h[2], h[1]);
    }

    #[test]
    fn smoother_keeps_steps_and_recomputes_headings() {
        let path: Vec<Waypoint> = zigzag(10)
            .into_iter()
            .enumerate()
            .map(|(i, p)| Waypoint::new(p, i as u32, 0.0))
            .collect();
        let out = PathSmoother::new(Smoothing::MovingAverage { window: 4 }).smooth(&path);
        assert_eq!(out.len(), path.len());
        assert!(out.iter().enumerate().all(|(i, w)| w.step == i as u32));
        assert!(out[..9].iter().all(|w| w.heading > 0.0 && w.heading < 180.0));

        let same = PathSmoother::new(Smoothing::None).smooth(&path);
        assert_eq!(same, path);
    }
}

// ── Conflict test ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod conflict {
    use fleet_core::Vec2;

    use crate::{first_conflict, paths_conflict, position_at_step};

    fn straight(from: Vec2, step: Vec2, n: usize) -> Vec<Vec2> {
        (0..n).map(|i| from + step * i as f64).collect()
    }

    #[test]
    fn crossing_at_shared_index_conflicts() {
        let a = straight(Vec2::new(0.0, 5.0), Vec2::new(1.0, 0.0), 11);
        let b = straight(Vec2::new(5.0, 0.0), Vec2::new(0.0, 1.0), 11);
        assert!(paths_conflict(&a, &b, 1.0));
        assert_eq!(first_conflict(&a, &b, 1.0), Some(5));
    }

    #[test]
    fn parallel_paths_apart_do_not_conflict() {
        let a = straight(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), 10);
        let b = straight(Vec2::new(0.0, 1.5), Vec2::new(1.0, 0.0), 10);
        assert!(!paths_conflict(&a, &b, 1.0));
        // Exactly at the safety distance is not a conflict.
        let c = straight(Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0), 10);
        assert!(!paths_conflict(&a, &c, 1.0));
    }

    #[test]
    fn shorter_path_is_held_at_its_end() {
        let parked = vec![Vec2::new(0.0, 0.0), Vec2::new(5.0, 0.0)];
        let passing = straight(Vec2::new(0.0, 3.0), Vec2::new(1.0, -0.5), 8);
        // passing reaches (6, 0) at step 6, 1 unit from the parked end.
        assert_eq!(position_at_step(&parked, 6), Some(Vec2::new(5.0, 0.0)));
        assert!(paths_conflict(&parked, &passing, 1.5));
    }

    #[test]
    fn empty_paths_never_conflict() {
        let a = vec![Vec2::ZERO];
        assert!(!paths_conflict(&a, &[], 10.0));
        assert_eq!(position_at_step(&[], 3), None);
    }
}

// ── Multi-agent planner ─────────────────────────────────────────────────────────

#[cfg(test)]
mod multi {
    use fleet_core::{AgentId, PlannerConfig, Smoothing, Vec2};
    use fleet_grid::Circle;

    use crate::{AgentPlanRequest, MultiAgentPlanner, PlanError, PlanRequest, paths_conflict};

    fn agent(id: u32, start: (f64, f64), goal: (f64, f64)) -> AgentPlanRequest {
        AgentPlanRequest {
            id:            AgentId(id),
            start:         Vec2::new(start.0, start.1),
            start_heading: 0.0,
            goal:          Vec2::new(goal.0, goal.1),
        }
    }

    fn raw_config() -> PlannerConfig {
        PlannerConfig { smoothing: Smoothing::None, ..PlannerConfig::default() }
    }

    /// Agent 0 runs east along y = 5, agent 1 runs north along x = 5; both
    /// reach (5.1, 5.1) at step 25.
    fn crossing() -> PlanRequest {
        PlanRequest {
            agents:   vec![agent(1, (5.0, 0.0), (5.0, 8.0)), agent(0, (0.0, 5.0), (10.0, 5.0))],
            keep_out: vec![],
        }
    }

    #[test]
    fn empty_request_empty_response() {
        let planner = MultiAgentPlanner::new(PlannerConfig::default());
        assert!(planner.plan(&PlanRequest::default()).unwrap().is_empty());
    }

    #[test]
    fn single_agent_open_water() {
        let planner = MultiAgentPlanner::new(raw_config());
        let req = PlanRequest { agents: vec![agent(3, (0.0, 0.0), (4.0, 3.0))], keep_out: vec![] };
        let resp = planner.plan(&req).unwrap();
        let p = &resp[&AgentId(3)];
        let d = &p.diagnostics;
        assert!(d.found && d.converged);
        assert_eq!(d.iterations, 1);
        assert!(d.interfering.is_empty());
        let last = p.waypoints.last().unwrap().pos;
        assert!(last.distance(Vec2::new(4.0, 3.0)) < 0.2);
    }

    #[test]
    fn longest_agent_planned_first() {
        let planner = MultiAgentPlanner::new(raw_config());
        let resp = planner.plan(&crossing()).unwrap();
        let long = &resp[&AgentId(0)].diagnostics;
        let short = &resp[&AgentId(1)].diagnostics;
        assert_eq!(long.iterations, 1);
        assert!(long.interfering.is_empty());
        assert_eq!(short.interfering, vec![AgentId(0)]);
        assert!(short.iterations >= 2);
    }

    #[test]
    fn resolved_paths_keep_safe_distance() {
        let cfg = raw_config();
        let planner = MultiAgentPlanner::new(cfg.clone());
        let resp = planner.plan(&crossing()).unwrap();
        let a: Vec<Vec2> = resp[&AgentId(0)].positions().collect();
        let b: Vec<Vec2> = resp[&AgentId(1)].positions().collect();
        assert!(resp[&AgentId(1)].diagnostics.converged);
        assert!(!paths_conflict(&a, &b, cfg.safe_distance));
    }

    #[test]
    fn iteration_cap_finalizes_unconverged() {
        let cfg = PlannerConfig { max_iterations: 1, ..raw_config() };
        let resp = MultiAgentPlanner::new(cfg).plan(&crossing()).unwrap();
        let short = &resp[&AgentId(1)];
        assert_eq!(short.diagnostics.iterations, 1);
        assert!(!short.diagnostics.converged);
        assert!(short.diagnostics.found);
        assert!(!short.is_empty());
    }

    #[test]
    fn same_snapshot_same_plan() {
        let planner = MultiAgentPlanner::new(PlannerConfig::default());
        let req = PlanRequest {
            agents: vec![
                agent(0, (0.0, 0.0), (12.0, 9.0)),
                agent(1, (12.0, 0.0), (0.0, 9.0)),
                agent(2, (6.0, -2.0), (6.0, 11.0)),
            ],
            keep_out: vec![Circle::new(Vec2::new(6.0, 4.5), 1.5)],
        };
        assert_eq!(planner.plan(&req).unwrap(), planner.plan(&req).unwrap());
    }

    #[test]
    fn goal_inside_keep_out_has_no_path() {
        let planner = MultiAgentPlanner::new(raw_config());
        let req = PlanRequest {
            agents:   vec![agent(0, (0.0, 0.0), (5.0, 5.0)), agent(1, (0.0, 8.0), (3.0, 8.0))],
            keep_out: vec![Circle::new(Vec2::new(5.0, 5.0), 1.0)],
        };
        let resp = planner.plan(&req).unwrap();
        let stuck = &resp[&AgentId(0)];
        assert!(stuck.is_empty());
        assert!(!stuck.diagnostics.found);
        assert!(resp[&AgentId(1)].diagnostics.found);
    }

    #[test]
    fn keep_out_is_avoided() {
        let planner = MultiAgentPlanner::new(raw_config());
        let zone = Circle::new(Vec2::new(5.0, 0.0), 2.0);
        let req = PlanRequest { agents: vec![agent(0, (0.0, 0.0), (10.0, 0.0))], keep_out: vec![zone] };
        let resp = planner.plan(&req).unwrap();
        let p = &resp[&AgentId(0)];
        assert!(p.diagnostics.found);
        assert!(p.positions().all(|pos| !zone.contains(pos)));
    }

    #[test]
    fn invalid_requests_rejected() {
        let planner = MultiAgentPlanner::new(PlannerConfig::default());
        let dup = PlanRequest { agents: vec![agent(0, (0.0, 0.0), (1.0, 1.0)); 2], keep_out: vec![] };
        assert!(matches!(planner.plan(&dup), Err(PlanError::InvalidRequest(_))));

        let nan = PlanRequest { agents: vec![agent(0, (f64::NAN, 0.0), (1.0, 1.0))], keep_out: vec![] };
        assert!(matches!(planner.plan(&nan), Err(PlanError::InvalidRequest(_))));

        let zone = PlanRequest {
            agents:   vec![agent(0, (0.0, 0.0), (1.0, 1.0))],
            keep_out: vec![Circle::new(Vec2::ZERO, -1.0)],
        };
        assert!(planner.plan(&zone).is_err());
    }

    #[test]
    fn oversized_grid_rejected() {
        let cfg = PlannerConfig { grid_scale: 0.001, ..PlannerConfig::default() };
        let req = PlanRequest { agents: vec![agent(0, (0.0, 0.0), (100.0, 100.0))], keep_out: vec![] };
        assert!(matches!(MultiAgentPlanner::new(cfg).plan(&req), Err(PlanError::GridTooLarge { .. })));
    }

    #[test]
    fn smoothing_preserves_waypoint_count() {
        let raw = MultiAgentPlanner::new(raw_config()).plan(&crossing()).unwrap();
        let smooth_cfg = PlannerConfig { smoothing: Smoothing::Spline { factor: 0.5 }, ..PlannerConfig::default() };
        let smoothed = MultiAgentPlanner::new(smooth_cfg).plan(&crossing()).unwrap();
        for id in [AgentId(0), AgentId(1)] {
            assert_eq!(raw[&id].waypoints.len(), smoothed[&id].waypoints.len());
        }
    }

    #[test]
    fn scaled_converts_units() {
        let planner = MultiAgentPlanner::new(raw_config());
        let req = PlanRequest { agents: vec![agent(0, (0.0, 0.0), (2.0, 0.0))], keep_out: vec![] };
        let p = planner.plan(&req).unwrap().remove(&AgentId(0)).unwrap();
        let first = p.waypoints[0].pos;
        let scaled = p.scaled(20.0);
        assert_eq!(scaled.waypoints[0].pos, first * 20.0);
    }
}
