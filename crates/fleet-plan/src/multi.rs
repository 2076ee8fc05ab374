//! Sequential multi-agent planning with pairwise conflict resolution.
//!
//! # Algorithm
//!
//! 1. Agents are ordered by straight-line start→goal distance, longest first
//!    (stable, so ties keep request order).
//! 2. Each agent is planned alone on the static grid.  Its path is tested
//!    against every already-finalized path; each conflicting agent joins the
//!    agent's *interfering set*.
//! 3. While the last pass found new conflicts, the agent is re-planned with
//!    the whole interfering set as moving obstacles and re-tested against the
//!    finalized agents not yet interfering.
//! 4. The path is finalized.  After `max_iterations` passes it is finalized
//!    anyway and flagged `converged = false`.
//! 5. Once every agent is finalized, one smoothing pass runs over all paths.
//!
//! The result is greedy, not optimal: an earlier agent never yields to a
//! later one.
//!
//! # Units
//!
//! Requests and responses are in *planning units*.  Callers scale world
//! coordinates by `PlannerConfig::planning_scale` on the way in and divide on
//! the way out (see [`PlannedPath::scaled`]).

use std::collections::{BTreeMap, BTreeSet};

use fleet_core::{AgentId, PlannerConfig, Vec2, Waypoint};
use fleet_grid::Circle;

use crate::astar::{PathSearch, SearchGrid, SearchQuery, TimeHeadingAStar};
use crate::conflict::paths_conflict;
use crate::smooth::PathSmoother;
use crate::{PlanError, PlanResult};

/// Upper bound on kernel-grid cells for one request.
pub const MAX_GRID_CELLS: u64 = 4_000_000;

// ── Request / response ────────────────────────────────────────────────────────

/// Start and goal of one agent, in planning units.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentPlanRequest {
    pub id:            AgentId,
    pub start:         Vec2,
    pub start_heading: f64,
    pub goal:          Vec2,
}

impl AgentPlanRequest {
    #[inline]
    pub fn span(&self) -> f64 {
        self.start.distance(self.goal)
    }
}

/// Immutable snapshot handed to the planner.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanRequest {
    pub agents:   Vec<AgentPlanRequest>,
    /// Zones blocked for every agent (the target's defended circle).
    pub keep_out: Vec<Circle>,
}

/// How one agent's plan came about.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanDiagnostics {
    /// Search passes run for this agent (≥ 1).
    pub iterations:  usize,
    /// Finalized agents treated as moving obstacles, in the order they were added.
    pub interfering: Vec<AgentId>,
    /// States expanded across all passes.
    pub expanded:    usize,
    /// `false` when the last pass found no path.
    pub found:       bool,
    /// `false` when the iteration cap ended the conflict loop.
    pub converged:   bool,
}

/// One agent's finalized plan.  `waypoints` is empty when no path was found.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannedPath {
    pub waypoints:   Vec<Waypoint>,
    pub diagnostics: PlanDiagnostics,
}

impl PlannedPath {
    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.waypoints.iter().map(|w| w.pos)
    }

    pub fn headings(&self) -> impl Iterator<Item = f64> + '_ {
        self.waypoints.iter().map(|w| w.heading)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// The same path with every position multiplied by `factor`.
    pub fn scaled(mut self, factor: f64) -> Self {
        for w in &mut self.waypoints {
            w.pos = w.pos * factor;
        }
        self
    }
}

/// Finalized paths keyed by agent.
pub type PlanResponse = BTreeMap<AgentId, PlannedPath>;

// ── MultiAgentPlanner ─────────────────────────────────────────────────────────

/// Greedy sequential planner over any [`PathSearch`].
#[derive(Clone, Debug)]
pub struct MultiAgentPlanner<S: PathSearch = TimeHeadingAStar> {
    search:   S,
    config:   PlannerConfig,
    smoother: PathSmoother,
}

impl MultiAgentPlanner<TimeHeadingAStar> {
    /// Planner with the default A*, using `config.heading_window`.
    pub fn new(config: PlannerConfig) -> Self {
        let search = TimeHeadingAStar::new(config.heading_window);
        Self::with_search(search, config)
    }
}

impl<S: PathSearch> MultiAgentPlanner<S> {
    pub fn with_search(search: S, config: PlannerConfig) -> Self {
        let smoother = PathSmoother::new(config.smoothing);
        Self { search, config, smoother }
    }

    #[inline]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan every agent in `request`.  Deterministic: the same request always
    /// produces the same response.
    pub fn plan(&self, request: &PlanRequest) -> PlanResult<PlanResponse> {
        validate(request)?;
        if request.agents.is_empty() {
            return Ok(PlanResponse::new());
        }
        let grid = self.kernel_grid(request)?;

        let mut order: Vec<&AgentPlanRequest> = request.agents.iter().collect();
        order.sort_by(|a, b| b.span().total_cmp(&a.span()));

        // Positions of finalized agents, in finalization order.  An agent
        // without a path is parked at its start.
        let mut finalized: Vec<(AgentId, Vec<Vec2>)> = Vec::with_capacity(order.len());
        let mut raw = PlanResponse::new();

        for agent in order {
            let planned = self.plan_one(&grid, agent, &finalized);
            let positions = if planned.is_empty() {
                vec![agent.start]
            } else {
                planned.positions().collect()
            };
            finalized.push((agent.id, positions));
            raw.insert(agent.id, planned);
        }

        Ok(raw
            .into_iter()
            .map(|(id, mut p)| {
                if !p.is_empty() {
                    p.waypoints = self.smoother.smooth(&p.waypoints);
                }
                (id, p)
            })
            .collect())
    }

    fn plan_one(
        &self,
        grid: &SearchGrid,
        agent: &AgentPlanRequest,
        finalized: &[(AgentId, Vec<Vec2>)],
    ) -> PlannedPath {
        let (Some(start), Some(goal)) = (grid.cell_of(agent.start), grid.cell_of(agent.goal)) else {
            // Unreachable for a kernel grid built from this request.
            return PlannedPath::default();
        };

        let mut interfering: BTreeSet<usize> = BTreeSet::new();
        let mut diagnostics = PlanDiagnostics::default();

        loop {
            diagnostics.iterations += 1;
            let moving: Vec<&[Vec2]> = interfering.iter().map(|&k| finalized[k].1.as_slice()).collect();
            let query = SearchQuery {
                start,
                start_heading: agent.start_heading,
                goal,
                moving:        &moving,
                clearance:     self.config.safe_distance,
            };
            let outcome = self.search.search(grid, &query);
            diagnostics.expanded += outcome.expanded;
            diagnostics.found = outcome.found();

            let positions: Vec<Vec2> = if outcome.found() {
                outcome.waypoints.iter().map(|w| w.pos).collect()
            } else {
                vec![agent.start]
            };
            let fresh: Vec<usize> = finalized
                .iter()
                .enumerate()
                .filter(|(k, _)| !interfering.contains(k))
                .filter(|(_, (_, other))| paths_conflict(&positions, other, self.config.safe_distance))
                .map(|(k, _)| k)
                .collect();

            if fresh.is_empty() {
                diagnostics.converged = true;
                tracing::debug!(
                    agent = %agent.id,
                    iterations = diagnostics.iterations,
                    expanded = diagnostics.expanded,
                    found = diagnostics.found,
                    "Agent plan finalized"
                );
                return PlannedPath { waypoints: outcome.waypoints, diagnostics };
            }

            for k in fresh {
                interfering.insert(k);
                diagnostics.interfering.push(finalized[k].0);
            }

            if diagnostics.iterations >= self.config.max_iterations {
                diagnostics.converged = false;
                tracing::warn!(
                    agent = %agent.id,
                    iterations = diagnostics.iterations,
                    interfering = diagnostics.interfering.len(),
                    "Conflict resolution hit the iteration cap; finalizing last path"
                );
                return PlannedPath { waypoints: outcome.waypoints, diagnostics };
            }
        }
    }

    /// Bounding box of every start, goal and keep-out circle, padded by
    /// `margin` and discretized at `grid_scale`.
    fn kernel_grid(&self, request: &PlanRequest) -> PlanResult<SearchGrid> {
        let mut lo = Vec2::new(f64::INFINITY, f64::INFINITY);
        let mut hi = Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        let mut grow = |p: Vec2, r: f64| {
            lo = Vec2::new(lo.x.min(p.x - r), lo.y.min(p.y - r));
            hi = Vec2::new(hi.x.max(p.x + r), hi.y.max(p.y + r));
        };
        for a in &request.agents {
            grow(a.start, 0.0);
            grow(a.goal, 0.0);
        }
        for zone in &request.keep_out {
            grow(zone.center, zone.radius);
        }

        let margin = self.config.margin;
        let scale = self.config.grid_scale;
        let origin = Vec2::new(lo.x - margin, lo.y - margin);
        let cols = ((hi.x + margin - origin.x) / scale).ceil().max(1.0);
        let rows = ((hi.y + margin - origin.y) / scale).ceil().max(1.0);
        if cols * rows > MAX_GRID_CELLS as f64 {
            return Err(PlanError::GridTooLarge { cols: cols as u64, rows: rows as u64, limit: MAX_GRID_CELLS });
        }

        let mut grid = SearchGrid::new(cols as u32, rows as u32, origin, scale)?;
        for zone in &request.keep_out {
            grid.block_circle(*zone);
        }
        Ok(grid)
    }
}

fn validate(request: &PlanRequest) -> PlanResult<()> {
    let mut seen = BTreeSet::new();
    for a in &request.agents {
        if !seen.insert(a.id) {
            return Err(PlanError::InvalidRequest(format!("duplicate agent {}", a.id)));
        }
        if !(a.start.is_finite() && a.goal.is_finite() && a.start_heading.is_finite()) {
            return Err(PlanError::InvalidRequest(format!("non-finite start or goal for {}", a.id)));
        }
    }
    for zone in &request.keep_out {
        if !(zone.center.is_finite() && zone.radius.is_finite() && zone.radius >= 0.0) {
            return Err(PlanError::InvalidRequest(format!(
                "keep-out zone at {} has invalid radius {}",
                zone.center, zone.radius
            )));
        }
    }
    Ok(())
}
