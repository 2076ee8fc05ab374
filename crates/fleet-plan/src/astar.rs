//! Search trait and the default time/heading-aware A*.
//!
//! # Pluggability
//!
//! [`MultiAgentPlanner`](crate::MultiAgentPlanner) drives single-agent
//! searches through the [`PathSearch`] trait, so any deterministic search can
//! replace the default [`TimeHeadingAStar`] without touching the conflict
//! loop.
//!
//! # State and cost
//!
//! A search state is `(col, row, step, heading)`.  Moves are 8-connected with
//! cost 1 orthogonally and √2 diagonally; each move advances `step` by one
//! and sets `heading` from the move direction.  `step` and `heading` are path
//! metadata: the closed set is keyed on `(col, row)` only, and the goal test
//! ignores both.  The heuristic is octile distance, which never overestimates
//! on a uniform 8-connected grid.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::f64::consts::SQRT_2;

use ordered_float::OrderedFloat;

use fleet_core::{Heading, Vec2, Waypoint, heading_of};
use fleet_grid::{Cell, Circle, GridError};

use crate::PlanResult;

/// The 8 neighbor offsets `(dc, dr)`, in a fixed order so that expansion
/// (and therefore tie-breaking) is reproducible.
const NEIGHBORS: [(i64, i64); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    ( 0, -1),          ( 0, 1),
    ( 1, -1), ( 1, 0), ( 1, 1),
];

const NO_PARENT: u32 = u32::MAX;

// ── SearchGrid ────────────────────────────────────────────────────────────────

/// Static blocked-cell snapshot for one planning cycle.
///
/// Dense row-major bitmap, same layout as the footprint grid.  Cell `(c, r)`
/// has its center at `origin + ((c + ½)·s, (r + ½)·s)`.
#[derive(Clone, Debug)]
pub struct SearchGrid {
    cols:      u32,
    rows:      u32,
    origin:    Vec2,
    cell_size: f64,
    blocked:   Vec<bool>,
}

impl SearchGrid {
    pub fn new(cols: u32, rows: u32, origin: Vec2, cell_size: f64) -> PlanResult<Self> {
        if cols == 0 || rows == 0 || !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(GridError::InvalidDimensions { cols, rows, cell_size }.into());
        }
        Ok(Self {
            cols,
            rows,
            origin,
            cell_size,
            blocked: vec![false; cols as usize * rows as usize],
        })
    }

    /// Grid with `cells` blocked.  Out-of-range cells are ignored.
    pub fn from_blocked<I>(cols: u32, rows: u32, origin: Vec2, cell_size: f64, cells: I) -> PlanResult<Self>
    where
        I: IntoIterator<Item = Cell>,
    {
        let mut grid = Self::new(cols, rows, origin, cell_size)?;
        for cell in cells {
            grid.block(cell);
        }
        Ok(grid)
    }

    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocked.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }

    #[inline]
    pub fn contains(&self, col: i64, row: i64) -> bool {
        col >= 0 && row >= 0 && col < self.cols as i64 && row < self.rows as i64
    }

    pub fn block(&mut self, cell: Cell) {
        if self.contains(cell.col as i64, cell.row as i64) {
            let i = self.offset(cell);
            self.blocked[i] = true;
        }
    }

    /// Block every cell whose center lies within the circle.
    pub fn block_circle(&mut self, zone: Circle) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let cell = Cell::new(col, row);
                if zone.contains(self.center_of(cell)) {
                    let i = self.offset(cell);
                    self.blocked[i] = true;
                }
            }
        }
    }

    #[inline]
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.contains(cell.col as i64, cell.row as i64) && self.blocked[self.offset(cell)]
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|b| **b).count()
    }

    /// Cell containing `p`, or `None` off the grid.
    pub fn cell_of(&self, p: Vec2) -> Option<Cell> {
        let col = ((p.x - self.origin.x) / self.cell_size).floor();
        let row = ((p.y - self.origin.y) / self.cell_size).floor();
        if !(col.is_finite() && row.is_finite()) {
            return None;
        }
        let (col, row) = (col as i64, row as i64);
        self.contains(col, row).then(|| Cell::new(col as u32, row as u32))
    }

    #[inline]
    pub fn center_of(&self, cell: Cell) -> Vec2 {
        Vec2::new(
            self.origin.x + (cell.col as f64 + 0.5) * self.cell_size,
            self.origin.y + (cell.row as f64 + 0.5) * self.cell_size,
        )
    }

    #[inline]
    fn offset(&self, cell: Cell) -> usize {
        cell.row as usize * self.cols as usize + cell.col as usize
    }

    #[inline]
    fn cell_at(&self, index: usize) -> Cell {
        let cols = self.cols as usize;
        Cell::new((index % cols) as u32, (index / cols) as u32)
    }
}

// ── Query & outcome ───────────────────────────────────────────────────────────

/// One single-agent search.
///
/// `moving` holds the per-step positions of agents that this search must
/// keep clear of: a cell reached at step `t` is rejected when its center is
/// closer than `clearance` to any moving path's position at step `t`
/// (clamped to that path's last position).  An empty `moving` slice gives the
/// plain static search.
#[derive(Clone, Debug)]
pub struct SearchQuery<'a> {
    pub start:         Cell,
    pub start_heading: f64,
    pub goal:          Cell,
    pub moving:        &'a [&'a [Vec2]],
    pub clearance:     f64,
}

impl<'a> SearchQuery<'a> {
    /// Static query with no moving obstacles.
    pub fn new(start: Cell, start_heading: f64, goal: Cell) -> Self {
        Self { start, start_heading, goal, moving: &[], clearance: 0.0 }
    }
}

/// The result of a search.  `waypoints` is empty when no path exists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchOutcome {
    pub waypoints: Vec<Waypoint>,
    /// Accumulated move cost (1 per orthogonal move, √2 per diagonal).
    pub cost:      f64,
    /// Number of states popped and expanded.
    pub expanded:  usize,
}

impl SearchOutcome {
    #[inline]
    pub fn found(&self) -> bool {
        !self.waypoints.is_empty()
    }
}

// ── PathSearch trait ──────────────────────────────────────────────────────────

/// Pluggable single-agent search.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`: the planner runs on a rayon worker
/// while the tick loop keeps its own copy of the engine.
pub trait PathSearch: Send + Sync {
    /// Search from `query.start` to `query.goal` on `grid`.  Must be
    /// deterministic: identical inputs give identical outcomes.
    fn search(&self, grid: &SearchGrid, query: &SearchQuery<'_>) -> SearchOutcome;
}

// ── TimeHeadingAStar ──────────────────────────────────────────────────────────

/// A* over `(col, row)` with step and heading carried as metadata.
///
/// After reconstruction the headings are smoothed with a trailing window of
/// `heading_window` points (each point compared to the one `k` steps earlier;
/// zero displacement keeps the previous heading), and the first waypoint
/// takes the query's start heading.  A window of 0 keeps the raw per-move
/// bearings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeHeadingAStar {
    pub heading_window: usize,
}

impl Default for TimeHeadingAStar {
    fn default() -> Self {
        Self { heading_window: 3 }
    }
}

impl TimeHeadingAStar {
    pub fn new(heading_window: usize) -> Self {
        Self { heading_window }
    }
}

impl PathSearch for TimeHeadingAStar {
    fn search(&self, grid: &SearchGrid, query: &SearchQuery<'_>) -> SearchOutcome {
        astar(grid, query, self.heading_window)
    }
}

/// Octile distance between two cells, in cell units.
#[inline]
pub fn octile(a: Cell, b: Cell) -> f64 {
    let dx = (a.col as f64 - b.col as f64).abs();
    let dy = (a.row as f64 - b.row as f64).abs();
    dx.max(dy) + (SQRT_2 - 1.0) * dx.min(dy)
}

// ── A* internals ──────────────────────────────────────────────────────────────

fn astar(grid: &SearchGrid, query: &SearchQuery<'_>, heading_window: usize) -> SearchOutcome {
    let (start, goal) = (query.start, query.goal);
    if !grid.contains(start.col as i64, start.row as i64) || !grid.contains(goal.col as i64, goal.row as i64) {
        return SearchOutcome::default();
    }

    let n = grid.len();
    // g[v] = best known cost to reach v.
    let mut g      = vec![f64::INFINITY; n];
    // parent[v] = cell index that reached v; NO_PARENT for the start and unreached cells.
    let mut parent = vec![NO_PARENT; n];
    let mut step   = vec![0u32; n];
    // heading[v] = bearing of the move that reached v.
    let mut heading = vec![query.start_heading; n];
    let mut closed = vec![false; n];

    let start_i = grid.offset(start);
    let goal_i  = grid.offset(goal);
    g[start_i] = 0.0;

    // Min-heap on (f, seq): the sequence number breaks f-ties in insertion order.
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, u64, usize)>> = BinaryHeap::new();
    let mut seq = 0u64;
    heap.push(Reverse((OrderedFloat(octile(start, goal)), seq, start_i)));

    let mut expanded = 0usize;

    while let Some(Reverse((_, _, cur))) = heap.pop() {
        if closed[cur] {
            continue;
        }
        closed[cur] = true;
        expanded += 1;

        if cur == goal_i {
            let waypoints = reconstruct(grid, &parent, &step, &heading, goal_i, heading_window);
            return SearchOutcome { waypoints, cost: g[cur], expanded };
        }

        let here = grid.cell_at(cur);
        let next_step = step[cur] + 1;

        for (dc, dr) in NEIGHBORS {
            let (nc, nr) = (here.col as i64 + dc, here.row as i64 + dr);
            if !grid.contains(nc, nr) {
                continue;
            }
            let cell = Cell::new(nc as u32, nr as u32);
            let ni = grid.offset(cell);
            if closed[ni] || grid.blocked[ni] {
                continue;
            }
            if crowded(grid.center_of(cell), next_step, query.moving, query.clearance) {
                continue;
            }

            let move_cost = if dc != 0 && dr != 0 { SQRT_2 } else { 1.0 };
            let new_g = g[cur] + move_cost;
            if new_g < g[ni] {
                g[ni] = new_g;
                parent[ni] = cur as u32;
                step[ni] = next_step;
                heading[ni] = heading_of(dc as f64, dr as f64);
                seq += 1;
                heap.push(Reverse((OrderedFloat(new_g + octile(cell, goal)), seq, ni)));
            }
        }
    }

    SearchOutcome { waypoints: Vec::new(), cost: 0.0, expanded }
}

/// `true` when `pos` at `step` is closer than `clearance` to any moving path.
fn crowded(pos: Vec2, step: u32, moving: &[&[Vec2]], clearance: f64) -> bool {
    moving.iter().any(|path| match path.get(step as usize).or_else(|| path.last()) {
        Some(other) => pos.distance(*other) < clearance,
        None => false,
    })
}

fn reconstruct(
    grid: &SearchGrid,
    parent: &[u32],
    step: &[u32],
    heading: &[f64],
    goal: usize,
    window: usize,
) -> Vec<Waypoint> {
    let mut chain = vec![goal];
    let mut cur = goal;
    while parent[cur] != NO_PARENT {
        cur = parent[cur] as usize;
        chain.push(cur);
    }
    chain.reverse();

    let positions: Vec<Vec2> = chain.iter().map(|&i| grid.center_of(grid.cell_at(i))).collect();
    // The start cell keeps the query heading in both branches.
    let headings = if window == 0 {
        chain.iter().map(|&i| heading[i]).collect()
    } else {
        trailing_headings(&positions, window, heading[chain[0]])
    };

    chain
        .iter()
        .zip(positions)
        .zip(headings)
        .map(|((&i, pos), heading)| Waypoint::new(pos, step[i], heading))
        .collect()
}

/// Heading of each point relative to the point `window` steps earlier
/// (clamped to the first point).  The first heading is `start_heading`; a
/// zero displacement repeats the previous heading.
pub fn trailing_headings(points: &[Vec2], window: usize, start_heading: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        if i == 0 {
            out.push(start_heading);
            continue;
        }
        let back = points[i.saturating_sub(window.max(1))];
        let h = match (*p - back).heading() {
            Some(h) if (*p - back).length() > 1e-9 => h,
            _ => out[i - 1],
        };
        out.push(h);
    }
    out
}
