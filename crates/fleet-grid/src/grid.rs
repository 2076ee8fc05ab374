//! Occupancy grid rasterized from safety footprints.
//!
//! # Data layout
//!
//! Cells are stored row-major in one dense `Vec<CellState>`:
//!
//! ```text
//! cells[ row * cols + col ]
//! ```
//!
//! Cell `(col, row)` covers `[origin + col·s, origin + (col+1)·s)` on each
//! axis, and its world position is its center.  The grid is rebuilt from
//! scratch every tick, so there is no incremental bookkeeping: a rebuild is
//! one `fill(Free)` followed by one rasterization per footprint.
//!
//! # Ownership
//!
//! Marking overwrites.  After [`FootprintGrid::rebuild`] every occupied cell
//! holds exactly one owner, the last one painted in iteration order; the
//! target's defended zone is painted last so it always wins.

use fleet_core::{AgentId, FleetConfig, Heading, Vec2};

use crate::{GridError, GridResult};

// ── Cell & state ──────────────────────────────────────────────────────────────

/// Integer grid coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub col: u32,
    pub row: u32,
}

impl Cell {
    #[inline]
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// Who painted an occupied cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Owner {
    Agent(AgentId),
    /// The target's defended zone, the one non-agent obstacle.
    Target,
}

/// Content of one grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    #[default]
    Free,
    Agent(AgentId),
    Target,
}

impl CellState {
    #[inline]
    pub fn is_free(self) -> bool {
        matches!(self, CellState::Free)
    }

    #[inline]
    pub fn owner(self) -> Option<Owner> {
        match self {
            CellState::Free      => None,
            CellState::Agent(id) => Some(Owner::Agent(id)),
            CellState::Target    => Some(Owner::Target),
        }
    }
}

impl From<Owner> for CellState {
    fn from(owner: Owner) -> Self {
        match owner {
            Owner::Agent(id) => CellState::Agent(id),
            Owner::Target    => CellState::Target,
        }
    }
}

// ── Shapes ────────────────────────────────────────────────────────────────────

/// One agent's safety envelope as painted into the grid.
///
/// `focus` is the **trailing** focus of the ellipse: the true center lies
/// ahead of it along `heading` by `sqrt(a² − b²)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Footprint {
    pub agent:      AgentId,
    pub focus:      Vec2,
    pub heading:    f64,
    pub semi_major: f64,
    pub semi_minor: f64,
}

/// A filled circle, used for the target's defended zone.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    pub center: Vec2,
    pub radius: f64,
}

impl Circle {
    #[inline]
    pub const fn new(center: Vec2, radius: f64) -> Self {
        Self { center, radius }
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.distance(self.center) <= self.radius
    }
}

/// Clamp ellipse axes to a valid shape: both at least their floor, minor no
/// larger than major.  Non-finite axes collapse to the floor.
pub fn clamp_axes(semi_major: f64, semi_minor: f64, min_major: f64, min_minor: f64) -> (f64, f64) {
    let floor = |v: f64, min: f64| if v.is_finite() { v.max(min) } else { min };
    let a = floor(semi_major, min_major);
    let b = floor(semi_minor, min_minor).min(a);
    (a, b)
}

// ── FootprintGrid ─────────────────────────────────────────────────────────────

/// Dense occupancy grid over the world rectangle.
#[derive(Clone, Debug)]
pub struct FootprintGrid {
    cols:      u32,
    rows:      u32,
    cell_size: f64,
    origin:    Vec2,
    min_major: f64,
    min_minor: f64,
    cells:     Vec<CellState>,
}

impl FootprintGrid {
    /// An all-free grid of `cols × rows` cells anchored at the world origin.
    pub fn new(cols: u32, rows: u32, cell_size: f64) -> GridResult<Self> {
        if cols == 0 || rows == 0 || !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(GridError::InvalidDimensions { cols, rows, cell_size });
        }
        let defaults = fleet_core::FootprintConfig::default();
        Ok(Self {
            cols,
            rows,
            cell_size,
            origin:    Vec2::ZERO,
            min_major: defaults.min_semi_major,
            min_minor: defaults.min_semi_minor,
            cells:     vec![CellState::Free; cols as usize * rows as usize],
        })
    }

    /// Grid covering `config.world`, with ellipse floors from `config.footprint`.
    pub fn from_config(config: &FleetConfig) -> GridResult<Self> {
        let w = &config.world;
        let cols = (w.width / w.cell_size).ceil();
        let rows = (w.height / w.cell_size).ceil();
        if !(cols.is_finite() && rows.is_finite()) || cols > u32::MAX as f64 || rows > u32::MAX as f64 {
            return Err(GridError::InvalidDimensions { cols: 0, rows: 0, cell_size: w.cell_size });
        }
        Ok(Self::new(cols as u32, rows as u32, w.cell_size)?
            .with_min_axes(config.footprint.min_semi_major, config.footprint.min_semi_minor))
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_min_axes(mut self, min_major: f64, min_minor: f64) -> Self {
        self.min_major = min_major;
        self.min_minor = min_minor;
        self
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn is_valid(&self, col: i64, row: i64) -> bool {
        col >= 0 && row >= 0 && col < self.cols as i64 && row < self.rows as i64
    }

    /// Cell containing `p`, or `None` when `p` lies off the grid.
    pub fn cell_of(&self, p: Vec2) -> Option<Cell> {
        let col = ((p.x - self.origin.x) / self.cell_size).floor();
        let row = ((p.y - self.origin.y) / self.cell_size).floor();
        if !(col.is_finite() && row.is_finite()) {
            return None;
        }
        let (col, row) = (col as i64, row as i64);
        self.is_valid(col, row).then(|| Cell::new(col as u32, row as u32))
    }

    /// World position of the center of `cell`.
    #[inline]
    pub fn center_of(&self, cell: Cell) -> Vec2 {
        Vec2::new(
            self.origin.x + (cell.col as f64 + 0.5) * self.cell_size,
            self.origin.y + (cell.row as f64 + 0.5) * self.cell_size,
        )
    }

    /// State of `cell`; cells outside the grid read as `Free`.
    #[inline]
    pub fn state(&self, cell: Cell) -> CellState {
        if cell.col < self.cols && cell.row < self.rows {
            self.cells[self.offset(cell.col, cell.row)]
        } else {
            CellState::Free
        }
    }

    /// State of the cell containing `p`, or `None` off the grid.
    #[inline]
    pub fn state_at(&self, p: Vec2) -> Option<CellState> {
        self.cell_of(p).map(|c| self.state(c))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|s| !s.is_free()).count()
    }

    /// Every occupied cell not owned by `except`, in row-major order.
    pub fn blocked_cells(&self, except: Option<AgentId>) -> impl Iterator<Item = Cell> + '_ {
        let cols = self.cols as usize;
        self.cells.iter().enumerate().filter_map(move |(i, s)| {
            let blocked = match *s {
                CellState::Free      => false,
                CellState::Agent(id) => Some(id) != except,
                CellState::Target    => true,
            };
            blocked.then(|| Cell::new((i % cols) as u32, (i / cols) as u32))
        })
    }

    // ── Painting ──────────────────────────────────────────────────────────

    /// Clear every cell to `Free`.
    pub fn reset(&mut self) {
        self.cells.fill(CellState::Free);
    }

    /// Mark every cell whose center lies within `radius` of `center`.
    pub fn mark_circle(&mut self, center: Vec2, radius: f64, owner: Owner) {
        if !(radius.is_finite() && radius >= 0.0 && center.is_finite()) {
            return;
        }
        let r2 = radius * radius;
        let state = CellState::from(owner);
        self.for_each_in_box(center, radius, |grid, col, row| {
            let cell = Cell::new(col, row);
            if (grid.center_of(cell) - center).length_squared() <= r2 {
                let i = grid.offset(col, row);
                grid.cells[i] = state;
            }
        });
    }

    /// Mark the ellipse with trailing focus `focus`, oriented along
    /// `heading_deg`.  Degenerate axes are clamped before use.
    pub fn mark_ellipse(
        &mut self,
        focus: Vec2,
        heading_deg: f64,
        semi_major: f64,
        semi_minor: f64,
        owner: Owner,
    ) {
        if !(focus.is_finite() && heading_deg.is_finite()) {
            return;
        }
        let (a, b) = clamp_axes(semi_major, semi_minor, self.min_major, self.min_minor);
        let c = (a * a - b * b).max(0.0).sqrt();
        let along = Vec2::from_heading(heading_deg);
        // Perpendicular, 90° clockwise from `along`.
        let across = Vec2::new(along.y, -along.x);
        let center = focus + along * c;
        let (a2, b2) = (a * a, b * b);
        let state = CellState::from(owner);

        self.for_each_in_box(center, a, |grid, col, row| {
            let d = grid.center_of(Cell::new(col, row)) - center;
            let x = d.dot(along);
            let y = d.dot(across);
            if x * x / a2 + y * y / b2 <= 1.0 {
                let i = grid.offset(col, row);
                grid.cells[i] = state;
            }
        });
    }

    /// Reset, paint every footprint in iteration order, then paint `target`.
    ///
    /// Callers pass footprints in ascending `AgentId` order so that overlap
    /// resolution is deterministic.
    pub fn rebuild<I>(&mut self, footprints: I, target: Option<Circle>)
    where
        I: IntoIterator<Item = Footprint>,
    {
        self.reset();
        for fp in footprints {
            self.mark_ellipse(fp.focus, fp.heading, fp.semi_major, fp.semi_minor, Owner::Agent(fp.agent));
        }
        if let Some(zone) = target {
            self.mark_circle(zone.center, zone.radius, Owner::Target);
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    #[inline]
    fn offset(&self, col: u32, row: u32) -> usize {
        row as usize * self.cols as usize + col as usize
    }

    /// Visit every in-grid cell overlapping the square `center ± half`.
    fn for_each_in_box(&mut self, center: Vec2, half: f64, mut f: impl FnMut(&mut Self, u32, u32)) {
        let s = self.cell_size;
        let lo_col = ((center.x - half - self.origin.x) / s).floor().max(0.0);
        let hi_col = ((center.x + half - self.origin.x) / s).floor().min(self.cols as f64 - 1.0);
        let lo_row = ((center.y - half - self.origin.y) / s).floor().max(0.0);
        let hi_row = ((center.y + half - self.origin.y) / s).floor().min(self.rows as f64 - 1.0);
        if lo_col > hi_col || lo_row > hi_row {
            return;
        }
        for row in lo_row as u32..=hi_row as u32 {
            for col in lo_col as u32..=hi_col as u32 {
                f(self, col, row);
            }
        }
    }
}
