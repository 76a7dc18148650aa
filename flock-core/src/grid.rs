use glam::DVec2;

use crate::{agent::Agent, arena::Arena, types::AgentId};

/// Upper bound on cells per axis, so a tiny separation radius cannot blow
/// up the grid allocation.
const MAX_CELLS_PER_AXIS: usize = 1024;

/// Uniform bucket grid over the arena for separation-radius lookups.
///
/// The cell edge is at least the separation radius, so every neighbor within
/// the radius of a point lives in the 3x3 block of cells around it.
/// Positions outside the arena are clamped into the border cells; clamping
/// never moves two points further apart in cell space, so lookups stay
/// complete for agents that overshoot the boundary.
#[derive(Debug)]
pub struct NeighborGrid {
    cell_size: f64,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<AgentId>>,
}

impl NeighborGrid {
    /// Creates an empty grid covering `arena` with cells of at least `radius`.
    pub fn new(arena: &Arena, radius: f64) -> Self {
        let cell_size = radius
            .max(arena.width() / MAX_CELLS_PER_AXIS as f64)
            .max(arena.height() / MAX_CELLS_PER_AXIS as f64);
        let cols = ((arena.width() / cell_size).ceil() as usize).max(1);
        let rows = ((arena.height() / cell_size).ceil() as usize).max(1);

        Self {
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Clamped integer cell coordinates of `p`.
    #[inline]
    fn coords(&self, p: DVec2) -> (usize, usize) {
        let cx = (p.x / self.cell_size).floor().clamp(0.0, (self.cols - 1) as f64) as usize;
        let cy = (p.y / self.cell_size).floor().clamp(0.0, (self.rows - 1) as f64) as usize;
        (cx, cy)
    }

    /// Flat index of the cell containing `p`.
    #[inline]
    pub fn cell_of(&self, p: DVec2) -> usize {
        let (cx, cy) = self.coords(p);
        cy * self.cols + cx
    }

    /// Empties every cell and re-inserts all agents in index order.
    pub fn rebuild(&mut self, agents: &[Agent]) {
        for cell in &mut self.cells {
            cell.clear();
        }
        for (id, a) in agents.iter().enumerate() {
            let c = self.cell_of(a.position);
            self.cells[c].push(id);
        }
    }

    /// Moves agent `id` from the cell containing `from` to the one containing `to`.
    ///
    /// Does nothing if both positions share a cell.
    pub fn relocate(&mut self, id: AgentId, from: DVec2, to: DVec2) {
        let old = self.cell_of(from);
        let new = self.cell_of(to);
        if old == new {
            return;
        }
        if let Some(slot) = self.cells[old].iter().position(|&i| i == id) {
            self.cells[old].swap_remove(slot);
        }
        self.cells[new].push(id);
    }

    /// Writes the ids of every agent in the 3x3 block around `p` into `out`,
    /// sorted ascending.
    ///
    /// Sorting keeps accumulation order identical to a plain scan of the
    /// flock, so grid-backed sums match the brute-force ones bit for bit.
    pub fn candidates(&self, p: DVec2, out: &mut Vec<AgentId>) {
        out.clear();
        let (cx, cy) = self.coords(p);

        for y in cy.saturating_sub(1)..=(cy + 1).min(self.rows - 1) {
            let row = y * self.cols;
            for x in cx.saturating_sub(1)..=(cx + 1).min(self.cols - 1) {
                out.extend_from_slice(&self.cells[row + x]);
            }
        }

        out.sort_unstable();
    }
}
