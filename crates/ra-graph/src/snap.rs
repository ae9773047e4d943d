//! Vertex snapping.
//!
//! A new vertex reuses the *first* existing node (lowest `NodeId`, i.e.
//! creation order) lying strictly closer than the threshold, not the
//! nearest one.  When several nodes qualify the result therefore depends on
//! creation order.
//!
//! Candidates are found through a uniform grid whose cells are one threshold
//! wide: anything closer than the threshold lies in the vertex's cell or one
//! of its eight neighbours.  Each cell lists its nodes in creation order, so
//! the grid returns exactly what a linear scan over all nodes would.

use rustc_hash::FxHashMap;

use ra_core::{NodeId, Point};

type Cell = (i64, i64);

pub(crate) struct SnapGrid {
    threshold: f64,
    cells:     FxHashMap<Cell, Vec<NodeId>>,
}

impl SnapGrid {
    /// `threshold <= 0` disables snapping: every vertex becomes a new node.
    pub fn new(threshold: f64) -> Self {
        Self { threshold, cells: FxHashMap::default() }
    }

    #[inline]
    fn enabled(&self) -> bool {
        self.threshold > 0.0
    }

    #[inline]
    fn cell_of(&self, p: Point) -> Cell {
        // `as` saturates, so far-out coordinates land in the edge cells.
        ((p.x / self.threshold).floor() as i64, (p.y / self.threshold).floor() as i64)
    }

    /// First node in creation order strictly within the threshold of `p`.
    pub fn find(&self, p: Point, position: impl Fn(NodeId) -> Point) -> Option<NodeId> {
        if !self.enabled() {
            return None;
        }
        let (cx, cy) = self.cell_of(p);
        let mut best: Option<NodeId> = None;

        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(ids) = self.cells.get(&(cx.saturating_add(dx), cy.saturating_add(dy))) else {
                    continue;
                };
                let hit = ids
                    .iter()
                    .copied()
                    .find(|&id| position(id).distance(p) < self.threshold);
                if let Some(id) = hit {
                    best = Some(best.map_or(id, |b| b.min(id)));
                }
            }
        }
        best
    }

    /// Register a freshly created node.  Ids must arrive in ascending order.
    pub fn insert(&mut self, id: NodeId, p: Point) {
        if self.enabled() {
            let cell = self.cell_of(p);
            self.cells.entry(cell).or_default().push(id);
        }
    }
}
