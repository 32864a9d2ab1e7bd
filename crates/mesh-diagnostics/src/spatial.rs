//! Shared uniform spatial hash grid.
//!
//! Several detection passes bucket geometry into a uniform grid before doing
//! exact tests: duplicate vertices, self-intersections, T-junctions, thin
//! walls, and coincident faces. They differ only in cell size and in what an
//! item id means, so they share this one implementation.

use hashbrown::HashMap;
use nalgebra::Point3;

/// Integer cell coordinate.
pub type Cell = (i64, i64, i64);

/// Uniform hash grid mapping cells to item ids.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<Cell, Vec<u32>>,
}

impl SpatialGrid {
    /// Create a grid with the given cell size. The size must be positive.
    pub fn new(cell_size: f64) -> Self {
        debug_assert!(cell_size > 0.0);
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Cell containing a point.
    #[inline]
    pub fn cell_of(&self, p: &Point3<f64>) -> Cell {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
            (p.z / self.cell_size).floor() as i64,
        )
    }

    /// Insert an item into one cell.
    #[inline]
    pub fn insert(&mut self, cell: Cell, id: u32) {
        self.cells.entry(cell).or_default().push(id);
    }

    /// Insert an item keyed by a point.
    #[inline]
    pub fn insert_point(&mut self, p: &Point3<f64>, id: u32) {
        let cell = self.cell_of(p);
        self.insert(cell, id);
    }

    /// Insert an item into every cell its AABB overlaps.
    pub fn insert_aabb(&mut self, min: &Point3<f64>, max: &Point3<f64>, id: u32) {
        let lo = self.cell_of(min);
        let hi = self.cell_of(max);
        for x in lo.0..=hi.0 {
            for y in lo.1..=hi.1 {
                for z in lo.2..=hi.2 {
                    self.insert((x, y, z), id);
                }
            }
        }
    }

    /// Items stored in one cell.
    #[inline]
    pub fn cell_items(&self, cell: Cell) -> &[u32] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Visit every item in the 3x3x3 neighborhood of a cell.
    ///
    /// Items inserted into multiple cells are visited once per cell; callers
    /// that need set semantics deduplicate on their side.
    pub fn for_each_in_neighborhood(&self, center: Cell, mut visit: impl FnMut(u32)) {
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let cell = (center.0 + dx, center.1 + dy, center.2 + dz);
                    for &id in self.cell_items(cell) {
                        visit(id);
                    }
                }
            }
        }
    }

    /// Visit every item whose cell range overlaps the given AABB.
    pub fn for_each_in_aabb(
        &self,
        min: &Point3<f64>,
        max: &Point3<f64>,
        mut visit: impl FnMut(u32),
    ) {
        let lo = self.cell_of(min);
        let hi = self.cell_of(max);
        for x in lo.0..=hi.0 {
            for y in lo.1..=hi.1 {
                for z in lo.2..=hi.2 {
                    for &id in self.cell_items((x, y, z)) {
                        visit(id);
                    }
                }
            }
        }
    }
}
