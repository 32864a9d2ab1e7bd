//! Near-coincident vertex detection.

use tracing::debug;

use crate::spatial::SpatialGrid;
use crate::types::MeshBuffers;

/// Two vertices closer than this are duplicates.
const WELD_EPSILON: f64 = 1e-6;

/// Count vertices that coincide with an earlier vertex.
///
/// Vertices are bucketed into a grid of cell size `10 * epsilon` and each
/// vertex is compared against the earlier occupants of its own cell only.
/// A duplicate pair that straddles a cell boundary is therefore missed;
/// this mirrors the reference behavior and keeps the pass O(V) on meshes
/// without pathological clustering.
pub fn count_duplicate_vertices(mesh: &MeshBuffers) -> usize {
    let vertex_count = mesh.vertex_count();
    if vertex_count < 2 {
        return 0;
    }

    let epsilon_sq = WELD_EPSILON * WELD_EPSILON;
    let mut grid = SpatialGrid::new(WELD_EPSILON * 10.0);
    let mut duplicate_count = 0;

    for v in 0..vertex_count as u32 {
        let p = mesh.point(v);
        let cell = grid.cell_of(&p);

        let mut is_duplicate = false;
        for &prior in grid.cell_items(cell) {
            if (p - mesh.point(prior)).norm_squared() < epsilon_sq {
                is_duplicate = true;
                break;
            }
        }
        if is_duplicate {
            duplicate_count += 1;
        }

        grid.insert(cell, v);
    }

    if duplicate_count > 0 {
        debug!("found {} duplicate vertices", duplicate_count);
    }

    duplicate_count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(positions: &[f32]) -> usize {
        let mesh = MeshBuffers::new(positions, &[]).unwrap();
        count_duplicate_vertices(&mesh)
    }

    #[test]
    fn test_no_duplicates() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        assert_eq!(count(&positions), 0);
    }

    #[test]
    fn test_exact_duplicates() {
        let positions = [
            0.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            1.0, 1.0, 0.0, // dup of 1
            0.0, 0.0, 0.0, // dup of 0
        ];
        assert_eq!(count(&positions), 2);
    }

    #[test]
    fn test_triple_counts_twice() {
        // Later copies each count once against the earlier occupant.
        let positions = [2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0];
        assert_eq!(count(&positions), 2);
    }

    #[test]
    fn test_separation_above_epsilon() {
        let positions = [0.0, 0.0, 0.0, 2e-6, 0.0, 0.0];
        assert_eq!(count(&positions), 0);
    }

    #[test]
    fn test_empty() {
        assert_eq!(count(&[]), 0);
    }
}
