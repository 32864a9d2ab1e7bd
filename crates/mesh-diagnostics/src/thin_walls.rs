//! Thin-wall detection via non-neighbor vertex proximity.
//!
//! Two patches of the same surface that pass close to each other without
//! sharing geometry indicate walls too thin to survive printing or boolean
//! work. The proxy used here is a vertex that has another vertex nearby
//! which it never shares a triangle with.

use hashbrown::HashSet;
use tracing::debug;

use crate::spatial::SpatialGrid;
use crate::types::{BoundingBox, MeshBuffers};

/// Distances below this floor are treated as coincident, not thin.
const MIN_SEPARATION: f64 = 1e-10;

/// Count vertices with at least one non-neighbor vertex closer than
/// `diagonal * fraction`.
pub fn count_thin_wall_vertices(
    mesh: &MeshBuffers,
    vertex_faces: &[Vec<u32>],
    bounds: &BoundingBox,
    fraction: f64,
) -> usize {
    let threshold = bounds.diagonal * fraction;
    if threshold <= 0.0 || mesh.vertex_count() < 2 {
        return 0;
    }
    let threshold_sq = threshold * threshold;
    let min_separation_sq = MIN_SEPARATION * MIN_SEPARATION;

    let mut grid = SpatialGrid::new(threshold * 3.0);
    for v in 0..mesh.vertex_count() as u32 {
        grid.insert_point(&mesh.point(v), v);
    }

    let mut neighbor_set: HashSet<u32> = HashSet::new();
    let mut thin_count = 0;

    for v in 0..mesh.vertex_count() as u32 {
        let p = mesh.point(v);

        neighbor_set.clear();
        for &face in &vertex_faces[v as usize] {
            for index in mesh.tri(face as usize) {
                neighbor_set.insert(index);
            }
        }

        let mut is_thin = false;
        grid.for_each_in_neighborhood(grid.cell_of(&p), |other| {
            if is_thin || other == v || neighbor_set.contains(&other) {
                return;
            }
            let dist_sq = (p - mesh.point(other)).norm_squared();
            if dist_sq > min_separation_sq && dist_sq < threshold_sq {
                is_thin = true;
            }
        });

        if is_thin {
            thin_count += 1;
        }
    }

    if thin_count > 0 {
        debug!("found {} thin-wall vertices", thin_count);
    }

    thin_count
}
