//! T-junction detection.
//!
//! A T-junction is a vertex that sits on the interior of another triangle's
//! edge without being topologically connected to it. Such vertices produce
//! hairline cracks under deformation or subdivision even though the mesh
//! looks sealed.

use hashbrown::HashSet;
use nalgebra::Point3;
use tracing::debug;

use crate::adjacency::MeshAdjacency;
use crate::spatial::SpatialGrid;
use crate::types::{BoundingBox, MeshBuffers};

/// Tolerance as a fraction of the bounding-box diagonal.
const TOLERANCE_FRACTION: f64 = 1e-4;
/// Parameter range along the edge; endpoints are excluded.
const PARAM_MIN: f64 = 0.01;
const PARAM_MAX: f64 = 0.99;

/// Find all T-junction vertices, in ascending vertex order.
///
/// Each unique edge is indexed under the cells of its two endpoints and its
/// midpoint. A vertex qualifies when it projects onto the interior of a
/// nearby edge (perpendicular distance below `diagonal * 1e-4`) and shares
/// no triangle with both edge endpoints.
pub fn detect_t_junctions(
    mesh: &MeshBuffers,
    adjacency: &MeshAdjacency,
    vertex_faces: &[Vec<u32>],
    bounds: &BoundingBox,
) -> Vec<u32> {
    let tolerance = bounds.diagonal * TOLERANCE_FRACTION;
    if tolerance <= 0.0 || adjacency.edge_count() == 0 {
        return Vec::new();
    }
    let tolerance_sq = tolerance * tolerance;

    let edges: Vec<(u32, u32)> = adjacency.edge_to_faces.keys().copied().collect();

    let mut grid = SpatialGrid::new(tolerance * 10.0);
    for (e, &(a, b)) in edges.iter().enumerate() {
        let p0 = mesh.point(a);
        let p1 = mesh.point(b);
        let mid = Point3::from((p0.coords + p1.coords) * 0.5);

        let mut cells = [grid.cell_of(&p0), grid.cell_of(&p1), grid.cell_of(&mid)];
        cells.sort_unstable();
        let mut last = None;
        for cell in cells {
            if last != Some(cell) {
                grid.insert(cell, e as u32);
                last = Some(cell);
            }
        }
    }

    let mut junctions = Vec::new();
    let mut candidates: HashSet<u32> = HashSet::new();

    for v in 0..mesh.vertex_count() as u32 {
        let p = mesh.point(v);

        candidates.clear();
        grid.for_each_in_neighborhood(grid.cell_of(&p), |e| {
            candidates.insert(e);
        });

        let is_junction = candidates.iter().any(|&e| {
            let (a, b) = edges[e as usize];
            if v == a || v == b {
                return false;
            }

            let e0 = mesh.point(a);
            let e1 = mesh.point(b);
            let dir = e1 - e0;
            let len_sq = dir.norm_squared();
            if len_sq == 0.0 {
                return false;
            }

            let t = (p - e0).dot(&dir) / len_sq;
            if t <= PARAM_MIN || t >= PARAM_MAX {
                return false;
            }

            let perp = (p - e0) - dir * t;
            if perp.norm_squared() >= tolerance_sq {
                return false;
            }

            // A vertex of a triangle that spans the whole edge is a corner,
            // not a junction.
            !vertex_faces[v as usize].iter().any(|&face| {
                let tri = mesh.tri(face as usize);
                tri.contains(&a) && tri.contains(&b)
            })
        });

        if is_junction {
            junctions.push(v);
        }
    }

    if !junctions.is_empty() {
        debug!("found {} T-junction vertices", junctions.len());
    }

    junctions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjacency::build_vertex_faces;

    fn detect(positions: &[f32], indices: &[u32]) -> Vec<u32> {
        let mesh = MeshBuffers::new(positions, indices).unwrap();
        let adjacency = MeshAdjacency::build(&mesh);
        let vertex_faces = build_vertex_faces(&mesh);
        let bounds = mesh.bounding_box().unwrap();
        detect_t_junctions(&mesh, &adjacency, &vertex_faces, &bounds)
    }

    #[test]
    fn test_vertex_on_unrelated_edge() {
        // One large triangle and a small one whose apex rests on the large
        // triangle's bottom edge midpoint.
        let positions = [
            0.0, 0.0, 0.0, //
            2.0, 0.0, 0.0, //
            1.0, 2.0, 0.0, //
            1.0, 0.0, 0.0, // on edge (0, 1), not connected to it
            0.5, -1.0, 0.0, //
            1.5, -1.0, 0.0,
        ];
        let indices = [0, 1, 2, 4, 5, 3];
        assert_eq!(detect(&positions, &indices), vec![3]);
    }

    #[test]
    fn test_shared_corner_is_not_a_junction() {
        // Two triangles stitched along the same edge: every vertex is a
        // corner of a triangle spanning the edges it touches.
        let positions = [
            0.0, 0.0, 0.0, //
            2.0, 0.0, 0.0, //
            1.0, 2.0, 0.0, //
            1.0, -2.0, 0.0,
        ];
        let indices = [0, 1, 2, 1, 0, 3];
        assert!(detect(&positions, &indices).is_empty());
    }

    #[test]
    fn test_vertex_near_endpoint_excluded() {
        // The dangling vertex projects at t < 0.01 of the long edge.
        let positions = [
            0.0, 0.0, 0.0, //
            100.0, 0.0, 0.0, //
            50.0, 100.0, 0.0, //
            0.5, 0.0, 0.0, //
            0.0, -10.0, 0.0, //
            1.0, -10.0, 0.0,
        ];
        let indices = [0, 1, 2, 4, 5, 3];
        assert!(detect(&positions, &indices).is_empty());
    }

    #[test]
    fn test_vertex_too_far_from_edge() {
        let positions = [
            0.0, 0.0, 0.0, //
            2.0, 0.0, 0.0, //
            1.0, 2.0, 0.0, //
            1.0, -0.5, 0.0, // half a unit off the edge
            0.5, -1.5, 0.0, //
            1.5, -1.5, 0.0,
        ];
        let indices = [0, 1, 2, 4, 5, 3];
        assert!(detect(&positions, &indices).is_empty());
    }
}
