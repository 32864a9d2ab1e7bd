//! Winding consistency analysis via directed-edge counting.
//!
//! Neighboring triangles on an orientable surface traverse their shared edge
//! in opposite directions. Counting directed traversals per edge exposes
//! flipped faces without walking the surface.

use hashbrown::{HashMap, HashSet};
use tracing::debug;

use crate::adjacency::edge_key;
use crate::types::MeshBuffers;

/// Result of the directed-edge winding check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindingReport {
    /// Edges traversed exactly twice in total (in either direction).
    pub manifold_edge_count: usize,
    /// Manifold edges whose two traversals do not run in opposite directions.
    pub inconsistent_edge_count: usize,
    /// `100 * (manifold - inconsistent) / manifold`, or `100` when the mesh
    /// has no manifold edges at all.
    pub consistency_percent: f64,
}

/// Count directed traversals over every edge and classify the manifold ones.
///
/// Only edges with a total traversal count of exactly two participate; an
/// edge traversed twice in the same direction (a flipped neighbor) counts as
/// inconsistent.
pub fn analyze_winding(mesh: &MeshBuffers) -> WindingReport {
    let mut directed: HashMap<(u32, u32), u32> =
        HashMap::with_capacity(mesh.triangle_count() * 3);

    for t in 0..mesh.triangle_count() {
        let [i0, i1, i2] = mesh.tri(t);
        for (from, to) in [(i0, i1), (i1, i2), (i2, i0)] {
            *directed.entry((from, to)).or_insert(0) += 1;
        }
    }

    let mut manifold_edge_count = 0;
    let mut inconsistent_edge_count = 0;
    let mut seen: HashSet<(u32, u32)> = HashSet::with_capacity(directed.len());

    for &(from, to) in directed.keys() {
        let key = edge_key(from, to);
        if !seen.insert(key) {
            continue;
        }
        let forward = directed.get(&(key.0, key.1)).copied().unwrap_or(0);
        let backward = directed.get(&(key.1, key.0)).copied().unwrap_or(0);
        if forward + backward != 2 {
            continue;
        }
        manifold_edge_count += 1;
        if forward != 1 || backward != 1 {
            inconsistent_edge_count += 1;
        }
    }

    let consistency_percent = if manifold_edge_count == 0 {
        100.0
    } else {
        100.0 * (manifold_edge_count - inconsistent_edge_count) as f64
            / manifold_edge_count as f64
    };

    debug!(
        "winding: {} manifold edge(s), {} inconsistent ({:.1}%)",
        manifold_edge_count, inconsistent_edge_count, consistency_percent
    );

    WindingReport {
        manifold_edge_count,
        inconsistent_edge_count,
        consistency_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(positions: &[f32], indices: &[u32]) -> WindingReport {
        let mesh = MeshBuffers::new(positions, indices).unwrap();
        analyze_winding(&mesh)
    }

    const QUAD_POSITIONS: [f32; 12] = [
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        0.5, 1.0, 0.0, //
        0.5, -1.0, 0.0,
    ];

    #[test]
    fn test_consistent_pair() {
        // Shared edge (0, 1) traversed as 0->1 and 1->0.
        let report = analyze(&QUAD_POSITIONS, &[0, 1, 2, 1, 0, 3]);
        assert_eq!(report.manifold_edge_count, 1);
        assert_eq!(report.inconsistent_edge_count, 0);
        assert_eq!(report.consistency_percent, 100.0);
    }

    #[test]
    fn test_flipped_pair() {
        // Both triangles traverse the shared edge as 0->1.
        let report = analyze(&QUAD_POSITIONS, &[0, 1, 2, 0, 1, 3]);
        assert_eq!(report.manifold_edge_count, 1);
        assert_eq!(report.inconsistent_edge_count, 1);
        assert_eq!(report.consistency_percent, 0.0);
    }

    #[test]
    fn test_boundary_edges_excluded() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let report = analyze(&positions, &[0, 1, 2]);
        assert_eq!(report.manifold_edge_count, 0);
        assert_eq!(report.consistency_percent, 100.0);
    }

    #[test]
    fn test_triple_edge_excluded() {
        // Edge (0, 1) carried by three triangles is not a winding-manifold
        // edge and contributes to neither count.
        let positions = [
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.5, 1.0, 0.0, //
            0.5, -1.0, 0.0, //
            0.5, 0.0, 1.0,
        ];
        let report = analyze(&positions, &[0, 1, 2, 0, 1, 3, 0, 1, 4]);
        assert_eq!(report.manifold_edge_count, 0);
        assert_eq!(report.inconsistent_edge_count, 0);
        assert_eq!(report.consistency_percent, 100.0);
    }
}
