//! Topology counters: edge classes, connected components, Euler
//! characteristic, isolated vertices, and the valence distribution.

use std::collections::BTreeMap;

use tracing::debug;

use crate::adjacency::MeshAdjacency;
use crate::types::MeshBuffers;

/// Union-find over vertex indices with path halving.
pub struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
        }
    }

    pub fn find(&mut self, mut v: u32) -> u32 {
        while self.parent[v as usize] != v {
            let grandparent = self.parent[self.parent[v as usize] as usize];
            self.parent[v as usize] = grandparent;
            v = grandparent;
        }
        v
    }

    pub fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[rb as usize] = ra;
        }
    }
}

/// Edge classification, component, and Euler counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologySummary {
    pub edge_count: usize,
    pub boundary_edge_count: usize,
    pub manifold_edge_count: usize,
    pub non_manifold_edge_count: usize,
    pub used_vertex_count: usize,
    pub isolated_vertex_count: usize,
    pub connected_components: usize,
    pub euler_characteristic: i64,
}

/// Classify edges and count components over the used vertex set.
///
/// Components come from union-find over vertices that appear in at least one
/// triangle, uniting `{i0,i1}` and `{i1,i2}` per triangle. The Euler
/// characteristic is `used - edges + triangles`.
pub fn summarize_topology(mesh: &MeshBuffers, adjacency: &MeshAdjacency) -> TopologySummary {
    let vertex_count = mesh.vertex_count();
    let triangle_count = mesh.triangle_count();

    let mut used = vec![false; vertex_count];
    let mut union_find = UnionFind::new(vertex_count);

    for t in 0..triangle_count {
        let [i0, i1, i2] = mesh.tri(t);
        used[i0 as usize] = true;
        used[i1 as usize] = true;
        used[i2 as usize] = true;
        union_find.union(i0, i1);
        union_find.union(i1, i2);
    }

    let mut used_vertex_count = 0;
    let mut roots = vec![false; vertex_count];
    let mut connected_components = 0;
    for v in 0..vertex_count as u32 {
        if !used[v as usize] {
            continue;
        }
        used_vertex_count += 1;
        let root = union_find.find(v);
        if !roots[root as usize] {
            roots[root as usize] = true;
            connected_components += 1;
        }
    }

    let edge_count = adjacency.edge_count();
    let summary = TopologySummary {
        edge_count,
        boundary_edge_count: adjacency.boundary_edge_count(),
        manifold_edge_count: adjacency.manifold_edge_count(),
        non_manifold_edge_count: adjacency.non_manifold_edge_count(),
        used_vertex_count,
        isolated_vertex_count: vertex_count - used_vertex_count,
        connected_components,
        euler_characteristic: used_vertex_count as i64 - edge_count as i64 + triangle_count as i64,
    };

    debug!(
        "topology: {} edges ({} boundary, {} non-manifold), {} component(s), chi = {}",
        summary.edge_count,
        summary.boundary_edge_count,
        summary.non_manifold_edge_count,
        summary.connected_components,
        summary.euler_characteristic
    );

    summary
}

/// Histogram of per-vertex triangle incidence. Valence 0 is omitted, so the
/// map is empty for a mesh with no triangles.
pub fn valence_histogram(mesh: &MeshBuffers) -> BTreeMap<u32, i64> {
    let mut valence = vec![0u32; mesh.vertex_count()];
    for &index in mesh.indices() {
        valence[index as usize] += 1;
    }

    let mut histogram = BTreeMap::new();
    for &v in &valence {
        if v > 0 {
            *histogram.entry(v).or_insert(0) += 1;
        }
    }
    histogram
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summarize(positions: &[f32], indices: &[u32]) -> TopologySummary {
        let mesh = MeshBuffers::new(positions, indices).unwrap();
        let adjacency = MeshAdjacency::build(&mesh);
        summarize_topology(&mesh, &adjacency)
    }

    #[test]
    fn test_single_triangle() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let summary = summarize(&positions, &[0, 1, 2]);

        assert_eq!(summary.edge_count, 3);
        assert_eq!(summary.boundary_edge_count, 3);
        assert_eq!(summary.connected_components, 1);
        assert_eq!(summary.isolated_vertex_count, 0);
        // chi = 3 - 3 + 1
        assert_eq!(summary.euler_characteristic, 1);
    }

    #[test]
    fn test_two_components_and_isolated_vertex() {
        let positions = [
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            10.0, 0.0, 0.0, //
            11.0, 0.0, 0.0, //
            10.0, 1.0, 0.0, //
            50.0, 50.0, 50.0, // never referenced
        ];
        let summary = summarize(&positions, &[0, 1, 2, 3, 4, 5]);

        assert_eq!(summary.connected_components, 2);
        assert_eq!(summary.used_vertex_count, 6);
        assert_eq!(summary.isolated_vertex_count, 1);
    }

    #[test]
    fn test_empty_mesh() {
        let summary = summarize(&[], &[]);
        assert_eq!(summary.edge_count, 0);
        assert_eq!(summary.connected_components, 0);
        assert_eq!(summary.euler_characteristic, 0);
    }

    #[test]
    fn test_valence_histogram() {
        let positions = [
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.5, 1.0, 0.0, //
            1.5, 1.0, 0.0, //
            9.0, 9.0, 9.0, // isolated
        ];
        let indices = [0, 1, 2, 1, 3, 2];
        let mesh = MeshBuffers::new(&positions, &indices).unwrap();
        let histogram = valence_histogram(&mesh);

        // Vertices 0 and 3 have valence 1; vertices 1 and 2 have valence 2.
        assert_eq!(histogram.get(&1), Some(&2));
        assert_eq!(histogram.get(&2), Some(&2));
        assert_eq!(histogram.get(&0), None);
    }

    #[test]
    fn test_valence_histogram_empty() {
        let mesh = MeshBuffers::new(&[0.0, 0.0, 0.0], &[]).unwrap();
        assert!(valence_histogram(&mesh).is_empty());
    }
}
