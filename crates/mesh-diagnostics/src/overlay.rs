//! Problem-geometry overlay extraction.
//!
//! The overlay carries the coordinates of offending geometry so a viewer can
//! highlight it: line segments for bad edges, points for bad vertices and
//! intersection sites. Coordinates are the raw input floats, in the same
//! frame as the position buffer.

use serde::{Deserialize, Serialize};

use crate::adjacency::MeshAdjacency;
use crate::types::MeshBuffers;

/// Highlight geometry for a diagnosed mesh.
///
/// Segment arrays (`boundary_edges`, `non_manifold_edges`) hold six floats
/// per edge; point arrays hold three floats per entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshOverlay {
    pub boundary_edges: Vec<f32>,
    pub non_manifold_edges: Vec<f32>,
    pub non_manifold_vertices: Vec<f32>,
    pub self_intersection_centroids: Vec<f32>,
    pub t_junction_vertices: Vec<f32>,
}

impl MeshOverlay {
    /// True when nothing needs highlighting.
    pub fn is_empty(&self) -> bool {
        self.boundary_edges.is_empty()
            && self.non_manifold_edges.is_empty()
            && self.non_manifold_vertices.is_empty()
            && self.self_intersection_centroids.is_empty()
            && self.t_junction_vertices.is_empty()
    }
}

/// Assemble the overlay from the detection passes' findings.
///
/// Edge segments are emitted in ascending canonical-key order, points in
/// ascending vertex order, and intersection centroids in ascending pair
/// order, so the overlay is byte-identical across runs.
pub fn extract_overlay(
    mesh: &MeshBuffers,
    adjacency: &MeshAdjacency,
    pinch_vertices: &[u32],
    intersecting_pairs: &[(u32, u32)],
    t_junction_vertices: &[u32],
) -> MeshOverlay {
    let mut overlay = MeshOverlay::default();

    let mut boundary: Vec<(u32, u32)> = Vec::new();
    let mut non_manifold: Vec<(u32, u32)> = Vec::new();
    for (&key, faces) in &adjacency.edge_to_faces {
        match faces.len() {
            1 => boundary.push(key),
            2 => {}
            _ => non_manifold.push(key),
        }
    }
    boundary.sort_unstable();
    non_manifold.sort_unstable();

    for (a, b) in boundary {
        mesh.push_raw_point(a, &mut overlay.boundary_edges);
        mesh.push_raw_point(b, &mut overlay.boundary_edges);
    }
    for (a, b) in non_manifold {
        mesh.push_raw_point(a, &mut overlay.non_manifold_edges);
        mesh.push_raw_point(b, &mut overlay.non_manifold_edges);
    }

    for &v in pinch_vertices {
        mesh.push_raw_point(v, &mut overlay.non_manifold_vertices);
    }

    for &(t1, t2) in intersecting_pairs {
        let a = mesh.triangle(t1 as usize);
        let b = mesh.triangle(t2 as usize);
        let sum = a.v0.coords + a.v1.coords + a.v2.coords + b.v0.coords + b.v1.coords + b.v2.coords;
        let centroid = sum / 6.0;
        overlay
            .self_intersection_centroids
            .extend_from_slice(&[centroid.x as f32, centroid.y as f32, centroid.z as f32]);
    }

    for &v in t_junction_vertices {
        mesh.push_raw_point(v, &mut overlay.t_junction_vertices);
    }

    overlay
}
