//! Dihedral angle analysis across manifold edges.

use nalgebra::Vector3;
use tracing::debug;

use crate::adjacency::{MeshAdjacency, edge_key};
use crate::stats::DistributionStats;
use crate::types::MeshBuffers;

/// Face normals shorter than this are degenerate and excluded.
const MIN_NORMAL_LENGTH: f64 = 1e-10;
/// Dihedral angles below this (degrees) count as sharp creases.
const SHARP_ANGLE_DEG: f64 = 30.0;
/// Dihedral angles above this (degrees) count as coplanar.
const COPLANAR_ANGLE_DEG: f64 = 170.0;

/// Sharp/coplanar counts and the dihedral angle distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct DihedralReport {
    pub sharp_edge_count: usize,
    pub coplanar_edge_count: usize,
    /// Over every edge with exactly two non-degenerate incident faces.
    pub angle_stats: Option<DistributionStats>,
}

/// Measure the dihedral angle at every edge shared by exactly two triangles.
///
/// The angle between the half-planes is `180 - acos(n1 . n2)` in degrees; a
/// flat surface therefore measures 180 and a knife edge approaches 0.
pub fn analyze_dihedrals(mesh: &MeshBuffers, adjacency: &MeshAdjacency) -> DihedralReport {
    let triangle_count = mesh.triangle_count();
    let normals: Vec<Vector3<f64>> = (0..triangle_count)
        .map(|t| mesh.triangle(t).normal_unnormalized())
        .collect();

    let mut sharp_edge_count = 0;
    let mut coplanar_edge_count = 0;
    let mut angles = Vec::new();

    // Walk edges via their lowest-index incident triangle so each shared
    // edge is visited exactly once, in triangle order.
    for t in 0..triangle_count {
        let [i0, i1, i2] = mesh.tri(t);
        for (a, b) in [(i0, i1), (i1, i2), (i2, i0)] {
            let key = edge_key(a, b);
            let Some(faces) = adjacency.faces_of(key) else {
                continue;
            };
            if faces.len() != 2 || faces[0] != t as u32 {
                continue;
            }

            let n1 = &normals[faces[0] as usize];
            let n2 = &normals[faces[1] as usize];
            let len1 = n1.norm();
            let len2 = n2.norm();
            if len1 < MIN_NORMAL_LENGTH || len2 < MIN_NORMAL_LENGTH {
                continue;
            }

            let cos = (n1.dot(n2) / (len1 * len2)).clamp(-1.0, 1.0);
            let dihedral = 180.0 - cos.acos().to_degrees();

            if dihedral < SHARP_ANGLE_DEG {
                sharp_edge_count += 1;
            }
            if dihedral > COPLANAR_ANGLE_DEG {
                coplanar_edge_count += 1;
            }
            angles.push(dihedral);
        }
    }

    debug!(
        "dihedral: {} sharp, {} coplanar of {} shared edge(s)",
        sharp_edge_count,
        coplanar_edge_count,
        angles.len()
    );

    DihedralReport {
        sharp_edge_count,
        coplanar_edge_count,
        angle_stats: DistributionStats::from_samples(angles),
    }
}
