//! Coincident face detection.
//!
//! Two triangles that lie in the same plane with overlapping support and no
//! shared vertices usually come from duplicated geometry or failed boolean
//! output. Candidates are gathered by centroid proximity and confirmed by
//! normal alignment and plane distance.

use hashbrown::HashSet;
use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::spatial::SpatialGrid;
use crate::types::{BoundingBox, MeshBuffers};

/// `|n1 . n2|` above this means parallel or antiparallel faces.
const PARALLEL_DOT: f64 = 0.999;
/// Plane separation threshold as a fraction of the diagonal.
const PLANE_DISTANCE_FRACTION: f64 = 1e-5;
/// Normals shorter than this are degenerate and excluded.
const MIN_NORMAL_LENGTH: f64 = 1e-10;
/// Smallest permitted centroid cell size.
const MIN_CELL_SIZE: f64 = 1e-6;

/// Count pairs of coincident faces.
pub fn count_coincident_faces(mesh: &MeshBuffers, bounds: &BoundingBox) -> usize {
    let triangle_count = mesh.triangle_count();
    if triangle_count < 2 {
        return 0;
    }

    let cell_size = (bounds.diagonal / (triangle_count as f64 / 10.0).sqrt()).max(MIN_CELL_SIZE);
    let plane_tolerance = bounds.diagonal * PLANE_DISTANCE_FRACTION;

    let mut centroids: Vec<Point3<f64>> = Vec::with_capacity(triangle_count);
    let mut normals: Vec<Vector3<f64>> = Vec::with_capacity(triangle_count);
    let mut grid = SpatialGrid::new(cell_size);

    for t in 0..triangle_count {
        let triangle = mesh.triangle(t);
        let centroid = triangle.centroid();
        grid.insert_point(&centroid, t as u32);
        centroids.push(centroid);
        normals.push(triangle.normal_unnormalized());
    }

    // Candidate pairs from the same or an adjacent centroid cell.
    let mut pairs: HashSet<(u32, u32)> = HashSet::new();
    for t in 0..triangle_count as u32 {
        grid.for_each_in_neighborhood(grid.cell_of(&centroids[t as usize]), |other| {
            if other > t {
                pairs.insert((t, other));
            }
        });
    }

    let mut coincident_count = 0;
    for &(t1, t2) in &pairs {
        let a = mesh.tri(t1 as usize);
        let b = mesh.tri(t2 as usize);
        if a.iter().any(|i| b.contains(i)) {
            continue;
        }

        let n1 = &normals[t1 as usize];
        let n2 = &normals[t2 as usize];
        let len1 = n1.norm();
        let len2 = n2.norm();
        if len1 < MIN_NORMAL_LENGTH || len2 < MIN_NORMAL_LENGTH {
            continue;
        }
        if (n1.dot(n2) / (len1 * len2)).abs() <= PARALLEL_DOT {
            continue;
        }

        let offset = centroids[t2 as usize] - centroids[t1 as usize];
        if offset.norm() > cell_size {
            continue;
        }

        // Distance from t2's centroid to t1's plane, measured with t1's
        // normal as the divisor.
        if (n1.dot(&offset) / len1).abs() < plane_tolerance {
            coincident_count += 1;
        }
    }

    if coincident_count > 0 {
        debug!("found {} coincident face pair(s)", coincident_count);
    }

    coincident_count
}
