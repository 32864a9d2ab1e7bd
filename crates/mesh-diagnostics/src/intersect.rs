//! Self-intersection detection.
//!
//! A uniform grid sized to the average triangle footprint prunes the pair
//! space, then a Moller interval test decides each surviving pair. Pairs
//! sharing two or more vertices are legitimate neighbors and are skipped;
//! pairs that merely touch at a shared vertex or along a shared edge line do
//! not count as intersecting.

use hashbrown::HashSet;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::spatial::SpatialGrid;
use crate::types::{BoundingBox, MeshBuffers, Triangle};

/// Interval/plane-distance tolerance for the narrow phase.
const PLANE_TOL: f64 = 1e-8;
/// Normals whose cross product is shorter than this mark a coplanar pair.
const PARALLEL_TOL: f64 = 1e-10;
/// Smallest permitted broad-phase cell size.
const MIN_CELL_SIZE: f64 = 1e-6;

/// Find all intersecting triangle pairs, sorted ascending by `(t1, t2)`.
pub fn detect_self_intersections(mesh: &MeshBuffers, bounds: &BoundingBox) -> Vec<(u32, u32)> {
    let triangle_count = mesh.triangle_count();
    if triangle_count < 2 {
        return Vec::new();
    }

    let triangles: Vec<Triangle> = mesh.triangles().collect();

    // Cell size tracks the expected triangle footprint: half the triangles
    // tile the surface, so the mean edge is about diagonal / sqrt(T/2).
    let mean_edge = bounds.diagonal / (triangle_count as f64 / 2.0).sqrt();
    let cell_size = (2.0 * mean_edge).max(MIN_CELL_SIZE);

    let mut grid = SpatialGrid::new(cell_size);
    for (t, triangle) in triangles.iter().enumerate() {
        let (min, max) = triangle.aabb();
        grid.insert_aabb(&min, &max, t as u32);
    }

    // Candidate pairs, deduplicated across cells.
    let mut pairs: HashSet<(u32, u32)> = HashSet::new();
    for (t, triangle) in triangles.iter().enumerate() {
        let (min, max) = triangle.aabb();
        grid.for_each_in_aabb(&min, &max, |other| {
            if other as usize > t {
                pairs.insert((t as u32, other));
            }
        });
    }

    let mut candidates: Vec<(u32, u32)> = pairs
        .into_iter()
        .filter(|&(a, b)| shared_vertex_count(mesh.tri(a as usize), mesh.tri(b as usize)) < 2)
        .collect();
    candidates.sort_unstable();

    debug!(
        "self-intersection broad phase: {} candidate pair(s) from {} triangle(s)",
        candidates.len(),
        triangle_count
    );

    let mut intersecting: Vec<(u32, u32)> = candidates
        .into_par_iter()
        .filter(|&(a, b)| triangles_intersect(&triangles[a as usize], &triangles[b as usize]))
        .collect();
    intersecting.sort_unstable();

    if !intersecting.is_empty() {
        warn!(
            "found {} self-intersecting triangle pair(s)",
            intersecting.len()
        );
    }

    intersecting
}

fn shared_vertex_count(a: [u32; 3], b: [u32; 3]) -> usize {
    a.iter().filter(|&i| b.contains(i)).count()
}

/// Moller triangle-triangle intersection test.
pub fn triangles_intersect(t1: &Triangle, t2: &Triangle) -> bool {
    let n1 = t1.normal_unnormalized();
    let n2 = t2.normal_unnormalized();

    // Degenerate triangles have no interior to intersect.
    if n1.norm_squared() < PARALLEL_TOL * PARALLEL_TOL
        || n2.norm_squared() < PARALLEL_TOL * PARALLEL_TOL
    {
        return false;
    }

    // Signed distances of each triangle's vertices to the other's plane.
    let offset1 = n1.dot(&t1.v0.coords);
    let d2 = [
        n1.dot(&t2.v0.coords) - offset1,
        n1.dot(&t2.v1.coords) - offset1,
        n1.dot(&t2.v2.coords) - offset1,
    ];
    if same_side(&d2) {
        return false;
    }

    let offset2 = n2.dot(&t2.v0.coords);
    let d1 = [
        n2.dot(&t1.v0.coords) - offset2,
        n2.dot(&t1.v1.coords) - offset2,
        n2.dot(&t1.v2.coords) - offset2,
    ];
    if same_side(&d1) {
        return false;
    }

    let direction = n1.cross(&n2);
    if direction.norm() < PARALLEL_TOL {
        return coplanar_overlap(t1, t2);
    }

    // Project onto the dominant axis of the intersection line.
    let axis = if direction.x.abs() >= direction.y.abs()
        && direction.x.abs() >= direction.z.abs()
    {
        0
    } else if direction.y.abs() >= direction.z.abs() {
        1
    } else {
        2
    };

    let p1 = [t1.v0[axis], t1.v1[axis], t1.v2[axis]];
    let p2 = [t2.v0[axis], t2.v1[axis], t2.v2[axis]];

    let (s1, e1) = crossing_interval(&p1, &d1);
    let (s2, e2) = crossing_interval(&p2, &d2);

    // Intervals must genuinely overlap; grazing contact at the tolerance is
    // not an intersection.
    s1.max(s2) < e1.min(e2) - PLANE_TOL
}

/// True when all three signed distances are strictly on one side of a plane.
fn same_side(d: &[f64; 3]) -> bool {
    (d[0] > PLANE_TOL && d[1] > PLANE_TOL && d[2] > PLANE_TOL)
        || (d[0] < -PLANE_TOL && d[1] < -PLANE_TOL && d[2] < -PLANE_TOL)
}

/// Interval of the projected crossing between a triangle and the other
/// triangle's plane.
///
/// `proj` holds the vertex projections on the chosen axis; `d` the signed
/// plane distances. The caller has already ruled out the all-on-one-side
/// case, so one vertex (the "odd" one) is separated from, or degenerately
/// on, the plane spanned by the other two.
fn crossing_interval(proj: &[f64; 3], d: &[f64; 3]) -> (f64, f64) {
    let (odd, e0, e1) = if d[0] * d[1] > 0.0 {
        (2, 0, 1)
    } else if d[0] * d[2] > 0.0 {
        (1, 0, 2)
    } else if d[1] * d[2] > 0.0 || d[0] != 0.0 {
        (0, 1, 2)
    } else if d[1] != 0.0 {
        (1, 0, 2)
    } else {
        (2, 0, 1)
    };

    let cross = |other: usize| -> f64 {
        let denom = d[odd] - d[other];
        if denom == 0.0 {
            proj[odd]
        } else {
            proj[odd] + (proj[other] - proj[odd]) * d[odd] / denom
        }
    };

    let a = cross(e0);
    let b = cross(e1);
    if a <= b { (a, b) } else { (b, a) }
}

/// 2D overlap test for coplanar triangles.
///
/// Projects both triangles onto the coordinate plane that maximizes their
/// footprint, then reports overlap iff any two edges strictly cross or a
/// vertex of one lies strictly inside the other.
fn coplanar_overlap(t1: &Triangle, t2: &Triangle) -> bool {
    let n = t1.normal_unnormalized();
    let (i0, i1) = if n.x.abs() >= n.y.abs() && n.x.abs() >= n.z.abs() {
        (1, 2)
    } else if n.y.abs() >= n.z.abs() {
        (0, 2)
    } else {
        (0, 1)
    };

    let a = [
        [t1.v0[i0], t1.v0[i1]],
        [t1.v1[i0], t1.v1[i1]],
        [t1.v2[i0], t1.v2[i1]],
    ];
    let b = [
        [t2.v0[i0], t2.v0[i1]],
        [t2.v1[i0], t2.v1[i1]],
        [t2.v2[i0], t2.v2[i1]],
    ];

    for i in 0..3 {
        for j in 0..3 {
            if segments_cross(a[i], a[(i + 1) % 3], b[j], b[(j + 1) % 3]) {
                return true;
            }
        }
    }

    b.iter().any(|p| point_in_triangle(*p, &a)) || a.iter().any(|p| point_in_triangle(*p, &b))
}

/// Strict 2D segment crossing; contact at endpoints (within tolerance) does
/// not count.
fn segments_cross(p1: [f64; 2], p2: [f64; 2], q1: [f64; 2], q2: [f64; 2]) -> bool {
    let orient = |a: [f64; 2], b: [f64; 2], c: [f64; 2]| -> f64 {
        (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
    };

    let o1 = orient(q1, q2, p1);
    let o2 = orient(q1, q2, p2);
    let o3 = orient(p1, p2, q1);
    let o4 = orient(p1, p2, q2);

    ((o1 > PLANE_TOL && o2 < -PLANE_TOL) || (o1 < -PLANE_TOL && o2 > PLANE_TOL))
        && ((o3 > PLANE_TOL && o4 < -PLANE_TOL) || (o3 < -PLANE_TOL && o4 > PLANE_TOL))
}

/// Strict barycentric containment: `u >= 0`, `v >= 0`, `u + v < 1`.
fn point_in_triangle(p: [f64; 2], tri: &[[f64; 2]; 3]) -> bool {
    let v0 = [tri[2][0] - tri[0][0], tri[2][1] - tri[0][1]];
    let v1 = [tri[1][0] - tri[0][0], tri[1][1] - tri[0][1]];
    let v2 = [p[0] - tri[0][0], p[1] - tri[0][1]];

    let dot00 = v0[0] * v0[0] + v0[1] * v0[1];
    let dot01 = v0[0] * v1[0] + v0[1] * v1[1];
    let dot02 = v0[0] * v2[0] + v0[1] * v2[1];
    let dot11 = v1[0] * v1[0] + v1[1] * v1[1];
    let dot12 = v1[0] * v2[0] + v1[1] * v2[1];

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom.abs() < PARALLEL_TOL {
        return false;
    }

    let u = (dot11 * dot02 - dot01 * dot12) / denom;
    let v = (dot00 * dot12 - dot01 * dot02) / denom;
    u > PLANE_TOL && v > PLANE_TOL && u + v < 1.0 - PLANE_TOL
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn detect(positions: &[f32], indices: &[u32]) -> Vec<(u32, u32)> {
        let mesh = MeshBuffers::new(positions, indices).unwrap();
        let bounds = mesh.bounding_box().unwrap();
        detect_self_intersections(&mesh, &bounds)
    }

    fn xy_triangle(x: f64, y: f64, size: f64) -> Triangle {
        Triangle::new(
            Point3::new(x, y, 0.0),
            Point3::new(x + size, y, 0.0),
            Point3::new(x + size / 2.0, y + size, 0.0),
        )
    }

    #[test]
    fn test_far_apart() {
        let t1 = xy_triangle(0.0, 0.0, 1.0);
        let t2 = xy_triangle(10.0, 10.0, 1.0);
        assert!(!triangles_intersect(&t1, &t2));
    }

    #[test]
    fn test_coplanar_disjoint() {
        let t1 = xy_triangle(0.0, 0.0, 1.0);
        let t2 = xy_triangle(2.0, 0.0, 1.0);
        assert!(!triangles_intersect(&t1, &t2));
    }

    #[test]
    fn test_coplanar_overlapping() {
        let t1 = xy_triangle(0.0, 0.0, 2.0);
        let t2 = xy_triangle(0.5, 0.5, 2.0);
        assert!(triangles_intersect(&t1, &t2));
    }

    #[test]
    fn test_crossing_planes() {
        let t1 = Triangle::new(
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let t2 = Triangle::new(
            Point3::new(0.0, 0.0, -1.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.5, 0.0),
        );
        assert!(triangles_intersect(&t1, &t2));
    }

    #[test]
    fn test_parallel_planes() {
        let t1 = xy_triangle(0.0, 0.0, 1.0);
        let mut t2 = xy_triangle(0.0, 0.0, 1.0);
        t2.v0.z = 1.0;
        t2.v1.z = 1.0;
        t2.v2.z = 1.0;
        assert!(!triangles_intersect(&t1, &t2));
    }

    #[test]
    fn test_touching_at_point_not_intersecting() {
        // Perpendicular triangles meeting at exactly one point.
        let t1 = Triangle::new(
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let t2 = Triangle::new(
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 2.0, -1.0),
            Point3::new(0.0, 2.0, 1.0),
        );
        assert!(!triangles_intersect(&t1, &t2));
    }

    #[test]
    fn test_degenerate_triangle_never_intersects() {
        let t1 = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        let t2 = xy_triangle(0.0, -0.5, 2.0);
        assert!(!triangles_intersect(&t1, &t2));
    }

    #[test]
    fn test_detect_crossing_pair() {
        let positions = [
            -1.0, -1.0, 0.0, //
            1.0, -1.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, -1.0, //
            0.0, 0.0, 1.0, //
            1.0, 0.5, 0.0,
        ];
        let pairs = detect(&positions, &[0, 1, 2, 3, 4, 5]);
        assert_eq!(pairs, vec![(0, 1)]);
    }

    #[test]
    fn test_detect_clean_tetrahedron() {
        let positions = [
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.5, 1.0, 0.0, //
            0.5, 0.5, 1.0,
        ];
        let indices = [0, 2, 1, 0, 1, 3, 1, 2, 3, 2, 0, 3];
        assert!(detect(&positions, &indices).is_empty());
    }

    #[test]
    fn test_adjacent_pair_skipped() {
        let positions = [
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.5, 1.0, 0.0, //
            0.5, -1.0, 0.0,
        ];
        assert!(detect(&positions, &[0, 1, 2, 1, 0, 3]).is_empty());
    }
}
