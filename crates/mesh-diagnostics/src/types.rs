//! Core types: borrowed mesh buffers, triangles, bounding volumes.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{MeshError, MeshResult};

/// Altitudes shorter than this make the aspect ratio infinite.
const MIN_ALTITUDE: f64 = 1e-10;

/// A read-only view over an indexed triangle soup.
///
/// `positions` holds packed `x, y, z` coordinates (vertex `v` at offsets
/// `3v..3v+3`); `indices` holds packed triangles (triangle `t` at offsets
/// `3t..3t+3`). The buffers are borrowed for the duration of one analysis and
/// never mutated.
#[derive(Debug, Clone, Copy)]
pub struct MeshBuffers<'a> {
    positions: &'a [f32],
    indices: &'a [u32],
}

impl<'a> MeshBuffers<'a> {
    /// Wrap raw buffers, failing fast on the first contract violation:
    /// ragged arrays, out-of-range indices, or non-finite coordinates.
    pub fn new(positions: &'a [f32], indices: &'a [u32]) -> MeshResult<Self> {
        if !positions.len().is_multiple_of(3) {
            return Err(MeshError::RaggedPositions {
                len: positions.len(),
            });
        }
        if !indices.len().is_multiple_of(3) {
            return Err(MeshError::RaggedIndices { len: indices.len() });
        }

        for (i, &value) in positions.iter().enumerate() {
            if !value.is_finite() {
                return Err(MeshError::InvalidCoordinate {
                    vertex_index: i / 3,
                    coordinate: ["x", "y", "z"][i % 3],
                    value,
                });
            }
        }

        let vertex_count = positions.len() / 3;
        for (i, &index) in indices.iter().enumerate() {
            if index as usize >= vertex_count {
                return Err(MeshError::IndexOutOfRange {
                    triangle_index: i / 3,
                    vertex_index: index,
                    vertex_count,
                });
            }
        }

        Ok(Self { positions, indices })
    }

    /// Number of vertices in the position buffer.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles in the index buffer.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Raw index buffer.
    #[inline]
    pub fn indices(&self) -> &'a [u32] {
        self.indices
    }

    /// Position of vertex `v`, widened to f64 for geometric work.
    #[inline]
    pub fn point(&self, v: u32) -> Point3<f64> {
        let o = v as usize * 3;
        Point3::new(
            self.positions[o] as f64,
            self.positions[o + 1] as f64,
            self.positions[o + 2] as f64,
        )
    }

    /// The three vertex indices of triangle `t`.
    #[inline]
    pub fn tri(&self, t: usize) -> [u32; 3] {
        let o = t * 3;
        [self.indices[o], self.indices[o + 1], self.indices[o + 2]]
    }

    /// Triangle `t` with concrete vertex positions.
    #[inline]
    pub fn triangle(&self, t: usize) -> Triangle {
        let [i0, i1, i2] = self.tri(t);
        Triangle::new(self.point(i0), self.point(i1), self.point(i2))
    }

    /// Iterate over all triangles in index order.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangle_count()).map(|t| self.triangle(t))
    }

    /// Append the raw f32 coordinates of vertex `v` to `out`.
    ///
    /// Used by overlay extraction so highlighted geometry carries the exact
    /// input coordinates.
    #[inline]
    pub fn push_raw_point(&self, v: u32, out: &mut Vec<f32>) {
        let o = v as usize * 3;
        out.extend_from_slice(&self.positions[o..o + 3]);
    }

    /// Axis-aligned bounding box over all vertices, or `None` when the
    /// position buffer is empty.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        if self.positions.is_empty() {
            return None;
        }

        let mut min = self.point(0);
        let mut max = min;
        for v in 1..self.vertex_count() as u32 {
            let p = self.point(v);
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some(BoundingBox::from_corners(min, max))
    }
}

/// Axis-aligned bounding volume with its derived extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
    pub size: Vector3<f64>,
    pub diagonal: f64,
}

impl BoundingBox {
    /// Build from min/max corners.
    pub fn from_corners(min: Point3<f64>, max: Point3<f64>) -> Self {
        let size = max - min;
        Self {
            min,
            max,
            size,
            diagonal: size.norm(),
        }
    }
}

/// A triangle with concrete vertex positions.
///
/// Winding is counter-clockwise when viewed from the front; the unnormalized
/// normal follows the right-hand rule.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    #[inline]
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unnormalized face normal via cross product. Its length is twice the
    /// triangle area.
    #[inline]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Triangle area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Center of mass.
    #[inline]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::new(
            (self.v0.x + self.v1.x + self.v2.x) / 3.0,
            (self.v0.y + self.v1.y + self.v2.y) / 3.0,
            (self.v0.z + self.v1.z + self.v2.z) / 3.0,
        )
    }

    /// Edge lengths `[|v0 v1|, |v1 v2|, |v2 v0|]`.
    #[inline]
    pub fn edge_lengths(&self) -> [f64; 3] {
        [
            (self.v1 - self.v0).norm(),
            (self.v2 - self.v1).norm(),
            (self.v0 - self.v2).norm(),
        ]
    }

    /// Longest edge divided by shortest altitude.
    ///
    /// An equilateral triangle scores ~1.15; slivers score high. Returns
    /// `f64::INFINITY` for triangles with zero area or a vanishing altitude.
    pub fn aspect_ratio(&self) -> f64 {
        let area = self.area();
        if area <= 0.0 {
            return f64::INFINITY;
        }

        let lengths = self.edge_lengths();
        let max_edge = lengths[0].max(lengths[1]).max(lengths[2]);

        // Shortest altitude corresponds to the longest edge as base.
        let altitude = 2.0 * area / max_edge;
        if altitude < MIN_ALTITUDE {
            return f64::INFINITY;
        }

        max_edge / altitude
    }

    /// AABB corners of this triangle.
    pub fn aabb(&self) -> (Point3<f64>, Point3<f64>) {
        (
            Point3::new(
                self.v0.x.min(self.v1.x).min(self.v2.x),
                self.v0.y.min(self.v1.y).min(self.v2.y),
                self.v0.z.min(self.v1.z).min(self.v2.z),
            ),
            Point3::new(
                self.v0.x.max(self.v1.x).max(self.v2.x),
                self.v0.y.max(self.v1.y).max(self.v2.y),
                self.v0.z.max(self.v1.z).max(self.v2.z),
            ),
        )
    }
}
