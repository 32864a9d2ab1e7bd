//! Topological and geometric diagnostics for indexed triangle meshes.
//!
//! This crate analyzes a single triangle mesh, given as packed position and
//! index buffers, and produces a structured report of its defects:
//!
//! - **Topology**: holes (boundary edges), non-manifold edges, pinch
//!   vertices, connected components, Euler characteristic, winding
//!   consistency
//! - **Geometry**: degenerate/tiny/needle triangles, duplicate vertices,
//!   self-intersections, T-junctions, thin walls, coincident faces
//! - **Distributions**: edge lengths, aspect ratios, vertex valence,
//!   dihedral angles, bounding volume
//!
//! Alongside the scalar diagnostics it extracts a problem-geometry
//! **overlay**: the coordinates of offending edges and vertices, ready for a
//! viewer to highlight in 3D.
//!
//! The analyzer is a pure synchronous function over borrowed memory. It
//! never mutates its input, holds no global state, and given identical
//! inputs produces bit-identical output, so it is safe to run concurrently
//! on disjoint meshes.
//!
//! # Quick Start
//!
//! ```
//! // A unit right triangle.
//! let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
//! let indices = [0, 1, 2];
//!
//! let analysis = mesh_diagnostics::analyze(&positions, &indices).unwrap();
//!
//! // An open triangle has three hole edges and is not watertight.
//! assert_eq!(analysis.diagnostics.boundary_edge_count, 3);
//! assert!(!analysis.diagnostics.is_watertight);
//! assert!(analysis.diagnostics.is_manifold);
//!
//! // The overlay carries one line segment per boundary edge.
//! assert_eq!(analysis.overlay.boundary_edges.len(), 6 * 3);
//!
//! println!("{}", analysis.diagnostics);
//! ```
//!
//! # Input contract
//!
//! `positions` packs `x, y, z` per vertex and `indices` packs three vertex
//! indices per triangle. Ragged buffers, out-of-range indices, and
//! non-finite coordinates fail fast with a [`MeshError`] naming the first
//! offence; no partial analysis is attempted.
//!
//! # Capacity
//!
//! Meshes above [`TRIANGLE_CAPACITY`] triangles are not analyzed in full:
//! the result still carries the vertex/triangle counts and bounding box, but
//! every other count is the `-1` sentinel and `winding_check_skipped` is
//! set. This is a documented limit, not an error.
//!
//! # Scope
//!
//! The crate is the analysis engine only. It does not parse model files,
//! render overlays, or repair meshes; callers hand it buffers they already
//! extracted and consume the reports it returns. Reports serialize with
//! serde (camelCase field names) for transport across process or worker
//! boundaries.

mod error;
mod stats;
mod types;

pub mod adjacency;
pub mod coincident;
pub mod diagnose;
pub mod dihedral;
pub mod duplicates;
pub mod intersect;
pub mod overlay;
pub mod pinch;
pub mod quality;
pub mod spatial;
pub mod thin_walls;
pub mod tjunction;
pub mod topology;
pub mod winding;

pub use diagnose::{
    AnalyzeParams, MeshAnalysis, MeshDiagnostics, TRIANGLE_CAPACITY, analyze, analyze_with_params,
};
pub use error::{MeshError, MeshResult};
pub use overlay::MeshOverlay;
pub use stats::DistributionStats;
pub use types::{BoundingBox, MeshBuffers, Triangle};
