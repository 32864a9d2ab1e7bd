//! The analysis pipeline and its diagnostics record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::adjacency::{MeshAdjacency, build_vertex_faces};
use crate::coincident::count_coincident_faces;
use crate::dihedral::analyze_dihedrals;
use crate::duplicates::count_duplicate_vertices;
use crate::error::MeshResult;
use crate::intersect::detect_self_intersections;
use crate::overlay::{MeshOverlay, extract_overlay};
use crate::pinch::detect_pinch_vertices;
use crate::quality::analyze_quality;
use crate::stats::DistributionStats;
use crate::thin_walls::count_thin_wall_vertices;
use crate::tjunction::detect_t_junctions;
use crate::topology::{summarize_topology, valence_histogram};
use crate::types::{BoundingBox, MeshBuffers};
use crate::winding::analyze_winding;

/// Largest triangle count the analyzer accepts before short-circuiting.
///
/// Matches a map-size limit of 2^24 entries in the reference deployment
/// divided by three edges per triangle. Meshes above the cap still get their
/// vertex/triangle counts and bounding box; every other field is the `-1`
/// sentinel. This is a documented capacity limit, not an error.
pub const TRIANGLE_CAPACITY: usize = 5_592_405;

/// Winding percentages at or above this count as consistent.
const CONSISTENT_WINDING_PERCENT: f64 = 99.5;

/// Tunable analysis parameters.
///
/// Detection tolerances are fixed by the engine; the only knob is the
/// thin-wall threshold, expressed as a fraction of the bounding-box
/// diagonal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeParams {
    /// Thin-wall threshold as a fraction of the diagonal.
    pub thin_wall_fraction: f64,
}

impl Default for AnalyzeParams {
    fn default() -> Self {
        Self {
            thin_wall_fraction: 0.005,
        }
    }
}

impl AnalyzeParams {
    /// Create params with a custom thin-wall fraction.
    pub fn with_thin_wall_fraction(thin_wall_fraction: f64) -> Self {
        Self { thin_wall_fraction }
    }
}

/// Everything one analysis produces: the scalar diagnostics and the
/// highlight overlay, derived from the same snapshot of the inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshAnalysis {
    pub diagnostics: MeshDiagnostics,
    pub overlay: MeshOverlay,
}

/// Diagnostics for one mesh.
///
/// Count fields are `-1` only when the triangle-capacity cap triggered; see
/// [`TRIANGLE_CAPACITY`]. Statistics blocks are absent when their inputs are
/// empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshDiagnostics {
    pub vertex_count: i64,
    pub triangle_count: i64,
    pub edge_count: i64,
    pub boundary_edge_count: i64,
    pub non_manifold_edge_count: i64,
    pub non_manifold_vertex_count: i64,
    pub connected_components: i64,
    pub euler_characteristic: i64,
    pub degenerate_triangle_count: i64,
    pub winding_inconsistent_edge_count: i64,
    pub duplicate_vertex_count: i64,
    pub tiny_triangle_count: i64,
    pub needle_triangle_count: i64,
    pub isolated_vertex_count: i64,
    pub sharp_edge_count: i64,
    pub coplanar_edge_count: i64,
    pub self_intersection_count: i64,
    pub t_junction_count: i64,
    pub thin_wall_count: i64,
    pub coincident_face_count: i64,

    /// Percentage of winding-manifold edges traversed consistently, or `-1`
    /// when the winding check was skipped.
    pub winding_consistency_percent: f64,
    pub winding_check_skipped: bool,
    /// Thin-wall threshold as a fraction of the diagonal.
    pub thin_wall_threshold: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_length_stats: Option<DistributionStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio_stats: Option<DistributionStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dihedral_angle_stats: Option<DistributionStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valence_distribution: Option<BTreeMap<u32, i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,

    pub is_watertight: bool,
    pub is_manifold: bool,
    pub has_non_manifold_vertices: bool,
    pub has_consistent_winding: bool,
}

impl MeshDiagnostics {
    /// True when every topology check a closed printable surface needs came
    /// back clean.
    pub fn is_clean(&self) -> bool {
        self.is_watertight
            && self.is_manifold
            && !self.has_non_manifold_vertices
            && self.has_consistent_winding
            && self.self_intersection_count == 0
    }
}

impl std::fmt::Display for MeshDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Mesh Diagnostics:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;

        if self.winding_check_skipped && self.edge_count < 0 {
            writeln!(
                f,
                "  Analysis skipped: triangle count exceeds capacity ({})",
                TRIANGLE_CAPACITY
            )?;
            return Ok(());
        }

        writeln!(
            f,
            "  Edges: {} ({} boundary, {} non-manifold)",
            self.edge_count, self.boundary_edge_count, self.non_manifold_edge_count
        )?;
        writeln!(f, "  Components: {}", self.connected_components)?;
        writeln!(f, "  Euler characteristic: {}", self.euler_characteristic)?;

        if let Some(bbox) = &self.bounding_box {
            writeln!(
                f,
                "  Bounds: [{:.2}, {:.2}, {:.2}] to [{:.2}, {:.2}, {:.2}]",
                bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z
            )?;
        }

        writeln!(
            f,
            "  Watertight: {} (boundary edges: {})",
            if self.is_watertight { "yes" } else { "NO" },
            self.boundary_edge_count
        )?;
        writeln!(
            f,
            "  Manifold: {} (non-manifold edges: {}, pinch vertices: {})",
            if self.is_manifold { "yes" } else { "NO" },
            self.non_manifold_edge_count,
            self.non_manifold_vertex_count
        )?;
        writeln!(
            f,
            "  Winding: {} ({:.1}% consistent, {} inconsistent edges)",
            if self.has_consistent_winding {
                "consistent"
            } else {
                "INCONSISTENT"
            },
            self.winding_consistency_percent,
            self.winding_inconsistent_edge_count
        )?;
        writeln!(
            f,
            "  Triangle quality: {} degenerate, {} tiny, {} needle",
            self.degenerate_triangle_count, self.tiny_triangle_count, self.needle_triangle_count
        )?;
        writeln!(
            f,
            "  Vertices: {} duplicate, {} isolated",
            self.duplicate_vertex_count, self.isolated_vertex_count
        )?;
        writeln!(
            f,
            "  Edges: {} sharp, {} coplanar",
            self.sharp_edge_count, self.coplanar_edge_count
        )?;
        writeln!(
            f,
            "  Proximity: {} self-intersections, {} T-junctions, {} thin walls, {} coincident faces",
            self.self_intersection_count,
            self.t_junction_count,
            self.thin_wall_count,
            self.coincident_face_count
        )?;

        Ok(())
    }
}

/// Analyze a mesh with default parameters.
///
/// `positions` holds packed vertex coordinates and `indices` packed
/// triangles, as described on [`MeshBuffers`]. Fails fast on ragged buffers,
/// out-of-range indices, or non-finite coordinates.
///
/// # Example
///
/// ```
/// let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
/// let indices = [0, 1, 2];
///
/// let analysis = mesh_diagnostics::analyze(&positions, &indices).unwrap();
/// assert_eq!(analysis.diagnostics.boundary_edge_count, 3);
/// assert!(!analysis.diagnostics.is_watertight);
/// ```
pub fn analyze(positions: &[f32], indices: &[u32]) -> MeshResult<MeshAnalysis> {
    analyze_with_params(positions, indices, &AnalyzeParams::default())
}

/// Analyze a mesh with explicit parameters.
pub fn analyze_with_params(
    positions: &[f32],
    indices: &[u32],
    params: &AnalyzeParams,
) -> MeshResult<MeshAnalysis> {
    let mesh = MeshBuffers::new(positions, indices)?;
    let vertex_count = mesh.vertex_count();
    let triangle_count = mesh.triangle_count();
    let bounding_box = mesh.bounding_box();

    debug!(
        "analyzing mesh: {} vertices, {} triangles",
        vertex_count, triangle_count
    );

    if triangle_count > TRIANGLE_CAPACITY {
        warn!(
            "mesh exceeds triangle capacity ({} > {}), reporting counts and bounds only",
            triangle_count, TRIANGLE_CAPACITY
        );
        return Ok(MeshAnalysis {
            diagnostics: capacity_limited(vertex_count, triangle_count, bounding_box, params),
            overlay: MeshOverlay::default(),
        });
    }

    let adjacency = MeshAdjacency::build(&mesh);
    let vertex_faces = build_vertex_faces(&mesh);

    let topology = summarize_topology(&mesh, &adjacency);
    let valence = valence_histogram(&mesh);
    let pinch_vertices = detect_pinch_vertices(&mesh, &vertex_faces);
    let winding = analyze_winding(&mesh);
    let quality = analyze_quality(&mesh);
    let duplicate_vertex_count = count_duplicate_vertices(&mesh);
    let dihedral = analyze_dihedrals(&mesh, &adjacency);

    // Proximity passes need a scale; an empty mesh has nothing to find.
    let (intersecting_pairs, t_junction_vertices, thin_wall_count, coincident_face_count) =
        match &bounding_box {
            Some(bounds) => (
                detect_self_intersections(&mesh, bounds),
                detect_t_junctions(&mesh, &adjacency, &vertex_faces, bounds),
                count_thin_wall_vertices(&mesh, &vertex_faces, bounds, params.thin_wall_fraction),
                count_coincident_faces(&mesh, bounds),
            ),
            None => (Vec::new(), Vec::new(), 0, 0),
        };

    let overlay = extract_overlay(
        &mesh,
        &adjacency,
        &pinch_vertices,
        &intersecting_pairs,
        &t_junction_vertices,
    );

    let is_watertight = topology.boundary_edge_count == 0;
    let is_manifold = topology.non_manifold_edge_count == 0;
    let has_consistent_winding = winding.consistency_percent >= CONSISTENT_WINDING_PERCENT;

    let diagnostics = MeshDiagnostics {
        vertex_count: vertex_count as i64,
        triangle_count: triangle_count as i64,
        edge_count: topology.edge_count as i64,
        boundary_edge_count: topology.boundary_edge_count as i64,
        non_manifold_edge_count: topology.non_manifold_edge_count as i64,
        non_manifold_vertex_count: pinch_vertices.len() as i64,
        connected_components: topology.connected_components as i64,
        euler_characteristic: topology.euler_characteristic,
        degenerate_triangle_count: quality.degenerate_count as i64,
        winding_inconsistent_edge_count: winding.inconsistent_edge_count as i64,
        duplicate_vertex_count: duplicate_vertex_count as i64,
        tiny_triangle_count: quality.tiny_count as i64,
        needle_triangle_count: quality.needle_count as i64,
        isolated_vertex_count: topology.isolated_vertex_count as i64,
        sharp_edge_count: dihedral.sharp_edge_count as i64,
        coplanar_edge_count: dihedral.coplanar_edge_count as i64,
        self_intersection_count: intersecting_pairs.len() as i64,
        t_junction_count: t_junction_vertices.len() as i64,
        thin_wall_count: thin_wall_count as i64,
        coincident_face_count: coincident_face_count as i64,
        winding_consistency_percent: winding.consistency_percent,
        winding_check_skipped: false,
        thin_wall_threshold: params.thin_wall_fraction,
        edge_length_stats: quality.edge_length_stats,
        aspect_ratio_stats: quality.aspect_ratio_stats,
        dihedral_angle_stats: dihedral.angle_stats,
        valence_distribution: if valence.is_empty() {
            None
        } else {
            Some(valence)
        },
        bounding_box,
        is_watertight,
        is_manifold,
        has_non_manifold_vertices: !pinch_vertices.is_empty(),
        has_consistent_winding,
    };

    if !diagnostics.is_watertight {
        warn!(
            "mesh is not watertight: {} boundary edges",
            diagnostics.boundary_edge_count
        );
    }
    if !diagnostics.is_manifold {
        warn!(
            "mesh is not manifold: {} non-manifold edges",
            diagnostics.non_manifold_edge_count
        );
    }
    if !diagnostics.has_consistent_winding {
        warn!(
            "winding is inconsistent: {} flipped edge(s), {:.1}% consistent",
            diagnostics.winding_inconsistent_edge_count, diagnostics.winding_consistency_percent
        );
    }

    info!(
        "analysis complete: {} vertices, {} triangles, {} edges, {} component(s)",
        vertex_count, triangle_count, topology.edge_count, topology.connected_components
    );

    Ok(MeshAnalysis {
        diagnostics,
        overlay,
    })
}

/// Diagnostics for a mesh over the triangle capacity: real counts and bounds
/// only, sentinels everywhere else.
fn capacity_limited(
    vertex_count: usize,
    triangle_count: usize,
    bounding_box: Option<BoundingBox>,
    params: &AnalyzeParams,
) -> MeshDiagnostics {
    MeshDiagnostics {
        vertex_count: vertex_count as i64,
        triangle_count: triangle_count as i64,
        edge_count: -1,
        boundary_edge_count: -1,
        non_manifold_edge_count: -1,
        non_manifold_vertex_count: -1,
        connected_components: -1,
        euler_characteristic: -1,
        degenerate_triangle_count: -1,
        winding_inconsistent_edge_count: -1,
        duplicate_vertex_count: -1,
        tiny_triangle_count: -1,
        needle_triangle_count: -1,
        isolated_vertex_count: -1,
        sharp_edge_count: -1,
        coplanar_edge_count: -1,
        self_intersection_count: -1,
        t_junction_count: -1,
        thin_wall_count: -1,
        coincident_face_count: -1,
        winding_consistency_percent: -1.0,
        winding_check_skipped: true,
        thin_wall_threshold: params.thin_wall_fraction,
        edge_length_stats: None,
        aspect_ratio_stats: None,
        dihedral_angle_stats: None,
        valence_distribution: None,
        bounding_box,
        is_watertight: false,
        is_manifold: false,
        has_non_manifold_vertices: false,
        has_consistent_winding: false,
    }
}
