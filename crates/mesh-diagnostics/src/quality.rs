//! Triangle quality: degenerate, tiny, and needle detection plus shape
//! statistics.

use tracing::debug;

use crate::stats::DistributionStats;
use crate::types::MeshBuffers;

/// Aspect ratios above this mark a needle triangle.
const NEEDLE_ASPECT_RATIO: f64 = 10.0;
/// Fraction of the median area below which a triangle is tiny.
const TINY_AREA_FRACTION: f64 = 0.01;
/// Scale factor applied to the expected equilateral area when testing for
/// degeneracy.
const DEGENERATE_FACTOR: f64 = 1e-8;
/// Squared area of a unit-edge equilateral triangle: (sqrt(3)/4)^2.
const EQUILATERAL_AREA_SQ: f64 = 0.1875;
/// Number of leading triangles sampled for the reference edge length.
const EDGE_SAMPLE_LIMIT: usize = 1000;

/// Per-mesh triangle quality summary.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub degenerate_count: usize,
    pub tiny_count: usize,
    pub needle_count: usize,
    /// Over all `3T` edge-length samples; `None` for an empty mesh.
    pub edge_length_stats: Option<DistributionStats>,
    /// Over finite aspect ratios only.
    pub aspect_ratio_stats: Option<DistributionStats>,
}

/// Classify every triangle and collect shape statistics.
///
/// Degeneracy is judged against the mesh's own scale: the squared-area test
/// `4A^2 < 1e-8 * 0.1875 * mean_edge^2` uses the average edge length of the
/// first `min(T, 1000)` triangles, avoiding a square root per triangle.
pub fn analyze_quality(mesh: &MeshBuffers) -> QualityReport {
    let triangle_count = mesh.triangle_count();
    if triangle_count == 0 {
        return QualityReport {
            degenerate_count: 0,
            tiny_count: 0,
            needle_count: 0,
            edge_length_stats: None,
            aspect_ratio_stats: None,
        };
    }

    // Reference edge length from a leading sample.
    let sample_count = triangle_count.min(EDGE_SAMPLE_LIMIT);
    let mut edge_sum = 0.0;
    for t in 0..sample_count {
        let lengths = mesh.triangle(t).edge_lengths();
        edge_sum += lengths[0] + lengths[1] + lengths[2];
    }
    let mean_edge = edge_sum / (sample_count * 3) as f64;
    let degenerate_threshold = DEGENERATE_FACTOR * EQUILATERAL_AREA_SQ * mean_edge * mean_edge;

    let mut degenerate_count = 0;
    let mut needle_count = 0;
    let mut areas = Vec::with_capacity(triangle_count);
    let mut edge_samples = Vec::with_capacity(triangle_count * 3);
    let mut aspect_samples = Vec::with_capacity(triangle_count);

    for t in 0..triangle_count {
        let triangle = mesh.triangle(t);

        let four_area_sq = triangle.normal_unnormalized().norm_squared();
        if four_area_sq < degenerate_threshold {
            degenerate_count += 1;
        }
        areas.push(four_area_sq.sqrt() * 0.5);

        edge_samples.extend_from_slice(&triangle.edge_lengths());

        let aspect = triangle.aspect_ratio();
        if aspect > NEEDLE_ASPECT_RATIO {
            needle_count += 1;
        }
        if aspect.is_finite() {
            aspect_samples.push(aspect);
        }
    }

    // Tiny triangles are judged against the median area.
    let mut sorted_areas = areas.clone();
    sorted_areas.sort_by(f64::total_cmp);
    let median_area = if triangle_count % 2 == 1 {
        sorted_areas[triangle_count / 2]
    } else {
        (sorted_areas[triangle_count / 2 - 1] + sorted_areas[triangle_count / 2]) * 0.5
    };
    let tiny_threshold = TINY_AREA_FRACTION * median_area;
    let tiny_count = areas.iter().filter(|&&a| a > 0.0 && a < tiny_threshold).count();

    debug!(
        "quality: {} degenerate, {} tiny, {} needle of {} triangle(s)",
        degenerate_count, tiny_count, needle_count, triangle_count
    );

    QualityReport {
        degenerate_count,
        tiny_count,
        needle_count,
        edge_length_stats: DistributionStats::from_samples(edge_samples),
        aspect_ratio_stats: DistributionStats::from_samples(aspect_samples),
    }
}
