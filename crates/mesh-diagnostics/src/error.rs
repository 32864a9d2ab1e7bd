//! Error types for mesh analysis.

use thiserror::Error;

/// Result type alias for mesh analysis operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Contract violations in the input buffers.
///
/// The analyzer fails fast on the first offence it finds; it does not attempt
/// partial analysis of malformed input. A capacity-limited result (too many
/// triangles) is *not* an error and is reported through the diagnostics
/// record instead.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Position buffer length is not a multiple of 3.
    #[error("ragged position buffer: length {len} is not a multiple of 3")]
    RaggedPositions { len: usize },

    /// Index buffer length is not a multiple of 3.
    #[error("ragged index buffer: length {len} is not a multiple of 3")]
    RaggedIndices { len: usize },

    /// A triangle references a vertex index outside the position buffer.
    #[error("invalid vertex index: triangle {triangle_index} references vertex {vertex_index}, but mesh only has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle_index: usize,
        vertex_index: u32,
        vertex_count: usize,
    },

    /// A vertex coordinate is NaN or infinite.
    #[error("invalid coordinate at vertex {vertex_index}: {coordinate} is {value}")]
    InvalidCoordinate {
        vertex_index: usize,
        coordinate: &'static str,
        value: f32,
    },
}
