//! Error types for resampling.

use mesh_locate::LocateError;
use mesh_types::MeshError;
use thiserror::Error;

/// Result type for resampling operations.
pub type ResampleResult<T> = Result<T, ResampleError>;

/// Errors that can occur while setting up or running a resample.
///
/// All of these are detected before any point is processed. A target point
/// that lies in no element is not an error.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ResampleError {
    /// A field frame does not have one value per mesh vertex.
    #[error("frame {frame} has {actual} values, expected {expected}")]
    FieldLengthMismatch {
        /// Index of the offending frame.
        frame: usize,
        /// Expected number of values.
        expected: usize,
        /// Actual number of values.
        actual: usize,
    },

    /// The output buffer does not have one row per frame and one slot per target.
    #[error("output must be {frames} rows of {targets} values")]
    OutputShapeMismatch {
        /// Required number of rows.
        frames: usize,
        /// Required row length.
        targets: usize,
    },

    /// The field has no frames.
    #[error("field has no frames")]
    EmptyField,

    /// Grid spacing or dimensions are unusable.
    #[error("invalid grid: spacing {spacing}, dimensions {dims:?}")]
    InvalidGrid {
        /// Requested spacing.
        spacing: f64,
        /// Requested points per axis.
        dims: [usize; 3],
    },

    /// A snapshot index is out of range.
    #[error("snapshot {index} out of range (deformation has {count} snapshots)")]
    InvalidSnapshot {
        /// The invalid index.
        index: usize,
        /// Number of snapshots.
        count: usize,
    },

    /// Forward and backward step lists differ in length or are empty.
    #[error("deformation needs equal, non-empty step lists (forward {forward}, backward {backward})")]
    DeformationMismatch {
        /// Number of forward steps.
        forward: usize,
        /// Number of backward steps.
        backward: usize,
    },

    /// A deformation step does not have one displacement per mesh vertex.
    #[error("deformation step {step} has {displacements} displacements for {vertices} vertices")]
    DisplacementCount {
        /// Index of the step.
        step: usize,
        /// Vertices in the step mesh.
        vertices: usize,
        /// Displacements supplied.
        displacements: usize,
    },

    /// Building a locator failed.
    #[error(transparent)]
    Locate(#[from] LocateError),

    /// A mesh operation failed.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}
