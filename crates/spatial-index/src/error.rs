//! Error types for spatial index construction.

/// Result type for spatial index operations.
pub type SpatialResult<T> = Result<T, SpatialError>;

/// Errors that can occur while building a [`SpatialIndex`](crate::SpatialIndex).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum SpatialError {
    /// The number of cells per axis must be at least 1.
    #[error("cells per axis must be at least 1, got {0}")]
    InvalidCellCount(usize),

    /// The requested grid has more cells than can be addressed.
    #[error("{cells_per_axis}^3 cells cannot be addressed")]
    TooManyCells {
        /// Requested cells per axis.
        cells_per_axis: usize,
    },

    /// Neither the primary nor the auxiliary points have a finite coordinate.
    #[error("no finite coordinates to derive bounds from")]
    EmptyPointSet,

    /// All coordinates are equal, so the cell edge would be zero.
    #[error("degenerate bounds: min == max == {value}")]
    DegenerateBounds {
        /// The single coordinate value shared by every axis.
        value: f64,
    },

    /// More primary points than `u32` indices can address.
    #[error("too many points: {count} (limit is u32::MAX)")]
    TooManyPoints {
        /// Number of primary points supplied.
        count: usize,
    },
}
