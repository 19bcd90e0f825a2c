//! Parameters for point location.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for building an [`ElementLocator`](crate::ElementLocator).
///
/// # Example
///
/// ```
/// use mesh_locate::LocateParams;
///
/// let params = LocateParams::default();
/// assert_eq!(params.cells_per_axis, 4);
/// assert!((params.tolerance - 1e-5).abs() < 1e-20);
///
/// // Finer search grid for a large mesh
/// let scaled = LocateParams::scaled_to(1_000_000);
/// assert!(scaled.cells_per_axis > 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocateParams {
    /// Cells per axis of the nearest-vertex search grid.
    pub cells_per_axis: usize,

    /// Sub-measures with magnitude below this are ignored by the
    /// containment test, so points on faces and edges count as inside.
    /// Absolute, in mesh units of area or volume.
    pub tolerance: f64,
}

impl Default for LocateParams {
    fn default() -> Self {
        Self {
            cells_per_axis: 4,
            tolerance: 1e-5,
        }
    }
}

impl LocateParams {
    /// Target number of vertices per search cell for [`scaled_to`](Self::scaled_to).
    pub const VERTICES_PER_CELL: usize = 8;

    /// Params with a search grid sized for `vertex_count` vertices.
    ///
    /// Aims for about [`VERTICES_PER_CELL`](Self::VERTICES_PER_CELL)
    /// vertices per cell, never below the default of 4 cells per axis nor
    /// above 128.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn scaled_to(vertex_count: usize) -> Self {
        let per_cell = vertex_count as f64 / Self::VERTICES_PER_CELL as f64;
        let n = per_cell.cbrt().ceil() as usize;
        Self {
            cells_per_axis: n.clamp(4, 128),
            ..Self::default()
        }
    }

    /// Params with a zero tolerance: points on an element boundary are
    /// outside.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            tolerance: 0.0,
            ..Self::default()
        }
    }

    /// Set the number of search cells per axis.
    #[must_use]
    pub const fn cells_per_axis(mut self, cells: usize) -> Self {
        self.cells_per_axis = cells;
        self
    }

    /// Set the containment tolerance.
    #[must_use]
    pub const fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}
