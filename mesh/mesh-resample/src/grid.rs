//! Regular target grids.

use mesh_types::{Aabb, Point3, Vector3};

use crate::error::{ResampleError, ResampleResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned lattice of sample points with uniform spacing.
///
/// Points are numbered with x varying fastest:
/// `index = ix + nx * (iy + ny * iz)`.
///
/// # Example
///
/// ```
/// use mesh_resample::RegularGrid;
/// use mesh_types::Point3;
///
/// let grid = RegularGrid::new(Point3::origin(), 0.5, [3, 2, 2]).unwrap();
/// assert_eq!(grid.len(), 12);
/// assert_eq!(grid.index(1, 1, 0), 4);
/// assert_eq!(grid.point(2, 1, 1), Point3::new(1.0, 0.5, 0.5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegularGrid {
    origin: Point3<f64>,
    spacing: f64,
    dims: [usize; 3],
}

impl RegularGrid {
    /// Creates a grid of `dims` points starting at `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`ResampleError::InvalidGrid`] if `spacing` is not a positive
    /// finite number, any dimension is zero, or the point count overflows.
    pub fn new(origin: Point3<f64>, spacing: f64, dims: [usize; 3]) -> ResampleResult<Self> {
        let invalid = || ResampleError::InvalidGrid { spacing, dims };
        if !(spacing.is_finite() && spacing > 0.0) || dims.contains(&0) {
            return Err(invalid());
        }
        dims[0]
            .checked_mul(dims[1])
            .and_then(|n| n.checked_mul(dims[2]))
            .ok_or_else(invalid)?;
        Ok(Self {
            origin,
            spacing,
            dims,
        })
    }

    /// Creates the grid with the given spacing that starts at the box's
    /// minimum corner and does not extend past its maximum corner.
    ///
    /// Each axis gets `floor(extent / spacing) + 1` points.
    ///
    /// # Errors
    ///
    /// Returns [`ResampleError::InvalidGrid`] if the box is empty or the
    /// spacing is invalid.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn covering(bounds: &Aabb, spacing: f64) -> ResampleResult<Self> {
        if bounds.is_empty() || !(spacing.is_finite() && spacing > 0.0) {
            return Err(ResampleError::InvalidGrid {
                spacing,
                dims: [0; 3],
            });
        }
        let size = bounds.size();
        let mut dims = [0usize; 3];
        for (dim, extent) in dims.iter_mut().zip(size.iter()) {
            let steps = (extent / spacing).floor();
            if !steps.is_finite() || steps >= usize::MAX as f64 {
                return Err(ResampleError::InvalidGrid { spacing, dims: [0; 3] });
            }
            *dim = steps as usize + 1;
        }
        Self::new(bounds.min, spacing, dims)
    }

    /// Minimum corner.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Point3<f64> {
        self.origin
    }

    /// Distance between adjacent points.
    #[inline]
    #[must_use]
    pub const fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Points per axis.
    #[inline]
    #[must_use]
    pub const fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Total number of points.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Always `false`; a grid has at least one point.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Linear index of a lattice coordinate.
    #[inline]
    #[must_use]
    pub const fn index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        ix + self.dims[0] * (iy + self.dims[1] * iz)
    }

    /// Lattice coordinate of a linear index.
    #[inline]
    #[must_use]
    pub const fn coords(&self, index: usize) -> [usize; 3] {
        let [nx, ny, _] = self.dims;
        [index % nx, (index / nx) % ny, index / (nx * ny)]
    }

    /// Position of a lattice coordinate.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn point(&self, ix: usize, iy: usize, iz: usize) -> Point3<f64> {
        self.origin + Vector3::new(ix as f64, iy as f64, iz as f64) * self.spacing
    }

    /// Position of a linear index.
    #[must_use]
    pub fn point_at(&self, index: usize) -> Point3<f64> {
        let [ix, iy, iz] = self.coords(index);
        self.point(ix, iy, iz)
    }

    /// All positions in linear order.
    pub fn points(&self) -> impl ExactSizeIterator<Item = Point3<f64>> + '_ {
        (0..self.len()).map(|i| self.point_at(i))
    }

    /// Bounding box of the grid points.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        let [nx, ny, nz] = self.dims;
        Aabb::new(self.origin, self.point(nx - 1, ny - 1, nz - 1))
    }

    /// The eight corners of [`bounds`](Self::bounds).
    #[must_use]
    pub fn corners(&self) -> [Point3<f64>; 8] {
        self.bounds().corners()
    }
}
