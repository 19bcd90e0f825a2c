//! Index construction and point-to-cell mapping.

use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::coord::CellCoord;
use crate::error::{SpatialError, SpatialResult};

/// One cell of the index lattice.
///
/// Holds its lattice coordinate, its world-space corners and the indices of
/// the primary points binned into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    coord: CellCoord,
    min: Point3<f64>,
    max: Point3<f64>,
    members: Vec<u32>,
}

impl Cell {
    /// Lattice coordinate of the cell.
    #[must_use]
    pub const fn coord(&self) -> CellCoord {
        self.coord
    }

    /// Minimum world-space corner.
    #[must_use]
    pub const fn min(&self) -> &Point3<f64> {
        &self.min
    }

    /// Maximum world-space corner.
    #[must_use]
    pub const fn max(&self) -> &Point3<f64> {
        &self.max
    }

    /// Indices (into the indexed point slice) of the points in this cell.
    #[must_use]
    pub fn members(&self) -> &[u32] {
        &self.members
    }

    /// Number of points in this cell.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Checks whether the cell holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Squared distance from `point` to the closest point of the cell box.
    ///
    /// Zero when the point lies inside the cell.
    #[must_use]
    pub fn distance_squared_to(&self, point: &Point3<f64>) -> f64 {
        (0..3)
            .map(|a| {
                let d = (self.min[a] - point[a]).max(point[a] - self.max[a]).max(0.0);
                d * d
            })
            .sum()
    }
}

/// A uniform cubic lattice of cells over a borrowed point set.
///
/// The bounds are a single scalar `min`/`max` shared by all three axes, so
/// every cell is a cube of edge `(max - min) / cells_per_axis`. The index
/// borrows its points; the lifetime `'a` ties it to the slice it was built
/// from.
///
/// # Example
///
/// ```
/// use nalgebra::Point3;
/// use spatial_index::SpatialIndex;
///
/// let points = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 1.0),
///     Point3::new(0.9, 0.1, 0.5),
/// ];
/// let index = SpatialIndex::build(&points, &[], 2).unwrap();
///
/// assert_eq!(index.cell_count(), 8);
/// assert_eq!(index.binned_count(), 3);
/// assert_eq!(index.cell_edge(), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct SpatialIndex<'a> {
    points: &'a [Point3<f64>],
    min: f64,
    max: f64,
    cells_per_axis: usize,
    edge: f64,
    cells: Vec<Cell>,
    binned: usize,
    dropped: usize,
}

impl<'a> SpatialIndex<'a> {
    /// Builds an index over `points`.
    ///
    /// The bounds cover every finite coordinate of `points` and `auxiliary`;
    /// auxiliary points only widen the bounds and are never binned. A point
    /// whose cell index along an axis is exactly `cells_per_axis` (it sits on
    /// the upper bound) goes to the last cell, and negative indices go to the
    /// first cell. Points with a non-finite coordinate are dropped with a
    /// warning.
    ///
    /// # Errors
    ///
    /// - [`SpatialError::InvalidCellCount`] if `cells_per_axis == 0`
    /// - [`SpatialError::TooManyCells`] if `cells_per_axis³` overflows
    /// - [`SpatialError::TooManyPoints`] if `points` cannot be indexed by `u32`
    /// - [`SpatialError::EmptyPointSet`] if there is no finite coordinate at all
    /// - [`SpatialError::DegenerateBounds`] if all coordinates are equal
    pub fn build(
        points: &'a [Point3<f64>],
        auxiliary: &[Point3<f64>],
        cells_per_axis: usize,
    ) -> SpatialResult<Self> {
        if cells_per_axis == 0 {
            return Err(SpatialError::InvalidCellCount(cells_per_axis));
        }
        let cell_count = cells_per_axis
            .checked_pow(3)
            .ok_or(SpatialError::TooManyCells { cells_per_axis })?;
        if u32::try_from(points.len()).is_err() {
            return Err(SpatialError::TooManyPoints {
                count: points.len(),
            });
        }

        let (min, max) = scalar_bounds(points.iter().chain(auxiliary))
            .ok_or(SpatialError::EmptyPointSet)?;
        if max <= min {
            return Err(SpatialError::DegenerateBounds { value: min });
        }

        #[allow(clippy::cast_precision_loss)]
        let edge = (max - min) / cells_per_axis as f64;

        let mut index = Self {
            points,
            min,
            max,
            cells_per_axis,
            edge,
            cells: Vec::with_capacity(cell_count),
            binned: 0,
            dropped: 0,
        };
        index.cells = (0..cell_count)
            .map(|linear| index.empty_cell(CellCoord::from_linear(linear, cells_per_axis)))
            .collect();

        for (i, point) in (0u32..).zip(points) {
            match index.cell_index_for(point) {
                Some(cell) => {
                    index.cells[cell].members.push(i);
                    index.binned += 1;
                }
                None => {
                    warn!(index = i, ?point, "dropping point that maps to no cell");
                    index.dropped += 1;
                }
            }
        }

        info!(
            points = points.len(),
            auxiliary = auxiliary.len(),
            cells_per_axis,
            binned = index.binned,
            dropped = index.dropped,
            "built spatial index"
        );
        debug!(min, max, edge, "spatial index bounds");

        Ok(index)
    }

    fn empty_cell(&self, coord: CellCoord) -> Cell {
        let corner = |c: usize, offset: f64| {
            #[allow(clippy::cast_precision_loss)]
            let c = c as f64;
            (c + offset).mul_add(self.edge, self.min)
        };
        Cell {
            coord,
            min: Point3::new(corner(coord.x, 0.0), corner(coord.y, 0.0), corner(coord.z, 0.0)),
            max: Point3::new(corner(coord.x, 1.0), corner(coord.y, 1.0), corner(coord.z, 1.0)),
            members: Vec::new(),
        }
    }

    /// Maps one coordinate to a cell index along an axis.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn axis_index(&self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            return None;
        }
        let t = ((value - self.min) / self.edge).floor();
        if t < 0.0 {
            return Some(0);
        }
        let i = t as usize;
        match i.cmp(&self.cells_per_axis) {
            std::cmp::Ordering::Less => Some(i),
            std::cmp::Ordering::Equal => Some(self.cells_per_axis - 1),
            std::cmp::Ordering::Greater => None,
        }
    }

    /// Returns the cell a point maps to.
    ///
    /// Coordinates exactly on the upper bound map to the last cell and
    /// coordinates below the lower bound map to the first. Returns `None` if
    /// any axis falls past the last cell or is not finite.
    ///
    /// # Example
    ///
    /// ```
    /// use nalgebra::Point3;
    /// use spatial_index::{CellCoord, SpatialIndex};
    ///
    /// let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)];
    /// let index = SpatialIndex::build(&points, &[], 2).unwrap();
    ///
    /// assert_eq!(index.cell_for(&Point3::new(1.0, 1.0, 1.0)), Some(CellCoord::new(1, 1, 1)));
    /// assert_eq!(index.cell_for(&Point3::new(0.5, 0.2, 0.7)), Some(CellCoord::new(1, 0, 1)));
    /// assert_eq!(index.cell_for(&Point3::new(5.0, 0.0, 0.0)), None);
    /// ```
    #[must_use]
    pub fn cell_for(&self, point: &Point3<f64>) -> Option<CellCoord> {
        Some(CellCoord::new(
            self.axis_index(point.x)?,
            self.axis_index(point.y)?,
            self.axis_index(point.z)?,
        ))
    }

    /// Linear index of the cell a point maps to; see [`cell_for`](Self::cell_for).
    #[must_use]
    pub fn cell_index_for(&self, point: &Point3<f64>) -> Option<usize> {
        self.cell_for(point).map(|c| c.linear(self.cells_per_axis))
    }

    /// Lower scalar bound shared by all axes.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Upper scalar bound shared by all axes.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Number of cells along each axis.
    #[must_use]
    pub const fn cells_per_axis(&self) -> usize {
        self.cells_per_axis
    }

    /// Edge length of every cell.
    #[must_use]
    pub const fn cell_edge(&self) -> f64 {
        self.edge
    }

    /// Total number of cells (`cells_per_axis³`).
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Returns a cell by coordinate, or `None` if out of range.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        let n = self.cells_per_axis;
        if coord.x >= n || coord.y >= n || coord.z >= n {
            return None;
        }
        self.cells.get(coord.linear(n))
    }

    /// All cells in linear-index order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The indexed point slice.
    #[must_use]
    pub const fn points(&self) -> &'a [Point3<f64>] {
        self.points
    }

    /// Number of points in the indexed slice, binned or not.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Checks whether the indexed slice is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points stored in some cell.
    #[must_use]
    pub const fn binned_count(&self) -> usize {
        self.binned
    }

    /// Number of points dropped during construction.
    #[must_use]
    pub const fn dropped_count(&self) -> usize {
        self.dropped
    }
}

/// Scalar min/max over all finite coordinates.
fn scalar_bounds<'p>(points: impl Iterator<Item = &'p Point3<f64>>) -> Option<(f64, f64)> {
    points
        .flat_map(|p| p.coords.iter().copied())
        .filter(|c| c.is_finite())
        .fold(None, |acc, c| match acc {
            None => Some((c, c)),
            Some((lo, hi)) => Some((f64::min(lo, c), f64::max(hi, c))),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lattice() -> Vec<Point3<f64>> {
        let mut points = Vec::new();
        for x in 0..2 {
            for y in 0..2 {
                for z in 0..2 {
                    points.push(Point3::new(f64::from(x), f64::from(y), f64::from(z)));
                }
            }
        }
        points
    }

    // ==================== Construction Tests ====================

    #[test]
    fn build_rejects_zero_cells() {
        let points = lattice();
        assert_eq!(
            SpatialIndex::build(&points, &[], 0).unwrap_err(),
            SpatialError::InvalidCellCount(0)
        );
    }

    #[test]
    fn build_rejects_empty_input() {
        assert_eq!(
            SpatialIndex::build(&[], &[], 4).unwrap_err(),
            SpatialError::EmptyPointSet
        );
        let nan = [Point3::new(f64::NAN, f64::NAN, f64::NAN)];
        assert_eq!(
            SpatialIndex::build(&nan, &[], 4).unwrap_err(),
            SpatialError::EmptyPointSet
        );
    }

    #[test]
    fn build_rejects_degenerate_bounds() {
        let points = [Point3::new(2.0, 2.0, 2.0)];
        assert_eq!(
            SpatialIndex::build(&points, &[], 4).unwrap_err(),
            SpatialError::DegenerateBounds { value: 2.0 }
        );
    }

    #[test]
    fn auxiliary_points_widen_bounds_only() {
        let points = [Point3::new(2.0, 2.0, 2.0)];
        let aux = [Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 4.0, 4.0)];
        let index = SpatialIndex::build(&points, &aux, 4).unwrap();

        assert_eq!(index.min(), 0.0);
        assert_eq!(index.max(), 4.0);
        assert_eq!(index.cell_edge(), 1.0);
        assert_eq!(index.binned_count(), 1);
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.cell(CellCoord::new(2, 2, 2)).unwrap().members(),
            &[0]
        );
    }

    #[test]
    fn cells_have_precomputed_corners() {
        let points = lattice();
        let index = SpatialIndex::build(&points, &[], 2).unwrap();
        assert_eq!(index.cell_count(), 8);

        let cell = index.cell(CellCoord::new(1, 0, 1)).unwrap();
        assert_eq!(cell.coord(), CellCoord::new(1, 0, 1));
        assert_relative_eq!(cell.min().x, 0.5);
        assert_relative_eq!(cell.min().y, 0.0);
        assert_relative_eq!(cell.max().z, 1.0);
        assert_eq!(index.cells()[CellCoord::new(1, 0, 1).linear(2)], *cell);
    }

    #[test]
    fn non_finite_points_are_dropped() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(f64::NAN, 0.5, 0.5),
            Point3::new(1.0, 1.0, 1.0),
        ];
        let index = SpatialIndex::build(&points, &[], 2).unwrap();
        assert_eq!(index.binned_count(), 2);
        assert_eq!(index.dropped_count(), 1);
        let total: usize = index.cells().iter().map(Cell::len).sum();
        assert_eq!(total, 2);
    }

    // ==================== Mapping Tests ====================

    #[test]
    fn upper_bound_clamps_to_last_cell() {
        let points = lattice();
        let index = SpatialIndex::build(&points, &[], 2).unwrap();
        assert_eq!(
            index.cell_for(&Point3::new(1.0, 1.0, 1.0)),
            Some(CellCoord::new(1, 1, 1))
        );
        assert_eq!(
            index.cell_for(&Point3::new(1.0, 0.0, 0.5)),
            Some(CellCoord::new(1, 0, 1))
        );
        // every lattice corner lands in its own cell
        assert!(index.cells().iter().all(|c| c.len() == 1));
    }

    #[test]
    fn below_lower_bound_clamps_to_first_cell() {
        let points = lattice();
        let index = SpatialIndex::build(&points, &[], 2).unwrap();
        assert_eq!(
            index.cell_for(&Point3::new(-3.0, 0.2, 0.9)),
            Some(CellCoord::new(0, 0, 1))
        );
    }

    #[test]
    fn past_upper_bound_maps_to_no_cell() {
        let points = lattice();
        let index = SpatialIndex::build(&points, &[], 2).unwrap();
        // 1.5 / 0.5 = 3 > n on the x axis only
        assert_eq!(index.cell_for(&Point3::new(1.5, 0.0, 0.0)), None);
        assert_eq!(index.cell_for(&Point3::new(0.0, 0.0, 1.5)), None);
        assert_eq!(index.cell_index_for(&Point3::new(0.0, f64::INFINITY, 0.0)), None);
        // just past the bound still rounds down to n, which clamps
        assert_eq!(
            index.cell_for(&Point3::new(1.2, 0.0, 0.0)),
            Some(CellCoord::new(1, 0, 0))
        );
    }

    #[test]
    fn cell_lookup_out_of_range() {
        let points = lattice();
        let index = SpatialIndex::build(&points, &[], 2).unwrap();
        assert!(index.cell(CellCoord::new(2, 0, 0)).is_none());
        assert!(index.cell(CellCoord::new(0, 0, 2)).is_none());
    }

    #[test]
    fn cell_distance_lower_bound() {
        let points = lattice();
        let index = SpatialIndex::build(&points, &[], 2).unwrap();
        let cell = index.cell(CellCoord::new(1, 1, 1)).unwrap();
        assert_eq!(cell.distance_squared_to(&Point3::new(0.75, 0.75, 0.75)), 0.0);
        assert_relative_eq!(cell.distance_squared_to(&Point3::new(0.0, 0.5, 0.5)), 0.25);
    }
}
