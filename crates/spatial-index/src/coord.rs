//! Integer cell coordinates and inclusive coordinate ranges.

/// Integer coordinate of a cell in the index lattice.
///
/// Each component lies in `0..cells_per_axis` for the index it came from.
///
/// # Example
///
/// ```
/// use spatial_index::CellCoord;
///
/// let a = CellCoord::new(1, 2, 3);
/// let b = CellCoord::new(3, 2, 0);
/// assert_eq!(a.chebyshev_distance(b), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellCoord {
    /// Index along X.
    pub x: usize,
    /// Index along Y.
    pub y: usize,
    /// Index along Z.
    pub z: usize,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Returns the coordinate as an array.
    #[must_use]
    pub const fn as_array(self) -> [usize; 3] {
        [self.x, self.y, self.z]
    }

    /// Maximum per-axis index difference to `other`.
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> usize {
        self.x
            .abs_diff(other.x)
            .max(self.y.abs_diff(other.y))
            .max(self.z.abs_diff(other.z))
    }

    /// Linear index `x·n² + y·n + z` for a lattice with `n` cells per axis.
    #[must_use]
    pub const fn linear(self, cells_per_axis: usize) -> usize {
        (self.x * cells_per_axis + self.y) * cells_per_axis + self.z
    }

    /// Inverse of [`linear`](Self::linear).
    #[must_use]
    pub const fn from_linear(index: usize, cells_per_axis: usize) -> Self {
        let n = cells_per_axis;
        Self::new(index / (n * n), (index / n) % n, index % n)
    }
}

impl From<[usize; 3]> for CellCoord {
    fn from([x, y, z]: [usize; 3]) -> Self {
        Self::new(x, y, z)
    }
}

/// An inclusive box of cell coordinates.
///
/// Iterates in linear-index order (Z fastest, then Y, then X), so the
/// visiting order matches the memory layout of the index.
///
/// # Example
///
/// ```
/// use spatial_index::{CellCoord, CellRange};
///
/// let range = CellRange::new(CellCoord::new(0, 0, 0), CellCoord::new(1, 1, 2));
/// assert_eq!(range.len(), 12);
/// assert_eq!(range.iter().nth(1), Some(CellCoord::new(0, 0, 1)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    /// Lowest corner (inclusive).
    pub min: CellCoord,
    /// Highest corner (inclusive).
    pub max: CellCoord,
}

impl CellRange {
    /// Creates a range from two corners, sorting each axis.
    #[must_use]
    pub fn new(a: CellCoord, b: CellCoord) -> Self {
        Self {
            min: CellCoord::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: CellCoord::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Cells within per-direction offsets of `center`, clipped to the lattice.
    ///
    /// `below[a]` and `above[a]` give how far the range extends on each side
    /// of `center` along axis `a`.
    #[must_use]
    pub fn around(
        center: CellCoord,
        below: [usize; 3],
        above: [usize; 3],
        cells_per_axis: usize,
    ) -> Self {
        let c = center.as_array();
        let last = cells_per_axis.saturating_sub(1);
        let lo: [usize; 3] = std::array::from_fn(|a| c[a].saturating_sub(below[a]));
        let hi: [usize; 3] = std::array::from_fn(|a| c[a].saturating_add(above[a]).min(last));
        Self {
            min: lo.into(),
            max: hi.into(),
        }
    }

    /// Number of cells in the range.
    #[must_use]
    pub const fn len(&self) -> usize {
        (self.max.x - self.min.x + 1) * (self.max.y - self.min.y + 1) * (self.max.z - self.min.z + 1)
    }

    /// Always `false`; a range holds at least one cell.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Checks if a coordinate lies within the range.
    #[must_use]
    pub const fn contains(&self, coord: CellCoord) -> bool {
        coord.x >= self.min.x
            && coord.x <= self.max.x
            && coord.y >= self.min.y
            && coord.y <= self.max.y
            && coord.z >= self.min.z
            && coord.z <= self.max.z
    }

    /// Iterates over every coordinate in the range.
    #[must_use]
    pub const fn iter(&self) -> CellRangeIter {
        CellRangeIter {
            range: *self,
            current: Some(self.min),
        }
    }
}

impl IntoIterator for CellRange {
    type Item = CellCoord;
    type IntoIter = CellRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over all coordinates in a [`CellRange`].
#[derive(Debug, Clone)]
pub struct CellRangeIter {
    range: CellRange,
    current: Option<CellCoord>,
}

impl Iterator for CellRangeIter {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;

        let mut next = current;
        next.z += 1;
        if next.z > self.range.max.z {
            next.z = self.range.min.z;
            next.y += 1;
            if next.y > self.range.max.y {
                next.y = self.range.min.y;
                next.x += 1;
                if next.x > self.range.max.x {
                    self.current = None;
                    return Some(current);
                }
            }
        }
        self.current = Some(next);

        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.current.map_or(0, |c| {
            let r = self.range;
            let size_y = r.max.y - r.min.y + 1;
            let size_z = r.max.z - r.min.z + 1;
            (r.max.z - c.z + 1) + (r.max.y - c.y) * size_z + (r.max.x - c.x) * size_y * size_z
        });
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CellRangeIter {}
