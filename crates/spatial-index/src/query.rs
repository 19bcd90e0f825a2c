//! Nearest-neighbour queries.
//!
//! [`SpatialIndex::find`] picks one of four strategies from the state of the
//! query point's home cell:
//!
//! | Home cell | Strategy |
//! |-----------|----------|
//! | holds a point equal to the query | [`SearchStrategy::Coincident`] |
//! | empty | [`SearchStrategy::ExpandingRing`] |
//! | non-empty | [`SearchStrategy::Directed`] |
//! | none (point past the bounds) | [`SearchStrategy::BruteForce`] |
//!
//! All strategies are exact: they return a point at the true minimum
//! distance. Among equidistant points the first one encountered is kept.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coord::{CellCoord, CellRange};
use crate::index::{Cell, SpatialIndex};

/// How a [`Neighbor`] was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SearchStrategy {
    /// The home cell held a point identical to the query.
    Coincident,
    /// The home cell was empty; rings of cells were searched outward.
    ExpandingRing,
    /// The home cell held a candidate; only cells that can beat it were searched.
    Directed,
    /// The query mapped to no cell; every cell was searched.
    BruteForce,
}

/// Result of a nearest-neighbour query.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Neighbor {
    /// Index of the nearest point in the indexed slice.
    pub index: usize,
    /// Euclidean distance to the query point.
    pub distance: f64,
    /// Strategy that produced the result.
    pub strategy: SearchStrategy,
}

#[derive(Debug, Clone, Copy)]
struct Best {
    index: u32,
    distance_squared: f64,
}

impl Best {
    fn into_neighbor(self, strategy: SearchStrategy) -> Neighbor {
        Neighbor {
            index: self.index as usize,
            distance: self.distance_squared.sqrt(),
            strategy,
        }
    }
}

impl SpatialIndex<'_> {
    /// Finds the indexed point nearest to `point`.
    ///
    /// Returns `None` when no point was binned or when `point` has a NaN
    /// coordinate.
    ///
    /// # Example
    ///
    /// ```
    /// use nalgebra::Point3;
    /// use spatial_index::{SearchStrategy, SpatialIndex};
    ///
    /// let points = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 1.0, 1.0),
    ///     Point3::new(0.9, 0.1, 0.5),
    /// ];
    /// let index = SpatialIndex::build(&points, &[], 4).unwrap();
    ///
    /// let hit = index.find(&Point3::new(0.8, 0.2, 0.4)).unwrap();
    /// assert_eq!(hit.index, 2);
    ///
    /// let same = index.find(&points[1]).unwrap();
    /// assert_eq!(same.index, 1);
    /// assert_eq!(same.strategy, SearchStrategy::Coincident);
    /// ```
    #[must_use]
    pub fn find(&self, point: &Point3<f64>) -> Option<Neighbor> {
        if self.binned_count() == 0 || point.coords.iter().any(|c| c.is_nan()) {
            return None;
        }

        let Some(home) = self.cell_for(point) else {
            return self.search_all_cells(point);
        };
        let home_cell = self.cell(home)?;

        if home_cell.is_empty() {
            return self.expanding_ring(point, home);
        }

        let mut best = None;
        self.scan(home_cell, point, &mut best);
        let best = best?;
        if best.distance_squared == 0.0 {
            return Some(best.into_neighbor(SearchStrategy::Coincident));
        }
        Some(self.directed(point, home_cell, best))
    }

    /// Finds the nearest point by scanning every point in index order.
    ///
    /// Points dropped during construction are skipped. Used as a reference
    /// for cross-checking [`find`](Self::find).
    #[must_use]
    pub fn find_brute_force(&self, point: &Point3<f64>) -> Option<Neighbor> {
        if point.coords.iter().any(|c| c.is_nan()) {
            return None;
        }
        let mut best: Option<Best> = None;
        for (i, candidate) in (0u32..).zip(self.points()) {
            if !candidate.coords.iter().all(|c| c.is_finite()) {
                continue;
            }
            consider(&mut best, i, (candidate - point).norm_squared());
        }
        best.map(|b| b.into_neighbor(SearchStrategy::BruteForce))
    }

    fn scan(&self, cell: &Cell, point: &Point3<f64>, best: &mut Option<Best>) {
        let points = self.points();
        for &member in cell.members() {
            let d2 = (points[member as usize] - point).norm_squared();
            consider(best, member, d2);
        }
    }

    fn search_all_cells(&self, point: &Point3<f64>) -> Option<Neighbor> {
        let mut best = None;
        for cell in self.cells() {
            self.scan(cell, point, &mut best);
        }
        best.map(|b| b.into_neighbor(SearchStrategy::BruteForce))
    }

    /// Searches Chebyshev shells of growing radius around an empty home cell.
    ///
    /// After the first ring that yields a candidate, one more ring is always
    /// swept; sweeping continues while the next ring could still hold a
    /// closer point.
    fn expanding_ring(&self, point: &Point3<f64>, home: CellCoord) -> Option<Neighbor> {
        let n = self.cells_per_axis();
        let last_ring = home
            .as_array()
            .iter()
            .map(|&h| h.max(n - 1 - h))
            .max()
            .unwrap_or(0);

        let mut best = None;
        let mut first_hit = None;
        for radius in 1..=last_ring {
            let shell = CellRange::around(home, [radius; 3], [radius; 3], n);
            for coord in shell.iter().filter(|c| c.chebyshev_distance(home) == radius) {
                if let Some(cell) = self.cell(coord) {
                    self.scan(cell, point, &mut best);
                }
            }

            if let Some(b) = best {
                let first = *first_hit.get_or_insert(radius);
                if radius > first
                    && self.ring_lower_bound_squared(point, home, radius + 1) >= b.distance_squared
                {
                    break;
                }
            }
        }

        best.map(|b| b.into_neighbor(SearchStrategy::ExpandingRing))
    }

    /// Lower bound on the squared distance from `point` to any cell at
    /// Chebyshev distance `radius` or more from `home`.
    ///
    /// Infinite when no such cell exists.
    fn ring_lower_bound_squared(&self, point: &Point3<f64>, home: CellCoord, radius: usize) -> f64 {
        let n = self.cells_per_axis();
        let plane = |c: usize| {
            #[allow(clippy::cast_precision_loss)]
            let c = c as f64;
            c.mul_add(self.cell_edge(), self.min())
        };

        let mut bound = f64::INFINITY;
        for (a, &h) in home.as_array().iter().enumerate() {
            if h >= radius {
                let gap = point[a] - plane(h + 1 - radius);
                bound = bound.min(gap.max(0.0));
            }
            if h + radius < n {
                let gap = plane(h + radius) - point[a];
                bound = bound.min(gap.max(0.0));
            }
        }
        bound * bound
    }

    /// Searches the cells around a non-empty home cell that can still hold a
    /// point closer than `best`.
    ///
    /// The ring count is chosen separately for each axis and direction. A
    /// direction is skipped outright when the home cell wall lies beyond the
    /// current best distance.
    fn directed(&self, point: &Point3<f64>, home_cell: &Cell, best: Best) -> Neighbor {
        let n = self.cells_per_axis();
        let distance = best.distance_squared.sqrt();
        let rings = |reach: f64| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let r = (reach / self.cell_edge()).ceil() as usize;
            r.clamp(1, n)
        };

        let mut below = [0; 3];
        let mut above = [0; 3];
        for a in 0..3 {
            let (lo, hi, p) = (home_cell.min()[a], home_cell.max()[a], point[a]);
            if lo >= p - distance {
                below[a] = rings(distance - (p - lo));
            }
            if hi <= p + distance {
                above[a] = rings(distance - (hi - p));
            }
        }

        let home = home_cell.coord();
        let mut found = Some(best);
        for coord in CellRange::around(home, below, above, n).iter() {
            if coord == home {
                continue;
            }
            if let Some(cell) = self.cell(coord) {
                self.scan(cell, point, &mut found);
            }
        }
        found.unwrap_or(best).into_neighbor(SearchStrategy::Directed)
    }
}

/// Replaces `best` only on a strictly smaller distance.
fn consider(best: &mut Option<Best>, index: u32, distance_squared: f64) {
    if best.is_none_or(|b| distance_squared < b.distance_squared) {
        *best = Some(Best {
            index,
            distance_squared,
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Corners of the unit cube, index `4x + 2y + z`.
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

    // ==================== Strategy Tests ====================

    #[test]
    fn lattice_query_near_origin() {
        let points = lattice();
        let index = SpatialIndex::build(&points, &[], 2).unwrap();

        let hit = index.find(&Point3::new(0.1, 0.1, 0.1)).unwrap();
        assert_eq!(hit.index, 0);
        assert_relative_eq!(hit.distance, 0.173_205, epsilon = 1e-6);
        assert_eq!(hit.strategy, SearchStrategy::Directed);
    }

    #[test]
    fn find_is_reflexive() {
        let points = lattice();
        let index = SpatialIndex::build(&points, &[], 2).unwrap();
        for (i, p) in points.iter().enumerate() {
            let hit = index.find(p).unwrap();
            assert_eq!(hit.index, i);
            assert_eq!(hit.distance, 0.0);
            assert_eq!(hit.strategy, SearchStrategy::Coincident);
        }
    }

    #[test]
    fn empty_home_cell_uses_rings() {
        let points = lattice();
        let index = SpatialIndex::build(&points, &[], 4).unwrap();

        let hit = index.find(&Point3::new(0.3, 0.3, 0.3)).unwrap();
        assert_eq!(hit.strategy, SearchStrategy::ExpandingRing);
        assert_eq!(hit.index, 0);
        assert_relative_eq!(hit.distance, 0.27f64.sqrt(), epsilon = 1e-12);

        let hit = index.find(&Point3::new(0.6, 0.9, 0.4)).unwrap();
        assert_eq!(hit.strategy, SearchStrategy::ExpandingRing);
        assert_eq!(hit.index, 6);
    }

    #[test]
    fn rings_keep_sweeping_until_exact() {
        // The origin is found three rings out, but the true nearest point
        // sits one ring further along x.
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.95, 2.95, 2.95),
            Point3::new(3.9, 1.1, 1.1),
        ];
        let aux = [Point3::new(4.0, 4.0, 4.0)];
        let index = SpatialIndex::build(&points, &aux, 8).unwrap();

        let query = Point3::new(1.9, 1.1, 1.1);
        let hit = index.find(&query).unwrap();
        let reference = index.find_brute_force(&query).unwrap();
        assert_eq!(hit.index, reference.index);
        assert_relative_eq!(hit.distance, reference.distance);
    }

    #[test]
    fn outside_bounds_uses_brute_force() {
        let points = lattice();
        let index = SpatialIndex::build(&points, &[], 2).unwrap();

        let hit = index.find(&Point3::new(3.0, 0.0, 0.0)).unwrap();
        assert_eq!(hit.strategy, SearchStrategy::BruteForce);
        assert_eq!(hit.index, 4);
        assert_relative_eq!(hit.distance, 2.0);
    }

    #[test]
    fn below_bounds_clamps_into_first_cell() {
        let points = lattice();
        let index = SpatialIndex::build(&points, &[], 2).unwrap();

        let hit = index.find(&Point3::new(-1.0, -1.0, -1.0)).unwrap();
        assert_eq!(hit.strategy, SearchStrategy::Directed);
        assert_eq!(hit.index, 0);
        assert_relative_eq!(hit.distance, 3.0f64.sqrt());
    }

    #[test]
    fn ties_keep_first_found() {
        let points = lattice();
        let index = SpatialIndex::build(&points, &[], 2).unwrap();

        // Equidistant from (0,0,0) and (1,0,0); x = 0.5 maps to cell 1, which
        // is scanned first.
        let hit = index.find(&Point3::new(0.5, 0.0, 0.0)).unwrap();
        assert_eq!(hit.index, 4);
        assert_relative_eq!(hit.distance, 0.5);

        // Index order breaks the tie for the reference scan.
        let reference = index.find_brute_force(&Point3::new(0.5, 0.0, 0.0)).unwrap();
        assert_eq!(reference.index, 0);
    }

    #[test]
    fn ties_within_a_cell_keep_lowest_index() {
        let points = vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 4.0, 4.0),
        ];
        let index = SpatialIndex::build(&points, &[], 1).unwrap();

        let query = Point3::new(0.5, 0.3, 0.0);
        let hit = index.find(&query).unwrap();
        assert_eq!(hit.index, 0);
        assert_eq!(hit.strategy, SearchStrategy::Directed);
        assert_eq!(hit.index, index.find_brute_force(&query).unwrap().index);
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn no_binned_points_returns_none() {
        let points = [Point3::new(f64::NAN, 0.0, 0.0)];
        let aux = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)];
        let index = SpatialIndex::build(&points, &aux, 2).unwrap();

        assert_eq!(index.binned_count(), 0);
        assert!(index.find(&Point3::new(0.5, 0.5, 0.5)).is_none());
        assert!(index.find_brute_force(&Point3::new(0.5, 0.5, 0.5)).is_none());
    }

    #[test]
    fn nan_query_returns_none() {
        let points = lattice();
        let index = SpatialIndex::build(&points, &[], 2).unwrap();
        assert!(index.find(&Point3::new(f64::NAN, 0.0, 0.0)).is_none());
    }

    #[test]
    fn single_cell_index() {
        let points = lattice();
        let index = SpatialIndex::build(&points, &[], 1).unwrap();
        let hit = index.find(&Point3::new(0.9, 0.8, 0.95)).unwrap();
        assert_eq!(hit.index, 7);
        assert_eq!(hit.strategy, SearchStrategy::Directed);
    }
}
