//! Element location by nearest-vertex seeding and breadth-first walk.

use std::collections::VecDeque;

use hashbrown::HashSet;
use mesh_types::{Point3, VolumeMesh};
use spatial_index::{Neighbor, SpatialIndex};
use tracing::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::adjacency::AdjacencyGraph;
use crate::barycentric::{Barycentric, Containment, element_measure, point_in_element};
use crate::error::{LocateError, LocateResult};
use crate::params::LocateParams;

/// An element containing (or closest to) a query point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Index of the element.
    pub element: usize,
    /// Barycentric coordinates of the point in that element.
    pub barycentric: Barycentric,
}

/// Finds the element containing a point.
///
/// The locator borrows a mesh and owns the two structures built from it:
/// an [`AdjacencyGraph`] for walking between elements and a
/// [`SpatialIndex`] over the mesh vertices for seeding the walk. It is
/// read-only after construction and can be shared across threads.
///
/// # Example
///
/// ```
/// use mesh_locate::{ElementLocator, LocateParams};
/// use mesh_types::{unit_tetrahedron, Point3};
///
/// let mesh = unit_tetrahedron();
/// let locator = ElementLocator::new(&mesh, &LocateParams::default()).unwrap();
///
/// let hit = locator.locate(&Point3::new(0.1, 0.1, 0.1), 1000).unwrap();
/// assert_eq!(hit.element, 0);
/// assert!((hit.barycentric.weights()[0] - 0.7).abs() < 1e-12);
///
/// assert!(locator.locate(&Point3::new(2.0, 2.0, 2.0), 1000).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ElementLocator<'m> {
    mesh: &'m VolumeMesh,
    graph: AdjacencyGraph,
    index: SpatialIndex<'m>,
    tolerance: f64,
}

impl<'m> ElementLocator<'m> {
    /// Builds a locator over `mesh`.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::Spatial`] if the vertex index cannot be built,
    /// for example when the mesh has no vertices.
    pub fn new(mesh: &'m VolumeMesh, params: &LocateParams) -> LocateResult<Self> {
        Self::with_auxiliary(mesh, &[], params)
    }

    /// Builds a locator whose vertex index bounds also cover `auxiliary`.
    ///
    /// Query points outside the mesh bounds but inside the auxiliary bounds
    /// still resolve to a search cell, which keeps their nearest-vertex
    /// lookup cheap.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::Spatial`] if the vertex index cannot be built.
    pub fn with_auxiliary(
        mesh: &'m VolumeMesh,
        auxiliary: &[Point3<f64>],
        params: &LocateParams,
    ) -> LocateResult<Self> {
        let graph = AdjacencyGraph::build(mesh);
        let index = SpatialIndex::build(mesh.vertices(), auxiliary, params.cells_per_axis)?;
        Ok(Self {
            mesh,
            graph,
            index,
            tolerance: params.tolerance,
        })
    }

    /// Assembles a locator from prebuilt parts.
    ///
    /// # Errors
    ///
    /// - [`LocateError::StaleAdjacency`] if `graph` does not match the mesh
    /// - [`LocateError::IndexMismatch`] if `index` does not cover the mesh vertices
    pub fn from_parts(
        mesh: &'m VolumeMesh,
        graph: AdjacencyGraph,
        index: SpatialIndex<'m>,
        tolerance: f64,
    ) -> LocateResult<Self> {
        if !graph.is_current(mesh) {
            return Err(LocateError::StaleAdjacency {
                graph_revision: graph.revision(),
                mesh_revision: mesh.revision(),
            });
        }
        if index.len() != mesh.vertex_count() {
            return Err(LocateError::IndexMismatch {
                indexed: index.len(),
                vertex_count: mesh.vertex_count(),
            });
        }
        Ok(Self {
            mesh,
            graph,
            index,
            tolerance,
        })
    }

    /// The located mesh.
    #[must_use]
    pub const fn mesh(&self) -> &'m VolumeMesh {
        self.mesh
    }

    /// The adjacency graph used for walking.
    #[must_use]
    pub const fn graph(&self) -> &AdjacencyGraph {
        &self.graph
    }

    /// The vertex index used for seeding.
    #[must_use]
    pub const fn index(&self) -> &SpatialIndex<'m> {
        &self.index
    }

    /// Containment tolerance.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Tests whether `point` lies in element `element`.
    ///
    /// # Errors
    ///
    /// - [`LocateError::ElementOutOfRange`] for a bad element index
    /// - [`LocateError::DegenerateElement`] if the element has zero measure
    pub fn point_in_element(&self, point: &Point3<f64>, element: usize) -> LocateResult<Containment> {
        let vertex_count = self.mesh.vertex_count();
        let indices = self
            .mesh
            .elements()
            .get(element)
            .ok_or(LocateError::ElementOutOfRange {
                index: element,
                element_count: self.mesh.element_count(),
            })?;
        let vertices = indices.resolve(self.mesh.vertices()).ok_or_else(|| {
            let bad = indices
                .vertices()
                .iter()
                .map(|&v| v as usize)
                .find(|&v| v >= vertex_count)
                .unwrap_or(vertex_count);
            LocateError::VertexOutOfRange {
                index: bad,
                vertex_count,
            }
        })?;

        point_in_element(point, &vertices, self.tolerance).ok_or_else(|| {
            LocateError::DegenerateElement {
                element,
                measure: element_measure(&vertices).unwrap_or(0.0),
            }
        })
    }

    fn test(&self, point: &Point3<f64>, element: usize) -> Option<Containment> {
        match self.point_in_element(point, element) {
            Ok(containment) => Some(containment),
            Err(err) => {
                trace!(element, %err, "skipping element");
                None
            }
        }
    }

    /// Finds an element containing `point`.
    ///
    /// Seeds at the nearest mesh vertex and walks outward through the
    /// adjacency graph breadth-first, testing the untested elements around
    /// each vertex it reaches. The first containing element wins. The walk
    /// stops when no vertices are left or after `max_iterations` vertices.
    /// Degenerate elements are skipped.
    ///
    /// With `max_iterations >= vertex_count` the walk reaches every vertex
    /// connected to the seed, so inside points of a connected mesh are
    /// always found.
    #[must_use]
    pub fn locate(&self, point: &Point3<f64>, max_iterations: usize) -> Option<Location> {
        let seed = self.index.find(point)?;

        let mut visited: HashSet<u32> = HashSet::new();
        let mut tested: HashSet<u32> = HashSet::new();
        let mut frontier = VecDeque::new();

        let seed = u32::try_from(seed.index).ok()?;
        visited.insert(seed);
        frontier.push_back(seed);

        let mut iterations = 0;
        while iterations < max_iterations {
            let Some(vertex) = frontier.pop_front() else {
                break;
            };
            iterations += 1;

            for &element in self.graph.incident_elements(vertex as usize) {
                if !tested.insert(element) {
                    continue;
                }
                match self.test(point, element as usize) {
                    Some(c) if c.inside => {
                        return Some(Location {
                            element: element as usize,
                            barycentric: c.barycentric,
                        });
                    }
                    _ => {}
                }
            }

            for &next in self.graph.neighbors(vertex as usize) {
                if visited.insert(next) {
                    frontier.push_back(next);
                }
            }
        }

        trace!(iterations, tested = tested.len(), "no containing element found");
        None
    }

    /// Finds the element containing `point`, or failing that the element
    /// the point is least far outside of.
    ///
    /// Scans every element. The first containing element wins; otherwise
    /// the element with the smallest sum of squared weights is returned.
    /// `None` only if every element is degenerate (or there are none).
    #[must_use]
    pub fn locate_closest(&self, point: &Point3<f64>) -> Option<Location> {
        let mut best: Option<(f64, Location)> = None;
        for element in 0..self.mesh.element_count() {
            let Some(c) = self.test(point, element) else {
                continue;
            };
            if c.inside {
                return Some(Location {
                    element,
                    barycentric: c.barycentric,
                });
            }
            let score = c.barycentric.weight_norm_squared();
            if best.as_ref().is_none_or(|(s, _)| score < *s) {
                best = Some((
                    score,
                    Location {
                        element,
                        barycentric: c.barycentric,
                    },
                ));
            }
        }
        best.map(|(_, location)| location)
    }

    /// Finds an element containing `point` by scanning every element.
    ///
    /// Unlike [`locate`](Self::locate) this does not depend on the walk
    /// reaching the element, at the cost of a full scan.
    #[must_use]
    pub fn find_containing(&self, point: &Point3<f64>) -> Option<Location> {
        (0..self.mesh.element_count()).find_map(|element| {
            self.test(point, element)
                .filter(|c| c.inside)
                .map(|c| Location {
                    element,
                    barycentric: c.barycentric,
                })
        })
    }

    /// Index of the element whose centroid is nearest to `point`.
    #[must_use]
    pub fn nearest_centroid_element(&self, point: &Point3<f64>) -> Option<usize> {
        let mut best: Option<(f64, usize)> = None;
        for element in 0..self.mesh.element_count() {
            let Ok(centroid) = self.mesh.centroid(element) else {
                continue;
            };
            let d2 = (centroid - point).norm_squared();
            if best.is_none_or(|(b, _)| d2 < b) {
                best = Some((d2, element));
            }
        }
        best.map(|(_, element)| element)
    }

    /// The mesh vertex nearest to `point`.
    #[must_use]
    pub fn locate_nearest_vertex(&self, point: &Point3<f64>) -> Option<Neighbor> {
        self.index.find(point)
    }

    /// Checks whether [`locate`](Self::locate) finds an element for `point`.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>, max_iterations: usize) -> bool {
        self.locate(point, max_iterations).is_some()
    }

    /// Interpolates a per-vertex scalar field at `point`.
    ///
    /// `None` if the point is not located or `values` is shorter than the
    /// vertex list.
    #[must_use]
    pub fn interpolate(&self, point: &Point3<f64>, values: &[f64], max_iterations: usize) -> Option<f64> {
        let location = self.locate(point, max_iterations)?;
        let element = self.mesh.elements().get(location.element)?;
        location.barycentric.interpolate(element.vertices(), values)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{Element, unit_cube, unit_tetrahedron};

    // ==================== Construction Tests ====================

    #[test]
    fn empty_mesh_cannot_be_indexed() {
        let mesh = VolumeMesh::new();
        let err = ElementLocator::new(&mesh, &LocateParams::default()).unwrap_err();
        assert!(matches!(err, LocateError::Spatial(_)));
    }

    #[test]
    fn from_parts_checks_revision() {
        let mut mesh = unit_tetrahedron();
        let graph = AdjacencyGraph::build(&mesh);
        mesh.push_vertex(Point3::new(1.0, 1.0, 1.0));

        let index = SpatialIndex::build(mesh.vertices(), &[], 2).unwrap();
        let err = ElementLocator::from_parts(&mesh, graph, index, 1e-5).unwrap_err();
        assert!(matches!(err, LocateError::StaleAdjacency { .. }));
    }

    #[test]
    fn from_parts_rejects_graph_of_another_mesh() {
        // Same shape, built separately.
        let mesh = unit_cube(1);
        let other = unit_cube(1);
        let graph = AdjacencyGraph::build(&other);

        let index = SpatialIndex::build(mesh.vertices(), &[], 2).unwrap();
        let err = ElementLocator::from_parts(&mesh, graph, index, 1e-5).unwrap_err();
        assert_eq!(
            err,
            LocateError::StaleAdjacency {
                graph_revision: other.revision(),
                mesh_revision: mesh.revision()
            }
        );
    }

    #[test]
    fn from_parts_checks_index() {
        let mesh = unit_tetrahedron();
        let other = [Point3::origin(), Point3::new(1.0, 1.0, 1.0)];
        let index = SpatialIndex::build(&other, &[], 2).unwrap();
        let err = ElementLocator::from_parts(&mesh, AdjacencyGraph::build(&mesh), index, 1e-5)
            .unwrap_err();
        assert_eq!(
            err,
            LocateError::IndexMismatch {
                indexed: 2,
                vertex_count: 4
            }
        );
    }

    #[test]
    fn from_parts_accepts_matching_parts() {
        let mesh = unit_tetrahedron();
        let index = SpatialIndex::build(mesh.vertices(), &[], 3).unwrap();
        let locator =
            ElementLocator::from_parts(&mesh, AdjacencyGraph::build(&mesh), index, 1e-5).unwrap();
        assert_eq!(locator.index().cells_per_axis(), 3);
        assert!(locator.contains(&Point3::new(0.2, 0.2, 0.2), 10));
    }

    // ==================== Element Test Tests ====================

    #[test]
    fn point_in_element_errors() {
        let mut mesh = unit_tetrahedron();
        let v = mesh.push_vertex(Point3::new(1.0, 1.0, 0.0));
        mesh.push_element(Element::tetrahedron([0, 1, 2, v], 0)).unwrap();
        let locator = ElementLocator::new(&mesh, &LocateParams::default()).unwrap();

        assert!(locator.point_in_element(&Point3::new(0.1, 0.1, 0.1), 0).unwrap().inside);
        assert_eq!(
            locator.point_in_element(&Point3::origin(), 7).unwrap_err(),
            LocateError::ElementOutOfRange {
                index: 7,
                element_count: 2
            }
        );
        assert_eq!(
            locator.point_in_element(&Point3::origin(), 1).unwrap_err(),
            LocateError::DegenerateElement {
                element: 1,
                measure: 0.0
            }
        );
    }

    // ==================== Locate Tests ====================

    #[test]
    fn unit_tetrahedron_scenario() {
        let mesh = unit_tetrahedron();
        let locator = ElementLocator::new(&mesh, &LocateParams::default()).unwrap();

        let hit = locator.locate(&Point3::new(0.1, 0.1, 0.1), 1000).unwrap();
        assert_eq!(hit.element, 0);
        let expected = [0.7, 0.1, 0.1, 0.1];
        for (w, e) in hit.barycentric.weights().iter().zip(expected) {
            assert_relative_eq!(*w, e, epsilon = 1e-12);
        }

        assert!(locator.locate(&Point3::new(2.0, 2.0, 2.0), 1000).is_none());
        let closest = locator.locate_closest(&Point3::new(2.0, 2.0, 2.0)).unwrap();
        assert_eq!(closest.element, 0);
    }

    #[test]
    fn locate_walks_across_cube() {
        let mesh = unit_cube(4);
        let locator = ElementLocator::new(&mesh, &LocateParams::default()).unwrap();

        for &(x, y, z) in &[(0.05, 0.9, 0.4), (0.51, 0.49, 0.77), (0.99, 0.01, 0.5)] {
            let p = Point3::new(x, y, z);
            let hit = locator.locate(&p, mesh.vertex_count()).unwrap();
            assert!(locator.point_in_element(&p, hit.element).unwrap().inside);
            assert_relative_eq!(hit.barycentric.weights().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn zero_iterations_finds_nothing() {
        let mesh = unit_tetrahedron();
        let locator = ElementLocator::new(&mesh, &LocateParams::default()).unwrap();
        assert!(locator.locate(&Point3::new(0.1, 0.1, 0.1), 0).is_none());
        assert!(locator.locate(&Point3::new(0.1, 0.1, 0.1), 1).is_some());
    }

    #[test]
    fn degenerate_elements_do_not_abort_walk() {
        let mesh = VolumeMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
            vec![
                Element::tetrahedron([0, 1, 2, 4], 0),
                Element::tetrahedron([0, 1, 2, 3], 0),
            ],
        )
        .unwrap();
        let locator = ElementLocator::new(&mesh, &LocateParams::default()).unwrap();

        let hit = locator.locate(&Point3::new(0.1, 0.1, 0.1), 100).unwrap();
        assert_eq!(hit.element, 1);
        assert_eq!(locator.find_containing(&Point3::new(0.1, 0.1, 0.1)).unwrap().element, 1);
    }

    #[test]
    fn closest_skips_degenerate_and_returns_none_if_all_are() {
        let mesh = VolumeMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            vec![Element::triangle([0, 1, 2], 0)],
        )
        .unwrap();
        let locator = ElementLocator::new(&mesh, &LocateParams::default()).unwrap();
        assert!(locator.locate_closest(&Point3::new(0.5, 0.0, 0.0)).is_none());
        assert!(locator.locate(&Point3::new(0.5, 0.0, 0.0), 10).is_none());
    }

    #[test]
    fn closest_prefers_smallest_weight_norm() {
        let mesh = unit_cube(2);
        let locator = ElementLocator::new(&mesh, &LocateParams::default()).unwrap();

        let outside = Point3::new(1.2, 0.9, 0.9);
        let closest = locator.locate_closest(&outside).unwrap();
        let score = closest.barycentric.weight_norm_squared();
        for element in 0..mesh.element_count() {
            let c = locator.point_in_element(&outside, element).unwrap();
            assert!(!c.inside);
            assert!(c.barycentric.weight_norm_squared() >= score);
        }
    }

    #[test]
    fn centroid_and_vertex_lookups() {
        let mesh = unit_cube(1);
        let locator = ElementLocator::new(&mesh, &LocateParams::default()).unwrap();

        let c = mesh.centroid(3).unwrap();
        assert_eq!(locator.nearest_centroid_element(&c), Some(3));

        let v = locator.locate_nearest_vertex(&Point3::new(0.9, 0.1, 0.95)).unwrap();
        assert_eq!(mesh.vertices()[v.index], Point3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn interpolate_scalar_field() {
        let mesh = unit_cube(3);
        let locator = ElementLocator::new(&mesh, &LocateParams::default()).unwrap();
        let field: Vec<f64> = mesh.vertices().iter().map(|p| p.x + 2.0 * p.y - p.z).collect();

        let p = Point3::new(0.3, 0.6, 0.45);
        let value = locator.interpolate(&p, &field, mesh.vertex_count()).unwrap();
        assert_relative_eq!(value, 0.3 + 1.2 - 0.45, epsilon = 1e-12);

        assert!(locator.interpolate(&Point3::new(3.0, 0.0, 0.0), &field, 100).is_none());
        assert!(locator.interpolate(&p, &field[..2], 100).is_none());
    }
}
