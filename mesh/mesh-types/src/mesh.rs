//! Indexed triangle/tetrahedron mesh.

use std::sync::atomic::{AtomicU64, Ordering};

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Aabb, Element, ElementKind, MeshError, MeshResult};

/// Source of mesh revisions. Zero is never handed out.
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// An indexed mesh of triangles and/or tetrahedra.
///
/// Vertices and elements are stored separately, elements referencing
/// vertices by index. Both arrays are private so that every structural
/// mutation goes through a method that replaces the mesh
/// [`revision`](Self::revision).
///
/// # Memory Layout
///
/// - `vertices`: `Vec<Point3<f64>>` - Vertex positions
/// - `elements`: `Vec<Element>` - 3 or 4 vertex indices plus an attribute
///
/// # Example
///
/// ```
/// use mesh_types::{Element, Point3, VolumeMesh};
///
/// let mesh = VolumeMesh::from_parts(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![Element::triangle([0, 1, 2], 0)],
/// )
/// .unwrap();
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.element_count(), 1);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VolumeMesh {
    vertices: Vec<Point3<f64>>,
    elements: Vec<Element>,
    #[cfg_attr(feature = "serde", serde(skip, default = "next_revision"))]
    revision: u64,
}

impl Default for VolumeMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            elements: Vec::new(),
            revision: next_revision(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(vertex_count: usize, element_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            elements: Vec::with_capacity(element_count),
            revision: next_revision(),
        }
    }

    /// Create a mesh from vertices and elements.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::VertexOutOfRange`] if an element references a
    /// vertex that does not exist.
    pub fn from_parts(vertices: Vec<Point3<f64>>, elements: Vec<Element>) -> MeshResult<Self> {
        let vertex_count = vertices.len();
        for element in &elements {
            check_element(element, vertex_count)?;
        }
        Ok(Self {
            vertices,
            elements,
            revision: next_revision(),
        })
    }

    /// Create a tetrahedral mesh from raw coordinate and index data.
    ///
    /// # Arguments
    ///
    /// * `positions` - Flat array `[x0, y0, z0, x1, y1, z1, ...]`
    /// * `tetrahedra` - Flat array of 4 indices per tetrahedron
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidArity`] if `tetrahedra.len()` is not a
    /// multiple of 4, and [`MeshError::VertexOutOfRange`] for bad indices.
    /// Trailing coordinates that do not form a whole point are ignored.
    pub fn from_raw_tetrahedra(positions: &[f64], tetrahedra: &[u32]) -> MeshResult<Self> {
        if tetrahedra.len() % 4 != 0 {
            return Err(MeshError::InvalidArity {
                arity: tetrahedra.len() % 4,
            });
        }
        let vertices = positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        let elements = tetrahedra
            .chunks_exact(4)
            .map(|c| Element::tetrahedron([c[0], c[1], c[2], c[3]], 0))
            .collect();
        Self::from_parts(vertices, elements)
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of elements.
    #[inline]
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if the mesh has no vertices or no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.elements.is_empty()
    }

    /// Vertex positions in index order.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Elements in index order.
    #[inline]
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Get a vertex position by index.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::VertexOutOfRange`] for an invalid index.
    pub fn vertex(&self, index: usize) -> MeshResult<Point3<f64>> {
        self.vertices
            .get(index)
            .copied()
            .ok_or(MeshError::VertexOutOfRange {
                index,
                vertex_count: self.vertices.len(),
            })
    }

    /// Get an element by index.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::ElementOutOfRange`] for an invalid index.
    pub fn element(&self, index: usize) -> MeshResult<&Element> {
        self.elements.get(index).ok_or(MeshError::ElementOutOfRange {
            index,
            element_count: self.elements.len(),
        })
    }

    /// Structural revision.
    ///
    /// Every construction and every mutation draws a fresh value that no
    /// other mesh in the process has, so caches keyed on it cannot confuse
    /// two meshes. A clone shares its original's revision until either
    /// changes.
    #[inline]
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Append a vertex and return its index.
    pub fn push_vertex(&mut self, position: Point3<f64>) -> u32 {
        self.touch();
        let index = self.vertices.len();
        self.vertices.push(position);
        #[allow(clippy::cast_possible_truncation)]
        let index = index as u32;
        index
    }

    /// Append an element and return its index.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::VertexOutOfRange`] if the element references a
    /// vertex that does not exist; the mesh is left unchanged.
    pub fn push_element(&mut self, element: Element) -> MeshResult<usize> {
        check_element(&element, self.vertices.len())?;
        self.touch();
        self.elements.push(element);
        Ok(self.elements.len() - 1)
    }

    /// Move an existing vertex.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::VertexOutOfRange`] for an invalid index.
    pub fn set_vertex(&mut self, index: usize, position: Point3<f64>) -> MeshResult<()> {
        let vertex_count = self.vertices.len();
        let slot = self
            .vertices
            .get_mut(index)
            .ok_or(MeshError::VertexOutOfRange {
                index,
                vertex_count,
            })?;
        *slot = position;
        self.touch();
        Ok(())
    }

    /// Remove an element, shifting later elements down by one.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::ElementOutOfRange`] for an invalid index.
    pub fn remove_element(&mut self, index: usize) -> MeshResult<Element> {
        if index >= self.elements.len() {
            return Err(MeshError::ElementOutOfRange {
                index,
                element_count: self.elements.len(),
            });
        }
        self.touch();
        Ok(self.elements.remove(index))
    }

    /// Remove all vertices and elements.
    pub fn clear(&mut self) {
        self.touch();
        self.vertices.clear();
        self.elements.clear();
    }

    /// Translate all vertices by the given vector.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        self.touch();
        for vertex in &mut self.vertices {
            *vertex += offset;
        }
    }

    /// Number of elements of the given kind.
    #[must_use]
    pub fn count_kind(&self, kind: ElementKind) -> usize {
        self.elements.iter().filter(|e| e.kind() == kind).count()
    }

    /// Centroid of an element.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::ElementOutOfRange`] for an invalid index.
    pub fn centroid(&self, index: usize) -> MeshResult<Point3<f64>> {
        let element = self.element(index)?;
        let sum = element
            .vertices()
            .iter()
            .fold(Vector3::zeros(), |acc, &v| acc + self.vertices[v as usize].coords);
        #[allow(clippy::cast_precision_loss)]
        let centroid = Point3::from(sum / element.arity() as f64);
        Ok(centroid)
    }

    /// Axis-aligned bounds of all vertices.
    ///
    /// Returns an empty AABB if the mesh has no vertices.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter())
    }

    fn touch(&mut self) {
        self.revision = next_revision();
    }
}

fn check_element(element: &Element, vertex_count: usize) -> MeshResult<()> {
    match element
        .vertices()
        .iter()
        .find(|&&v| v as usize >= vertex_count)
    {
        Some(&bad) => Err(MeshError::VertexOutOfRange {
            index: bad as usize,
            vertex_count,
        }),
        None => Ok(()),
    }
}

/// Create the unit tetrahedron `(0,0,0), (1,0,0), (0,1,0), (0,0,1)`.
///
/// The vertex order gives a positive signed volume of `1/6`.
///
/// # Example
///
/// ```
/// use mesh_types::unit_tetrahedron;
///
/// let tet = unit_tetrahedron();
/// assert_eq!(tet.vertex_count(), 4);
/// assert_eq!(tet.element_count(), 1);
/// ```
#[must_use]
pub fn unit_tetrahedron() -> VolumeMesh {
    VolumeMesh {
        vertices: vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ],
        elements: vec![Element::tetrahedron([0, 1, 2, 3], 0)],
        revision: next_revision(),
    }
}

/// Create the unit cube `[0, 1]^3` split into `subdivisions^3` sub-cubes of
/// six tetrahedra each.
///
/// Every sub-cube is cut along its main diagonal, so neighbouring
/// tetrahedra always share whole faces. Vertex `(i, j, k)` of the lattice
/// has index `(i * (n + 1) + j) * (n + 1) + k`.
///
/// Returns an empty mesh for zero subdivisions.
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
///
/// let cube = unit_cube(2);
/// assert_eq!(cube.vertex_count(), 27);
/// assert_eq!(cube.element_count(), 48);
/// ```
#[must_use]
pub fn unit_cube(subdivisions: u32) -> VolumeMesh {
    const ORDERS: [[usize; 3]; 6] = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

    let n = subdivisions;
    if n == 0 {
        return VolumeMesh::new();
    }
    let side = n + 1;
    let id = |c: [u32; 3]| (c[0] * side + c[1]) * side + c[2];
    let h = 1.0 / f64::from(n);

    let mut mesh = VolumeMesh::with_capacity((side * side * side) as usize, (6 * n * n * n) as usize);
    for i in 0..side {
        for j in 0..side {
            for k in 0..side {
                mesh.vertices
                    .push(Point3::new(f64::from(i) * h, f64::from(j) * h, f64::from(k) * h));
            }
        }
    }

    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                for order in ORDERS {
                    let mut c = [i, j, k];
                    let mut tet = [id(c); 4];
                    for (slot, axis) in order.into_iter().enumerate() {
                        c[axis] += 1;
                        tet[slot + 1] = id(c);
                    }
                    mesh.elements.push(Element::tetrahedron(tet, 0));
                }
            }
        }
    }
    mesh
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mesh_is_empty() {
        let mut mesh = VolumeMesh::new();
        assert!(mesh.is_empty());

        mesh.push_vertex(Point3::origin());
        assert!(mesh.is_empty());
    }

    #[test]
    fn from_parts_rejects_dangling_index() {
        let result = VolumeMesh::from_parts(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            vec![Element::triangle([0, 1, 2], 0)],
        );
        assert_eq!(
            result.unwrap_err(),
            MeshError::VertexOutOfRange {
                index: 2,
                vertex_count: 2
            }
        );
    }

    #[test]
    fn from_raw_tetrahedra() {
        let positions = [
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0,
        ];
        let mesh = VolumeMesh::from_raw_tetrahedra(&positions, &[0, 1, 2, 3]).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.count_kind(ElementKind::Tetrahedron), 1);

        assert!(VolumeMesh::from_raw_tetrahedra(&positions, &[0, 1, 2]).is_err());
    }

    #[test]
    fn mutations_bump_revision() {
        let mut mesh = unit_tetrahedron();
        let r0 = mesh.revision();

        mesh.push_vertex(Point3::new(2.0, 2.0, 2.0));
        let r1 = mesh.revision();
        assert!(r1 > r0);

        mesh.push_element(Element::triangle([0, 1, 4], 1)).unwrap();
        let r2 = mesh.revision();
        assert!(r2 > r1);

        mesh.set_vertex(4, Point3::new(3.0, 3.0, 3.0)).unwrap();
        assert!(mesh.revision() > r2);
    }

    #[test]
    fn revisions_are_unique_across_meshes() {
        let a = unit_tetrahedron();
        let b = unit_tetrahedron();
        assert_ne!(a.revision(), b.revision());
        assert_ne!(VolumeMesh::new().revision(), VolumeMesh::default().revision());

        let mut c = a.clone();
        assert_eq!(c.revision(), a.revision());
        c.translate(Vector3::new(1.0, 0.0, 0.0));
        assert_ne!(c.revision(), a.revision());
        assert_ne!(c.revision(), b.revision());
    }

    #[test]
    fn failed_mutation_keeps_revision() {
        let mut mesh = unit_tetrahedron();
        let before = mesh.revision();
        assert!(mesh.push_element(Element::triangle([0, 1, 9], 0)).is_err());
        assert!(mesh.set_vertex(10, Point3::origin()).is_err());
        assert!(mesh.remove_element(3).is_err());
        assert_eq!(mesh.revision(), before);
    }

    #[test]
    fn element_lookup_out_of_range() {
        let mesh = unit_tetrahedron();
        assert!(mesh.element(0).is_ok());
        assert_eq!(
            mesh.element(1).unwrap_err(),
            MeshError::ElementOutOfRange {
                index: 1,
                element_count: 1
            }
        );
        assert!(mesh.vertex(4).is_err());
    }

    #[test]
    fn centroid_of_unit_tetrahedron() {
        let mesh = unit_tetrahedron();
        let c = mesh.centroid(0).unwrap();
        assert_relative_eq!(c.x, 0.25, epsilon = 1e-12);
        assert_relative_eq!(c.y, 0.25, epsilon = 1e-12);
        assert_relative_eq!(c.z, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn mesh_bounds() {
        let mesh = unit_tetrahedron();
        let bounds = mesh.bounds();
        assert_eq!(bounds.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn mesh_translate() {
        let mut mesh = unit_tetrahedron();
        mesh.translate(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.vertices()[0], Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn unit_cube_lattice() {
        let cube = unit_cube(3);
        assert_eq!(cube.vertex_count(), 64);
        assert_eq!(cube.element_count(), 162);
        assert_eq!(cube.count_kind(ElementKind::Tetrahedron), 162);

        let bounds = cube.bounds();
        assert_eq!(bounds.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(1.0, 1.0, 1.0));

        // every tetrahedron spans one sub-cube diagonal
        for element in cube.elements() {
            let v = element.vertices();
            let first = cube.vertex(v[0] as usize).unwrap();
            let last = cube.vertex(v[3] as usize).unwrap();
            assert_relative_eq!((last - first).norm(), 3f64.sqrt() / 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn unit_cube_without_subdivisions_is_empty() {
        assert!(unit_cube(0).is_empty());
    }
}
