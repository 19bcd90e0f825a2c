//! Mesh elements (triangles and tetrahedra).

use nalgebra::Point3;
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MeshError, MeshResult};

/// Inline storage for the vertex indices of one element.
pub type ElementVertices = SmallVec<[u32; 4]>;

/// The shape of an element, determined by its vertex count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ElementKind {
    /// Three vertices; measured by signed area.
    Triangle,
    /// Four vertices; measured by signed volume.
    Tetrahedron,
}

impl ElementKind {
    /// Returns the kind for a vertex count, or `None` if unsupported.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::ElementKind;
    ///
    /// assert_eq!(ElementKind::from_arity(3), Some(ElementKind::Triangle));
    /// assert_eq!(ElementKind::from_arity(4), Some(ElementKind::Tetrahedron));
    /// assert_eq!(ElementKind::from_arity(5), None);
    /// ```
    #[must_use]
    pub const fn from_arity(arity: usize) -> Option<Self> {
        match arity {
            3 => Some(Self::Triangle),
            4 => Some(Self::Tetrahedron),
            _ => None,
        }
    }

    /// Number of vertices of this kind.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Triangle => 3,
            Self::Tetrahedron => 4,
        }
    }
}

/// A triangle or tetrahedron referencing mesh vertices by index.
///
/// The vertex order is significant: it fixes the sign of the element's
/// reference measure, and barycentric weights are reported in the same order.
///
/// # Example
///
/// ```
/// use mesh_types::{Element, ElementKind};
///
/// let tri = Element::triangle([0, 1, 2], 7);
/// assert_eq!(tri.kind(), ElementKind::Triangle);
/// assert_eq!(tri.attribute(), 7);
///
/// assert!(Element::try_new(&[0, 1], 0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Element {
    vertices: ElementVertices,
    attribute: i32,
}

impl Element {
    /// Creates a triangle element.
    #[must_use]
    pub fn triangle(vertices: [u32; 3], attribute: i32) -> Self {
        Self {
            vertices: SmallVec::from_slice(&vertices),
            attribute,
        }
    }

    /// Creates a tetrahedron element.
    #[must_use]
    pub fn tetrahedron(vertices: [u32; 4], attribute: i32) -> Self {
        Self {
            vertices: SmallVec::from_buf(vertices),
            attribute,
        }
    }

    /// Creates an element from a slice of vertex indices.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidArity`] unless the slice holds 3 or 4 indices.
    pub fn try_new(vertices: &[u32], attribute: i32) -> MeshResult<Self> {
        if ElementKind::from_arity(vertices.len()).is_none() {
            return Err(MeshError::InvalidArity {
                arity: vertices.len(),
            });
        }
        Ok(Self {
            vertices: SmallVec::from_slice(vertices),
            attribute,
        })
    }

    /// Returns the element kind.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        if self.vertices.len() == 4 {
            ElementKind::Tetrahedron
        } else {
            ElementKind::Triangle
        }
    }

    /// Number of vertices (3 or 4).
    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.vertices.len()
    }

    /// Vertex indices in element order.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[u32] {
        &self.vertices
    }

    /// Integer attribute (region tag).
    #[inline]
    #[must_use]
    pub const fn attribute(&self) -> i32 {
        self.attribute
    }

    /// Sets the attribute (region tag).
    pub fn set_attribute(&mut self, attribute: i32) {
        self.attribute = attribute;
    }

    /// Checks whether the element references the given vertex.
    #[must_use]
    pub fn contains(&self, vertex: u32) -> bool {
        self.vertices.contains(&vertex)
    }

    /// Iterates over all unordered vertex pairs of the element.
    ///
    /// A triangle yields 3 pairs, a tetrahedron 6.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.vertices.iter().enumerate().flat_map(move |(i, &a)| {
            self.vertices[i + 1..].iter().map(move |&b| (a, b))
        })
    }

    /// Resolves the vertex positions of the element.
    ///
    /// Returns `None` if any index is out of range for `positions`.
    #[must_use]
    pub fn resolve(&self, positions: &[Point3<f64>]) -> Option<SmallVec<[Point3<f64>; 4]>> {
        self.vertices
            .iter()
            .map(|&v| positions.get(v as usize).copied())
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn triangle_and_tetrahedron_kinds() {
        assert_eq!(Element::triangle([0, 1, 2], 0).arity(), 3);
        assert_eq!(Element::tetrahedron([0, 1, 2, 3], 0).arity(), 4);
        assert_eq!(
            Element::tetrahedron([0, 1, 2, 3], 0).kind(),
            ElementKind::Tetrahedron
        );
    }

    #[test]
    fn try_new_rejects_bad_arity() {
        assert_eq!(
            Element::try_new(&[0, 1], 0),
            Err(MeshError::InvalidArity { arity: 2 })
        );
        assert_eq!(
            Element::try_new(&[0, 1, 2, 3, 4], 0),
            Err(MeshError::InvalidArity { arity: 5 })
        );
        assert!(Element::try_new(&[4, 5, 6], 2).is_ok());
    }

    #[test]
    fn edges_of_tetrahedron() {
        let tet = Element::tetrahedron([0, 1, 2, 3], 0);
        let edges: Vec<_> = tet.edges().collect();
        assert_eq!(edges, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn edges_of_triangle() {
        let tri = Element::triangle([4, 2, 9], 0);
        assert_eq!(tri.edges().count(), 3);
    }

    #[test]
    fn resolve_positions() {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let tri = Element::triangle([2, 1, 0], 0);
        let resolved = tri.resolve(&positions).unwrap();
        assert_eq!(resolved[0], positions[2]);

        let bad = Element::triangle([0, 1, 3], 0);
        assert!(bad.resolve(&positions).is_none());
    }
}
