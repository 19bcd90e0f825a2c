//! Error types for point location.

use spatial_index::SpatialError;
use thiserror::Error;

/// Result type for point location operations.
pub type LocateResult<T> = Result<T, LocateError>;

/// Errors that can occur while building a locator or testing an element.
///
/// A point that lies in no element is not an error; queries report it as
/// `None`.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum LocateError {
    /// The element's own signed area/volume is zero.
    #[error("element {element} is degenerate (reference measure {measure})")]
    DegenerateElement {
        /// Index of the element.
        element: usize,
        /// The reference measure that was computed.
        measure: f64,
    },

    /// An element index is out of range.
    #[error("invalid element index: {index} (mesh has {element_count} elements)")]
    ElementOutOfRange {
        /// The invalid index.
        index: usize,
        /// Total number of elements in the mesh.
        element_count: usize,
    },

    /// An element references a vertex that does not exist.
    #[error("invalid vertex index: {index} (mesh has {vertex_count} vertices)")]
    VertexOutOfRange {
        /// The invalid index.
        index: usize,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },

    /// The adjacency graph was built from a different mesh revision.
    #[error("adjacency built at revision {graph_revision}, mesh is at {mesh_revision}")]
    StaleAdjacency {
        /// Revision recorded by the graph.
        graph_revision: u64,
        /// Current mesh revision.
        mesh_revision: u64,
    },

    /// The spatial index does not cover the mesh vertices.
    #[error("spatial index holds {indexed} points but the mesh has {vertex_count} vertices")]
    IndexMismatch {
        /// Number of points in the index.
        indexed: usize,
        /// Number of mesh vertices.
        vertex_count: usize,
    },

    /// Building the spatial index failed.
    #[error(transparent)]
    Spatial(#[from] SpatialError),
}
