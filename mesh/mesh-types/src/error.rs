//! Error types for mesh construction and lookup.

use thiserror::Error;

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors that can occur while building or querying a mesh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MeshError {
    /// An element was created with an unsupported number of vertices.
    #[error("element arity must be 3 or 4, got {arity}")]
    InvalidArity {
        /// The rejected vertex count.
        arity: usize,
    },

    /// An element references a vertex that does not exist.
    #[error("invalid vertex index: {index} (mesh has {vertex_count} vertices)")]
    VertexOutOfRange {
        /// The invalid index.
        index: usize,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },

    /// An element index is out of range.
    #[error("invalid element index: {index} (mesh has {element_count} elements)")]
    ElementOutOfRange {
        /// The invalid index.
        index: usize,
        /// Total number of elements in the mesh.
        element_count: usize,
    },
}
