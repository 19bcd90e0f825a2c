//! Vertex adjacency for mixed triangle/tetrahedron meshes.

use mesh_types::VolumeMesh;
use rayon::prelude::*;
use smallvec::SmallVec;
use tracing::debug;

/// Inline storage for one vertex's neighbour or incidence list.
type VertexList = SmallVec<[u32; 16]>;

/// Vertex-to-vertex and vertex-to-element adjacency of a mesh.
///
/// Two vertices are neighbours when some element contains both. Every list
/// is sorted and free of duplicates, and the neighbour relation is
/// symmetric.
///
/// The graph records the revision and vertex count of the mesh it was built
/// from; [`refresh`](Self::refresh) rebuilds it only when those no longer
/// match. Revisions are unique per mesh, so a graph is never current for a
/// different mesh of the same shape.
///
/// # Example
///
/// ```
/// use mesh_locate::AdjacencyGraph;
/// use mesh_types::unit_tetrahedron;
///
/// let mesh = unit_tetrahedron();
/// let graph = AdjacencyGraph::build(&mesh);
///
/// assert_eq!(graph.neighbors(0), &[1, 2, 3]);
/// assert_eq!(graph.incident_elements(3), &[0]);
/// assert_eq!(graph.edge_count(), 6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    neighbors: Vec<VertexList>,
    incident: Vec<VertexList>,
    revision: u64,
}

impl AdjacencyGraph {
    /// Builds the adjacency of `mesh`.
    #[must_use]
    pub fn build(mesh: &VolumeMesh) -> Self {
        let vertex_count = mesh.vertex_count();
        let mut neighbors = vec![VertexList::new(); vertex_count];
        let mut incident = vec![VertexList::new(); vertex_count];

        for (e, element) in (0u32..).zip(mesh.elements()) {
            for (a, b) in element.edges() {
                if a != b {
                    neighbors[a as usize].push(b);
                    neighbors[b as usize].push(a);
                }
            }
            for &v in element.vertices() {
                incident[v as usize].push(e);
            }
        }

        neighbors
            .par_iter_mut()
            .chain(incident.par_iter_mut())
            .for_each(|list| {
                list.sort_unstable();
                list.dedup();
            });

        let graph = Self {
            neighbors,
            incident,
            revision: mesh.revision(),
        };
        debug!(
            vertices = vertex_count,
            elements = mesh.element_count(),
            edges = graph.edge_count(),
            "built adjacency graph"
        );
        graph
    }

    /// Rebuilds the graph if `mesh` changed since it was built.
    ///
    /// Returns `true` if a rebuild happened.
    pub fn refresh(&mut self, mesh: &VolumeMesh) -> bool {
        if self.is_current(mesh) {
            return false;
        }
        debug!(
            from_revision = self.revision,
            to_revision = mesh.revision(),
            "adjacency graph is stale, rebuilding"
        );
        *self = Self::build(mesh);
        true
    }

    /// Checks whether the graph matches the mesh's current revision and
    /// vertex count.
    #[must_use]
    pub fn is_current(&self, mesh: &VolumeMesh) -> bool {
        self.revision == mesh.revision() && self.neighbors.len() == mesh.vertex_count()
    }

    /// Vertices sharing an element with `vertex`, sorted.
    ///
    /// Empty for an out-of-range vertex.
    #[inline]
    #[must_use]
    pub fn neighbors(&self, vertex: usize) -> &[u32] {
        self.neighbors.get(vertex).map_or(&[], |v| v.as_slice())
    }

    /// Elements containing `vertex`, sorted.
    ///
    /// Empty for an out-of-range vertex.
    #[inline]
    #[must_use]
    pub fn incident_elements(&self, vertex: usize) -> &[u32] {
        self.incident.get(vertex).map_or(&[], |v| v.as_slice())
    }

    /// Number of vertices covered by the graph.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(SmallVec::len).sum::<usize>() / 2
    }

    /// Mesh revision the graph was built from.
    #[inline]
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }
}
