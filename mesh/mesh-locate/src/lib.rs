//! Point location and barycentric interpolation on unstructured meshes.
//!
//! Given a [`VolumeMesh`](mesh_types::VolumeMesh) of triangles and/or
//! tetrahedra, this crate answers "which element contains `p`, and with what
//! weights?":
//!
//! - [`AdjacencyGraph`] - Vertex neighbours and incident elements
//! - [`barycentric_coordinates`] / [`point_in_element`] - Signed-measure
//!   containment test for one element
//! - [`ElementLocator`] - Nearest-vertex seeded breadth-first walk
//! - [`LocateParams`] - Search grid resolution and containment tolerance
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**.
//!
//! # Algorithm
//!
//! 1. Find the mesh vertex nearest to the query point with a
//!    [`SpatialIndex`](spatial_index::SpatialIndex).
//! 2. Walk the adjacency graph breadth-first from that vertex, testing each
//!    element around every vertex reached.
//! 3. Stop at the first element whose barycentric sign test passes.
//!
//! Points outside every element are reported as `None`;
//! [`ElementLocator::locate_closest`] falls back to the element the point is
//! least far outside of.
//!
//! # Example
//!
//! ```
//! use mesh_locate::{ElementLocator, LocateParams};
//! use mesh_types::{unit_tetrahedron, Point3};
//!
//! let mesh = unit_tetrahedron();
//! let locator = ElementLocator::new(&mesh, &LocateParams::default()).unwrap();
//!
//! let field = [1.0, 2.0, 3.0, 4.0];
//! let value = locator
//!     .interpolate(&Point3::new(0.25, 0.25, 0.25), &field, 100)
//!     .unwrap();
//! assert!((value - 2.5).abs() < 1e-12);
//! ```
//!
//! # Quality Standards
//!
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod adjacency;
mod barycentric;
mod error;
mod locator;
mod params;

pub use adjacency::AdjacencyGraph;
pub use barycentric::{
    Barycentric, Containment, barycentric_coordinates, element_measure, point_in_element,
};
pub use error::{LocateError, LocateResult};
pub use locator::{ElementLocator, Location};
pub use params::LocateParams;

// Re-export the seeding types for convenience
pub use spatial_index::{Neighbor, SearchStrategy};
