//! Core mesh types for unstructured triangle/tetrahedron meshes.
//!
//! This crate provides the foundational types shared by the locator and
//! resampling crates:
//!
//! - [`VolumeMesh`] - Ordered vertex positions plus ordered elements
//! - [`Element`] - A triangle or tetrahedron referencing vertices by index
//! - [`ElementKind`] - Arity of an element (3 or 4 vertices)
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - CLI tools
//! - Web applications (WASM)
//! - Servers
//! - Python bindings
//!
//! # Mixed Meshes
//!
//! A mesh may mix triangles and tetrahedra. The arity of every element is
//! fixed when it is created and validated against the allowed set `{3, 4}`.
//!
//! # Revisions
//!
//! Every structural mutation of a [`VolumeMesh`] bumps its
//! [`revision`](VolumeMesh::revision). Derived data (adjacency, search
//! indices) records the revision it was built from and compares it to decide
//! whether a rebuild is needed.
//!
//! # Example
//!
//! ```
//! use mesh_types::{Element, Point3, VolumeMesh};
//!
//! let mut mesh = VolumeMesh::new();
//! mesh.push_vertex(Point3::new(0.0, 0.0, 0.0));
//! mesh.push_vertex(Point3::new(1.0, 0.0, 0.0));
//! mesh.push_vertex(Point3::new(0.0, 1.0, 0.0));
//! mesh.push_vertex(Point3::new(0.0, 0.0, 1.0));
//! mesh.push_element(Element::tetrahedron([0, 1, 2, 3], 0)).unwrap();
//!
//! assert_eq!(mesh.vertex_count(), 4);
//! assert_eq!(mesh.element_count(), 1);
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

mod bounds;
mod element;
mod error;
mod mesh;

pub use bounds::Aabb;
pub use element::{Element, ElementKind, ElementVertices};
pub use error::{MeshError, MeshResult};
pub use mesh::{VolumeMesh, unit_cube, unit_tetrahedron};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
