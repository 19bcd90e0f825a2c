//! Uniform cell grid for exact nearest-neighbour queries.
//!
//! This crate bins a borrowed 3D point set into a cubic lattice of cells and
//! answers "which point is closest to `p`?" by searching only the cells that
//! can hold a better answer:
//!
//! - [`SpatialIndex`] - Cubic cell lattice over a borrowed point slice
//! - [`Cell`] - One lattice cell with its corners and member indices
//! - [`CellCoord`] / [`CellRange`] - Integer cell coordinates and boxes of them
//! - [`Neighbor`] / [`SearchStrategy`] - Query results
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - CLI tools
//! - Web applications (WASM)
//! - Servers
//! - Python bindings
//!
//! # Bounds
//!
//! The index uses a single scalar `min`/`max` for all three axes, taken over
//! every finite coordinate of the primary and auxiliary points. Auxiliary
//! points widen the bounds without being indexed, which keeps query points
//! (for example the corners of a sampling grid) inside the lattice.
//!
//! # Example
//!
//! ```
//! use nalgebra::Point3;
//! use spatial_index::SpatialIndex;
//!
//! let points: Vec<_> = (0..100)
//!     .map(|i| {
//!         let t = f64::from(i) * 0.1;
//!         Point3::new(t.sin(), t.cos(), t * 0.1)
//!     })
//!     .collect();
//!
//! let index = SpatialIndex::build(&points, &[], 8).unwrap();
//! let query = Point3::new(0.5, 0.5, 0.5);
//!
//! let fast = index.find(&query).unwrap();
//! let slow = index.find_brute_force(&query).unwrap();
//! assert_eq!(fast.distance, slow.distance);
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

mod coord;
mod error;
mod index;
mod query;

pub use coord::{CellCoord, CellRange, CellRangeIter};
pub use error::{SpatialError, SpatialResult};
pub use index::{Cell, SpatialIndex};
pub use query::{Neighbor, SearchStrategy};

pub use nalgebra::Point3;
