//! Barycentric resampling of per-vertex mesh fields.
//!
//! This crate carries scalar fields stored at the vertices of a
//! [`VolumeMesh`](mesh_types::VolumeMesh) onto arbitrary target points:
//!
//! - [`Resampler`] - Locates every target and interpolates every frame
//! - [`VertexField`] - One or more frames of per-vertex values
//! - [`RegularGrid`] - Axis-aligned lattice of targets
//! - [`Deformation`] / [`SnapshotDeformation`] - Carry targets between
//!   snapshots of a moving mesh before sampling
//! - [`ResampleParams`] - Walk budget, fill value and parallelism
//!
//! Targets that lie in no element are not errors. Their output slots keep
//! the fill value and they are counted in [`ResampleOutput::not_found`].
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**.
//!
//! # Example
//!
//! ```
//! use mesh_resample::{RegularGrid, ResampleParams, Resampler, VertexField};
//! use mesh_types::{Point3, unit_cube};
//!
//! let mesh = unit_cube(2);
//! let field = VertexField::from_fn(&mesh, |p| p.x + p.y + p.z);
//! let grid = RegularGrid::new(Point3::new(0.1, 0.1, 0.1), 0.2, [5, 5, 5]).unwrap();
//!
//! let resampler = Resampler::for_grid(&mesh, &grid, ResampleParams::default()).unwrap();
//! let output = resampler.resample_grid(&field, &grid, None).unwrap();
//!
//! assert_eq!(output.located, grid.len());
//! let centre = grid.index(2, 2, 2);
//! assert!((output.values[0][centre] - 1.5).abs() < 1e-9);
//! ```
//!
//! # Parallelism
//!
//! Targets are independent. Above
//! [`ResampleParams::parallel_threshold`] targets they are processed with
//! rayon; results do not depend on the thread count.
//!
//! # Quality Standards
//!
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod deformation;
mod engine;
mod error;
mod field;
mod grid;
mod params;

pub use deformation::{Deformation, DeformationRequest, DeformationStep, SnapshotDeformation};
pub use engine::{ResampleOutput, ResampleStats, Resampler};
pub use error::{ResampleError, ResampleResult};
pub use field::VertexField;
pub use grid::RegularGrid;
pub use params::ResampleParams;
