//! The resampling engine.

use mesh_locate::ElementLocator;
use mesh_types::{Aabb, Point3, VolumeMesh};
use rayon::prelude::*;
use smallvec::SmallVec;
use tracing::{info, warn};

use crate::deformation::DeformationRequest;
use crate::error::{ResampleError, ResampleResult};
use crate::field::VertexField;
use crate::grid::RegularGrid;
use crate::params::ResampleParams;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Counts of how target points were resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResampleStats {
    /// Targets found inside an element and interpolated.
    pub located: usize,
    /// Targets in no element reachable by the walk.
    pub not_found: usize,
    /// Targets skipped because they lie outside the deformation's source
    /// snapshot.
    pub outside_source: usize,
}

impl ResampleStats {
    /// Total number of targets processed.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.located + self.not_found + self.outside_source
    }
}

/// Result of [`Resampler::resample`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResampleOutput {
    /// One row per field frame, one value per target point.
    pub values: Vec<Vec<f64>>,
    /// Targets found inside an element.
    pub located: usize,
    /// Targets in no reachable element; their slots hold the fill value.
    pub not_found: usize,
    /// Targets outside the deformation's source snapshot; their slots hold
    /// the fill value.
    pub outside_source: usize,
}

impl ResampleOutput {
    /// The resolution counts.
    #[must_use]
    pub const fn stats(&self) -> ResampleStats {
        ResampleStats {
            located: self.located,
            not_found: self.not_found,
            outside_source: self.outside_source,
        }
    }
}

/// How one target point resolved.
enum Sample {
    /// Element vertices paired with their interpolation weights.
    Weights(SmallVec<[(u32, f64); 4]>),
    NotFound,
    OutsideSource,
}

/// Interpolates per-vertex fields of a mesh at arbitrary points.
///
/// The resampler owns an [`ElementLocator`] for the source mesh. Each target
/// point is located independently; a point that lies in no element leaves
/// its output slot at the fill value and never fails the batch.
///
/// # Example
///
/// ```
/// use mesh_resample::{ResampleParams, Resampler, VertexField};
/// use mesh_types::{Point3, unit_tetrahedron};
///
/// let mesh = unit_tetrahedron();
/// let field = VertexField::single(vec![0.0, 1.0, 2.0, 3.0]);
/// let targets = [Point3::new(0.25, 0.25, 0.25), Point3::new(2.0, 2.0, 2.0)];
///
/// let resampler = Resampler::new(&mesh, &targets, ResampleParams::default()).unwrap();
/// let output = resampler.resample(&field, &targets, None).unwrap();
///
/// assert!((output.values[0][0] - 1.5).abs() < 1e-12);
/// assert_eq!(output.values[0][1], 0.0);
/// assert_eq!(output.located, 1);
/// assert_eq!(output.not_found, 1);
/// ```
#[derive(Debug, Clone)]
pub struct Resampler<'m> {
    locator: ElementLocator<'m>,
    params: ResampleParams,
}

impl<'m> Resampler<'m> {
    /// Builds a resampler for `mesh` whose search grid also spans the
    /// bounding box of `targets`.
    ///
    /// # Errors
    ///
    /// Returns [`ResampleError::Locate`] if the mesh cannot be indexed, for
    /// example when it has no vertices.
    pub fn new(mesh: &'m VolumeMesh, targets: &[Point3<f64>], params: ResampleParams) -> ResampleResult<Self> {
        let bounds = Aabb::from_points(targets.iter());
        let corners = bounds.corners();
        let auxiliary: &[Point3<f64>] = if bounds.is_empty() { &[] } else { &corners };
        Self::with_auxiliary(mesh, auxiliary, params)
    }

    /// Builds a resampler for `mesh` whose search grid also spans `grid`.
    ///
    /// # Errors
    ///
    /// Returns [`ResampleError::Locate`] if the mesh cannot be indexed.
    pub fn for_grid(mesh: &'m VolumeMesh, grid: &RegularGrid, params: ResampleParams) -> ResampleResult<Self> {
        Self::with_auxiliary(mesh, &grid.corners(), params)
    }

    /// Wraps an existing locator.
    #[must_use]
    pub const fn from_locator(locator: ElementLocator<'m>, params: ResampleParams) -> Self {
        Self { locator, params }
    }

    fn with_auxiliary(
        mesh: &'m VolumeMesh,
        auxiliary: &[Point3<f64>],
        params: ResampleParams,
    ) -> ResampleResult<Self> {
        let locator = ElementLocator::with_auxiliary(mesh, auxiliary, &params.locate)?;
        Ok(Self { locator, params })
    }

    /// The underlying locator.
    #[inline]
    #[must_use]
    pub const fn locator(&self) -> &ElementLocator<'m> {
        &self.locator
    }

    /// The parameters in use.
    #[inline]
    #[must_use]
    pub const fn params(&self) -> &ResampleParams {
        &self.params
    }

    /// Interpolates every frame of `field` at every target point.
    ///
    /// With a non-identity `deformation`, each target is first checked
    /// against the source snapshot and then carried to the target snapshot
    /// before it is located.
    ///
    /// # Errors
    ///
    /// - [`ResampleError::EmptyField`] if `field` has no frames
    /// - [`ResampleError::FieldLengthMismatch`] if a frame does not have one
    ///   value per mesh vertex
    /// - [`ResampleError::InvalidSnapshot`] if the deformation request names
    ///   a snapshot that does not exist
    pub fn resample(
        &self,
        field: &VertexField,
        targets: &[Point3<f64>],
        deformation: Option<DeformationRequest<'_>>,
    ) -> ResampleResult<ResampleOutput> {
        field.check_against(self.locator.mesh())?;
        let mut values = vec![vec![self.params.fill_value; targets.len()]; field.frame_count()];
        let stats = self.resample_into(field, targets, &mut values, deformation)?;
        Ok(ResampleOutput {
            values,
            located: stats.located,
            not_found: stats.not_found,
            outside_source: stats.outside_source,
        })
    }

    /// Like [`resample`](Self::resample), but writes into `out` and leaves
    /// slots of unresolved targets untouched.
    ///
    /// # Errors
    ///
    /// As for [`resample`](Self::resample), plus
    /// [`ResampleError::OutputShapeMismatch`] if `out` is not one row per
    /// frame of one slot per target.
    pub fn resample_into(
        &self,
        field: &VertexField,
        targets: &[Point3<f64>],
        out: &mut [Vec<f64>],
        deformation: Option<DeformationRequest<'_>>,
    ) -> ResampleResult<ResampleStats> {
        let mesh = self.locator.mesh();
        field.check_against(mesh)?;
        if out.len() != field.frame_count() || out.iter().any(|row| row.len() != targets.len()) {
            return Err(ResampleError::OutputShapeMismatch {
                frames: field.frame_count(),
                targets: targets.len(),
            });
        }
        if let Some(request) = &deformation {
            request.validate()?;
        }

        let parallel = self.params.parallel && targets.len() > self.params.parallel_threshold;
        info!(
            vertices = mesh.vertex_count(),
            elements = mesh.element_count(),
            targets = targets.len(),
            frames = field.frame_count(),
            parallel,
            "resampling field"
        );

        let samples: Vec<Sample> = if parallel {
            targets
                .par_iter()
                .map(|point| self.sample(point, deformation))
                .collect()
        } else {
            targets
                .iter()
                .map(|point| self.sample(point, deformation))
                .collect()
        };

        let mut stats = ResampleStats::default();
        for (i, sample) in samples.iter().enumerate() {
            match sample {
                Sample::Weights(weights) => {
                    stats.located += 1;
                    for (row, values) in out.iter_mut().zip(field.frames()) {
                        row[i] = weights.iter().map(|&(v, w)| w * values[v as usize]).sum();
                    }
                }
                Sample::NotFound => stats.not_found += 1,
                Sample::OutsideSource => stats.outside_source += 1,
            }
        }

        info!(
            located = stats.located,
            not_found = stats.not_found,
            outside_source = stats.outside_source,
            "resampling finished"
        );
        if stats.located == 0 && !targets.is_empty() {
            warn!(targets = targets.len(), "no target point was located in the mesh");
        }
        Ok(stats)
    }

    /// Interpolates every frame of `field` at every point of `grid`, in the
    /// grid's linear order.
    ///
    /// # Errors
    ///
    /// As for [`resample`](Self::resample).
    pub fn resample_grid(
        &self,
        field: &VertexField,
        grid: &RegularGrid,
        deformation: Option<DeformationRequest<'_>>,
    ) -> ResampleResult<ResampleOutput> {
        let targets: Vec<Point3<f64>> = grid.points().collect();
        self.resample(field, &targets, deformation)
    }

    fn sample(&self, point: &Point3<f64>, deformation: Option<DeformationRequest<'_>>) -> Sample {
        let mut p = *point;
        if let Some(request) = deformation.filter(|r| !r.is_identity()) {
            if !request.deformation.contains(&p, request.source) {
                return Sample::OutsideSource;
            }
            let Some(d) = request
                .deformation
                .displacement(&p, request.source, request.target)
            else {
                return Sample::NotFound;
            };
            p += d;
        }

        let Some(location) = self.locator.locate(&p, self.params.max_iterations) else {
            return Sample::NotFound;
        };
        let Some(element) = self.locator.mesh().elements().get(location.element) else {
            return Sample::NotFound;
        };
        Sample::Weights(
            element
                .vertices()
                .iter()
                .copied()
                .zip(location.barycentric.weights().iter().copied())
                .collect(),
        )
    }
}
