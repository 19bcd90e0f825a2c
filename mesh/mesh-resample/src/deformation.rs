//! Deformations between mesh snapshots.
//!
//! A deformation maps a point in one snapshot of a moving mesh to the
//! corresponding point in another. The resampler applies it before locating
//! each target, so that a field recorded on snapshot `target` can be sampled
//! at positions given in snapshot `source`.

use std::fmt;

use mesh_locate::ElementLocator;
use mesh_types::{Point3, Vector3, VolumeMesh};
use tracing::{debug, trace};

use crate::error::{ResampleError, ResampleResult};
use crate::params::ResampleParams;

/// Maps points between the snapshots of a moving mesh.
///
/// Snapshots are numbered `0..snapshot_count()` and form a cycle.
pub trait Deformation: Sync {
    /// Number of snapshots.
    fn snapshot_count(&self) -> usize;

    /// Whether `point` lies inside the mesh at `snapshot`.
    fn contains(&self, point: &Point3<f64>, snapshot: usize) -> bool;

    /// Displacement carrying `point` from snapshot `source` to snapshot
    /// `target`, or `None` if it cannot be computed.
    fn displacement(&self, point: &Point3<f64>, source: usize, target: usize) -> Option<Vector3<f64>>;
}

/// A deformation together with the snapshots to map between.
#[derive(Clone, Copy)]
pub struct DeformationRequest<'d> {
    /// The deformation to apply.
    pub deformation: &'d dyn Deformation,
    /// Snapshot the target points are given in.
    pub source: usize,
    /// Snapshot the field was recorded on.
    pub target: usize,
}

impl<'d> DeformationRequest<'d> {
    /// Creates a request.
    #[must_use]
    pub fn new(deformation: &'d dyn Deformation, source: usize, target: usize) -> Self {
        Self {
            deformation,
            source,
            target,
        }
    }

    /// Whether the request maps a snapshot onto itself.
    #[inline]
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        self.source == self.target
    }

    /// Checks both snapshot indices against the deformation.
    ///
    /// # Errors
    ///
    /// Returns [`ResampleError::InvalidSnapshot`] for the first index that
    /// is out of range.
    pub fn validate(&self) -> ResampleResult<()> {
        let count = self.deformation.snapshot_count();
        for index in [self.source, self.target] {
            if index >= count {
                return Err(ResampleError::InvalidSnapshot { index, count });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for DeformationRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeformationRequest")
            .field("snapshots", &self.deformation.snapshot_count())
            .field("source", &self.source)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// One step of a cyclic snapshot sequence: a mesh and, per vertex, the
/// displacement that carries it to the neighbouring snapshot.
#[derive(Debug, Clone)]
pub struct DeformationStep {
    /// Mesh at the step's starting snapshot.
    pub mesh: VolumeMesh,
    /// Displacement of each mesh vertex.
    pub displacements: Vec<Vector3<f64>>,
}

impl DeformationStep {
    /// Creates a step.
    #[must_use]
    pub fn new(mesh: VolumeMesh, displacements: Vec<Vector3<f64>>) -> Self {
        Self { mesh, displacements }
    }

    /// Creates the step that moves `from` onto `to`, which must share its
    /// connectivity.
    ///
    /// # Errors
    ///
    /// Returns [`ResampleError::DisplacementCount`] if the vertex counts differ.
    pub fn between(from: VolumeMesh, to: &VolumeMesh) -> ResampleResult<Self> {
        if from.vertex_count() != to.vertex_count() {
            return Err(ResampleError::DisplacementCount {
                step: 0,
                vertices: from.vertex_count(),
                displacements: to.vertex_count(),
            });
        }
        let displacements = from
            .vertices()
            .iter()
            .zip(to.vertices())
            .map(|(a, b)| b - a)
            .collect();
        Ok(Self::new(from, displacements))
    }
}

struct StepLocator<'m> {
    locator: ElementLocator<'m>,
    displacements: &'m [Vector3<f64>],
}

impl StepLocator<'_> {
    /// Displacement at `point`, taken from the containing element or, if the
    /// point is outside the step mesh, from the nearest one.
    fn displacement_at(&self, point: &Point3<f64>, max_iterations: usize) -> Option<Vector3<f64>> {
        let location = self
            .locator
            .locate(point, max_iterations)
            .or_else(|| self.locator.locate_closest(point))?;
        let element = self.locator.mesh().elements().get(location.element)?;
        location
            .barycentric
            .interpolate(element.vertices(), self.displacements)
    }
}

/// A [`Deformation`] defined by a cycle of mesh snapshots.
///
/// `forward[i]` carries snapshot `i` to `i + 1` and `backward[i]` carries
/// snapshot `i` to `i - 1`, both modulo the snapshot count. Mapping between
/// two snapshots walks the shorter way round the cycle, preferring forward
/// on a tie, and moves the point after every step.
///
/// # Example
///
/// ```
/// use mesh_resample::{Deformation, DeformationStep, ResampleParams, SnapshotDeformation};
/// use mesh_types::{Point3, Vector3, unit_tetrahedron};
///
/// let a = unit_tetrahedron();
/// let mut b = unit_tetrahedron();
/// b.translate(Vector3::new(0.5, 0.0, 0.0));
///
/// let forward = vec![
///     DeformationStep::between(a.clone(), &b).unwrap(),
///     DeformationStep::between(b.clone(), &a).unwrap(),
/// ];
/// let backward = vec![
///     DeformationStep::between(a, &b).unwrap(),
///     DeformationStep::between(b, &unit_tetrahedron()).unwrap(),
/// ];
///
/// let deformation =
///     SnapshotDeformation::new(&forward, &backward, &ResampleParams::default()).unwrap();
/// let d = deformation.displacement(&Point3::new(0.1, 0.1, 0.1), 0, 1).unwrap();
/// assert!((d.x - 0.5).abs() < 1e-12);
/// ```
pub struct SnapshotDeformation<'m> {
    forward: Vec<StepLocator<'m>>,
    backward: Vec<StepLocator<'m>>,
    max_iterations: usize,
}

impl<'m> SnapshotDeformation<'m> {
    /// Builds a locator for every step.
    ///
    /// # Errors
    ///
    /// - [`ResampleError::DeformationMismatch`] if the step lists are empty
    ///   or differ in length
    /// - [`ResampleError::DisplacementCount`] if a step does not have one
    ///   displacement per vertex
    /// - [`ResampleError::Locate`] if a step mesh cannot be indexed
    pub fn new(
        forward: &'m [DeformationStep],
        backward: &'m [DeformationStep],
        params: &ResampleParams,
    ) -> ResampleResult<Self> {
        if forward.is_empty() || forward.len() != backward.len() {
            return Err(ResampleError::DeformationMismatch {
                forward: forward.len(),
                backward: backward.len(),
            });
        }

        let build = |steps: &'m [DeformationStep]| -> ResampleResult<Vec<StepLocator<'m>>> {
            steps
                .iter()
                .enumerate()
                .map(|(step, s)| {
                    if s.displacements.len() != s.mesh.vertex_count() {
                        return Err(ResampleError::DisplacementCount {
                            step,
                            vertices: s.mesh.vertex_count(),
                            displacements: s.displacements.len(),
                        });
                    }
                    Ok(StepLocator {
                        locator: ElementLocator::new(&s.mesh, &params.locate)?,
                        displacements: &s.displacements,
                    })
                })
                .collect()
        };

        let deformation = Self {
            forward: build(forward)?,
            backward: build(backward)?,
            max_iterations: params.max_iterations,
        };
        debug!(snapshots = forward.len(), "built snapshot deformation");
        Ok(deformation)
    }

    /// Displacement carrying `point` from snapshot `source` to `target`.
    ///
    /// Returns `Ok(None)` if some step has no usable element for the moving
    /// point.
    ///
    /// # Errors
    ///
    /// Returns [`ResampleError::InvalidSnapshot`] if either index is out of
    /// range.
    pub fn try_displacement(
        &self,
        point: &Point3<f64>,
        source: usize,
        target: usize,
    ) -> ResampleResult<Option<Vector3<f64>>> {
        let n = self.forward.len();
        for index in [source, target] {
            if index >= n {
                return Err(ResampleError::InvalidSnapshot { index, count: n });
            }
        }

        let mut total = Vector3::zeros();
        if source == target {
            return Ok(Some(total));
        }

        let ahead = (target + n - source) % n;
        let behind = (source + n - target) % n;
        let (steps, advance): (&[StepLocator<'m>], usize) = if ahead <= behind {
            (self.forward.as_slice(), 1)
        } else {
            (self.backward.as_slice(), n - 1)
        };

        let mut current = *point;
        let mut v = source;
        while v != target {
            let Some(d) = steps[v].displacement_at(&current, self.max_iterations) else {
                trace!(snapshot = v, ?current, "no element to displace point");
                return Ok(None);
            };
            current += d;
            total += d;
            v = (v + advance) % n;
        }
        Ok(Some(total))
    }
}

impl Deformation for SnapshotDeformation<'_> {
    fn snapshot_count(&self) -> usize {
        self.forward.len()
    }

    /// Scans every element of the snapshot mesh, so points inside a
    /// component the nearest vertex does not belong to are still found.
    fn contains(&self, point: &Point3<f64>, snapshot: usize) -> bool {
        self.forward
            .get(snapshot)
            .is_some_and(|step| step.locator.find_containing(point).is_some())
    }

    fn displacement(&self, point: &Point3<f64>, source: usize, target: usize) -> Option<Vector3<f64>> {
        self.try_displacement(point, source, target).ok().flatten()
    }
}

impl fmt::Debug for SnapshotDeformation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotDeformation")
            .field("snapshots", &self.forward.len())
            .field("max_iterations", &self.max_iterations)
            .finish_non_exhaustive()
    }
}
