//! Per-vertex scalar fields.

use mesh_types::{Point3, VolumeMesh};

use crate::error::{ResampleError, ResampleResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One or more frames of per-vertex scalar values.
///
/// Every frame holds the same number of values, one per vertex of the mesh
/// it is resampled from. Frames typically come from a time series.
///
/// # Example
///
/// ```
/// use mesh_resample::VertexField;
///
/// let field = VertexField::new(vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]]).unwrap();
/// assert_eq!(field.frame_count(), 2);
/// assert_eq!(field.vertex_count(), 3);
/// assert_eq!(field.frame(1), Some(&[3.0, 4.0, 5.0][..]));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexField {
    frames: Vec<Vec<f64>>,
}

impl VertexField {
    /// Creates a field from its frames.
    ///
    /// # Errors
    ///
    /// - [`ResampleError::EmptyField`] if there are no frames
    /// - [`ResampleError::FieldLengthMismatch`] if frames differ in length
    pub fn new(frames: Vec<Vec<f64>>) -> ResampleResult<Self> {
        let Some(first) = frames.first() else {
            return Err(ResampleError::EmptyField);
        };
        let expected = first.len();
        if let Some((frame, values)) = frames.iter().enumerate().find(|(_, f)| f.len() != expected) {
            return Err(ResampleError::FieldLengthMismatch {
                frame,
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { frames })
    }

    /// Creates a single-frame field.
    #[must_use]
    pub fn single(values: Vec<f64>) -> Self {
        Self { frames: vec![values] }
    }

    /// Evaluates `f` at every vertex of `mesh` into a single frame.
    #[must_use]
    pub fn from_fn<F>(mesh: &VolumeMesh, f: F) -> Self
    where
        F: Fn(&Point3<f64>) -> f64,
    {
        Self::single(mesh.vertices().iter().map(f).collect())
    }

    /// Number of frames.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Number of values per frame.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.frames.first().map_or(0, Vec::len)
    }

    /// Values of one frame.
    #[inline]
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&[f64]> {
        self.frames.get(index).map(Vec::as_slice)
    }

    /// All frames.
    #[inline]
    #[must_use]
    pub fn frames(&self) -> &[Vec<f64>] {
        &self.frames
    }

    /// Checks that every frame has one value per vertex of `mesh`.
    pub(crate) fn check_against(&self, mesh: &VolumeMesh) -> ResampleResult<()> {
        if self.frames.is_empty() {
            return Err(ResampleError::EmptyField);
        }
        let expected = mesh.vertex_count();
        for (frame, values) in self.frames.iter().enumerate() {
            if values.len() != expected {
                return Err(ResampleError::FieldLengthMismatch {
                    frame,
                    expected,
                    actual: values.len(),
                });
            }
        }
        Ok(())
    }
}
