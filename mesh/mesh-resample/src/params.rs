//! Parameters for resampling.

use mesh_locate::LocateParams;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for a [`Resampler`](crate::Resampler).
///
/// # Example
///
/// ```
/// use mesh_resample::ResampleParams;
///
/// let params = ResampleParams::default();
/// assert_eq!(params.max_iterations, 1000);
/// assert!(params.parallel);
///
/// // Never give up on a point
/// let exhaustive = ResampleParams::exhaustive();
/// assert_eq!(exhaustive.max_iterations, usize::MAX);
///
/// // Mark misses with NaN
/// let params = ResampleParams::default().fill_value(f64::NAN);
/// assert!(params.fill_value.is_nan());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResampleParams {
    /// Locator construction parameters.
    pub locate: LocateParams,

    /// Maximum number of vertices the element walk visits per target point.
    pub max_iterations: usize,

    /// Value written for targets that are not located.
    pub fill_value: f64,

    /// Whether to process targets in parallel.
    pub parallel: bool,

    /// Parallelism only kicks in above this many targets.
    pub parallel_threshold: usize,
}

impl Default for ResampleParams {
    fn default() -> Self {
        Self {
            locate: LocateParams::default(),
            max_iterations: 1000,
            fill_value: 0.0,
            parallel: true,
            parallel_threshold: 1000,
        }
    }
}

impl ResampleParams {
    /// Params with an unbounded walk: every point inside a connected mesh is
    /// found, however far it lies from its nearest vertex's elements.
    #[must_use]
    pub fn exhaustive() -> Self {
        Self {
            max_iterations: usize::MAX,
            ..Self::default()
        }
    }

    /// Params with a short walk and a finer seeding grid.
    ///
    /// Suited to dense targets over well-shaped meshes, where the containing
    /// element is almost always adjacent to the nearest vertex.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            locate: LocateParams::default().cells_per_axis(16),
            max_iterations: 64,
            ..Self::default()
        }
    }

    /// Set the locator parameters.
    #[must_use]
    pub const fn locate(mut self, locate: LocateParams) -> Self {
        self.locate = locate;
        self
    }

    /// Set the walk budget.
    #[must_use]
    pub const fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Set the value written for targets that are not located.
    #[must_use]
    pub const fn fill_value(mut self, value: f64) -> Self {
        self.fill_value = value;
        self
    }

    /// Enable or disable parallel processing.
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the target count above which processing goes parallel.
    #[must_use]
    pub const fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }
}
