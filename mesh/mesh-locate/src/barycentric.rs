//! Barycentric coordinates and point-in-element tests.
//!
//! For an element with vertices `v_0 .. v_k`, the reference measure `V0` is
//! the element's signed size:
//!
//! - tetrahedron: signed volume `((b - a) × (c - a)) · (d - a) / 6`
//! - triangle: signed area `½ ((b - a) × (c - a)) · n̂`, measured along the
//!   triangle's own unit normal `n̂`
//!
//! The sub-measure `V_i` is the same formula with vertex `i` replaced by the
//! query point. The weights `V_i / V0` always sum to one. A point is inside
//! when every sub-measure that is not negligible has the sign of `V0`.
//!
//! Measuring triangles along their own normal makes the test work for
//! surface triangles in 3D: an off-plane point is judged by its projection
//! onto the triangle's plane.

use std::iter::Sum;
use std::ops::Mul;

use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Barycentric coordinates of a point with respect to one element.
///
/// # Example
///
/// ```
/// use mesh_locate::barycentric_coordinates;
/// use nalgebra::Point3;
///
/// let tet = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ];
/// let bary = barycentric_coordinates(&Point3::new(0.25, 0.25, 0.25), &tet).unwrap();
///
/// for w in bary.weights() {
///     assert!((w - 0.25).abs() < 1e-12);
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Barycentric {
    reference: f64,
    measures: SmallVec<[f64; 4]>,
    weights: SmallVec<[f64; 4]>,
}

impl Barycentric {
    /// Signed reference measure `V0` of the element.
    #[must_use]
    pub const fn reference_measure(&self) -> f64 {
        self.reference
    }

    /// Sub-measures `V_i`, in element vertex order.
    #[must_use]
    pub fn sub_measures(&self) -> &[f64] {
        &self.measures
    }

    /// Weights `V_i / V0`, in element vertex order.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Sum of squared weights.
    ///
    /// Smallest at the element centroid, so it ranks how far outside an
    /// element a point lies.
    #[must_use]
    pub fn weight_norm_squared(&self) -> f64 {
        self.weights.iter().map(|w| w * w).sum()
    }

    /// Checks the sign test with the given tolerance.
    ///
    /// Sub-measures with `|V_i| < tolerance` are ignored; every other one
    /// must have the sign of the reference measure.
    #[must_use]
    pub fn is_inside(&self, tolerance: f64) -> bool {
        self.measures
            .iter()
            .all(|&m| m.abs() < tolerance || m * self.reference > 0.0)
    }

    /// Interpolates per-vertex values at the point.
    ///
    /// `element_vertices` are the element's vertex indices into `values`.
    /// Works for anything that scales by `f64` and sums, such as scalars or
    /// displacement vectors. Returns `None` if the vertex count does not
    /// match the weights or an index is out of range.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_locate::barycentric_coordinates;
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let tri = [
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(2.0, 0.0, 0.0),
    ///     Point3::new(0.0, 2.0, 0.0),
    /// ];
    /// let bary = barycentric_coordinates(&Point3::new(1.0, 0.0, 0.0), &tri).unwrap();
    ///
    /// let scalars = [10.0, 20.0, 30.0];
    /// let s: f64 = bary.interpolate(&[0, 1, 2], &scalars).unwrap();
    /// assert!((s - 15.0).abs() < 1e-12);
    ///
    /// let vectors = [Vector3::x(), Vector3::y(), Vector3::z()];
    /// let v = bary.interpolate(&[0, 1, 2], &vectors).unwrap();
    /// assert!((v - Vector3::new(0.5, 0.5, 0.0)).norm() < 1e-12);
    /// ```
    #[must_use]
    pub fn interpolate<T>(&self, element_vertices: &[u32], values: &[T]) -> Option<T>
    where
        T: Copy + Mul<f64, Output = T> + Sum<T>,
    {
        if element_vertices.len() != self.weights.len() {
            return None;
        }
        element_vertices
            .iter()
            .zip(&self.weights)
            .map(|(&v, &w)| values.get(v as usize).map(|&value| value * w))
            .sum()
    }
}

/// Result of a point-in-element test.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Containment {
    /// Whether the point passed the sign test.
    pub inside: bool,
    /// Barycentric coordinates of the point, valid inside or out.
    pub barycentric: Barycentric,
}

/// Computes the barycentric coordinates of `point` in the element spanned by
/// `vertices` (3 or 4 points, in element order).
///
/// Returns `None` for any other vertex count or when the element's reference
/// measure is zero.
#[must_use]
pub fn barycentric_coordinates(point: &Point3<f64>, vertices: &[Point3<f64>]) -> Option<Barycentric> {
    let reference = element_measure(vertices)?;
    if reference == 0.0 || !reference.is_finite() {
        return None;
    }

    let normal = triangle_normal(vertices);
    let mut slots: SmallVec<[Point3<f64>; 4]> = SmallVec::from_slice(vertices);
    let mut measures = SmallVec::new();
    for i in 0..vertices.len() {
        slots[i] = *point;
        measures.push(signed_measure(&slots, normal.as_ref()));
        slots[i] = vertices[i];
    }
    let weights = measures.iter().map(|m| m / reference).collect();

    Some(Barycentric {
        reference,
        measures,
        weights,
    })
}

/// Tests whether `point` lies in the element spanned by `vertices`.
///
/// Returns `None` when [`barycentric_coordinates`] does.
///
/// # Example
///
/// ```
/// use mesh_locate::point_in_element;
/// use nalgebra::Point3;
///
/// let tri = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// assert!(point_in_element(&Point3::new(0.2, 0.2, 0.0), &tri, 1e-5).unwrap().inside);
/// assert!(!point_in_element(&Point3::new(0.8, 0.8, 0.0), &tri, 1e-5).unwrap().inside);
/// ```
#[must_use]
pub fn point_in_element(
    point: &Point3<f64>,
    vertices: &[Point3<f64>],
    tolerance: f64,
) -> Option<Containment> {
    let barycentric = barycentric_coordinates(point, vertices)?;
    Some(Containment {
        inside: barycentric.is_inside(tolerance),
        barycentric,
    })
}

/// Signed reference measure of an element, or `None` for a bad vertex count.
///
/// Zero for a degenerate element.
#[must_use]
pub fn element_measure(vertices: &[Point3<f64>]) -> Option<f64> {
    match vertices.len() {
        3 => Some(triangle_normal(vertices).map_or(0.0, |n| signed_measure(vertices, Some(&n)))),
        4 => Some(signed_measure(vertices, None)),
        _ => None,
    }
}

/// Unit normal of a triangle, `None` for tetrahedra and degenerate triangles.
fn triangle_normal(vertices: &[Point3<f64>]) -> Option<Vector3<f64>> {
    let [a, b, c] = vertices else {
        return None;
    };
    (b - a).cross(&(c - a)).try_normalize(0.0)
}

fn signed_measure(v: &[Point3<f64>], normal: Option<&Vector3<f64>>) -> f64 {
    let e1 = v[1] - v[0];
    let e2 = v[2] - v[0];
    match normal {
        Some(n) => 0.5 * e1.cross(&e2).dot(n),
        None => e1.cross(&e2).dot(&(v[3] - v[0])) / 6.0,
    }
}
