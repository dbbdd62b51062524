//! Numeric tolerance shared by construction, slicing and classification.

use nalgebra::{Point3, Vector3};

/// Default epsilon.
/// Coordinates closer than this are considered equal, and points closer
/// than this to a plane are considered "on" it.
pub const DEFAULT_EPSILON: f32 = 1e-5;

/// The epsilon used for every tolerant comparison in the crate.
///
/// A tree and all of its polygons must be built and queried with the same
/// tolerance; mixing values makes sidedness and coplanarity disagree.
///
/// Distances and coordinates are compared against `epsilon` as an absolute
/// length, while edge directions are compared by angle (see
/// [`Tolerance::are_parallel`]) and so work at any scale. The absolute
/// part needs `epsilon` above the `f32` spacing of the coordinates in use:
/// around `1e3` that spacing is already `6e-5`, so split points computed
/// there can land outside the default slab and the build fails with
/// [`BspError::InconsistentSplit`](crate::BspError::InconsistentSplit).
/// Scenes that far from the origin need a larger epsilon, or recentering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    epsilon: f32,
}

impl Tolerance {
    /// Creates a tolerance from an epsilon.
    ///
    /// Returns `None` if `epsilon` is negative, NaN or infinite.
    pub fn new(epsilon: f32) -> Option<Self> {
        if epsilon.is_finite() && epsilon >= 0.0 {
            Some(Self { epsilon })
        } else {
            None
        }
    }

    /// Returns the epsilon value.
    #[inline]
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Coordinate-wise comparison: every component differs by less than epsilon.
    #[inline]
    pub fn approx_eq(&self, a: &Vector3<f32>, b: &Vector3<f32>) -> bool {
        (a - b).iter().all(|d| d.abs() < self.epsilon)
    }

    /// Coordinate-wise comparison of two points.
    #[inline]
    pub fn points_eq(&self, a: &Point3<f32>, b: &Point3<f32>) -> bool {
        self.approx_eq(&a.coords, &b.coords)
    }

    /// Do `a` and `b` fail to span a plane?
    ///
    /// True when the sine of the angle between them is at most epsilon, or
    /// when either is zero. Independent of the vectors' lengths.
    #[inline]
    pub fn are_parallel(&self, a: &Vector3<f32>, b: &Vector3<f32>) -> bool {
        a.cross(b).norm() <= self.epsilon * a.norm() * b.norm()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
        }
    }
}
