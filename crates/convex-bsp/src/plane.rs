//! Oriented planes and tolerant side tests.

use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

use crate::Tolerance;

/// Side of a plane, with a slab of width `2ε` counted as on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    Front,
    Back,
    OnPlane,
}

/// Where a vertex loop lies relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Nothing behind and at least one vertex in front.
    Front,
    /// Nothing in front and at least one vertex behind.
    Back,
    /// Every vertex on the plane.
    Coplanar,
    /// Vertices strictly on both sides.
    Spanning,
}

/// A plane in 3D space, represented by a point on it and a unit normal.
///
/// The normal points to the side considered "in front".
#[derive(Debug, Clone, PartialEq)]
pub struct Plane3D {
    point: Point3<f32>,
    normal: Vector3<f32>,
}

impl Plane3D {
    /// Plane through `point`; `normal` is normalized here.
    ///
    /// Returns `None` for a zero-length normal.
    pub fn from_point_and_normal(point: Point3<f32>, normal: Vector3<f32>) -> Option<Self> {
        let normal = normal.try_normalize(f32::EPSILON)?;
        Some(Self { point, normal })
    }

    /// Creates a plane from a point and a normal that is already unit length.
    pub(crate) fn from_unit_normal(point: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { point, normal }
    }

    #[inline]
    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    /// Returns the reference point on the plane.
    #[inline]
    pub fn point(&self) -> Point3<f32> {
        self.point
    }

    /// `normal · (point - self.point)`: positive in front, negative behind.
    #[inline]
    pub fn signed_distance(&self, point: Point3<f32>) -> f32 {
        self.normal.dot(&(point - self.point))
    }

    /// Front beyond `ε`, back below `-ε`, on the plane in between.
    pub fn classify_point(&self, point: Point3<f32>, tolerance: Tolerance) -> PlaneSide {
        match self.signed_distance(point) {
            d if d > tolerance.epsilon() => PlaneSide::Front,
            d if d < -tolerance.epsilon() => PlaneSide::Back,
            _ => PlaneSide::OnPlane,
        }
    }

    /// Classifies a vertex loop against the plane.
    pub fn classify_points(&self, points: &[Point3<f32>], tolerance: Tolerance) -> Classification {
        let mut front = 0;
        let mut back = 0;

        for point in points {
            match self.classify_point(*point, tolerance) {
                PlaneSide::Front => front += 1,
                PlaneSide::Back => back += 1,
                PlaneSide::OnPlane => {}
            }
        }

        match (front, back) {
            (0, 0) => Classification::Coplanar,
            (_, 0) => Classification::Front,
            (0, _) => Classification::Back,
            _ => Classification::Spanning,
        }
    }

    /// Closest point on the plane.
    #[inline]
    pub fn project_point(&self, point: Point3<f32>) -> Point3<f32> {
        point - self.normal * self.signed_distance(point)
    }

    /// Where the segment `start..=end` meets the plane, as
    /// `(s, start + s * (end - start))` with `s` in `[0, 1]`.
    ///
    /// `None` when the segment is parallel to the plane or stops short of it.
    pub fn intersect_segment(
        &self,
        start: Point3<f32>,
        end: Point3<f32>,
    ) -> Option<(f32, Point3<f32>)> {
        let along = end - start;
        let rate = self.normal.dot(&along);
        if rate.abs() < f32::EPSILON {
            return None;
        }

        let s = self.normal.dot(&(self.point - start)) / rate;
        (0.0..=1.0).contains(&s).then(|| (s, start + along * s))
    }

    /// Applies an affine transform, returning the moved plane.
    ///
    /// `normal_matrix` must come from [`normal_matrix`] for the same transform.
    pub(crate) fn transformed(
        &self,
        transform: &Matrix4<f32>,
        normal_matrix: &Matrix3<f32>,
    ) -> Self {
        Self {
            point: transform.transform_point(&self.point),
            normal: transform_normal(normal_matrix, &self.normal),
        }
    }
}

/// Matrix mapping normals under `transform`.
///
/// This is `sign(det L) * L⁻ᵀ` for the linear part `L`, the cofactor matrix
/// up to a positive factor. For rotations it equals `L`; for any invertible
/// `L` it maps the cross product of two edges to a positive multiple of the
/// cross product of the transformed edges, so a polygon's normal keeps
/// agreeing with its winding.
///
/// Returns `None` if the linear part has no finite inverse.
pub(crate) fn normal_matrix(transform: &Matrix4<f32>) -> Option<Matrix3<f32>> {
    let linear: Matrix3<f32> = transform.fixed_view::<3, 3>(0, 0).into_owned();
    let inverse = linear.try_inverse()?;
    if !inverse.iter().all(|v| v.is_finite()) {
        return None;
    }
    Some(inverse.transpose() * linear.determinant().signum())
}

/// Transforms a unit normal and renormalizes it.
pub(crate) fn transform_normal(
    normal_matrix: &Matrix3<f32>,
    normal: &Vector3<f32>,
) -> Vector3<f32> {
    let moved = normal_matrix * normal;
    moved.try_normalize(f32::MIN_POSITIVE).unwrap_or(moved)
}
