//! Convex polygon representation for BSP trees.

use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

use crate::plane::{normal_matrix, transform_normal};
use crate::{Classification, Material, Plane3D, PolygonError, Tolerance};

/// A convex, planar polygon in 3D space.
///
/// Points form a loop: each adjacent pair is an edge and the last point
/// connects back to the first. The plane normal follows the winding by the
/// right-hand rule and points to the side considered "in front".
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: Vec<Point3<f32>>,
    plane_normal: Vector3<f32>,
    material: Material,
}

impl Polygon {
    /// Creates a polygon using the default tolerance.
    ///
    /// See [`Polygon::with_tolerance`].
    pub fn new(points: Vec<Point3<f32>>, material: Material) -> Result<Self, PolygonError> {
        Self::with_tolerance(points, material, Tolerance::default())
    }

    /// Creates a polygon from a point loop; the orientation comes from the winding.
    ///
    /// Consecutive duplicate points (including the last/first pair) are
    /// removed before validation.
    ///
    /// # Errors
    /// - [`PolygonError::TooFewPoints`] if fewer than 3 distinct points remain.
    /// - [`PolygonError::Collinear`] if no corner defines a direction.
    /// - [`PolygonError::NotConvexPlanar`] if some corner's normal disagrees
    ///   with the first one.
    pub fn with_tolerance(
        points: Vec<Point3<f32>>,
        material: Material,
        tolerance: Tolerance,
    ) -> Result<Self, PolygonError> {
        let (points, plane_normal) = validate_loop(points, tolerance)?;
        Ok(Self {
            points,
            plane_normal,
            material,
        })
    }

    /// Creates a polygon whose orientation agrees with the given vertex normals.
    ///
    /// If the average of `normals` points away from the winding-derived
    /// normal, the point order is reversed and the normal negated. An empty
    /// `normals` slice keeps the winding orientation.
    pub fn with_reference_normals(
        points: Vec<Point3<f32>>,
        normals: &[Vector3<f32>],
        material: Material,
        tolerance: Tolerance,
    ) -> Result<Self, PolygonError> {
        let mut polygon = Self::with_tolerance(points, material, tolerance)?;

        if !normals.is_empty() {
            let average = normals.iter().sum::<Vector3<f32>>() / normals.len() as f32;
            if polygon.plane_normal.dot(&average) < 0.0 {
                polygon.points.reverse();
                polygon.plane_normal = -polygon.plane_normal;
            }
        }

        Ok(polygon)
    }

    /// Builds a piece of this polygon from a sub-loop of its plane.
    ///
    /// The piece keeps this polygon's normal and material. Duplicate and
    /// collinear checks still apply; the corner check does not, since a cut
    /// of a convex polygon is convex.
    pub(crate) fn fragment(
        &self,
        points: Vec<Point3<f32>>,
        tolerance: Tolerance,
    ) -> Result<Self, PolygonError> {
        let points = prune_loop(points, tolerance)?;
        derive_normal(&points, tolerance)?;
        Ok(Self {
            points,
            plane_normal: self.plane_normal,
            material: self.material.clone(),
        })
    }

    /// Returns the points of the polygon, in loop order.
    #[inline]
    pub fn points(&self) -> &[Point3<f32>] {
        &self.points
    }

    /// Returns the unit plane normal.
    #[inline]
    pub fn plane_normal(&self) -> Vector3<f32> {
        self.plane_normal
    }

    /// Returns the material carried by this polygon.
    #[inline]
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Returns the number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed polygon.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the plane through the first point with the polygon's normal.
    pub fn plane(&self) -> Plane3D {
        Plane3D::from_unit_normal(self.points[0], self.plane_normal)
    }

    /// Computes the centroid (average of the points).
    pub fn centroid(&self) -> Point3<f32> {
        let sum: Vector3<f32> = self.points.iter().map(|p| p.coords).sum();
        Point3::from(sum / self.points.len() as f32)
    }

    /// Computes the area by fan triangulation.
    pub fn area(&self) -> f32 {
        let origin = self.points[0];
        self.points
            .windows(2)
            .skip(1)
            .map(|edge| (edge[0] - origin).cross(&(edge[1] - origin)).dot(&self.plane_normal))
            .sum::<f32>()
            * 0.5
    }

    /// Classifies this polygon relative to a plane.
    ///
    /// Returns:
    /// - `Front` if no vertex is behind and at least one is in front
    /// - `Back` if no vertex is in front and at least one is behind
    /// - `Coplanar` if all vertices lie on the plane
    /// - `Spanning` if vertices are on both sides
    pub fn classify(&self, plane: &Plane3D, tolerance: Tolerance) -> Classification {
        plane.classify_points(&self.points, tolerance)
    }

    /// Is this polygon in front of (on the normal side of) `other`?
    ///
    /// Touching vertices are tolerated, but at least one vertex must be
    /// strictly in front.
    pub fn is_front(&self, other: &Polygon, tolerance: Tolerance) -> bool {
        self.classify(&other.plane(), tolerance) == Classification::Front
    }

    /// Is this polygon behind (opposite the normal side of) `other`?
    pub fn is_behind(&self, other: &Polygon, tolerance: Tolerance) -> bool {
        self.classify(&other.plane(), tolerance) == Classification::Back
    }

    /// Is this polygon on `other`'s plane and facing the same way?
    pub fn is_on_same_plane(&self, other: &Polygon, tolerance: Tolerance) -> bool {
        self.classify(&other.plane(), tolerance) == Classification::Coplanar
            && tolerance.approx_eq(&self.plane_normal, &other.plane_normal)
    }

    /// Applies an affine transform to the points and the normal.
    ///
    /// The normal is renormalized afterwards, and stays consistent with the
    /// winding under non-uniform scaling and reflection.
    ///
    /// # Errors
    /// [`PolygonError::SingularTransform`] if the linear part is not
    /// invertible; the polygon is left unchanged.
    pub fn apply(&mut self, transform: &Matrix4<f32>) -> Result<(), PolygonError> {
        let normals = normal_matrix(transform).ok_or(PolygonError::SingularTransform)?;
        self.apply_with(transform, &normals);
        Ok(())
    }

    pub(crate) fn apply_with(&mut self, transform: &Matrix4<f32>, normal_matrix: &Matrix3<f32>) {
        for point in &mut self.points {
            *point = transform.transform_point(point);
        }
        self.plane_normal = transform_normal(normal_matrix, &self.plane_normal);
    }
}

/// Removes duplicates, derives the normal and checks every corner against it.
fn validate_loop(
    points: Vec<Point3<f32>>,
    tolerance: Tolerance,
) -> Result<(Vec<Point3<f32>>, Vector3<f32>), PolygonError> {
    let points = prune_loop(points, tolerance)?;
    let plane_normal = derive_normal(&points, tolerance)?;

    for i in 0..points.len() {
        if let Some(normal) = corner_normal(&points, i, tolerance) {
            if !tolerance.approx_eq(&normal, &plane_normal) {
                return Err(PolygonError::NotConvexPlanar {
                    vertex: (i + 1) % points.len(),
                });
            }
        }
    }

    Ok((points, plane_normal))
}

/// Removes consecutive duplicates; at least 3 points must exist before and after.
fn prune_loop(
    mut points: Vec<Point3<f32>>,
    tolerance: Tolerance,
) -> Result<Vec<Point3<f32>>, PolygonError> {
    if points.len() < 3 {
        return Err(PolygonError::TooFewPoints {
            count: points.len(),
        });
    }

    remove_consecutive_duplicates(&mut points, tolerance);
    if points.len() < 3 {
        return Err(PolygonError::TooFewPoints {
            count: points.len(),
        });
    }

    Ok(points)
}

/// Normal of the first corner that defines a direction.
fn derive_normal(
    points: &[Point3<f32>],
    tolerance: Tolerance,
) -> Result<Vector3<f32>, PolygonError> {
    (0..points.len())
        .find_map(|i| corner_normal(points, i, tolerance))
        .ok_or(PolygonError::Collinear)
}

/// Drops every point equal to its successor in the loop.
fn remove_consecutive_duplicates(points: &mut Vec<Point3<f32>>, tolerance: Tolerance) {
    let mut i = 0;
    while points.len() > 1 && i < points.len() {
        let next = (i + 1) % points.len();
        if tolerance.points_eq(&points[i], &points[next]) {
            points.remove(i);
        } else {
            i += 1;
        }
    }
}

/// Unit normal at the corner `points[i + 1]`, from the edges entering and
/// leaving it. `None` if the edges are (nearly) parallel.
fn corner_normal(
    points: &[Point3<f32>],
    i: usize,
    tolerance: Tolerance,
) -> Option<Vector3<f32>> {
    let n = points.len();
    let entering = points[(i + 1) % n] - points[i];
    let leaving = points[(i + 2) % n] - points[(i + 1) % n];
    if tolerance.are_parallel(&entering, &leaving) {
        None
    } else {
        Some(entering.cross(&leaving).normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, Vector4};

    fn make_polygon(points: &[[f32; 3]]) -> Result<Polygon, PolygonError> {
        Polygon::new(
            points.iter().map(|p| Point3::new(p[0], p[1], p[2])).collect(),
            Material::default(),
        )
    }

    fn unit_square() -> Polygon {
        // Counter-clockwise seen from +Z.
        make_polygon(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn normal_follows_winding() {
        assert_relative_eq!(unit_square().plane_normal(), Vector3::z());

        let clockwise = make_polygon(&[
            [0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
            [1.0, 0.0, 0.0],
        ])
        .unwrap();
        assert_relative_eq!(clockwise.plane_normal(), -Vector3::z());
    }

    #[test]
    fn too_few_points() {
        let err = make_polygon(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]).unwrap_err();
        assert_eq!(err, PolygonError::TooFewPoints { count: 2 });
    }

    #[test]
    fn duplicates_are_removed_including_wraparound() {
        let polygon = make_polygon(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1e-6, 0.0],
            [0.0, 0.0, 0.0],
        ])
        .unwrap();
        assert_eq!(polygon.len(), 3);
    }

    #[test]
    fn duplicates_collapsing_below_three_points() {
        let err = make_polygon(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0]]).unwrap_err();
        assert_eq!(err, PolygonError::TooFewPoints { count: 2 });
    }

    #[test]
    fn tiny_triangles_are_valid() {
        for leg in [0.002, 0.0002] {
            let polygon =
                make_polygon(&[[0.0, 0.0, 0.0], [leg, 0.0, 0.0], [0.0, leg, 0.0]]).unwrap();
            assert_eq!(polygon.len(), 3);
            assert_relative_eq!(polygon.plane_normal(), Vector3::z());
        }
    }

    #[test]
    fn slivers_are_collinear_at_any_scale() {
        for scale in [1e-3, 1.0, 1e3] {
            let err = make_polygon(&[
                [0.0, 0.0, 0.0],
                [scale, 0.0, 0.0],
                [2.0 * scale, scale * 1e-7, 0.0],
            ])
            .unwrap_err();
            assert_eq!(err, PolygonError::Collinear);
        }
    }

    #[test]
    fn collinear_points_rejected() {
        let err = make_polygon(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]).unwrap_err();
        assert_eq!(err, PolygonError::Collinear);
        assert!(err.is_degenerate_input());
    }

    #[test]
    fn collinear_midpoint_is_tolerated() {
        let polygon = make_polygon(&[
            [0.0, 0.0, 0.0],
            [0.5, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
        ])
        .unwrap();
        assert_eq!(polygon.len(), 4);
        assert_relative_eq!(polygon.plane_normal(), Vector3::z());
    }

    #[test]
    fn non_planar_rejected() {
        let err = make_polygon(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.5],
            [0.0, 1.0, 0.0],
        ])
        .unwrap_err();
        assert!(matches!(err, PolygonError::NotConvexPlanar { .. }));
        assert!(!err.is_degenerate_input());
    }

    #[test]
    fn non_convex_rejected() {
        let err = make_polygon(&[
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [1.0, 0.5, 0.0],
            [2.0, 2.0, 0.0],
            [0.0, 2.0, 0.0],
        ])
        .unwrap_err();
        assert!(matches!(err, PolygonError::NotConvexPlanar { .. }));
    }

    #[test]
    fn rebuilding_from_own_points_keeps_normal() {
        let polygon = make_polygon(&[
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 1.0],
            [2.0, 3.0, 1.0],
            [0.0, 3.0, 0.0],
        ])
        .unwrap();
        let rebuilt = Polygon::new(polygon.points().to_vec(), Material::default()).unwrap();

        assert_relative_eq!(rebuilt.plane_normal(), polygon.plane_normal(), epsilon = 1e-5);
        assert_relative_eq!(polygon.plane_normal().norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn reference_normals_flip_orientation() {
        let points = unit_square().points().to_vec();
        let tol = Tolerance::default();
        let down = [-Vector3::z(), -Vector3::z(), Vector3::new(0.1, 0.0, -1.0)];

        let flipped =
            Polygon::with_reference_normals(points.clone(), &down, Material::default(), tol)
                .unwrap();
        assert_relative_eq!(flipped.plane_normal(), -Vector3::z());
        let mut reversed = points.clone();
        reversed.reverse();
        assert_eq!(flipped.points(), reversed.as_slice());

        let kept = Polygon::with_reference_normals(
            points.clone(),
            &[Vector3::z()],
            Material::default(),
            tol,
        )
        .unwrap();
        assert_eq!(kept.points(), points.as_slice());
        assert_relative_eq!(kept.plane_normal(), Vector3::z());
    }

    #[test]
    fn flipped_polygon_still_matches_its_winding() {
        let tol = Tolerance::default();
        let flipped = Polygon::with_reference_normals(
            unit_square().points().to_vec(),
            &[-Vector3::z()],
            Material::default(),
            tol,
        )
        .unwrap();
        let rebuilt = Polygon::new(flipped.points().to_vec(), Material::default()).unwrap();
        assert_relative_eq!(rebuilt.plane_normal(), flipped.plane_normal());
    }

    #[test]
    fn classification_against_other_polygon() {
        let tol = Tolerance::default();
        let base = unit_square();
        let above = make_polygon(&[[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 2.0]]).unwrap();
        let below = make_polygon(&[[0.0, 0.0, -1.0], [1.0, 0.0, -1.0], [0.0, 1.0, -2.0]]).unwrap();
        let touching = make_polygon(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]).unwrap();
        let spanning = make_polygon(&[[0.0, 0.0, -1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]]).unwrap();

        assert!(above.is_front(&base, tol) && !above.is_behind(&base, tol));
        assert!(below.is_behind(&base, tol) && !below.is_front(&base, tol));
        assert!(touching.is_front(&base, tol));
        assert!(!spanning.is_front(&base, tol) && !spanning.is_behind(&base, tol));
        assert!(!spanning.is_on_same_plane(&base, tol));
    }

    #[test]
    fn coplanar_is_neither_front_nor_behind() {
        let tol = Tolerance::default();
        let base = unit_square();
        let neighbour =
            make_polygon(&[[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 1.0, 0.0]]).unwrap();
        let opposite =
            make_polygon(&[[1.0, 0.0, 0.0], [2.0, 1.0, 0.0], [2.0, 0.0, 0.0]]).unwrap();

        assert!(!neighbour.is_front(&base, tol));
        assert!(!neighbour.is_behind(&base, tol));
        assert!(neighbour.is_on_same_plane(&base, tol));
        assert!(!opposite.is_on_same_plane(&base, tol));
    }

    #[test]
    fn apply_identity_is_noop() {
        let mut polygon = unit_square();
        let original = polygon.clone();
        polygon.apply(&Matrix4::identity()).unwrap();

        for (a, b) in polygon.points().iter().zip(original.points()) {
            assert_relative_eq!(*a, *b);
        }
        assert_relative_eq!(polygon.plane_normal(), original.plane_normal());
    }

    #[test]
    fn apply_rigid_transform() {
        let mut polygon = unit_square();
        let transform = Translation3::new(0.0, 0.0, 5.0).to_homogeneous()
            * Matrix4::new_rotation(Vector3::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0));
        polygon.apply(&transform).unwrap();

        // Rotating +Z about +X by 90 degrees gives -Y.
        assert_relative_eq!(polygon.plane_normal(), -Vector3::y(), epsilon = 1e-6);
        assert_relative_eq!(polygon.points()[2], Point3::new(1.0, 0.0, 6.0), epsilon = 1e-6);
    }

    #[test]
    fn apply_scale_renormalizes() {
        let mut polygon = unit_square();
        polygon.apply(&Matrix4::new_scaling(3.0)).unwrap();
        assert_relative_eq!(polygon.plane_normal(), Vector3::z(), epsilon = 1e-6);
    }

    #[test]
    fn apply_tiny_uniform_scale() {
        let mut polygon = unit_square();
        polygon.apply(&Matrix4::new_scaling(0.001)).unwrap();

        assert_relative_eq!(polygon.plane_normal(), Vector3::z(), epsilon = 1e-6);
        assert_relative_eq!(polygon.points()[2], Point3::new(0.001, 0.001, 0.0));
    }

    #[test]
    fn apply_singular_leaves_polygon_untouched() {
        let mut polygon = unit_square();
        let original = polygon.clone();
        let err = polygon
            .apply(&Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 1.0, 0.0)))
            .unwrap_err();

        assert_eq!(err, PolygonError::SingularTransform);
        assert_eq!(polygon, original);
    }

    #[test]
    fn centroid_and_area() {
        let square = unit_square();
        assert_relative_eq!(square.centroid(), Point3::new(0.5, 0.5, 0.0));
        assert_relative_eq!(square.area(), 1.0);
    }

    #[test]
    fn material_is_kept() {
        let material = Material::default().with_color(Vector4::new(1.0, 0.0, 0.0, 1.0));
        let polygon = Polygon::new(unit_square().points().to_vec(), material.clone()).unwrap();
        assert_eq!(polygon.material(), &material);
    }
}
