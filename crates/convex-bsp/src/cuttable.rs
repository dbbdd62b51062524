//! Polygon slicing and splitter placement for BSP construction.

use log::{trace, warn};
use nalgebra::{Point3, Vector3};

use crate::{
    BspError, Classification, Plane3D, PlaneSide, Polygon, PolygonError, Tolerance,
};

/// Trait for geometry that can be cut by a plane.
pub trait Cuttable {
    /// Cuts the geometry by a plane.
    ///
    /// Returns the pieces as polygons:
    /// - one polygon (a copy of the input) if the plane does not cross it;
    /// - the front piece then the back piece if it does. A piece that
    ///   collapses into degenerate geometry is dropped, so fewer than two
    ///   may come back.
    fn slice_plane(&self, plane: &Plane3D, tolerance: Tolerance)
    -> Result<Vec<Polygon>, PolygonError>;

    /// Cuts by the plane through `point` with `normal`.
    ///
    /// A zero `normal` defines no plane and leaves the geometry whole.
    fn slice(
        &self,
        point: Point3<f32>,
        normal: Vector3<f32>,
        tolerance: Tolerance,
    ) -> Result<Vec<Polygon>, PolygonError>;

    /// Cuts by the plane of another polygon.
    fn slice_by(
        &self,
        other: &Polygon,
        tolerance: Tolerance,
    ) -> Result<Vec<Polygon>, PolygonError> {
        self.slice_plane(&other.plane(), tolerance)
    }
}

impl Cuttable for Polygon {
    fn slice_plane(
        &self,
        plane: &Plane3D,
        tolerance: Tolerance,
    ) -> Result<Vec<Polygon>, PolygonError> {
        match self.classify(plane, tolerance) {
            Classification::Spanning => split_polygon(self, plane, tolerance),
            _ => Ok(vec![self.clone()]),
        }
    }

    fn slice(
        &self,
        point: Point3<f32>,
        normal: Vector3<f32>,
        tolerance: Tolerance,
    ) -> Result<Vec<Polygon>, PolygonError> {
        match Plane3D::from_point_and_normal(point, normal) {
            Some(plane) => self.slice_plane(&plane, tolerance),
            None => Ok(vec![self.clone()]),
        }
    }
}

/// Splits a spanning polygon into front and back parts.
///
/// Walks the polygon edges and builds two vertex rings, adding the
/// intersection point to both whenever an edge goes strictly from one side
/// to the other. Vertices on the plane go to both rings.
fn split_polygon(
    polygon: &Polygon,
    plane: &Plane3D,
    tolerance: Tolerance,
) -> Result<Vec<Polygon>, PolygonError> {
    let points = polygon.points();
    let n = points.len();

    let mut front_ring = Vec::with_capacity(n + 2);
    let mut back_ring = Vec::with_capacity(n + 2);

    let sides: Vec<PlaneSide> = points
        .iter()
        .map(|p| plane.classify_point(*p, tolerance))
        .collect();

    for i in 0..n {
        let current = points[i];
        let next = points[(i + 1) % n];

        match sides[i] {
            PlaneSide::Front => front_ring.push(current),
            PlaneSide::Back => back_ring.push(current),
            PlaneSide::OnPlane => {
                front_ring.push(current);
                back_ring.push(current);
            }
        }

        let crosses = matches!(
            (sides[i], sides[(i + 1) % n]),
            (PlaneSide::Front, PlaneSide::Back) | (PlaneSide::Back, PlaneSide::Front)
        );

        if crosses {
            if let Some((_, intersection)) = plane.intersect_segment(current, next) {
                // Snap onto the plane so both rings agree it is on it.
                let intersection = plane.project_point(intersection);
                front_ring.push(intersection);
                back_ring.push(intersection);
            }
        }
    }

    trace!(
        "split {}-gon into front ring of {} and back ring of {}",
        n,
        front_ring.len(),
        back_ring.len()
    );

    let mut fragments = Vec::with_capacity(2);
    for ring in [front_ring, back_ring] {
        match polygon.fragment(ring, tolerance) {
            Ok(fragment) => fragments.push(fragment),
            Err(err) if err.is_degenerate_input() => {
                warn!("dropping degenerate slice fragment: {err}");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(fragments)
}

/// Where a polygon goes relative to a splitter during construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// Wholly in front of the splitter's plane
    Front(Polygon),
    /// Wholly behind the splitter's plane
    Behind(Polygon),
    /// On the splitter's plane
    Coplanar(Polygon),
    /// Cut in two by the splitter's plane
    Split { front: Polygon, behind: Polygon },
}

/// Places `polygon` relative to `splitter`.
///
/// Checks front, then behind, then coplanar, and slices by the splitter's
/// plane otherwise.
///
/// # Errors
/// [`BspError::InconsistentSplit`] if slicing yields no fragment, or two
/// fragments that are not one front and one behind.
pub fn place(
    polygon: Polygon,
    splitter: &Polygon,
    tolerance: Tolerance,
) -> Result<Placement, BspError> {
    if polygon.is_front(splitter, tolerance) {
        return Ok(Placement::Front(polygon));
    }
    if polygon.is_behind(splitter, tolerance) {
        return Ok(Placement::Behind(polygon));
    }
    if polygon.is_on_same_plane(splitter, tolerance) {
        return Ok(Placement::Coplanar(polygon));
    }

    let mut fragments = polygon.slice_by(splitter, tolerance)?;
    match fragments.len() {
        2 => {
            let (Some(second), Some(first)) = (fragments.pop(), fragments.pop()) else {
                return Err(BspError::InconsistentSplit { fragments: 2 });
            };
            if first.is_front(splitter, tolerance) && second.is_behind(splitter, tolerance) {
                Ok(Placement::Split {
                    front: first,
                    behind: second,
                })
            } else if second.is_front(splitter, tolerance) && first.is_behind(splitter, tolerance) {
                Ok(Placement::Split {
                    front: second,
                    behind: first,
                })
            } else {
                Err(BspError::InconsistentSplit { fragments: 2 })
            }
        }
        1 => {
            let Some(single) = fragments.pop() else {
                return Err(BspError::InconsistentSplit { fragments: 1 });
            };
            if single.is_front(splitter, tolerance) {
                Ok(Placement::Front(single))
            } else if single.is_behind(splitter, tolerance) {
                Ok(Placement::Behind(single))
            } else {
                Ok(Placement::Coplanar(single))
            }
        }
        count => Err(BspError::InconsistentSplit { fragments: count }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Material;
    use approx::assert_relative_eq;
    use nalgebra::Vector4;

    fn make_polygon(points: &[[f32; 3]]) -> Polygon {
        Polygon::new(
            points.iter().map(|p| Point3::new(p[0], p[1], p[2])).collect(),
            Material::default(),
        )
        .unwrap()
    }

    fn xz_plane() -> (Point3<f32>, Vector3<f32>) {
        (Point3::origin(), Vector3::y())
    }

    fn straddling_triangle() -> Polygon {
        make_polygon(&[[-1.0, 1.0, 0.0], [1.0, 1.0, 0.0], [0.0, -1.0, 0.0]])
    }

    #[test]
    fn slice_missing_plane_returns_original() {
        let tol = Tolerance::default();
        let (point, normal) = xz_plane();
        let polygon = make_polygon(&[[0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [0.0, 2.0, 0.0]]);

        let pieces = polygon.slice(point, normal, tol).unwrap();
        assert_eq!(pieces, vec![polygon]);
    }

    #[test]
    fn slice_touching_plane_returns_original() {
        let tol = Tolerance::default();
        let (point, normal) = xz_plane();
        let polygon = make_polygon(&[[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [-1.0, 1.0, 0.0]]);

        let pieces = polygon.slice(point, normal, tol).unwrap();
        assert_eq!(pieces, vec![polygon]);
    }

    #[test]
    fn slice_straddling_triangle_into_quad_and_triangle() {
        let tol = Tolerance::default();
        let (point, normal) = xz_plane();
        let triangle = straddling_triangle();

        let pieces = triangle.slice(point, normal, tol).unwrap();
        assert_eq!(pieces.len(), 2);

        let (front, back) = (&pieces[0], &pieces[1]);
        assert_eq!(front.len(), 4);
        assert_eq!(back.len(), 3);
        assert!(front.points().iter().all(|p| p.y >= 0.0));
        assert!(back.points().iter().all(|p| p.y <= 0.0));

        // Both fragments keep the original orientation.
        assert_relative_eq!(front.plane_normal(), triangle.plane_normal());
        assert_relative_eq!(back.plane_normal(), triangle.plane_normal());
    }

    #[test]
    fn slice_adds_exactly_two_intersection_points() {
        let tol = Tolerance::default();
        let (point, normal) = xz_plane();
        let triangle = straddling_triangle();

        let pieces = triangle.slice(point, normal, tol).unwrap();
        let all: Vec<Point3<f32>> = pieces.iter().flat_map(|p| p.points().to_vec()).collect();

        let new_points: Vec<Point3<f32>> = all
            .iter()
            .filter(|p| !triangle.points().iter().any(|q| tol.points_eq(p, q)))
            .copied()
            .collect();
        assert_eq!(all.len() - new_points.len(), triangle.len());

        // Each intersection point is shared by both fragments.
        assert_eq!(new_points.len(), 4);
        let x1 = Point3::new(0.5, 0.0, 0.0);
        let x2 = Point3::new(-0.5, 0.0, 0.0);
        assert_eq!(new_points.iter().filter(|p| tol.points_eq(p, &x1)).count(), 2);
        assert_eq!(new_points.iter().filter(|p| tol.points_eq(p, &x2)).count(), 2);
    }

    #[test]
    fn slice_through_vertex_keeps_vertex_on_both_sides() {
        let tol = Tolerance::default();
        let (point, normal) = xz_plane();
        // Diamond with two vertices on the cutting plane.
        let diamond = make_polygon(&[
            [0.0, -1.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [-1.0, 0.0, 0.0],
        ]);

        let pieces = diamond.slice(point, normal, tol).unwrap();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].len(), 3);
        assert_eq!(pieces[1].len(), 3);
        assert_relative_eq!(pieces[0].area() + pieces[1].area(), diamond.area(), epsilon = 1e-6);
    }

    #[test]
    fn slice_by_uses_other_polygon_plane() {
        let tol = Tolerance::default();
        let ground = make_polygon(&[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]]);
        let pieces = straddling_triangle().slice_by(&ground, tol).unwrap();

        assert_eq!(pieces.len(), 2);
        assert!(pieces[0].is_front(&ground, tol));
        assert!(pieces[1].is_behind(&ground, tol));
    }

    #[test]
    fn slice_with_zero_normal_keeps_polygon() {
        let tol = Tolerance::default();
        let triangle = straddling_triangle();
        let pieces = triangle.slice(Point3::origin(), Vector3::zeros(), tol).unwrap();
        assert_eq!(pieces, vec![triangle]);
    }

    #[test]
    fn fragments_keep_material() {
        let tol = Tolerance::default();
        let (point, normal) = xz_plane();
        let material = Material::default().with_color(Vector4::new(0.0, 1.0, 0.0, 1.0));
        let triangle =
            Polygon::new(straddling_triangle().points().to_vec(), material.clone()).unwrap();

        for piece in triangle.slice(point, normal, tol).unwrap() {
            assert_eq!(piece.material(), &material);
        }
    }

    #[test]
    fn slice_millimetre_triangle() {
        let tol = Tolerance::default();
        let (point, normal) = xz_plane();
        let small = make_polygon(&[[-0.002, 0.002, 0.0], [0.002, 0.002, 0.0], [0.0, -0.002, 0.0]]);

        let pieces = small.slice(point, normal, tol).unwrap();
        assert_eq!(pieces.len(), 2);
        assert_eq!((pieces[0].len(), pieces[1].len()), (4, 3));
        assert_relative_eq!(pieces[0].area() + pieces[1].area(), small.area(), epsilon = 1e-9);
    }

    #[test]
    fn intersection_points_lie_on_the_cutting_plane() {
        let tol = Tolerance::default();
        let (point, normal) = xz_plane();
        // Edges cross y = 0 at a third of their length.
        let triangle = make_polygon(&[[-0.7, 1.1, 0.3], [0.9, 1.1, -0.2], [0.1, -2.2, 0.4]]);

        for piece in triangle.slice(point, normal, tol).unwrap() {
            for p in piece.points().iter().filter(|p| p.y.abs() < 0.5) {
                assert!(p.y.abs() <= tol.epsilon());
            }
        }
    }

    #[test]
    fn place_front_behind_and_coplanar() {
        let tol = Tolerance::default();
        let ground = make_polygon(&[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]]);
        let above = make_polygon(&[[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 2.0, 0.0]]);
        let below = make_polygon(&[[0.0, -1.0, 0.0], [0.0, -1.0, 1.0], [1.0, -2.0, 0.0]]);
        let beside = make_polygon(&[[2.0, 0.0, 0.0], [2.0, 0.0, 1.0], [3.0, 0.0, 0.0]]);

        assert!(matches!(place(above, &ground, tol), Ok(Placement::Front(_))));
        assert!(matches!(place(below, &ground, tol), Ok(Placement::Behind(_))));
        assert!(matches!(place(beside, &ground, tol), Ok(Placement::Coplanar(_))));
    }

    #[test]
    fn place_opposite_facing_coplanar_stays_on_plane() {
        let tol = Tolerance::default();
        let ground = make_polygon(&[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]]);
        let flipped = make_polygon(&[[2.0, 0.0, 0.0], [3.0, 0.0, 0.0], [2.0, 0.0, 1.0]]);

        match place(flipped.clone(), &ground, tol).unwrap() {
            Placement::Coplanar(polygon) => assert_eq!(polygon, flipped),
            other => panic!("expected coplanar placement, got {other:?}"),
        }
    }

    #[test]
    fn place_straddling_splits() {
        let tol = Tolerance::default();
        let ground = make_polygon(&[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]]);

        match place(straddling_triangle(), &ground, tol).unwrap() {
            Placement::Split { front, behind } => {
                assert!(front.is_front(&ground, tol));
                assert!(behind.is_behind(&ground, tol));
                assert_eq!(front.len() + behind.len(), 7);
            }
            other => panic!("expected split placement, got {other:?}"),
        }
    }
}
