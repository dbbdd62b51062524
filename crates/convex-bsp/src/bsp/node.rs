//! BSP tree node implementation.

use log::trace;
use nalgebra::{Matrix3, Matrix4, Point3};

use crate::cuttable::{Placement, place};
use crate::{BspError, Plane3D, PlaneSide, Polygon, Tolerance};

/// A node in the BSP tree.
///
/// Each node partitions space using the plane of its splitter polygon and
/// stores the polygons lying on that plane (the splitter first). Polygons
/// in front of or behind the plane live in the respective child subtrees.
/// A node always holds at least one polygon; a side with no geometry has
/// no child.
#[derive(Debug, Clone)]
pub struct BspNode {
    /// The splitting plane for this node, from the splitter polygon.
    plane: Plane3D,

    /// Polygons on the plane. The first one is the splitter.
    polygons: Vec<Polygon>,

    /// Subtree containing polygons in FRONT of the splitting plane.
    front: Option<Box<BspNode>>,

    /// Subtree containing polygons BEHIND the splitting plane.
    behind: Option<Box<BspNode>>,

    tolerance: Tolerance,
}

impl BspNode {
    /// Recursively builds a node from a list of polygons.
    ///
    /// The first polygon is the splitter. Every other polygon goes to the
    /// front list, the behind list or this node's coplanar group; polygons
    /// straddling the plane are sliced and their fragments distributed.
    ///
    /// # Errors
    /// - [`BspError::EmptyInput`] if `polygons` is empty.
    /// - [`BspError::InconsistentSplit`] or [`BspError::Polygon`] if slicing
    ///   a straddling polygon breaks an invariant.
    pub fn build(polygons: Vec<Polygon>, tolerance: Tolerance) -> Result<Self, BspError> {
        let mut polygons = polygons.into_iter();
        let splitter = polygons.next().ok_or(BspError::EmptyInput)?;
        let plane = splitter.plane();

        let mut coplanar = Vec::new();
        let mut front_list = Vec::new();
        let mut behind_list = Vec::new();

        for polygon in polygons {
            match place(polygon, &splitter, tolerance)? {
                Placement::Front(polygon) => front_list.push(polygon),
                Placement::Behind(polygon) => behind_list.push(polygon),
                Placement::Coplanar(polygon) => coplanar.push(polygon),
                Placement::Split { front, behind } => {
                    trace!(
                        "split polygon into {}-gon in front and {}-gon behind",
                        front.len(),
                        behind.len()
                    );
                    front_list.push(front);
                    behind_list.push(behind);
                }
            }
        }

        let mut group = Vec::with_capacity(coplanar.len() + 1);
        group.push(splitter);
        group.extend(coplanar);

        Ok(Self {
            plane,
            polygons: group,
            front: build_child(front_list, tolerance)?,
            behind: build_child(behind_list, tolerance)?,
            tolerance,
        })
    }

    /// Returns a reference to the splitting plane.
    #[inline]
    pub fn plane(&self) -> &Plane3D {
        &self.plane
    }

    /// Returns the polygons on this node's plane, splitter first.
    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Returns the splitter polygon.
    #[inline]
    pub fn splitter(&self) -> &Polygon {
        &self.polygons[0]
    }

    /// Returns the tolerance the node was built with.
    #[inline]
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Returns a reference to the front child subtree.
    #[inline]
    pub fn front(&self) -> Option<&BspNode> {
        self.front.as_deref()
    }

    /// Returns a reference to the behind child subtree.
    #[inline]
    pub fn behind(&self) -> Option<&BspNode> {
        self.behind.as_deref()
    }

    /// Checks if this node has any children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.front.is_none() && self.behind.is_none()
    }

    /// Is `point` strictly in front of (on the normal side of) this node's plane?
    pub fn is_front(&self, point: Point3<f32>) -> bool {
        self.classify_point(point) == PlaneSide::Front
    }

    /// Is `point` strictly behind this node's plane?
    pub fn is_behind(&self, point: Point3<f32>) -> bool {
        self.classify_point(point) == PlaneSide::Back
    }

    /// Classifies a point against this node's plane.
    pub fn classify_point(&self, point: Point3<f32>) -> PlaneSide {
        self.plane.classify_point(point, self.tolerance)
    }

    /// Returns the total number of polygons in this subtree (including all descendants).
    pub fn polygon_count(&self) -> usize {
        let mut count = self.polygons.len();

        if let Some(ref front) = self.front {
            count += front.polygon_count();
        }
        if let Some(ref behind) = self.behind {
            count += behind.polygon_count();
        }

        count
    }

    /// Returns the number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self.front.as_ref().map_or(0, |n| n.node_count())
            + self.behind.as_ref().map_or(0, |n| n.node_count())
    }

    /// Returns the depth of this subtree (1 for a leaf node).
    pub fn depth(&self) -> usize {
        let front_depth = self.front.as_ref().map_or(0, |n| n.depth());
        let behind_depth = self.behind.as_ref().map_or(0, |n| n.depth());
        1 + front_depth.max(behind_depth)
    }

    /// Moves the plane, the polygons, and both subtrees.
    pub(crate) fn apply_with(&mut self, transform: &Matrix4<f32>, normal_matrix: &Matrix3<f32>) {
        self.plane = self.plane.transformed(transform, normal_matrix);
        for polygon in &mut self.polygons {
            polygon.apply_with(transform, normal_matrix);
        }
        if let Some(front) = self.front.as_deref_mut() {
            front.apply_with(transform, normal_matrix);
        }
        if let Some(behind) = self.behind.as_deref_mut() {
            behind.apply_with(transform, normal_matrix);
        }
    }
}

fn build_child(
    polygons: Vec<Polygon>,
    tolerance: Tolerance,
) -> Result<Option<Box<BspNode>>, BspError> {
    if polygons.is_empty() {
        return Ok(None);
    }
    BspNode::build(polygons, tolerance).map(|node| Some(Box::new(node)))
}
