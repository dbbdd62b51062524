//! BSP tree container and construction.

use std::fmt;

use log::{debug, warn};
use nalgebra::{Matrix4, Point3};

use crate::plane::normal_matrix;
use crate::triangle::triangles;
use crate::{BspError, Material, Polygon, PolygonError, Tolerance};

use super::node::BspNode;
use super::visitor::{BspVisitor, CollectingVisitor};

/// A Binary Space Partitioning tree for convex 3D polygons.
///
/// BSP trees recursively partition space using planes. Each node contains
/// polygons that are coplanar with its splitting plane, while the remaining
/// polygons are stored in front or behind subtrees.
///
/// # Construction
///
/// ```ignore
/// use convex_bsp::{BspTree, Polygon};
///
/// let polygons: Vec<Polygon> = /* ... */;
/// let tree = BspTree::from_polygons(polygons)?;
/// ```
///
/// # Traversal
///
/// [`BspTree::polygons`] and [`BspTree::traverse`] walk the tree in a fixed
/// order: a node's own polygons, then its front subtree, then its behind
/// subtree. The order does not depend on any viewpoint.
#[derive(Debug, Clone)]
pub struct BspTree {
    root: BspNode,
}

/// A triangle dropped while building from a triangle stream.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTriangle {
    /// Position of the triangle in the stream (vertex index / 3).
    pub index: usize,
    /// Why it could not become a polygon.
    pub reason: PolygonError,
}

/// Result of building a tree from a triangle stream.
#[derive(Debug, Clone)]
pub struct TriangleBuild {
    pub tree: BspTree,
    pub skipped: Vec<SkippedTriangle>,
}

impl BspTree {
    /// Builds a BSP tree from a collection of polygons.
    ///
    /// Polygons that span a splitting plane are automatically split.
    ///
    /// # Errors
    /// See [`BspNode::build`].
    pub fn build(polygons: Vec<Polygon>, tolerance: Tolerance) -> Result<Self, BspError> {
        let input_count = polygons.len();
        let root = BspNode::build(polygons, tolerance)?;
        debug!(
            "built BSP tree from {} polygons: {} polygons in {} nodes, depth {}",
            input_count,
            root.polygon_count(),
            root.node_count(),
            root.depth()
        );
        Ok(Self { root })
    }

    /// Builds a BSP tree using the default tolerance.
    pub fn from_polygons(polygons: Vec<Polygon>) -> Result<Self, BspError> {
        Self::build(polygons, Tolerance::default())
    }

    /// Builds a BSP tree from a flat triangle stream using the default tolerance.
    ///
    /// See [`BspTree::from_triangles_with_tolerance`].
    pub fn from_triangles(
        vertices: &[Point3<f32>],
        material: &Material,
    ) -> Result<TriangleBuild, BspError> {
        Self::from_triangles_with_tolerance(vertices, material, Tolerance::default())
    }

    /// Builds a BSP tree from a flat triangle stream.
    ///
    /// Every 3 vertices form one triangle sharing `material`. Triangles that
    /// are degenerate (duplicate or collinear points) are left out and listed
    /// in [`TriangleBuild::skipped`].
    ///
    /// # Errors
    /// - [`BspError::RaggedTriangleStream`] if the vertex count is not a multiple of 3.
    /// - [`BspError::EmptyInput`] if no triangle survives.
    pub fn from_triangles_with_tolerance(
        vertices: &[Point3<f32>],
        material: &Material,
        tolerance: Tolerance,
    ) -> Result<TriangleBuild, BspError> {
        let mut polygons = Vec::with_capacity(vertices.len() / 3);
        let mut skipped = Vec::new();

        for (index, triangle) in triangles(vertices)?.enumerate() {
            match triangle.into_polygon(material.clone(), tolerance) {
                Ok(polygon) => polygons.push(polygon),
                Err(reason) if reason.is_degenerate_input() => {
                    warn!("skipping triangle {index}: {reason}");
                    skipped.push(SkippedTriangle { index, reason });
                }
                Err(reason) => return Err(reason.into()),
            }
        }

        if !skipped.is_empty() {
            debug!("skipped {} degenerate triangles", skipped.len());
        }

        Ok(TriangleBuild {
            tree: Self::build(polygons, tolerance)?,
            skipped,
        })
    }

    /// Returns a reference to the root node.
    #[inline]
    pub fn root(&self) -> &BspNode {
        &self.root
    }

    /// Returns the tolerance the tree was built with.
    #[inline]
    pub fn tolerance(&self) -> Tolerance {
        self.root.tolerance()
    }

    /// Returns the total number of polygons in the tree.
    pub fn polygon_count(&self) -> usize {
        self.root.polygon_count()
    }

    /// Returns the number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Returns the maximum depth of the tree.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Applies an affine transform to every plane and polygon in the tree.
    ///
    /// # Errors
    /// [`PolygonError::SingularTransform`] (wrapped) if the linear part is
    /// not invertible; the tree is left unchanged.
    pub fn apply(&mut self, transform: &Matrix4<f32>) -> Result<(), BspError> {
        let normals = normal_matrix(transform).ok_or(PolygonError::SingularTransform)?;
        self.root.apply_with(transform, &normals);
        Ok(())
    }

    /// Visits every node's coplanar group: the node first, then its front
    /// subtree, then its behind subtree.
    pub fn traverse<V: BspVisitor>(&self, visitor: &mut V) {
        traverse_node(&self.root, 0, visitor);
    }

    /// Collects all polygons in traversal order.
    pub fn polygons(&self) -> Vec<Polygon> {
        let mut visitor = CollectingVisitor::with_capacity(self.polygon_count());
        self.traverse(&mut visitor);
        visitor.into_polygons()
    }
}

/// Recursively visits a node subtree.
fn traverse_node<V: BspVisitor>(node: &BspNode, depth: usize, visitor: &mut V) {
    visitor.visit(node.polygons(), depth);
    if let Some(front) = node.front() {
        traverse_node(front, depth + 1, visitor);
    }
    if let Some(behind) = node.behind() {
        traverse_node(behind, depth + 1, visitor);
    }
}

/// Writes a node subtree in heap numbering: front child of `i` is
/// `2i + 1`, behind child is `2i + 2`.
fn dump_node(
    node: &BspNode,
    depth: usize,
    index: usize,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let indent = depth * 2;
    writeln!(f, "{:indent$}index: {index}", "")?;
    for (k, polygon) in node.polygons().iter().enumerate() {
        writeln!(f, "{:indent$}({k}", "")?;
        for point in polygon.points() {
            writeln!(f, "{:indent$}  ({}, {}, {})", "", point.x, point.y, point.z)?;
        }
        writeln!(f, "{:indent$})", "")?;
    }
    if let Some(front) = node.front() {
        dump_node(front, depth + 1, index * 2 + 1, f)?;
    }
    if let Some(behind) = node.behind() {
        dump_node(behind, depth + 1, index * 2 + 2, f)?;
    }
    Ok(())
}

/// Diagnostic dump of node indices and raw polygon coordinates.
impl fmt::Display for BspTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dump_node(&self.root, 0, 0, f)
    }
}
