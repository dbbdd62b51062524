//! Binary Space Partitioning tree over convex polygons.
//!
//! The tree recursively partitions 3D space using the planes of its input
//! polygons. Building it splits polygons that straddle a plane, so every
//! node ends up with:
//!
//! - the polygons lying on its plane,
//! - a front subtree with everything on the normal side,
//! - a behind subtree with everything on the other side.
//!
//! # Usage
//!
//! ```ignore
//! use convex_bsp::{BspTree, Material};
//! use nalgebra::{Matrix4, Point3};
//!
//! // Build a tree from a triangle stream
//! let vertices: Vec<Point3<f32>> = /* groups of 3 points */;
//! let build = BspTree::from_triangles(&vertices, &Material::default())?;
//! let mut tree = build.tree;
//!
//! // Reposition the whole scene and flatten it for rendering
//! tree.apply(&Matrix4::new_translation(&nalgebra::Vector3::new(0.0, 0.0, -5.0)))?;
//! let polygons = tree.polygons();
//! ```
//!
//! [`BspTree::traverse`] hands each node's coplanar group to a
//! [`BspVisitor`] in the order `polygons` returns them.

mod node;
mod tree;
mod visitor;

pub use node::BspNode;
pub use tree::{BspTree, SkippedTriangle, TriangleBuild};
pub use visitor::{BspVisitor, CollectingVisitor, FnVisitor};
