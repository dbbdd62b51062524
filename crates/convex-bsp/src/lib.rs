//! BSP (Binary Space Partitioning) of convex planar polygons.
//!
//! Polygons are validated on construction, split by plane with a shared
//! [`Tolerance`], and organized into a [`BspTree`] that can be transformed
//! and flattened back into a polygon list.

pub mod bsp;
mod cuttable;
mod error;
mod material;
mod plane;
mod polygon;
mod tolerance;
mod triangle;

pub use bsp::{
    BspNode, BspTree, BspVisitor, CollectingVisitor, FnVisitor, SkippedTriangle, TriangleBuild,
};
pub use cuttable::{Cuttable, Placement, place};
pub use error::{BspError, PolygonError};
pub use material::Material;
pub use plane::{Classification, Plane3D, PlaneSide};
pub use polygon::Polygon;
pub use tolerance::{DEFAULT_EPSILON, Tolerance};
pub use triangle::{Triangle, triangles};
