use thiserror::Error;

/// Failure to build or transform a single polygon.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolygonError {
    #[error("polygon needs at least 3 distinct points, got {count}")]
    TooFewPoints { count: usize },
    #[error("polygon points are collinear")]
    Collinear,
    #[error("vertex {vertex} is not on the polygon's plane or breaks convexity")]
    NotConvexPlanar { vertex: usize },
    #[error("transform has a singular linear part")]
    SingularTransform,
}

impl PolygonError {
    /// Returns true for errors caused by unusable input geometry
    /// (as opposed to contract violations).
    ///
    /// Bulk construction and slicing drop polygons failing this way.
    pub fn is_degenerate_input(&self) -> bool {
        matches!(self, Self::TooFewPoints { .. } | Self::Collinear)
    }
}

/// Failure to build or transform a BSP tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BspError {
    #[error("cannot build a BSP node from an empty polygon list")]
    EmptyInput,
    #[error("triangle stream length {len} is not a multiple of 3")]
    RaggedTriangleStream { len: usize },
    #[error(
        "slicing a straddling polygon produced {fragments} fragment(s), \
         expected one front and one behind"
    )]
    InconsistentSplit { fragments: usize },
    #[error("polygon error: {0}")]
    Polygon(#[from] PolygonError),
}
