//! Triangle representation and flat triangle streams.

use nalgebra::Point3;

use crate::{BspError, Material, Polygon, PolygonError, Tolerance};

/// Three consecutive vertices of a triangle stream, not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    vertices: [Point3<f32>; 3],
}

impl Triangle {
    /// The front side is the one from which `a`, `b`, `c` appear
    /// counter-clockwise.
    pub fn new(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[Point3<f32>; 3] {
        &self.vertices
    }

    /// Validates the triangle as a polygon; see [`Polygon::with_tolerance`].
    pub fn into_polygon(
        self,
        material: Material,
        tolerance: Tolerance,
    ) -> Result<Polygon, PolygonError> {
        Polygon::with_tolerance(self.vertices.to_vec(), material, tolerance)
    }
}

/// Reads a flat vertex stream as consecutive triangles.
///
/// # Errors
/// [`BspError::RaggedTriangleStream`] if the length is not a multiple of 3.
pub fn triangles(
    vertices: &[Point3<f32>],
) -> Result<impl Iterator<Item = Triangle> + '_, BspError> {
    if vertices.len() % 3 != 0 {
        return Err(BspError::RaggedTriangleStream {
            len: vertices.len(),
        });
    }
    Ok(vertices
        .chunks_exact(3)
        .map(|chunk| Triangle::new(chunk[0], chunk[1], chunk[2])))
}
