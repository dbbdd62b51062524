//! Surface attributes carried by polygons.

use nalgebra::{Vector3, Vector4};

/// Phong-style surface attributes.
///
/// The BSP never reads these; they travel with a polygon through splits
/// and transforms so that renderers can shade the fragments.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Diffuse reflection coefficient (RGB).
    pub diffuse: Vector3<f32>,
    /// Ambient reflection coefficient (RGB).
    pub ambient: Vector3<f32>,
    /// Specular reflection coefficient (RGB).
    pub specular: Vector3<f32>,
    /// Specular exponent.
    pub shininess: f32,
    /// Base color (RGBA).
    pub color: Vector4<f32>,
}

impl Material {
    pub fn new(
        diffuse: Vector3<f32>,
        ambient: Vector3<f32>,
        specular: Vector3<f32>,
        shininess: f32,
        color: Vector4<f32>,
    ) -> Self {
        Self {
            diffuse,
            ambient,
            specular,
            shininess,
            color,
        }
    }

    /// Returns a copy with a different base color.
    pub fn with_color(mut self, color: Vector4<f32>) -> Self {
        self.color = color;
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: Vector3::repeat(0.6),
            ambient: Vector3::repeat(0.2),
            specular: Vector3::repeat(0.2),
            shininess: 32.0,
            color: Vector4::new(0.5, 0.5, 0.5, 1.0),
        }
    }
}
