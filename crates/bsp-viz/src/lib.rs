//! Drawing helpers, demo geometry and camera for the BSP viewer.

use std::hash::{Hash, Hasher};

use convex_bsp::{BspVisitor, Polygon};
use macroquad::models::{Mesh, Vertex, draw_mesh};
use macroquad::prelude::*;
use nalgebra::{Point3, Rotation3, Vector3};

pub mod navigator;
pub use navigator::TreeNavigator;

/// Direction of the single light used for flat shading.
const LIGHT_DIRECTION: [f32; 3] = [0.4, 0.8, 0.45];

/// Shades a polygon from its material and normal.
///
/// Ambient plus Lambert diffuse on the material color, with a small hash of
/// the vertices mixed in so that split fragments are told apart.
pub fn polygon_color(polygon: &Polygon) -> Color {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for point in polygon.points() {
        point.coords.iter().for_each(|c| c.to_bits().hash(&mut hasher));
    }
    let jitter = (hasher.finish() & 0xFF) as f32 / 255.0 * 0.15;

    let material = polygon.material();
    let light = Vector3::from(LIGHT_DIRECTION).normalize();
    let lambert = polygon.plane_normal().dot(&light).abs();
    let shade = |channel: usize| {
        let lit = material.ambient[channel] + material.diffuse[channel] * lambert;
        (material.color[channel] * lit + jitter).clamp(0.0, 1.0)
    };

    Color::new(shade(0), shade(1), shade(2), material.color.w)
}

/// Builds a single-colored triangle fan over the polygon's loop.
pub fn polygon_mesh(polygon: &Polygon, color: Color) -> Mesh {
    let vertices = polygon
        .points()
        .iter()
        .map(|p| Vertex::new(p.x, p.y, p.z, 0.0, 0.0, color))
        .collect();
    let indices = (1..polygon.len() as u16 - 1)
        .flat_map(|i| [0, i, i + 1])
        .collect();

    Mesh {
        vertices,
        indices,
        texture: None,
    }
}

/// Draws a polygon with its material shading.
pub fn draw_polygon(polygon: &Polygon) {
    draw_mesh(&polygon_mesh(polygon, polygon_color(polygon)));
}

/// Draws every visited group as-is.
pub struct RenderVisitor;

impl BspVisitor for RenderVisitor {
    fn visit(&mut self, polygons: &[Polygon], _depth: usize) {
        polygons.iter().for_each(draw_polygon);
    }
}

/// Appends the two triangles of the quad `[a, b, c, d]` to a vertex stream.
fn push_quad(stream: &mut Vec<Point3<f32>>, [a, b, c, d]: [Point3<f32>; 4]) {
    stream.extend([a, b, c, a, c, d]);
}

/// Triangle stream for the six faces of a rotated cube, wound outward.
pub fn cube_triangles(
    center: Point3<f32>,
    size: f32,
    rotation: &Rotation3<f32>,
) -> Vec<Point3<f32>> {
    let half = size / 2.0;
    let mut stream = Vec::with_capacity(36);

    for axis in 0..3 {
        // u x v == +axis for this cyclic choice.
        let normal = Vector3::ith(axis, half);
        let u = Vector3::ith((axis + 1) % 3, half);
        let v = Vector3::ith((axis + 2) % 3, half);

        for sign in [1.0, -1.0] {
            let face = normal * sign;
            let mut quad = [face - u - v, face + u - v, face + u + v, face - u + v]
                .map(|offset| center + rotation * offset);
            if sign < 0.0 {
                quad.reverse();
            }
            push_quad(&mut stream, quad);
        }
    }

    stream
}

/// Triangle stream for a horizontal square floor facing up.
pub fn floor_triangles(height: f32, half_extent: f32) -> Vec<Point3<f32>> {
    let corner = |x: f32, z: f32| Point3::new(x * half_extent, height, z * half_extent);
    let mut stream = Vec::with_capacity(6);
    push_quad(
        &mut stream,
        [corner(-1.0, -1.0), corner(-1.0, 1.0), corner(1.0, 1.0), corner(1.0, -1.0)],
    );
    stream
}

/// Camera circling a fixed target.
///
/// Angles are in radians; `pitch` is kept away from the poles so the up
/// vector stays valid.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Point3<f32>,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    zoom_step: f32,
    distance_range: (f32, f32),
}

impl OrbitCamera {
    const PITCH_LIMIT: f32 = 1.5;
    const DRAG_SPEED: f32 = 2.0;
    const KEY_SPEED: f32 = 0.02;

    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            target: Point3::origin(),
            distance,
            yaw,
            pitch: pitch.clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT),
            zoom_step: 1.0,
            distance_range: (1.0, 100.0),
        }
    }

    /// Sets how far one scroll notch moves, and the allowed distance range.
    pub fn with_zoom(mut self, step: f32, min: f32, max: f32) -> Self {
        self.zoom_step = step;
        self.distance_range = (min, max);
        self.distance = self.distance.clamp(min, max);
        self
    }

    /// Turns the camera around the target.
    pub fn orbit(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
    }

    /// Moves toward (positive `notches`) or away from the target.
    pub fn zoom(&mut self, notches: f32) {
        let (min, max) = self.distance_range;
        self.distance = (self.distance - notches * self.zoom_step).clamp(min, max);
    }

    /// Reads mouse drag, arrow keys and the scroll wheel.
    pub fn update(&mut self) {
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            self.orbit(-delta.x * Self::DRAG_SPEED, -delta.y * Self::DRAG_SPEED);
        }

        let axis = |positive: KeyCode, negative: KeyCode| {
            (is_key_down(positive) as i8 - is_key_down(negative) as i8) as f32 * Self::KEY_SPEED
        };
        self.orbit(axis(KeyCode::Left, KeyCode::Right), axis(KeyCode::Up, KeyCode::Down));

        let scroll = mouse_wheel().1;
        if scroll != 0.0 {
            self.zoom(scroll.signum());
        }
    }

    /// World position of the eye.
    pub fn position(&self) -> Point3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let direction = Vector3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw);
        self.target + direction * self.distance
    }

    pub fn to_camera3d(&self) -> Camera3D {
        let eye = self.position();
        Camera3D {
            position: vec3(eye.x, eye.y, eye.z),
            up: Vec3::Y,
            target: vec3(self.target.x, self.target.y, self.target.z),
            ..Default::default()
        }
    }
}
