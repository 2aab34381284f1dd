//! Core types for the rasterizer

use serde::{Serialize, Deserialize};

use super::math::{project, Vec3};

/// A render-ready vertex: position plus the color carried to the rasterizer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub color: Vec3,
    /// Normal used by the shader (face normal, or smoothed vertex normal)
    pub normal: Vec3,
}

impl Vertex {
    pub fn new(position: Vec3, color: Vec3, normal: Vec3) -> Self {
        Self { position, color, normal }
    }
}

/// Screen-space axis-aligned bounding box
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl BoundingBox {
    pub fn of(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            min_x: a.x.min(b.x).min(c.x),
            max_x: a.x.max(b.x).max(c.x),
            min_y: a.y.min(b.y).min(c.y),
            max_y: a.y.max(b.y).max(c.y),
        }
    }
}

/// Self-contained triangle, independent of the mesh it came from
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Triangle {
    pub v1: Vertex,
    pub v2: Vertex,
    pub v3: Vertex,
    pub normal: Vec3,
    /// Only meaningful after projection
    pub bounds: BoundingBox,
}

impl Triangle {
    pub fn new(v1: Vertex, v2: Vertex, v3: Vertex, normal: Vec3) -> Self {
        Self {
            v1,
            v2,
            v3,
            normal,
            bounds: BoundingBox::default(),
        }
    }

    /// Copy with screen-space positions and a screen-space bounding box
    pub fn projected(&self, viewport: &Viewport) -> Triangle {
        let mut t = *self;
        t.v1.position = project(self.v1.position, viewport);
        t.v2.position = project(self.v2.position, viewport);
        t.v3.position = project(self.v3.position, viewport);
        t.bounds = BoundingBox::of(t.v1.position, t.v2.position, t.v3.position);
        t
    }
}

/// Visible window of world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            x_min: -1.0,
            x_max: 1.0,
            y_min: -1.0,
            y_max: 1.0,
        }
    }
}

impl WorldBounds {
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }
}

/// World window plus output size; fixed for one render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub world: WorldBounds,
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(world: WorldBounds, width: usize, height: usize) -> Self {
        Self { world, width, height }
    }
}

/// Shading mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShadingMode {
    None,     // Raw face colors
    #[default]
    Flat,     // One normal per face
    Smooth,   // Accumulated vertex normals, colors interpolated across the face
}

/// The single directional light of a render
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Light {
    /// Direction towards the light, normalized before use
    pub direction: Vec3,
    pub color: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, 0.0, 1.0),
            color: Vec3::ONE,
        }
    }
}

/// Rasterizer settings
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RasterSettings {
    pub light: Light,
    pub shading: ShadingMode,
    /// Split the framebuffer into row bands rendered on the rayon pool
    pub parallel: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projected_bounds() {
        let white = Vec3::ONE;
        let n = Vec3::new(0.0, 0.0, 1.0);
        let t = Triangle::new(
            Vertex::new(Vec3::new(-0.5, 0.0, 0.0), white, n),
            Vertex::new(Vec3::new(0.0, 0.5, -1.0), white, n),
            Vertex::new(Vec3::new(0.5, 0.0, 0.0), white, n),
            n,
        );
        let viewport = Viewport::new(WorldBounds::default(), 400, 400);
        let p = t.projected(&viewport);

        assert_eq!(p.v1.position, Vec3::new(100.0, 200.0, 0.0));
        assert_eq!(p.v2.position, Vec3::new(200.0, 300.0, -1.0));
        assert_eq!(p.v3.position, Vec3::new(300.0, 200.0, 0.0));
        assert_eq!(
            p.bounds,
            BoundingBox { min_x: 100.0, max_x: 300.0, min_y: 200.0, max_y: 300.0 }
        );
        // colors and normals travel unchanged
        assert_eq!(p.v2.color, white);
        assert_eq!(p.normal, n);
    }
}
