//! Flatten an indexed mesh into camera-ready triangles

use serde::{Serialize, Deserialize};

use crate::rasterizer::{ShadingMode, Triangle, Vec3, Vertex, WorldBounds};

use super::Mesh;

/// Where the model lands in the world window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Framing {
    pub x_offset: f32,
    pub y_offset: f32,
    pub scale: f32,
}

impl Default for Framing {
    fn default() -> Self {
        Self {
            x_offset: 0.0,
            y_offset: 0.0,
            scale: 1.0,
        }
    }
}

impl Framing {
    /// Scale the model so its larger X/Y extent covers `fill` of the
    /// smaller side of the world window, centered in the window.
    pub fn fit(mesh: &Mesh, world: &WorldBounds, fill: f32) -> Self {
        let span = world.width().abs().min(world.height().abs());
        let scale = if mesh.max_extent > 0.0 && mesh.max_extent.is_finite() {
            fill * span / mesh.max_extent
        } else {
            1.0
        };
        Self {
            x_offset: (world.x_min + world.x_max) * 0.5,
            y_offset: (world.y_min + world.y_max) * 0.5,
            scale,
        }
    }

    /// Recenter on X/Y, scale X/Y, then offset. Z is never touched.
    pub fn apply(&self, v: Vec3, centroid: Vec3) -> Vec3 {
        Vec3 {
            x: (v.x - centroid.x) * self.scale + self.x_offset,
            y: (v.y - centroid.y) * self.scale + self.y_offset,
            z: v.z,
        }
    }
}

impl Mesh {
    /// Build one self-contained render triangle per face.
    ///
    /// Vertices carry the face color. With `ShadingMode::Smooth` each vertex
    /// normal is the normalized accumulated normal; otherwise the face normal.
    pub fn render_triangles(&self, centroid: Vec3, framing: &Framing, shading: ShadingMode) -> Vec<Triangle> {
        self.faces
            .iter()
            .map(|face| {
                let [v1, v2, v3] = face.indices.map(|i| {
                    let normal = match shading {
                        ShadingMode::Smooth => self.vertex_normal(i).unwrap_or(face.normal),
                        ShadingMode::Flat | ShadingMode::None => face.normal,
                    };
                    Vertex::new(framing.apply(self.positions[i], centroid), face.color, normal)
                });
                Triangle::new(v1, v2, v3, face.normal)
            })
            .collect()
    }
}
