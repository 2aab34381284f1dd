//! Software triangle rasterizer
//!
//! Features:
//! - Orthographic projection of a fixed world window onto the canvas
//! - Barycentric coverage test that excludes edges and vertices
//! - Affine (screen-space) color and depth interpolation
//! - Z-buffer where larger Z is closer to the camera
//! - Per-vertex diffuse lighting from one directional light

mod math;
mod types;
mod shading;
mod render;

pub use math::*;
pub use types::*;
pub use shading::*;
pub use render::*;

/// Default canvas dimensions
pub const WIDTH: usize = 400;
pub const HEIGHT: usize = 400;
