//! tri-raster: offline software triangle rasterizer
//!
//! Pipeline, leaves first:
//! - `mesh`: ASCII model loading, face/vertex normals, flattening to triangles
//! - `rasterizer`: shading, orthographic projection, Z-buffered scan conversion
//! - `output`: TGA/PNG serialization of the framebuffer
//! - `config`: RON render configuration

pub mod config;
pub mod mesh;
pub mod output;
pub mod rasterizer;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
