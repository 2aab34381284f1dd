//! Mesh module - ASCII model ingestion and normal computation
//!
//! - Index-addressed buffers (positions, normal accumulators, faces)
//! - Face normals computed once at load time
//! - Flattening into self-contained render triangles

mod parse;
mod loader;
mod normalize;

pub use parse::*;
pub use loader::*;
pub use normalize::*;

use std::path::PathBuf;

use crate::rasterizer::Vec3;

/// Errors raised while reading a mesh.
///
/// Only `FileOpen` is fatal; the others are collected in `Mesh::issues`.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("could not open mesh file {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: RecordError,
    },

    #[error("line {line}: vertex index {index} out of range (1..={vertex_count})")]
    IndexOutOfRange {
        line: usize,
        index: usize,
        vertex_count: usize,
    },

    #[error("line {line}: degenerate face, zero-length normal")]
    DegenerateFace { line: usize },
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    /// Empty box: any expansion replaces both corners
    fn default() -> Self {
        Self {
            min: Vec3::new(f32::MAX, f32::MAX, f32::MAX),
            max: Vec3::new(f32::MIN, f32::MIN, f32::MIN),
        }
    }
}

impl Aabb {
    /// Expand bounds to include a point
    pub fn expand(&mut self, point: Vec3) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Triangle face (0-based indices into the mesh buffers)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshFace {
    pub indices: [usize; 3],
    /// Unit normal from the winding v1 -> v2 -> v3
    pub normal: Vec3,
    pub color: Vec3,
}

/// A loaded triangle mesh. Immutable once built.
#[derive(Debug, Default)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    /// Unnormalized sums of the face normals touching each vertex
    pub normals: Vec<Vec3>,
    pub faces: Vec<MeshFace>,
    /// Model bounds; X and Y are relative to the centroid, Z is not
    pub bounds: Aabb,
    /// Larger of the X and Y ranges
    pub max_extent: f32,
    pub centroid: Vec3,
    /// Recoverable problems found while parsing
    pub issues: Vec<MeshError>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Normalized accumulated normal of a vertex, if it has one
    pub fn vertex_normal(&self, index: usize) -> Option<Vec3> {
        self.normals.get(index).and_then(|n| n.try_normalize())
    }
}
