//! Mesh loading
//!
//! Lines are processed in file order, so the floating point summation
//! order of vertex normals is fixed by the file.

use std::fs;
use std::path::Path;

use crate::rasterizer::Vec3;

use super::parse::{classify, parse_face_line, parse_vertex_line, FaceRecord, LineKind};
use super::{Aabb, Mesh, MeshError, MeshFace};

/// Face color used when the file does not give one
pub const DEFAULT_FACE_COLOR: Vec3 = Vec3::ONE;

/// Accumulates mesh state while lines are read
struct MeshBuilder {
    mesh: Mesh,
    sum: Vec3,
    default_color: Vec3,
}

impl MeshBuilder {
    fn new(default_color: Vec3) -> Self {
        Self {
            mesh: Mesh::default(),
            sum: Vec3::ZERO,
            default_color,
        }
    }

    fn issue(&mut self, err: MeshError) {
        log::warn!("{}", err);
        self.mesh.issues.push(err);
    }

    fn push_vertex(&mut self, line: usize, text: &str) {
        let record = parse_vertex_line(text);
        for source in record.errors {
            self.issue(MeshError::Parse { line, source });
        }

        let p = record.position;
        self.sum += p;
        self.mesh.bounds.expand(p);
        self.mesh.positions.push(p);
        self.mesh.normals.push(Vec3::ZERO);
    }

    fn push_face(&mut self, line: usize, text: &str) {
        let record = match parse_face_line(text) {
            Ok(r) => r,
            Err(source) => {
                self.issue(MeshError::Parse { line, source });
                return;
            }
        };
        if let Err(e) = self.add_face(line, record) {
            self.issue(e);
        }
    }

    fn add_face(&mut self, line: usize, record: FaceRecord) -> Result<(), MeshError> {
        let vertex_count = self.mesh.positions.len();
        let mut indices = [0usize; 3];
        for (slot, &index) in record.indices.iter().enumerate() {
            // file indices are 1-based
            if index == 0 || index > vertex_count {
                return Err(MeshError::IndexOutOfRange { line, index, vertex_count });
            }
            indices[slot] = index - 1;
        }

        let [a, b, c] = indices.map(|i| self.mesh.positions[i]);
        let normal = (b - a)
            .cross(c - a)
            .try_normalize()
            .ok_or(MeshError::DegenerateFace { line })?;

        for &i in &indices {
            self.mesh.normals[i] += normal;
        }

        self.mesh.faces.push(MeshFace {
            indices,
            normal,
            color: record.color.unwrap_or(self.default_color),
        });
        Ok(())
    }

    fn finish(self) -> Mesh {
        let MeshBuilder { mut mesh, sum, .. } = self;
        let count = mesh.positions.len();

        if count == 0 {
            log::warn!("mesh has no vertices");
            mesh.bounds = Aabb {
                min: Vec3::ZERO,
                max: Vec3::ZERO,
            };
            return mesh;
        }

        mesh.centroid = sum.scale(1.0 / count as f32);

        let size = mesh.bounds.size();
        mesh.max_extent = size.x.max(size.y);

        // Express X/Y bounds as if the centroid sat at the origin.
        // Z keeps model space: framing only needs the view-plane extents.
        mesh.bounds.min.x -= mesh.centroid.x;
        mesh.bounds.max.x -= mesh.centroid.x;
        mesh.bounds.min.y -= mesh.centroid.y;
        mesh.bounds.max.y -= mesh.centroid.y;

        mesh
    }
}

/// Parse mesh text that is already in memory.
pub fn load_mesh_from_str(text: &str, default_color: Vec3) -> Mesh {
    let mut builder = MeshBuilder::new(default_color);

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let raw = raw.trim_end_matches('\r');
        match classify(raw) {
            LineKind::Vertex => builder.push_vertex(line, raw),
            LineKind::Face => builder.push_face(line, raw),
            LineKind::Comment | LineKind::Other => {}
        }
    }

    builder.finish()
}

/// Load a mesh file
pub fn load_mesh<P: AsRef<Path>>(path: P, default_color: Vec3) -> Result<Mesh, MeshError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| MeshError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let mesh = load_mesh_from_str(&contents, default_color);
    log::info!(
        "Loaded mesh {}: {} vertices, {} faces, {} issues",
        path.display(),
        mesh.vertex_count(),
        mesh.face_count(),
        mesh.issues.len()
    );
    Ok(mesh)
}
