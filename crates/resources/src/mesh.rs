//! Wavefront OBJ loading into a single indexed mesh.
//!
//! Every model in the file is merged into one vertex/index pair so the frame
//! pipeline can draw it with a single indexed call.

use std::path::Path;

use swapframe_rhi::vertex::MeshVertex;
use tracing::{debug, info, warn};

use crate::error::{ResourceError, ResourceResult};

/// CPU-side mesh ready for upload.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex data as raw bytes for a vertex buffer.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Loads and merges every model in an OBJ file.
///
/// Missing vertex colors default to white. Texture coordinates are flipped
/// vertically since OBJ puts the origin at the bottom left.
pub fn load_obj(path: impl AsRef<Path>) -> ResourceResult<MeshData> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ResourceError::FileNotFound(path.to_path_buf()));
    }

    let (models, materials) =
        tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|source| ResourceError::ObjLoad {
            path: path.to_path_buf(),
            source,
        })?;

    if let Err(e) = materials {
        // Materials only carry textures, which are not sampled
        debug!("Ignoring materials for {}: {}", path.display(), e);
    }

    let mut mesh = MeshData::default();
    for model in &models {
        append_model(&mut mesh, &model.mesh).ok_or_else(|| {
            ResourceError::TooManyVertices(path.to_path_buf())
        })?;
    }

    if mesh.indices.is_empty() {
        return Err(ResourceError::EmptyMesh(path.to_path_buf()));
    }

    info!(
        "Loaded {} ({} model(s), {} vertices, {} triangles)",
        path.display(),
        models.len(),
        mesh.vertices.len(),
        mesh.triangle_count()
    );

    Ok(mesh)
}

/// Appends one tobj mesh, rebasing its indices. `None` on u32 overflow.
fn append_model(out: &mut MeshData, mesh: &tobj::Mesh) -> Option<()> {
    let base = u32::try_from(out.vertices.len()).ok()?;
    let vertex_count = mesh.positions.len() / 3;

    let has_colors = mesh.vertex_color.len() == mesh.positions.len();
    let has_tex_coords = mesh.texcoords.len() / 2 == vertex_count;
    if !mesh.texcoords.is_empty() && !has_tex_coords {
        warn!("Texture coordinate count does not match positions, ignoring them");
    }

    out.vertices.reserve(vertex_count);
    for i in 0..vertex_count {
        let position = glam::Vec3::from_slice(&mesh.positions[3 * i..3 * i + 3]);
        let color = if has_colors {
            glam::Vec3::from_slice(&mesh.vertex_color[3 * i..3 * i + 3])
        } else {
            glam::Vec3::ONE
        };
        let tex_coord = if has_tex_coords {
            glam::Vec2::new(mesh.texcoords[2 * i], 1.0 - mesh.texcoords[2 * i + 1])
        } else {
            glam::Vec2::ZERO
        };
        out.vertices.push(MeshVertex::new(position, color, tex_coord));
    }

    out.indices.reserve(mesh.indices.len());
    for &index in &mesh.indices {
        out.indices.push(base.checked_add(index)?);
    }

    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> tobj::Mesh {
        tobj::Mesh {
            positions: vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                1.0, 1.0, 0.0, //
                0.0, 1.0, 0.0,
            ],
            texcoords: vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
            indices: vec![0, 1, 2, 2, 3, 0],
            ..Default::default()
        }
    }

    #[test]
    fn test_append_rebases_indices() {
        let mut mesh = MeshData::default();
        append_model(&mut mesh, &quad()).unwrap();
        append_model(&mut mesh, &quad()).unwrap();

        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.index_count(), 12);
        assert_eq!(&mesh.indices[6..], &[4, 5, 6, 6, 7, 4]);
    }

    #[test]
    fn test_missing_color_defaults_to_white() {
        let mut mesh = MeshData::default();
        append_model(&mut mesh, &quad()).unwrap();
        assert!(mesh.vertices.iter().all(|v| v.color == glam::Vec3::ONE));
    }

    #[test]
    fn test_tex_coords_are_flipped() {
        let mut mesh = MeshData::default();
        append_model(&mut mesh, &quad()).unwrap();
        assert_eq!(mesh.vertices[0].tex_coord, glam::Vec2::new(0.0, 1.0));
        assert_eq!(mesh.vertices[2].tex_coord, glam::Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_byte_views() {
        let mut mesh = MeshData::default();
        append_model(&mut mesh, &quad()).unwrap();
        assert_eq!(mesh.vertex_bytes().len(), 4 * std::mem::size_of::<MeshVertex>());
        assert_eq!(mesh.index_bytes().len(), 6 * 4);
    }
}
