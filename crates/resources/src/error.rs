//! Error types for resource loading.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResourceError {
    /// tobj rejected the file.
    #[error("Failed to load OBJ file '{path}': {source}")]
    ObjLoad {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    /// The file parsed but produced no triangles.
    #[error("OBJ file '{0}' contains no triangles")]
    EmptyMesh(PathBuf),

    /// Indices exceed what a 32-bit index buffer can address.
    #[error("Mesh '{0}' has too many vertices for 32-bit indices")]
    TooManyVertices(PathBuf),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

pub type ResourceResult<T> = Result<T, ResourceError>;
