//! Asset loading for the frame pipeline.
//!
//! Currently a single concern: Wavefront OBJ meshes flattened into one vertex and
//! index buffer.

mod error;
pub mod mesh;

pub use error::{ResourceError, ResourceResult};
pub use mesh::{MeshData, load_obj};
