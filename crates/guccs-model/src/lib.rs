pub mod obj;

use std::path::PathBuf;

use guccs_ccs::Mesh;

pub use obj::ObjSink;

/// Destination for decoded meshes.
pub trait MeshSink {
    /// Stores `mesh` as `name`, with its material pointing at the `texture` image.
    ///
    /// Returns the files that were written.
    fn write_mesh(&mut self, name: &str, texture: &str, mesh: &Mesh)
        -> anyhow::Result<Vec<PathBuf>>;
}
