use std::path::Path;

use guccs_ccs::Container;
use guccs_model::{MeshSink, ObjSink};
use guccs_texture::{compose, ImageSink, PngSink};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportStats {
    pub images: usize,
    pub meshes: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Writes one PNG per image and one OBJ/MTL pair per mesh into `dir`.
///
/// Individual assets that fail are logged and counted; the rest are still written.
pub fn export_all(container: &Container, dir: &Path, palette: usize) -> ExportStats {
    let mut stats = ExportStats::default();
    let mut images = PngSink::new(dir);
    let mut meshes = ObjSink::new(dir);

    for mesh in &container.meshes {
        let name = container.label(mesh.id);
        let texture = format!("{}.png", container.label(mesh.material_id.saturating_add(1)));
        match meshes.write_mesh(&name, &texture, mesh) {
            Ok(_) => stats.meshes += 1,
            Err(e) => {
                error!("Failed to export mesh {name}: {e:#}");
                stats.failed += 1;
            }
        }
    }

    for image in &container.images {
        let name = container.label(image.id);
        let index = if image.palettes.is_empty() {
            warn!("Image {name} has no palette, skipping");
            stats.skipped += 1;
            continue;
        } else if palette < image.palettes.len() {
            palette
        } else {
            warn!(
                "Image {name} has {} palettes, using palette 0 instead of {palette}",
                image.palettes.len()
            );
            0
        };

        let result = compose(image, index).and_then(|raster| images.write_image(&name, &raster));
        match result {
            Ok(path) => {
                debug!("Wrote {}", path.display());
                stats.images += 1;
            }
            Err(e) => {
                error!("Failed to export image {name}: {e:#}");
                stats.failed += 1;
            }
        }
    }

    stats
}
