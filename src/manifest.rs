use std::borrow::Cow;

use guccs_ccs::{Container, ScanEnd};
use serde::Serialize;

/// JSON description of a decoded container.
#[derive(Serialize, Debug)]
pub struct Manifest<'a> {
    pub name: &'a str,
    pub source: &'a str,
    pub files: &'a [String],
    pub objects: &'a [String],
    pub images: Vec<ImageEntry<'a>>,
    pub meshes: Vec<MeshEntry<'a>>,
    pub scan: ScanSummary,
}

#[derive(Serialize, Debug)]
pub struct ImageEntry<'a> {
    pub name: Cow<'a, str>,
    pub width: u32,
    pub height: u32,
    pub format: u8,
    pub palettes: Vec<PaletteEntry<'a>>,
}

#[derive(Serialize, Debug)]
pub struct PaletteEntry<'a> {
    pub name: Cow<'a, str>,
    pub colors: usize,
}

#[derive(Serialize, Debug)]
pub struct MeshEntry<'a> {
    pub name: Cow<'a, str>,
    pub material: Option<&'a str>,
    pub texture: Option<&'a str>,
    pub vertices: usize,
    pub triangles: usize,
    pub declared_indices: u32,
}

#[derive(Serialize, Debug)]
pub struct ScanSummary {
    pub complete: bool,
    pub end: String,
    pub dropped: Vec<DroppedChunk>,
    pub unresolved_ids: usize,
}

#[derive(Serialize, Debug)]
pub struct DroppedChunk {
    pub offset: usize,
    pub tag: String,
    pub error: String,
}

impl<'a> Manifest<'a> {
    pub fn new(container: &'a Container, source: &'a str) -> Self {
        let images = container
            .images
            .iter()
            .map(|image| ImageEntry {
                name: container.label(image.id),
                width: image.width,
                height: image.height,
                format: image.format as u8,
                palettes: image
                    .palettes
                    .iter()
                    .map(|p| PaletteEntry {
                        name: container.label(p.id),
                        colors: p.len(),
                    })
                    .collect(),
            })
            .collect();

        let meshes = container
            .meshes
            .iter()
            .map(|mesh| MeshEntry {
                name: container.label(mesh.id),
                material: container.object_name(mesh.material_id),
                texture: container.texture_name(mesh),
                vertices: mesh.vertex_count(),
                triangles: mesh.triangles.len(),
                declared_indices: mesh.index_count,
            })
            .collect();

        let report = &container.report;
        let end = match &report.end {
            ScanEnd::Terminator(tag) => format!("terminator {tag:#010x}"),
            ScanEnd::EndOfInput => "end of input".to_string(),
            ScanEnd::TruncatedChunk { offset, tag, size } => {
                format!("{tag} chunk at {offset:#x} needs {size} bytes")
            }
            ScanEnd::PaletteFailure { offset, error } => {
                format!("palette at {offset:#x}: {error}")
            }
        };

        Self {
            name: &container.name,
            source,
            files: &container.file_names,
            objects: &container.object_names,
            images,
            meshes,
            scan: ScanSummary {
                complete: report.end.is_complete(),
                end,
                dropped: report
                    .issues
                    .iter()
                    .map(|issue| DroppedChunk {
                        offset: issue.offset,
                        tag: issue.tag.to_string(),
                        error: issue.error.to_string(),
                    })
                    .collect(),
                unresolved_ids: report.unresolved.len(),
            },
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
