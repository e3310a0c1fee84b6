use std::fmt::Write;

use guccs_ccs::Container;

/// Writes a human-readable summary of a decoded container.
pub fn render(out: &mut impl Write, container: &Container, source: &str) -> std::fmt::Result {
    writeln!(out, "{} ({source})", container.name)?;

    writeln!(out, "\n--- FILES ---")?;
    for (i, name) in container.file_names.iter().enumerate() {
        writeln!(out, "{i}. {name}")?;
    }
    writeln!(out, "\n--- OBJECTS ---")?;
    for (i, name) in container.object_names.iter().enumerate() {
        writeln!(out, "{i}. {name}")?;
    }

    writeln!(out, "\n--- MESHES ---")?;
    for mesh in &container.meshes {
        writeln!(out, "• {}", container.label(mesh.id))?;
        writeln!(
            out,
            "    • {} ({} vertices, {} triangles)",
            container.label(mesh.material_id),
            mesh.vertex_count(),
            mesh.triangles.len()
        )?;
    }

    writeln!(out, "\n--- IMAGES ---")?;
    for image in &container.images {
        writeln!(
            out,
            "• {} ({}x{})",
            container.label(image.id),
            image.width,
            image.height
        )?;
        for palette in &image.palettes {
            writeln!(
                out,
                "    • {} palette with num colors {}",
                container.label(palette.id),
                palette.len()
            )?;
        }
    }

    writeln!(
        out,
        "\nFILES: {} OBJECTS: {}",
        container.file_names.len(),
        container.object_names.len()
    )
}
