//! Wavefront OBJ/MTL output.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use guccs_ccs::Mesh;
use tracing::debug;

use crate::MeshSink;

/// Name of the single material every exported mesh uses.
pub const MATERIAL_NAME: &str = "texture";

/// Writes `<dir>/<name>.obj` and `<dir>/<name>.mtl`.
pub struct ObjSink {
    dir: PathBuf,
}

impl ObjSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl MeshSink for ObjSink {
    fn write_mesh(
        &mut self,
        name: &str,
        texture: &str,
        mesh: &Mesh,
    ) -> anyhow::Result<Vec<PathBuf>> {
        let obj_path = self.dir.join(format!("{name}.obj"));
        let mtl_path = self.dir.join(format!("{name}.mtl"));
        debug!(
            "Writing mesh {name} ({} vertices, {} triangles) to {}",
            mesh.vertex_count(),
            mesh.triangles.len(),
            obj_path.display()
        );

        let mtl_file_name = format!("{name}.mtl");
        write_file(&obj_path, |w| write_obj(w, name, &mtl_file_name, mesh))?;
        write_file(&mtl_path, |w| write_mtl(w, name, texture))?;

        Ok(vec![obj_path, mtl_path])
    }
}

fn write_file(
    path: &Path,
    f: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    f(&mut w)
        .and_then(|_| w.flush())
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Writes the geometry. Position and texture coordinate indices are the same for every corner.
pub fn write_obj<W: Write>(w: &mut W, name: &str, mtllib: &str, mesh: &Mesh) -> std::io::Result<()> {
    writeln!(w, "# guccs")?;
    writeln!(w, "# mesh: {name}")?;
    writeln!(w)?;
    writeln!(w, "mtllib {mtllib}")?;
    writeln!(w, "g {name}")?;
    writeln!(w, "usemtl {MATERIAL_NAME}")?;

    for [x, y, z] in &mesh.positions {
        writeln!(w, "v {x:.6} {y:.6} {z:.6}")?;
    }
    for [u, v] in &mesh.coords {
        writeln!(w, "vt {u:.6} {v:.6}")?;
    }
    for triangle in &mesh.triangles {
        let [a, b, c] = triangle.indices().map(|i| i + 1);
        writeln!(w, "f {a}/{a} {b}/{b} {c}/{c}")?;
    }
    Ok(())
}

pub fn write_mtl<W: Write>(w: &mut W, name: &str, texture: &str) -> std::io::Result<()> {
    writeln!(w, "# guccs")?;
    writeln!(w, "# mesh: {name}")?;
    writeln!(w)?;
    writeln!(w, "newmtl {MATERIAL_NAME}")?;
    writeln!(w, "map_Kd {texture}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use guccs_ccs::Triangle;

    use super::*;

    fn quad() -> Mesh {
        Mesh {
            id: 0,
            material_id: 1,
            some_id: 0,
            index_count: 0,
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 1.0, -0.5],
            ],
            coords: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
            markers: vec![2, 0, 0, 0],
            zero_markers: 3,
            triangles: vec![Triangle([1, 0, 2]), Triangle([1, 2, 3])],
        }
    }

    #[test]
    fn obj_lists_vertices_coords_and_one_based_faces() {
        let mut out = Vec::new();
        write_obj(&mut out, "box", "box.mtl", &quad()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines.contains(&"mtllib box.mtl"));
        assert!(lines.contains(&"g box"));
        assert!(lines.contains(&"usemtl texture"));
        assert_eq!(lines.iter().filter(|l| l.starts_with("v ")).count(), 4);
        assert_eq!(lines.iter().filter(|l| l.starts_with("vt ")).count(), 4);
        assert!(lines.contains(&"v 1.000000 1.000000 -0.500000"));
        assert!(lines.contains(&"vt 0.000000 1.000000"));

        let faces: Vec<&str> = lines.into_iter().filter(|l| l.starts_with("f ")).collect();
        assert_eq!(faces, vec!["f 2/2 1/1 3/3", "f 2/2 3/3 4/4"]);
    }

    #[test]
    fn mtl_points_at_texture() {
        let mut out = Vec::new();
        write_mtl(&mut out, "box", "crate.png").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("newmtl texture\n"));
        assert!(text.ends_with("map_Kd crate.png\n"));
    }

    #[test]
    fn sink_writes_both_files() {
        let dir = std::env::temp_dir().join(format!("guccs-obj-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let written = ObjSink::new(&dir)
            .write_mesh("box", "crate.png", &quad())
            .unwrap();
        assert_eq!(written, vec![dir.join("box.obj"), dir.join("box.mtl")]);
        let obj = std::fs::read_to_string(dir.join("box.obj")).unwrap();
        assert!(obj.contains("f 2/2 3/3 4/4"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
