use binrw::BinRead;
use tracing::{debug, trace};

use crate::{
    cursor::{CursorBuffer, Record},
    error::{Error, Result},
    renumber,
    strip::{self, Triangle},
};

/// Larger vertex counts mean the header was read from the wrong place.
pub const MAX_VERTICES: u32 = 100_000;

/// Header value marking a mesh record without geometry.
pub const NO_GEOMETRY: u32 = 0x8000_0000;

#[derive(BinRead, Debug)]
struct MeshHeader {
    #[br(map = renumber)]
    id: u32,
    #[br(pad_before = 12)]
    index_count: u32,
    #[br(assert(flags != NO_GEOMETRY, "mesh has no geometry ({:#x})", flags))]
    flags: u32,
    #[br(pad_before = 4, map = renumber)]
    some_id: u32,
    #[br(map = renumber)]
    material_id: u32,
    #[br(assert(
        vertex_count != 0 && vertex_count <= MAX_VERTICES,
        "vertex count {} out of range",
        vertex_count
    ))]
    vertex_count: u32,
}

impl Record for MeshHeader {
    const SIZE: usize = 40;
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub id: u32,
    /// Material object, an index into the object name table.
    pub material_id: u32,
    /// Unidentified id stored next to the material.
    pub some_id: u32,
    /// Index count as declared by the header. Not checked against the geometry.
    pub index_count: u32,
    pub positions: Vec<[f32; 3]>,
    pub coords: Vec<[f32; 2]>,
    /// Per-vertex strip markers; 0 continues a strip, 1 or 2 opens one.
    pub markers: Vec<u8>,
    /// Number of zero markers seen while decoding.
    pub zero_markers: u32,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Reads a mesh chunk body and resolves its triangle strips.
    pub fn read(cursor: &mut CursorBuffer) -> Result<Self> {
        let header: MeshHeader = cursor.read_record()?;
        let count = header.vertex_count as usize;
        debug!(
            id = header.id,
            material_id = header.material_id,
            index_count = header.index_count,
            "mesh with {count} vertices"
        );

        let positions = (0..count)
            .map(|_| cursor.read_array::<6>().map(decode_position))
            .collect::<Result<Vec<_>>>()?;
        cursor.reserved((count * 6) % 4)?;

        let mut markers = Vec::with_capacity(count);
        for _ in 0..count {
            cursor.reserved(3)?;
            markers.push(cursor.read_u8()?);
        }
        let zero_markers = markers.iter().filter(|&&m| m == 0).count() as u32;

        // Normals or vertex colours
        cursor.reserved(count * 4)?;

        let coords = (0..count)
            .map(|_| cursor.read_array::<4>().map(decode_coord))
            .collect::<Result<Vec<_>>>()?;

        let marker_offset = cursor.position();
        let triangles = strip::resolve(&markers).map_err(|e| match e {
            Error::MalformedChunk { reason, .. } => Error::malformed(marker_offset, reason),
            other => other,
        })?;
        trace!(
            "resolved {} triangles ({zero_markers} zero markers)",
            triangles.len()
        );

        Ok(Self {
            id: header.id,
            material_id: header.material_id,
            some_id: header.some_id,
            index_count: header.index_count,
            positions,
            coords,
            markers,
            zero_markers,
            triangles,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Decodes one axis: an unsigned fraction byte followed by a signed integer byte.
pub fn fixed_point(fraction: u8, integer: u8) -> f32 {
    fraction as f32 / 256.0 + integer as i8 as f32
}

fn decode_position(b: [u8; 6]) -> [f32; 3] {
    [
        fixed_point(b[0], b[1]),
        fixed_point(b[2], b[3]),
        fixed_point(b[4], b[5]),
    ]
}

fn decode_coord(b: [u8; 4]) -> [f32; 2] {
    [fixed_point(b[0], b[1]), fixed_point(b[2], b[3])]
}
