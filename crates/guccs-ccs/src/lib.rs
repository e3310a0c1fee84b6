//! Decoder for CCS asset containers.
//!
//! A container starts with a fixed header and two name tables, followed by a data section of
//! tagged chunks. Palette, image and mesh chunks are decoded; everything else is skipped by its
//! declared size.

pub mod chunk;
pub mod container;
pub mod cursor;
pub mod error;
pub mod image;
pub mod mesh;
pub mod palette;
pub mod strip;

pub use chunk::ChunkTag;
pub use container::{Container, ScanEnd, ScanReport};
pub use cursor::CursorBuffer;
pub use error::{Error, Result};
pub use image::{Image, PixelFormat};
pub use mesh::Mesh;
pub use palette::{Color, Palette};
pub use strip::Triangle;

/// First four bytes of every container, little-endian.
pub const CCS_MAGIC: u32 = 0xcccc_0001;

/// Converts a 1-based id from the file to a 0-based index. 0 stays 0.
pub fn renumber(id: u32) -> u32 {
    id.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renumber_is_one_based() {
        assert_eq!(renumber(0), 0);
        assert_eq!(renumber(1), 0);
        assert_eq!(renumber(2), 1);
        assert_eq!(renumber(u32::MAX), u32::MAX - 1);
    }
}
