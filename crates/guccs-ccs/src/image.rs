use binrw::BinRead;
use tracing::debug;

use crate::{
    cursor::{CursorBuffer, Record},
    error::{Error, Result},
    palette::Palette,
    renumber,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PixelFormat {
    /// One palette index per byte
    Indexed8 = 19,
    /// Two 4-bit palette indices per byte, low nibble first
    Indexed4 = 20,
}

impl PixelFormat {
    /// Number of bytes the index plane occupies for `pixels` pixels.
    pub fn plane_size(&self, pixels: usize) -> usize {
        match self {
            PixelFormat::Indexed8 => pixels,
            PixelFormat::Indexed4 => pixels.div_ceil(2),
        }
    }
}

impl TryFrom<u8> for PixelFormat {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            19 => Ok(Self::Indexed8),
            20 => Ok(Self::Indexed4),
            tag => Err(Error::UnsupportedFormat { tag }),
        }
    }
}

#[derive(BinRead, Debug)]
struct ImageHeader {
    #[br(map = renumber)]
    id: u32,
    #[br(map = renumber)]
    palette_id: u32,
    #[br(pad_before = 5)]
    format: u8,
    #[br(pad_before = 2)]
    width_exponent: u8,
    #[br(pad_after = 10)]
    height_exponent: u8,
}

impl Record for ImageHeader {
    const SIZE: usize = 28;
}

#[derive(Debug, Clone)]
pub struct Image {
    pub id: u32,
    /// Historical single-palette reference. The attached `palettes` are what composition uses.
    pub palette_id: u32,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// One palette index per pixel, bottom row first.
    pub indices: Vec<u8>,
    pub palettes: Vec<Palette>,
}

impl Image {
    /// Reads an image chunk body. `size` is the chunk's declared length in bytes.
    ///
    /// The returned image has no palettes; the scanner attaches the palette group that preceded it.
    pub fn read(cursor: &mut CursorBuffer, size: usize) -> Result<Self> {
        let offset = cursor.position();
        let header: ImageHeader = cursor.read_record()?;
        debug!(
            id = header.id,
            palette_id = header.palette_id,
            format = header.format,
            "image header: 2^{} x 2^{}",
            header.width_exponent,
            header.height_exponent
        );

        let format = PixelFormat::try_from(header.format)?;
        let width = dimension(header.width_exponent, offset)?;
        let height = dimension(header.height_exponent, offset)?;

        let pixels = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| Error::malformed(offset, format!("{width}x{height} image overflows")))?;
        let plane_size = format.plane_size(pixels);
        let available = size.saturating_sub(ImageHeader::SIZE);
        if plane_size > available {
            return Err(Error::malformed(
                offset,
                format!(
                    "{width}x{height} index plane needs {plane_size} bytes, chunk has {available}"
                ),
            ));
        }

        let plane = cursor.read_bytes(plane_size)?;
        let indices = match format {
            PixelFormat::Indexed8 => plane.to_vec(),
            PixelFormat::Indexed4 => unpack_nibbles(plane, pixels, offset)?,
        };

        Ok(Self {
            id: header.id,
            palette_id: header.palette_id,
            width,
            height,
            format,
            indices,
            palettes: Vec::new(),
        })
    }

    /// Index plane rows, bottom row first as stored.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, u8> {
        self.indices.chunks_exact(self.width as usize)
    }
}

/// Decodes a dimension stored as a power-of-two exponent.
pub fn dimension(exponent: u8, offset: usize) -> Result<u32> {
    1u32.checked_shl(exponent as u32)
        .ok_or_else(|| Error::malformed(offset, format!("dimension 2^{exponent} overflows")))
}

/// Splits each byte into two indices, `byte % 16` then `byte / 16`, keeping the first `pixels`.
pub fn unpack_nibbles(plane: &[u8], pixels: usize, offset: usize) -> Result<Vec<u8>> {
    let mut indices = Vec::with_capacity(plane.len() * 2);
    for (i, &byte) in plane.iter().enumerate() {
        let (lo, hi) = (byte % 16, byte / 16);
        // Either half reaching 16 means the plane is no longer aligned with the stream.
        if lo >= 16 || hi >= 16 {
            return Err(Error::malformed(
                offset + i,
                format!("index byte {byte:#04x} does not split into nibbles"),
            ));
        }
        indices.push(lo);
        indices.push(hi);
    }
    indices.truncate(pixels);
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_chunk(format: u8, width_exp: u8, height_exp: u8, plane: &[u8]) -> CursorBuffer {
        let mut c = CursorBuffer::default();
        c.write_u32(5);
        c.write_u32(2);
        c.write_bytes(&[0x11; 5]);
        c.write_u8(format);
        c.write_bytes(&[0x22; 2]);
        c.write_u8(width_exp);
        c.write_u8(height_exp);
        c.write_bytes(&[0x33; 10]);
        c.write_bytes(plane);
        c.seek_to(0).unwrap();
        c
    }

    #[test]
    fn power_of_two_dimensions() {
        assert_eq!(dimension(0, 0).unwrap(), 1);
        assert_eq!(dimension(8, 0).unwrap(), 256);
        assert_eq!(dimension(10, 0).unwrap(), 1024);
        assert_eq!(dimension(31, 0).unwrap(), 1 << 31);
        assert!(matches!(dimension(32, 0), Err(Error::MalformedChunk { .. })));
        assert!(matches!(dimension(255, 0), Err(Error::MalformedChunk { .. })));
    }

    #[test]
    fn reads_byte_indices() {
        let plane: Vec<u8> = (0..8).collect();
        let mut c = image_chunk(19, 2, 1, &plane);
        let size = c.len();
        let image = Image::read(&mut c, size).unwrap();
        assert_eq!((image.id, image.palette_id), (4, 1));
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(image.format, PixelFormat::Indexed8);
        assert_eq!(image.indices, plane);
        assert!(image.palettes.is_empty());
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn reads_nibble_indices_low_first() {
        let mut c = image_chunk(20, 2, 1, &[0x21, 0x43, 0x65, 0xf0]);
        let size = c.len();
        let image = Image::read(&mut c, size).unwrap();
        assert_eq!(image.format, PixelFormat::Indexed4);
        assert_eq!(image.indices, vec![1, 2, 3, 4, 5, 6, 0, 15]);
    }

    #[test]
    fn nibble_plane_for_single_pixel() {
        let mut c = image_chunk(20, 0, 0, &[0x9a]);
        let size = c.len();
        let image = Image::read(&mut c, size).unwrap();
        assert_eq!(image.indices, vec![0x0a]);
    }

    #[test]
    fn unpack_matches_modulo_and_division() {
        let plane: Vec<u8> = (0..=255).collect();
        let indices = unpack_nibbles(&plane, 512, 0).unwrap();
        for (k, byte) in plane.iter().enumerate() {
            assert_eq!(indices[2 * k], byte % 16);
            assert_eq!(indices[2 * k + 1], byte / 16);
        }
    }

    #[test]
    fn unknown_format_is_unsupported() {
        let mut c = image_chunk(7, 1, 1, &[0; 4]);
        let size = c.len();
        assert!(matches!(
            Image::read(&mut c, size),
            Err(Error::UnsupportedFormat { tag: 7 })
        ));
    }

    #[test]
    fn plane_larger_than_chunk_is_malformed() {
        let mut c = image_chunk(19, 4, 4, &[0; 16]);
        let size = c.len();
        assert!(matches!(
            Image::read(&mut c, size),
            Err(Error::MalformedChunk { .. })
        ));

        let mut c = image_chunk(19, 255, 0, &[]);
        let size = c.len();
        assert!(matches!(
            Image::read(&mut c, size),
            Err(Error::MalformedChunk { .. })
        ));
    }

    #[test]
    fn rows_are_width_sized() {
        let mut c = image_chunk(19, 1, 1, &[1, 2, 3, 4]);
        let size = c.len();
        let image = Image::read(&mut c, size).unwrap();
        let rows: Vec<&[u8]> = image.rows().collect();
        assert_eq!(rows, vec![&[1u8, 2][..], &[3, 4][..]]);
    }
}
