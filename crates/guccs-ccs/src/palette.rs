use binrw::BinRead;
use bytemuck::{Pod, Zeroable};

use crate::{
    cursor::{CursorBuffer, Record},
    error::{Error, Result},
    renumber,
};

/// Size of the palette chunk body before the colour table: id plus 16 reserved bytes.
pub const PALETTE_HEADER_SIZE: usize = 20;

#[derive(BinRead, Debug, Default, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[br(map = rescale_alpha)]
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };
}

impl Record for Color {
    const SIZE: usize = 4;
}

/// Alpha is stored either as 0..=128 or as 0..=255. Values up to 128 are stretched to the full range.
pub fn rescale_alpha(a: u8) -> u8 {
    if a <= 128 {
        (a as u32 * 255 / 128) as u8
    } else {
        a
    }
}

#[derive(BinRead, Debug)]
struct PaletteHeader {
    #[br(map = renumber, pad_after = 16)]
    id: u32,
}

impl Record for PaletteHeader {
    const SIZE: usize = PALETTE_HEADER_SIZE;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub id: u32,
    pub colors: Vec<Color>,
}

impl Palette {
    /// Reads a palette chunk body. `size` is the chunk's declared length in bytes.
    pub fn read(cursor: &mut CursorBuffer, size: usize) -> Result<Self> {
        let offset = cursor.position();
        let count = color_count(size).ok_or_else(|| {
            Error::malformed(offset, format!("palette chunk of {size} bytes has no colour table"))
        })?;

        let header: PaletteHeader = cursor.read_record()?;
        let colors = (0..count)
            .map(|_| cursor.read_record::<Color>())
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: header.id,
            colors,
        })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: u8) -> Option<Color> {
        self.colors.get(index as usize).copied()
    }
}

fn color_count(size: usize) -> Option<usize> {
    let table = size.checked_sub(PALETTE_HEADER_SIZE)?;
    if table == 0 || table % Color::SIZE != 0 {
        return None;
    }
    Some(table / Color::SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette_chunk(id: u32, colors: &[[u8; 4]]) -> CursorBuffer {
        let mut c = CursorBuffer::default();
        c.write_u32(id);
        c.write_bytes(&[0xaa; 16]);
        for color in colors {
            c.write_bytes(color);
        }
        c.seek_to(0).unwrap();
        c
    }

    #[test]
    fn alpha_rescale() {
        for a in 0..=128u32 {
            assert_eq!(rescale_alpha(a as u8) as u32, a * 255 / 128);
        }
        for a in 129..=255u8 {
            assert_eq!(rescale_alpha(a), a);
        }
        assert_eq!(rescale_alpha(128), 255);
        assert_eq!(rescale_alpha(0), 0);
        assert_eq!(rescale_alpha(64), 127);
    }

    #[test]
    fn reads_colours_and_renumbers_id() {
        let mut c = palette_chunk(3, &[[1, 2, 3, 128], [4, 5, 6, 200], [7, 8, 9, 0]]);
        let palette = Palette::read(&mut c, 20 + 3 * 4).unwrap();
        assert_eq!(palette.id, 2);
        assert_eq!(
            palette.colors,
            vec![
                Color { r: 1, g: 2, b: 3, a: 255 },
                Color { r: 4, g: 5, b: 6, a: 200 },
                Color { r: 7, g: 8, b: 9, a: 0 },
            ]
        );
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn id_zero_stays_zero() {
        let mut c = palette_chunk(0, &[[0, 0, 0, 0]]);
        assert_eq!(Palette::read(&mut c, 24).unwrap().id, 0);
    }

    #[test]
    fn rejects_undersized_chunks() {
        for size in [0, 4, 16, 19, 20, 22] {
            let mut c = palette_chunk(1, &[[0; 4]; 2]);
            assert!(
                matches!(Palette::read(&mut c, size), Err(Error::MalformedChunk { .. })),
                "size {size} should be rejected"
            );
        }
    }

    #[test]
    fn truncated_colour_table() {
        let mut c = palette_chunk(1, &[[0; 4]]);
        assert!(matches!(
            Palette::read(&mut c, 20 + 8),
            Err(Error::TruncatedInput { .. })
        ));
    }
}
