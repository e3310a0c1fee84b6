use anyhow::Context;
use guccs_ccs::{Color, Image};
use tracing::warn;

/// A top-down RGBA8 raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Raster {
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * 4;
        let start = y as usize * stride;
        &self.pixels[start..start + stride]
    }
}

/// Resolves an image's index plane through its `palette`-th attached palette.
///
/// The index plane is stored bottom row first; the raster is flipped to top row first.
/// Indices past the end of the palette become transparent black.
pub fn compose(image: &Image, palette: usize) -> anyhow::Result<Raster> {
    let table = image.palettes.get(palette).with_context(|| {
        format!(
            "image has {} palettes, palette {palette} requested",
            image.palettes.len()
        )
    })?;

    let width = image.width as usize;
    let expected = width * image.height as usize;
    anyhow::ensure!(
        image.indices.len() == expected,
        "index plane has {} entries, expected {expected}",
        image.indices.len()
    );

    let mut colors = Vec::with_capacity(expected);
    let mut out_of_range = 0usize;
    for row in image.rows().rev() {
        colors.extend(row.iter().map(|&index| {
            table.get(index).unwrap_or_else(|| {
                out_of_range += 1;
                Color::TRANSPARENT
            })
        }));
    }

    if out_of_range > 0 {
        warn!(
            "{out_of_range} pixels index past the {} colours of palette {palette}",
            table.len()
        );
    }

    Ok(Raster {
        width: image.width,
        height: image.height,
        pixels: bytemuck::cast_slice(&colors).to_vec(),
    })
}
