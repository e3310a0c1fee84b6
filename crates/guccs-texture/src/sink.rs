use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::Raster;

/// Destination for composed rasters.
pub trait ImageSink {
    /// Stores `raster` under `name`. Returns where it went, for reporting.
    fn write_image(&mut self, name: &str, raster: &Raster) -> anyhow::Result<PathBuf>;
}

/// Writes `<dir>/<name>.png`.
pub struct PngSink {
    dir: PathBuf,
}

impl PngSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ImageSink for PngSink {
    fn write_image(&mut self, name: &str, raster: &Raster) -> anyhow::Result<PathBuf> {
        let path = self.dir.join(format!("{name}.png"));
        debug!("Writing {}x{} image to {}", raster.width, raster.height, path.display());

        let output_image = image::ImageBuffer::<image::Rgba<u8>, _>::from_raw(
            raster.width,
            raster.height,
            &raster.pixels[..],
        )
        .context("Raster buffer does not match its dimensions")?;
        output_image
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_png_that_reads_back() {
        let dir = std::env::temp_dir().join(format!("guccs-png-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let raster = Raster {
            width: 2,
            height: 1,
            pixels: vec![1, 2, 3, 4, 5, 6, 7, 8],
        };
        let path = PngSink::new(&dir).write_image("pixel", &raster).unwrap();
        assert_eq!(path, dir.join("pixel.png"));

        let decoded = image::open(&path).unwrap().into_rgba8();
        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.into_raw(), raster.pixels);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn mismatched_buffer_is_rejected() {
        let raster = Raster {
            width: 4,
            height: 4,
            pixels: vec![0; 4],
        };
        assert!(PngSink::new(std::env::temp_dir())
            .write_image("never-written", &raster)
            .is_err());
    }
}
