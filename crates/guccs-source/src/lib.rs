pub mod compression;

use std::path::Path;

use anyhow::Context;
use guccs_ccs::CursorBuffer;
use tracing::debug;

pub use compression::CompressionType;

/// Reads a container file, inflating it first when it is gzip-compressed.
pub fn load(path: impl AsRef<Path>) -> anyhow::Result<CursorBuffer> {
    let path = path.as_ref();
    let data = std::fs::read(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let compression = CompressionType::guess_from_slice(&data);
    debug!("{}: {} bytes, {compression:?}", path.display(), data.len());

    let cursor = compression::decompress(data)
        .with_context(|| format!("Cannot decompress {}", path.display()))?;
    debug!("{}: {} bytes after decompression", path.display(), cursor.len());
    Ok(cursor)
}
