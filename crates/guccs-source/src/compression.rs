use std::io::Read;

use anyhow::Context;
use flate2::read::MultiGzDecoder;
use guccs_ccs::CursorBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    None,
    Gzip,
}

impl CompressionType {
    pub fn guess_from_slice(buf: &[u8]) -> CompressionType {
        match buf {
            [0x1f, 0x8b, ..] => CompressionType::Gzip,
            _ => CompressionType::None,
        }
    }
}

/// Decompresses `buf` into a cursor positioned at its start.
///
/// Input that is not gzip is taken as-is.
pub fn decompress(buf: Vec<u8>) -> anyhow::Result<CursorBuffer> {
    match CompressionType::guess_from_slice(&buf) {
        CompressionType::Gzip => {
            let mut out = CursorBuffer::with_capacity(buf.len() * 4);
            inflate_into(MultiGzDecoder::new(&buf[..]), &mut out)?;
            out.seek_to(0)?;
            Ok(out)
        }
        CompressionType::None => Ok(CursorBuffer::new(buf)),
    }
}

/// Streams a decoder's output into the write half of `out`.
pub fn inflate_into<R: Read>(mut decoder: R, out: &mut CursorBuffer) -> anyhow::Result<u64> {
    std::io::copy(&mut decoder, out).context("Failed to decompress gzip stream")
}
