use std::io::{Read, Seek, SeekFrom, Write};

use binrw::{BinRead, Endian};

use crate::error::{Error, Result};

/// A fixed-layout record parsed through binrw in a single step.
///
/// `SIZE` is the number of bytes the record consumes, including any padding it skips.
pub trait Record: for<'a> BinRead<Args<'a> = ()> {
    const SIZE: usize;
}

/// Seekable byte buffer with a read/write position.
///
/// Reads never go past the end of the buffer, they fail with [`Error::TruncatedInput`] instead.
/// Writes overwrite at the current position and grow the buffer as needed.
#[derive(Clone)]
pub struct CursorBuffer {
    data: Vec<u8>,
    pos: usize,
    endian: Endian,
}

impl CursorBuffer {
    /// Wraps `data` with the position at 0. CCS files are little-endian throughout.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            pos: 0,
            endian: Endian::Little,
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self::new(Vec::with_capacity(cap))
    }

    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Current byte position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total size of the buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the position and the end.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Moves to an absolute offset. The end of the buffer is a valid position.
    pub fn seek_to(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(Error::TruncatedInput {
                offset: pos,
                need: 0,
                have: 0,
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Moves relative to the current position.
    pub fn seek_by(&mut self, delta: isize) -> Result<()> {
        match self.pos.checked_add_signed(delta) {
            Some(pos) => self.seek_to(pos),
            None => Err(Error::TruncatedInput {
                offset: self.pos,
                need: delta.unsigned_abs(),
                have: self.pos,
            }),
        }
    }

    /// Skips an opaque region whose meaning is unknown.
    pub fn reserved(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Reads `n` bytes without copying.
    pub fn read_bytes(&mut self, n: usize) -> Result<&[u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Fills `out` from the buffer.
    pub fn read_into(&mut self, out: &mut [u8]) -> Result<()> {
        let bytes = self.read_bytes(out.len())?;
        out.copy_from_slice(bytes);
        Ok(())
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.read_into(&mut out)?;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_array::<2>()?;
        Ok(match self.endian {
            Endian::Little => u16::from_le_bytes(bytes),
            Endian::Big => u16::from_be_bytes(bytes),
        })
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_array::<4>()?;
        Ok(match self.endian {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        })
    }

    /// Parses a fixed-layout record with the buffer's endianness.
    pub fn read_record<T: Record>(&mut self) -> Result<T> {
        let start = self.pos;
        let have = self.remaining();
        self.ensure(T::SIZE)?;
        let endian = self.endian;
        T::read_options(self, endian, ()).map_err(|e| {
            self.pos = start;
            Error::from_binrw(e, start, T::SIZE, have)
        })
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }

    pub fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub fn write_u16(&mut self, v: u16) {
        match self.endian {
            Endian::Little => self.write_bytes(&v.to_le_bytes()),
            Endian::Big => self.write_bytes(&v.to_be_bytes()),
        }
    }

    pub fn write_u32(&mut self, v: u32) {
        match self.endian {
            Endian::Little => self.write_bytes(&v.to_le_bytes()),
            Endian::Big => self.write_bytes(&v.to_be_bytes()),
        }
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if n > self.remaining() {
            return Err(Error::TruncatedInput {
                offset: self.pos,
                need: n,
                have: self.remaining(),
            });
        }
        Ok(())
    }
}

impl Default for CursorBuffer {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl std::fmt::Debug for CursorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorBuffer")
            .field("len", &self.data.len())
            .field("pos", &self.pos)
            .field("endian", &self.endian)
            .finish()
    }
}

impl Read for CursorBuffer {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = buf.len().min(self.remaining());
        if n == 0 {
            return Ok(0);
        }
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for CursorBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.write_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Seek for CursorBuffer {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(p) => Some(p as i128),
            SeekFrom::Current(d) => Some(self.pos as i128 + d as i128),
            SeekFrom::End(d) => Some(self.data.len() as i128 + d as i128),
        }
        .filter(|p| *p >= 0)
        .ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "seek before start")
        })?;

        // Seeking past the end is allowed, like std's Cursor; reads there return 0 bytes.
        self.pos = usize::try_from(target).map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "seek out of range")
        })?;
        Ok(self.pos as u64)
    }
}
