use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid header: expected {:#010x}, found {found:#010x}", crate::CCS_MAGIC)]
    InvalidHeader { found: u32 },

    #[error("unexpected end of input at offset {offset:#x} (need {need} bytes, have {have})")]
    TruncatedInput {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("malformed chunk at offset {offset:#x}: {reason}")]
    MalformedChunk { offset: usize, reason: String },

    #[error("unsupported pixel format {tag}")]
    UnsupportedFormat { tag: u8 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedChunk {
            offset,
            reason: reason.into(),
        }
    }

    /// Converts a binrw failure raised while parsing a record that started at `offset`.
    ///
    /// `need`/`have` describe the record size and the bytes that were left when it was attempted.
    pub(crate) fn from_binrw(err: binrw::Error, offset: usize, need: usize, have: usize) -> Self {
        match err {
            binrw::Error::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Self::TruncatedInput { offset, need, have }
            }
            binrw::Error::Io(e) => Self::Io(e),
            binrw::Error::AssertFail { pos, message } => Self::malformed(pos as usize, message),
            other => Self::malformed(offset, other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
