use std::io;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("truncated header: expected {expected} bytes, but only {available} available")]
    TruncatedHeader { expected: usize, available: usize },
    #[error("truncated point data: expected {expected} point records, but only {decoded} decoded")]
    Truncated { expected: u64, decoded: u64 },
    #[error("invalid file signature {found:?}, this is not a LAS file")]
    InvalidSignature { found: [u8; 4] },
    #[error("unrecognized point data record format {0}")]
    UnrecognizedFormat(u8),
    #[error("point data record length {record_length} is shorter than the {expected} bytes required by point format {format}")]
    RecordLengthTooShort {
        format: u8,
        record_length: u16,
        expected: u16,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns true for the conditions that leave the header usable and
    /// only affect the point records.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Truncated { .. } | Self::UnrecognizedFormat(_))
    }
}
