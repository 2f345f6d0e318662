//! Error types for the SWF tag stream model

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decompression failed: {0}")]
    Decompression(String),

    #[error("Invalid file signature: {0:?}")]
    InvalidSignature([u8; 3]),

    #[error("Unsupported compression: {0}")]
    UnsupportedCompression(String),

    #[error("Unexpected end of data at byte offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("Invalid {record} record: {reason}")]
    InvalidRecord { record: &'static str, reason: String },

    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),
}

impl SwfError {
    /// Shorthand for an [`SwfError::InvalidRecord`]
    pub fn invalid(record: &'static str, reason: impl Into<String>) -> Self {
        SwfError::InvalidRecord {
            record,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SwfError>;
