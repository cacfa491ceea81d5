//! Error types for codec operations.

use std::io;

/// Encoding failed; the caller should keep the raw pair instead.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// A value could not be serialized.
    #[error("failed to serialize view {part}: {source}")]
    Serialize {
        part: &'static str,
        source: bincode::Error,
    },

    /// The compressor rejected the stream.
    #[error("failed to compress view state: {0}")]
    Compress(#[source] io::Error),
}

/// A stored blob could not be turned back into a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The compressed stream is corrupt.
    #[error("corrupt compressed stream while reading view {part}: {source}")]
    Stream {
        part: &'static str,
        source: bincode::Error,
    },

    /// The stream ended before both values were read.
    #[error("view state truncated: missing {part}")]
    Truncated { part: &'static str },

    /// The bytes do not describe a value of the requested type.
    #[error("malformed view {part}: {source}")]
    Malformed {
        part: &'static str,
        source: bincode::Error,
    },
}

impl DecodeError {
    /// Classify a deserializer failure for the given half of the pair.
    pub(crate) fn from_bincode(part: &'static str, source: bincode::Error) -> Self {
        let io_kind = match &*source {
            bincode::ErrorKind::Io(e) => Some(e.kind()),
            _ => None,
        };

        match io_kind {
            Some(io::ErrorKind::UnexpectedEof) => DecodeError::Truncated { part },
            Some(_) => DecodeError::Stream { part, source },
            None => DecodeError::Malformed { part, source },
        }
    }
}
