//! Codec trait and the gzip + bincode implementation.

use std::io::Write;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::blob::Blob;
use crate::error::{DecodeError, EncodeError};

/// Default gzip level (flate2's default).
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Initial capacity of the encode buffer.
const INITIAL_BUFFER: usize = 1024;

/// Turns a (structure, state) pair into a [`Blob`] and back.
///
/// Implementations must write the two values in order, structure first, and
/// must stamp every blob with their [`format`](ViewCodec::format) so a store
/// can tell its own blobs from anything else. Decoding a blob must yield
/// exactly the values that were encoded.
pub trait ViewCodec: Send + Sync {
    /// Format tag written on every blob this codec produces.
    fn format(&self) -> u8;

    /// Serialize and compress a snapshot.
    fn encode<S, T>(&self, structure: &S, state: &T) -> Result<Blob, EncodeError>
    where
        S: Serialize,
        T: Serialize;

    /// Decompress and deserialize a snapshot.
    fn decode<S, T>(&self, blob: &Blob) -> Result<(S, T), DecodeError>
    where
        S: DeserializeOwned,
        T: DeserializeOwned;
}

/// Writes both values back to back in bincode inside a single gzip member.
///
/// bincode keeps every serde value distinct (`Some(None)` vs `None`, NaN and
/// infinite floats), so a decoded pair is identical to the encoded one.
/// Values that need a self-describing format (`#[serde(flatten)]`, sequences
/// of unknown length) fail to encode and are reported as
/// [`EncodeError::Serialize`].
#[derive(Debug, Clone, Copy)]
pub struct GzipBincodeCodec {
    level: Compression,
}

impl GzipBincodeCodec {
    /// Format tag for gzip-compressed bincode pairs.
    pub const FORMAT: u8 = 1;

    /// Create a codec with the default compression level.
    pub fn new() -> Self {
        Self::with_level(DEFAULT_COMPRESSION_LEVEL)
    }

    /// Create a codec with an explicit gzip level (clamped to 0..=9).
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }

    /// The configured compression level.
    pub fn level(&self) -> u32 {
        self.level.level()
    }
}

impl Default for GzipBincodeCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewCodec for GzipBincodeCodec {
    fn format(&self) -> u8 {
        Self::FORMAT
    }

    fn encode<S, T>(&self, structure: &S, state: &T) -> Result<Blob, EncodeError>
    where
        S: Serialize,
        T: Serialize,
    {
        trace!(level = self.level(), "Compressing view state");

        let mut encoder = GzEncoder::new(Vec::with_capacity(INITIAL_BUFFER), self.level);
        write_value(&mut encoder, "structure", structure)?;
        write_value(&mut encoder, "state", state)?;
        let bytes = encoder.finish().map_err(EncodeError::Compress)?;

        debug!(bytes = bytes.len(), "Serialized view state");
        Ok(Blob::new(Self::FORMAT, bytes))
    }

    fn decode<S, T>(&self, blob: &Blob) -> Result<(S, T), DecodeError>
    where
        S: DeserializeOwned,
        T: DeserializeOwned,
    {
        let mut decoder = GzDecoder::new(blob.as_bytes());

        let structure: S = bincode::deserialize_from(&mut decoder)
            .map_err(|e| DecodeError::from_bincode("structure", e))?;
        let state: T = bincode::deserialize_from(&mut decoder)
            .map_err(|e| DecodeError::from_bincode("state", e))?;

        trace!(bytes = blob.len(), "Decompressed view state");
        Ok((structure, state))
    }
}

fn write_value<W, V>(writer: &mut W, part: &'static str, value: &V) -> Result<(), EncodeError>
where
    W: Write,
    V: Serialize,
{
    bincode::serialize_into(writer, value).map_err(|source| match *source {
        bincode::ErrorKind::Io(e) => EncodeError::Compress(e),
        kind => EncodeError::Serialize {
            part,
            source: Box::new(kind),
        },
    })
}
