//! Compressed snapshot container.

/// Compressed bytes of one view snapshot, tagged with the format of the
/// codec that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    format: u8,
    bytes: Vec<u8>,
}

impl Blob {
    /// Wrap already-encoded bytes.
    ///
    /// Codecs use this when encoding; hosts use it when handing back a blob
    /// they persisted elsewhere.
    pub fn new(format: u8, bytes: Vec<u8>) -> Self {
        Self { format, bytes }
    }

    /// Format tag of the codec that wrote this blob.
    pub fn format(&self) -> u8 {
        self.format
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the compressed payload in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
