//! Stored snapshot representation and identifiers.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use viewstash_codec::Blob;

/// Identifier of one saved snapshot of a logical view.
///
/// Minted by the host per save and echoed back by the client; opaque to the
/// store beyond equality and hashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveId(String);

impl SaveId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SaveId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SaveId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SaveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bounds for the structure and state halves of a snapshot.
pub trait ViewPayload: Serialize + DeserializeOwned + Clone + Send + 'static {}

impl<T> ViewPayload for T where T: Serialize + DeserializeOwned + Clone + Send + 'static {}

/// One snapshot as held in a session.
///
/// Decided at write time: `Compressed` normally, `Raw` only when the codec
/// could not encode the pair.
#[derive(Debug, Clone)]
pub enum StoredView<S, T> {
    Compressed(Blob),
    Raw(S, T),
}

impl<S, T> StoredView<S, T> {
    pub fn is_compressed(&self) -> bool {
        matches!(self, StoredView::Compressed(_))
    }

    /// Compressed size, or `None` for a raw pair.
    pub fn compressed_len(&self) -> Option<usize> {
        match self {
            StoredView::Compressed(blob) => Some(blob.len()),
            StoredView::Raw(..) => None,
        }
    }
}
