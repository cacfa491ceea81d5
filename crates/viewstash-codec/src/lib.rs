//! Serialize-and-compress codec for view state snapshots.
//!
//! A snapshot is a pair of opaque values: the component tree structure and
//! the component state. The codec writes both, in that order, into a single
//! compressed [`Blob`] and reads them back on restore.
//!
//! Encoding failures are soft: callers keep the raw pair instead. Decoding
//! failures are scoped to the blob being decoded.
//!
//! # Example
//!
//! ```rust,ignore
//! use viewstash_codec::{GzipBincodeCodec, ViewCodec};
//!
//! let codec = GzipBincodeCodec::new();
//! let blob = codec.encode(&tree, &state)?;
//! let (tree, state): (Tree, State) = codec.decode(&blob)?;
//! ```

mod blob;
mod codec;
mod error;

pub use blob::Blob;
pub use codec::{GzipBincodeCodec, ViewCodec, DEFAULT_COMPRESSION_LEVEL};
pub use error::{DecodeError, EncodeError};
