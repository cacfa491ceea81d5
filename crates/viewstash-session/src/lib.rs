//! Session-scoped LRU store for view state snapshots.
//!
//! This crate keeps, per user session, a bounded history of recent view
//! snapshots for every logical view:
//! - Two levels of LRU maps (logical view id, then save id)
//! - Transparent compression through a [`ViewCodec`](viewstash_codec::ViewCodec)
//! - Fallback to the freshest snapshot when a requested id has been evicted
//! - One lock per session; sessions never block each other
//!
//! # Example
//!
//! ```rust,ignore
//! use viewstash_session::{MemorySessionRegistry, SessionViewStore, StoreConfig};
//!
//! let store = SessionViewStore::new(StoreConfig::default());
//! let sessions = MemorySessionRegistry::new();
//! let session = sessions.create();
//!
//! store.save(&*session, "/orders.xhtml", "j_id1".into(), tree, state)?;
//! let restored: Option<(Tree, State)> =
//!     store.restore(Some(&*session), "/orders.xhtml", Some(&"j_id1".into()))?;
//! ```

mod bounded;
mod config;
mod error;
mod session;
mod store;
mod stored;

pub use bounded::BoundedMap;
pub use config::{DEFAULT_VIEWS_PER_LOGICAL_VIEW, StoreConfig};
pub use error::{Error, Result};
pub use session::{MemorySession, MemorySessionRegistry, SessionAttributes, SessionHandle};
pub use store::{LogicalViewHistory, SessionViewStore, VIEW_STATES_KEY, ViewStateStore, ViewStoreStats};
pub use stored::{SaveId, StoredView, ViewPayload};

pub use viewstash_codec::{Blob, GzipBincodeCodec, ViewCodec};
