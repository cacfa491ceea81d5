//! Compressed, bounded per-session view state management.
//!
//! The hosting web framework talks to a [`StateManager`]; the provided
//! [`PerformantStateManager`] keeps the last few snapshots of every logical
//! view in the user's session, compressed, and hands the client only a small
//! save id. Restoring an id that has been evicted serves the freshest
//! snapshot of the same view instead of failing.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use viewstash::{MemoryRequestContext, MemorySessionRegistry, PerformantStateManager, StateManager};
//!
//! let sessions = Arc::new(MemorySessionRegistry::new());
//! let manager: PerformantStateManager<Tree, State> = PerformantStateManager::default();
//!
//! let mut ctx = MemoryRequestContext::new(Arc::clone(&sessions));
//! let saved = manager.save_view(&mut ctx, "/orders.xhtml", tree, state)?;
//! ```

mod context;
mod error;
pub mod logging;
mod manager;
mod minter;

pub use context::{MemoryRequestContext, RequestContext, VIEW_SEQUENCE_KEY};
pub use error::{Error, Result};
pub use manager::{PerformantStateManager, SerializedView, StateManager, store_config};
pub use minter::{SaveIdMinter, SequenceMinter, UuidMinter};

pub use viewstash_config::{LoggingConfig, ViewStateConfig, ViewstashConfig};
pub use viewstash_session::{
    MemorySession, MemorySessionRegistry, SaveId, SessionHandle, SessionViewStore, StoreConfig,
    ViewPayload, ViewStoreStats,
};
