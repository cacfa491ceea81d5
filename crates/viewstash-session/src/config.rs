//! Configuration for the view store.

use viewstash_codec::DEFAULT_COMPRESSION_LEVEL;

/// Default number of snapshots kept per logical view, and of logical views
/// kept per session.
pub const DEFAULT_VIEWS_PER_LOGICAL_VIEW: usize = 3;

/// Configuration for the view store.
///
/// Fixed at construction; the store never resizes its maps at runtime.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Capacity of every bounded map the store creates: snapshots per
    /// logical view, and logical views per session.
    pub views_per_logical_view: usize,

    /// Gzip level used when compressing snapshots (0..=9).
    pub compression_level: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            views_per_logical_view: DEFAULT_VIEWS_PER_LOGICAL_VIEW,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many snapshots are retained per logical view.
    pub fn with_views_per_logical_view(mut self, views: usize) -> Self {
        self.views_per_logical_view = views;
        self
    }

    /// Set the gzip compression level.
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }
}
