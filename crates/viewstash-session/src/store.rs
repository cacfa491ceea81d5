//! Two-level view state store with id lookup and freshest-snapshot fallback.

use tracing::{debug, trace};
use viewstash_codec::{GzipBincodeCodec, ViewCodec};

use crate::bounded::BoundedMap;
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::session::{SessionAttributes, SessionHandle};
use crate::stored::{SaveId, StoredView, ViewPayload};

/// Session attribute under which the [`ViewStateStore`] lives.
pub const VIEW_STATES_KEY: &str = "viewstash.VIEW_STATES_MAP";

/// Recent snapshots of one logical view, keyed by save id.
pub type LogicalViewHistory<S, T> = BoundedMap<SaveId, StoredView<S, T>>;

/// Per-session map from logical view id to its snapshot history.
pub type ViewStateStore<S, T> = BoundedMap<String, LogicalViewHistory<S, T>>;

/// Snapshot of what one session currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewStoreStats {
    /// Logical views with a history.
    pub logical_views: usize,

    /// Snapshots across all histories.
    pub snapshots: usize,

    /// Snapshots kept uncompressed because encoding failed.
    pub raw_snapshots: usize,

    /// Total size of compressed snapshots in bytes.
    pub compressed_bytes: usize,

    /// Capacity of each bounded map.
    pub capacity: usize,
}

/// Session-scoped store of compressed view snapshots.
///
/// Every operation runs entirely under the session's lock, so requests for
/// the same session serialize while different sessions proceed in parallel.
/// The store itself holds no per-session state and can be shared freely.
pub struct SessionViewStore<C: ViewCodec = GzipBincodeCodec> {
    codec: C,
    config: StoreConfig,
}

impl SessionViewStore<GzipBincodeCodec> {
    /// Create a store using gzip-compressed bincode snapshots.
    pub fn new(config: StoreConfig) -> Self {
        let codec = GzipBincodeCodec::with_level(config.compression_level);
        Self::with_codec(config, codec)
    }
}

impl Default for SessionViewStore<GzipBincodeCodec> {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl<C: ViewCodec> SessionViewStore<C> {
    /// Create a store with a custom codec.
    pub fn with_codec(config: StoreConfig, codec: C) -> Self {
        Self { codec, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Save a snapshot of `view_id` under `new_id` and return the id.
    ///
    /// The snapshot is compressed when possible and kept raw otherwise. May
    /// evict the least-recently-used snapshot of the same view, and creating
    /// a new view history may evict the least-recently-used view.
    pub fn save<H, S, T>(
        &self,
        session: &H,
        view_id: &str,
        new_id: SaveId,
        structure: S,
        state: T,
    ) -> Result<SaveId>
    where
        H: SessionHandle,
        S: ViewPayload,
        T: ViewPayload,
    {
        session.with_attributes(|attrs| {
            let view = self.encode(structure, state);
            self.insert_locked(attrs, session.id(), view_id, new_id.clone(), view)?;
            Ok(new_id)
        })
    }

    /// Store an already-built snapshot under `save_id`.
    ///
    /// Used by hosts that keep blobs elsewhere and hand them back.
    pub fn insert<H, S, T>(
        &self,
        session: &H,
        view_id: &str,
        save_id: SaveId,
        view: StoredView<S, T>,
    ) -> Result<()>
    where
        H: SessionHandle,
        S: ViewPayload,
        T: ViewPayload,
    {
        session.with_attributes(|attrs| {
            self.insert_locked(attrs, session.id(), view_id, save_id, view)
        })
    }

    /// Restore the snapshot `id` of `view_id`.
    ///
    /// When `id` is `None` or no longer stored, the most-recently-touched
    /// snapshot of the view is returned instead. `Ok(None)` means there is
    /// nothing to restore: no session, no history for the view, or a
    /// snapshot that could not be decoded.
    pub fn restore<H, S, T>(
        &self,
        session: Option<&H>,
        view_id: &str,
        id: Option<&SaveId>,
    ) -> Result<Option<(S, T)>>
    where
        H: SessionHandle,
        S: ViewPayload,
        T: ViewPayload,
    {
        self.restore_with(session, view_id, id, |_| {})
    }

    /// Like [`restore`](Self::restore), calling `on_lookup` with the
    /// requested id once the view's history has been found, before the id is
    /// looked up. Runs under the session lock.
    pub fn restore_with<H, S, T, F>(
        &self,
        session: Option<&H>,
        view_id: &str,
        id: Option<&SaveId>,
        on_lookup: F,
    ) -> Result<Option<(S, T)>>
    where
        H: SessionHandle,
        S: ViewPayload,
        T: ViewPayload,
        F: FnOnce(&SaveId),
    {
        let Some(session) = session else {
            debug!(view_id = %view_id, "Can't restore view state: session expired");
            return Ok(None);
        };
        let session_id = session.id();

        session.with_attributes(|attrs| {
            let Some(views) = view_states::<S, T>(attrs, session_id, Some(view_id))? else {
                debug!(session_id = %session_id, "No view states in session");
                return Ok(None);
            };
            let Some(history) = views.get_mut(view_id) else {
                debug!(session_id = %session_id, view_id = %view_id, "No history for logical view");
                return Ok(None);
            };

            match id {
                Some(id) => {
                    on_lookup(id);
                    if let Some(view) = history.get(id) {
                        return self.open(session_id, view_id, id, view);
                    }
                    debug!(
                        session_id = %session_id,
                        view_id = %view_id,
                        save_id = %id,
                        "No saved view state for id, restoring last saved state"
                    );
                }
                None => {
                    debug!(session_id = %session_id, view_id = %view_id, "No id requested, restoring last saved state");
                }
            }

            match history.last_entry() {
                Some((last_id, view)) => self.open(session_id, view_id, last_id, view),
                None => {
                    debug!(session_id = %session_id, view_id = %view_id, "History is empty");
                    Ok(None)
                }
            }
        })
    }

    /// Drop the whole history of one logical view.
    ///
    /// Returns whether a history existed.
    pub fn forget_view<H, S, T>(&self, session: &H, view_id: &str) -> Result<bool>
    where
        H: SessionHandle,
        S: ViewPayload,
        T: ViewPayload,
    {
        let session_id = session.id();
        session.with_attributes(|attrs| {
            let removed = view_states::<S, T>(attrs, session_id, Some(view_id))?
                .and_then(|views| views.remove(view_id))
                .is_some();
            if removed {
                debug!(session_id = %session_id, view_id = %view_id, "Forgot logical view");
            }
            Ok(removed)
        })
    }

    /// Save ids held for `view_id`, most recent first. Does not touch recency.
    pub fn saved_ids<H, S, T>(&self, session: &H, view_id: &str) -> Result<Vec<SaveId>>
    where
        H: SessionHandle,
        S: ViewPayload,
        T: ViewPayload,
    {
        let session_id = session.id();
        session.with_attributes(|attrs| {
            let ids = view_states::<S, T>(attrs, session_id, Some(view_id))?
                .and_then(|views| views.peek(view_id))
                .map(|history| history.keys().cloned().collect())
                .unwrap_or_default();
            Ok(ids)
        })
    }

    /// Logical view ids held in the session, most recent first.
    pub fn logical_views<H, S, T>(&self, session: &H) -> Result<Vec<String>>
    where
        H: SessionHandle,
        S: ViewPayload,
        T: ViewPayload,
    {
        let session_id = session.id();
        session.with_attributes(|attrs| {
            let views = view_states::<S, T>(attrs, session_id, None)?
                .map(|views| views.keys().cloned().collect())
                .unwrap_or_default();
            Ok(views)
        })
    }

    /// Summarize what the session currently holds.
    pub fn stats<H, S, T>(&self, session: &H) -> Result<ViewStoreStats>
    where
        H: SessionHandle,
        S: ViewPayload,
        T: ViewPayload,
    {
        let session_id = session.id();
        let capacity = self.capacity();
        session.with_attributes(|attrs| {
            let mut stats = ViewStoreStats {
                capacity,
                ..ViewStoreStats::default()
            };
            if let Some(views) = view_states::<S, T>(attrs, session_id, None)? {
                stats.logical_views = views.len();
                for (_, history) in views.iter() {
                    for (_, view) in history.iter() {
                        stats.snapshots += 1;
                        match view.compressed_len() {
                            Some(len) => stats.compressed_bytes += len,
                            None => stats.raw_snapshots += 1,
                        }
                    }
                }
            }
            Ok(stats)
        })
    }

    /// Capacity of every map, as clamped by [`BoundedMap::new`].
    fn capacity(&self) -> usize {
        self.config.views_per_logical_view.max(1)
    }

    /// Compress the pair, falling back to the raw pair when encoding fails.
    fn encode<S, T>(&self, structure: S, state: T) -> StoredView<S, T>
    where
        S: ViewPayload,
        T: ViewPayload,
    {
        match self.codec.encode(&structure, &state) {
            Ok(blob) => StoredView::Compressed(blob),
            Err(e) => {
                debug!(error = %e, "Could not serialize view state, storing it uncompressed");
                StoredView::Raw(structure, state)
            }
        }
    }

    /// Insert into the nested maps. Caller holds the session lock.
    fn insert_locked<S, T>(
        &self,
        attrs: &mut SessionAttributes,
        session_id: &str,
        view_id: &str,
        save_id: SaveId,
        view: StoredView<S, T>,
    ) -> Result<()>
    where
        S: ViewPayload,
        T: ViewPayload,
    {
        let capacity = self.capacity();
        let views = attrs
            .entry(VIEW_STATES_KEY.to_string())
            .or_insert_with(|| Box::new(ViewStateStore::<S, T>::new(capacity)))
            .downcast_mut::<ViewStateStore<S, T>>()
            .ok_or_else(|| Error::corrupt(session_id, Some(view_id), foreign_attribute()))?;

        if let Some(evicted) = views.would_evict(view_id) {
            debug!(
                session_id = %session_id,
                view_id = %evicted,
                "Evicting least recently used logical view"
            );
        }
        let history = views.get_or_insert_with(view_id.to_string(), || BoundedMap::new(capacity));

        let bytes = view.compressed_len();
        if let Some((evicted, _)) = history.put(save_id.clone(), view) {
            debug!(
                session_id = %session_id,
                view_id = %view_id,
                save_id = %evicted,
                "Evicting least recently used view state"
            );
        }

        trace!(
            session_id = %session_id,
            view_id = %view_id,
            save_id = %save_id,
            bytes = ?bytes,
            history_size = history.len(),
            "View state saved"
        );
        Ok(())
    }

    /// Turn a stored snapshot back into its pair.
    fn open<S, T>(
        &self,
        session_id: &str,
        view_id: &str,
        save_id: &SaveId,
        view: &StoredView<S, T>,
    ) -> Result<Option<(S, T)>>
    where
        S: ViewPayload,
        T: ViewPayload,
    {
        match view {
            StoredView::Raw(structure, state) => {
                debug!(save_id = %save_id, "Found uncompressed view state");
                Ok(Some((structure.clone(), state.clone())))
            }
            StoredView::Compressed(blob) if blob.format() == self.codec.format() => {
                debug!(save_id = %save_id, bytes = blob.len(), "Found compressed view state");
                match self.codec.decode(blob) {
                    Ok(pair) => Ok(Some(pair)),
                    Err(e) => {
                        debug!(
                            session_id = %session_id,
                            view_id = %view_id,
                            save_id = %save_id,
                            error = %e,
                            "Could not deserialize view state"
                        );
                        Ok(None)
                    }
                }
            }
            StoredView::Compressed(blob) => Err(Error::corrupt(
                session_id,
                Some(view_id),
                format!(
                    "snapshot '{save_id}' has unrecognized blob format {}",
                    blob.format()
                ),
            )),
        }
    }
}

impl<C: ViewCodec + Clone> Clone for SessionViewStore<C> {
    fn clone(&self) -> Self {
        Self {
            codec: self.codec.clone(),
            config: self.config.clone(),
        }
    }
}

/// The session's view state map, if present.
///
/// A value of any other type under [`VIEW_STATES_KEY`] is corrupt state.
fn view_states<'a, S, T>(
    attrs: &'a mut SessionAttributes,
    session_id: &str,
    view_id: Option<&str>,
) -> Result<Option<&'a mut ViewStateStore<S, T>>>
where
    S: ViewPayload,
    T: ViewPayload,
{
    match attrs.get_mut(VIEW_STATES_KEY) {
        None => Ok(None),
        Some(value) => value
            .downcast_mut::<ViewStateStore<S, T>>()
            .map(Some)
            .ok_or_else(|| Error::corrupt(session_id, view_id, foreign_attribute())),
    }
}

fn foreign_attribute() -> String {
    format!("session attribute '{VIEW_STATES_KEY}' holds a value of another type")
}
