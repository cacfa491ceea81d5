//! State manager facing the hosting framework.

use std::marker::PhantomData;
use std::path::Path;

use tracing::{debug, info, warn};
use viewstash_codec::{GzipBincodeCodec, ViewCodec};
use viewstash_config::{LoadedConfig, ViewStateConfig};
use viewstash_session::{
    SaveId, SessionHandle, SessionViewStore, StoreConfig, ViewPayload, ViewStoreStats,
};

use crate::{Error, Result};
use crate::context::{RequestContext, VIEW_SEQUENCE_KEY};
use crate::minter::{SaveIdMinter, SequenceMinter};

/// What the client receives after a save: only the save id, never the
/// snapshot itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedView {
    pub id: SaveId,
}

/// Save/restore interface the hosting framework calls.
pub trait StateManager {
    /// Component tree structure.
    type Structure: ViewPayload;

    /// Component state.
    type State: ViewPayload;

    /// Save the current view and return the reference to send to the client.
    fn save_view<C: RequestContext>(
        &self,
        ctx: &mut C,
        view_id: &str,
        structure: Self::Structure,
        state: Self::State,
    ) -> Result<SerializedView>;

    /// Restore the view the client refers to. `Ok(None)` means the view
    /// state expired and the host should ask the user to reload.
    fn restore_view<C: RequestContext>(
        &self,
        ctx: &mut C,
        view_id: &str,
        render_kit_id: &str,
    ) -> Result<Option<(Self::Structure, Self::State)>>;
}

/// Keeps view state in the session, compressed and bounded per logical view.
pub struct PerformantStateManager<S, T, M = SequenceMinter, C = GzipBincodeCodec>
where
    C: ViewCodec,
{
    store: SessionViewStore<C>,
    minter: M,
    _payload: PhantomData<fn() -> (S, T)>,
}

impl<S, T> PerformantStateManager<S, T> {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_parts(SessionViewStore::new(config), SequenceMinter::new())
    }

    /// Build from the `[view_state]` config section.
    pub fn from_config(config: &ViewStateConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(store_config(config)))
    }

    /// Build from already discovered config layers, logging skipped layers.
    pub fn from_loaded(loaded: &LoadedConfig) -> Result<Self> {
        for warning in &loaded.warnings {
            warn!(warning = %warning, "Ignoring config layer");
        }
        let view_state = loaded.config.view_state();
        info!(
            views_per_logical_view = view_state.views_per_logical_view,
            compression_level = view_state.compression_level,
            sources = loaded.loaded_from().count(),
            "Configured view state store"
        );
        Self::from_config(&view_state)
    }

    /// Discover the user and project config files for `project_dir` and
    /// build from the merged `[view_state]` section.
    pub fn discover(project_dir: Option<&Path>) -> Result<Self> {
        Self::from_loaded(&viewstash_config::load_config(project_dir)?)
    }
}

impl<S, T> Default for PerformantStateManager<S, T> {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl<S, T, M, C> PerformantStateManager<S, T, M, C>
where
    M: SaveIdMinter,
    C: ViewCodec,
{
    pub fn with_parts(store: SessionViewStore<C>, minter: M) -> Self {
        Self {
            store,
            minter,
            _payload: PhantomData,
        }
    }

    pub fn store(&self) -> &SessionViewStore<C> {
        &self.store
    }
}

impl<S, T, M, C> PerformantStateManager<S, T, M, C>
where
    S: ViewPayload,
    T: ViewPayload,
    M: SaveIdMinter,
    C: ViewCodec,
{
    /// Summarize what the request's session holds, without creating one.
    pub fn stats<X: RequestContext>(&self, ctx: &mut X) -> Result<Option<ViewStoreStats>> {
        match ctx.session(false) {
            Some(session) => Ok(Some(self.store.stats::<_, S, T>(&session)?)),
            None => Ok(None),
        }
    }
}

impl<S, T, M, C> StateManager for PerformantStateManager<S, T, M, C>
where
    S: ViewPayload,
    T: ViewPayload,
    M: SaveIdMinter,
    C: ViewCodec,
{
    type Structure = S;
    type State = T;

    fn save_view<X: RequestContext>(
        &self,
        ctx: &mut X,
        view_id: &str,
        structure: S,
        state: T,
    ) -> Result<SerializedView> {
        debug!(view_id = %view_id, "Saving view state in session");

        let session = ctx.session(true).ok_or(Error::SessionUnavailable)?;
        let id = self.minter.next_save_id(session.id());
        let id = self.store.save(&session, view_id, id, structure, state)?;

        Ok(SerializedView { id })
    }

    fn restore_view<X: RequestContext>(
        &self,
        ctx: &mut X,
        view_id: &str,
        render_kit_id: &str,
    ) -> Result<Option<(S, T)>> {
        debug!(view_id = %view_id, render_kit_id = %render_kit_id, "Restoring view state from session");

        let id = ctx.requested_save_id(view_id, render_kit_id);
        let session = ctx.session(false);

        let restored = self.store.restore_with(session.as_ref(), view_id, id.as_ref(), |id| {
            ctx.set_request_attribute(VIEW_SEQUENCE_KEY, id.to_string())
        })?;
        Ok(restored)
    }
}

/// Map the `[view_state]` config section onto the store's runtime config.
pub fn store_config(config: &ViewStateConfig) -> StoreConfig {
    StoreConfig::new()
        .with_views_per_logical_view(config.views_per_logical_view)
        .with_compression_level(config.compression_level)
}
