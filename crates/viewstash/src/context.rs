//! Request-scoped view of the hosting framework.

use std::collections::HashMap;
use std::sync::Arc;

use viewstash_session::{MemorySession, MemorySessionRegistry, SaveId, SessionHandle};

/// Request attribute holding the save id a restore was asked for.
pub const VIEW_SEQUENCE_KEY: &str = "viewstash.VIEW_SEQUENCE";

/// What the state manager needs from the host for one request.
pub trait RequestContext {
    /// Session type handed out by the host.
    type Session: SessionHandle;

    /// The requesting user's session. With `create`, a session is started
    /// when none exists; without it, `None` means expired or never started.
    fn session(&mut self, create: bool) -> Option<Arc<Self::Session>>;

    /// The save id the client echoed back for `view_id`, if any.
    fn requested_save_id(&self, view_id: &str, render_kit_id: &str) -> Option<SaveId>;

    /// Put a value into request-scoped storage.
    fn set_request_attribute(&mut self, key: &str, value: String);
}

/// Request context backed by a [`MemorySessionRegistry`].
///
/// Carries the session id the way a cookie would: once a session is created
/// for this request, later calls resolve to it.
pub struct MemoryRequestContext {
    sessions: Arc<MemorySessionRegistry>,
    session_id: Option<String>,
    requested: Option<SaveId>,
    attributes: HashMap<String, String>,
}

impl MemoryRequestContext {
    /// A request without a session cookie or a submitted save id.
    pub fn new(sessions: Arc<MemorySessionRegistry>) -> Self {
        Self {
            sessions,
            session_id: None,
            requested: None,
            attributes: HashMap::new(),
        }
    }

    /// Attach an existing session id.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Simulate a postback carrying `id`.
    pub fn with_requested_save_id(mut self, id: impl Into<SaveId>) -> Self {
        self.requested = Some(id.into());
        self
    }

    /// Session id bound to this request, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn request_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

impl RequestContext for MemoryRequestContext {
    type Session = MemorySession;

    fn session(&mut self, create: bool) -> Option<Arc<MemorySession>> {
        let session = self.sessions.resolve(self.session_id.as_deref(), create)?;
        self.session_id = Some(session.id().to_string());
        Some(session)
    }

    fn requested_save_id(&self, _view_id: &str, _render_kit_id: &str) -> Option<SaveId> {
        self.requested.clone()
    }

    fn set_request_attribute(&mut self, key: &str, value: String) {
        self.attributes.insert(key.to_string(), value);
    }
}
