//! Session handles.
//!
//! The store never owns sessions. It borrows a [`SessionHandle`] from the
//! host for the duration of one operation and touches the session's
//! attributes only while the handle's lock is held.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Attribute map scoped to one session.
pub type SessionAttributes = HashMap<String, Box<dyn Any + Send>>;

/// A user session as seen by the view store.
///
/// Implementations wrap the host's real session object. `with_attributes`
/// must hold the session's mutual-exclusion primitive for the whole call and
/// release it on every exit path, including unwinding.
pub trait SessionHandle: Send + Sync {
    /// Stable identity of the session (used in logs and errors).
    fn id(&self) -> &str;

    /// Run `f` with exclusive access to the session attributes.
    fn with_attributes<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut SessionAttributes) -> R;
}

impl<H: SessionHandle> SessionHandle for Arc<H> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn with_attributes<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut SessionAttributes) -> R,
    {
        (**self).with_attributes(f)
    }
}

/// In-memory session guarded by its own mutex.
pub struct MemorySession {
    id: String,
    attributes: Mutex<SessionAttributes>,
}

impl MemorySession {
    /// Create an empty session with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Mutex::new(HashMap::new()),
        }
    }

    /// Create an empty session with a random id.
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    /// Number of attributes currently set.
    pub fn attribute_count(&self) -> usize {
        self.attributes.lock().len()
    }
}

impl SessionHandle for MemorySession {
    fn id(&self) -> &str {
        &self.id
    }

    fn with_attributes<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut SessionAttributes) -> R,
    {
        let mut attributes = self.attributes.lock();
        f(&mut attributes)
    }
}

impl std::fmt::Debug for MemorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySession").field("id", &self.id).finish()
    }
}

/// Table of live in-memory sessions.
///
/// The table lock is held only while resolving a handle; work on a session
/// happens under that session's own lock.
#[derive(Default)]
pub struct MemorySessionRegistry {
    sessions: RwLock<HashMap<String, Arc<MemorySession>>>,
}

impl MemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a session with a random id.
    pub fn create(&self) -> Arc<MemorySession> {
        let session = Arc::new(MemorySession::generate());
        self.sessions
            .write()
            .insert(session.id.clone(), Arc::clone(&session));
        debug!(session_id = %session.id, "Created session");
        session
    }

    /// Look up a live session.
    pub fn get(&self, session_id: &str) -> Option<Arc<MemorySession>> {
        self.sessions.read().get(session_id).cloned()
    }

    /// Resolve the session for a request.
    ///
    /// Returns the live session for `session_id` if there is one. Otherwise a
    /// new session is created when `create` is set, and `None` is returned
    /// when it is not.
    pub fn resolve(&self, session_id: Option<&str>, create: bool) -> Option<Arc<MemorySession>> {
        if let Some(session) = session_id.and_then(|id| self.get(id)) {
            return Some(session);
        }
        create.then(|| self.create())
    }

    /// Destroy a session together with everything stored in it.
    pub fn invalidate(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().remove(session_id).is_some();
        if removed {
            debug!(session_id = %session_id, "Invalidated session");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_are_per_session() {
        let a = MemorySession::new("a");
        let b = MemorySession::new("b");

        a.with_attributes(|attrs| attrs.insert("k".into(), Box::new(1u32)));

        assert_eq!(a.attribute_count(), 1);
        assert_eq!(b.attribute_count(), 0);
        let value = a.with_attributes(|attrs| attrs.get("k").and_then(|v| v.downcast_ref::<u32>()).copied());
        assert_eq!(value, Some(1));
    }

    #[test]
    fn test_lock_released_after_panic() {
        let session = Arc::new(MemorySession::new("s"));
        let cloned = Arc::clone(&session);

        let result = std::thread::spawn(move || {
            cloned.with_attributes(|_| panic!("boom"));
        })
        .join();
        assert!(result.is_err());

        // parking_lot does not poison; the lock is usable again.
        session.with_attributes(|attrs| attrs.insert("k".into(), Box::new(())));
        assert_eq!(session.attribute_count(), 1);
    }

    #[test]
    fn test_registry_resolve() {
        let registry = MemorySessionRegistry::new();

        assert!(registry.resolve(None, false).is_none());
        assert!(registry.resolve(Some("missing"), false).is_none());

        let created = registry.resolve(None, true).unwrap();
        assert_eq!(registry.len(), 1);

        let found = registry.resolve(Some(created.id()), false).unwrap();
        assert!(Arc::ptr_eq(&created, &found));
    }

    #[test]
    fn test_registry_invalidate() {
        let registry = MemorySessionRegistry::new();
        let session = registry.create();

        assert!(registry.invalidate(session.id()));
        assert!(!registry.invalidate(session.id()));
        assert!(registry.get(session.id()).is_none());
        assert!(registry.is_empty());
    }
}
