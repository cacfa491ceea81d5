//! Error types for view store operations.
//!
//! Only unrecoverable conditions live here. A missing session, view or
//! snapshot is reported as `Ok(None)`, and codec failures are absorbed by
//! the store.

/// Error type for view store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A stored value matches no known representation.
    ///
    /// `view_id` is `None` when the operation spans every view of the session.
    #[error("corrupt view state{} in session '{session_id}': {reason}", for_view(.view_id))]
    CorruptState {
        session_id: String,
        view_id: Option<String>,
        reason: String,
    },
}

impl Error {
    pub(crate) fn corrupt(
        session_id: &str,
        view_id: Option<&str>,
        reason: impl Into<String>,
    ) -> Self {
        Error::CorruptState {
            session_id: session_id.to_string(),
            view_id: view_id.map(str::to_string),
            reason: reason.into(),
        }
    }
}

fn for_view(view_id: &Option<String>) -> String {
    view_id
        .as_deref()
        .map(|id| format!(" for '{id}'"))
        .unwrap_or_default()
}

/// Result type for view store operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_state_message_names_view() {
        let err = Error::corrupt("s1", Some("/a.xhtml"), "bad blob");
        assert_eq!(
            err.to_string(),
            "corrupt view state for '/a.xhtml' in session 's1': bad blob"
        );
    }

    #[test]
    fn test_corrupt_state_message_without_view() {
        let err = Error::corrupt("s1", None, "bad map");
        assert_eq!(err.to_string(), "corrupt view state in session 's1': bad map");
    }
}
