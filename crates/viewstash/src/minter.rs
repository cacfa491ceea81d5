//! Save id minting.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;
use viewstash_session::SaveId;

/// Produces the id under which the next snapshot is saved.
pub trait SaveIdMinter: Send + Sync {
    fn next_save_id(&self, session_id: &str) -> SaveId;
}

/// Counter producing `j_id1`, `j_id2`, ... Each minter, and so each manager,
/// counts on its own; ids are unique per manager, across all its sessions.
#[derive(Debug, Default)]
pub struct SequenceMinter {
    next: AtomicU64,
}

impl SequenceMinter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveIdMinter for SequenceMinter {
    fn next_save_id(&self, _session_id: &str) -> SaveId {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        SaveId::new(format!("j_id{n}"))
    }
}

/// Random v4 UUIDs, for hosts that do not want guessable ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidMinter;

impl SaveIdMinter for UuidMinter {
    fn next_save_id(&self, _session_id: &str) -> SaveId {
        SaveId::new(Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sequence_ids() {
        let minter = SequenceMinter::new();
        assert_eq!(minter.next_save_id("s").as_str(), "j_id1");
        assert_eq!(minter.next_save_id("s").as_str(), "j_id2");
        assert_eq!(minter.next_save_id("other").as_str(), "j_id3");
    }

    #[test]
    fn test_each_minter_counts_on_its_own() {
        let first = SequenceMinter::new();
        let second = SequenceMinter::new();
        assert_eq!(first.next_save_id("s").as_str(), "j_id1");
        assert_eq!(second.next_save_id("s").as_str(), "j_id1");
        assert_eq!(first.next_save_id("s").as_str(), "j_id2");
    }

    #[test]
    fn test_sequence_ids_unique_across_threads() {
        let minter = SequenceMinter::new();
        let ids: HashSet<SaveId> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| (0..50).map(|_| minter.next_save_id("s")).collect::<Vec<_>>()))
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn test_uuid_ids_differ() {
        let minter = UuidMinter;
        assert_ne!(minter.next_save_id("s"), minter.next_save_id("s"));
    }
}
