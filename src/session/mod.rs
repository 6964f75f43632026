use crate::models::SessionProfile;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Per-user cache of the merged account + plan snapshot.
///
/// The profile loader is the single writer; handlers only read. Writes are
/// last-write-wins with no merge detection, and reads are synchronous and may
/// be stale until the next explicit reload. Snapshots are persisted to disk so
/// a restart serves the last-known profile before the first reload completes.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SessionProfile>>>,
    persist_path: Option<PathBuf>,
}

impl SessionStore {
    pub fn new(persist_path: Option<PathBuf>) -> Self {
        let snapshot = match &persist_path {
            Some(path) => Self::load_snapshot(path),
            None => HashMap::new(),
        };

        Self {
            inner: Arc::new(RwLock::new(snapshot)),
            persist_path,
        }
    }

    fn load_snapshot(path: &PathBuf) -> HashMap<Uuid, SessionProfile> {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    log::warn!("Ignoring unreadable session snapshot {path:?}: {e}");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                log::warn!("Failed to read session snapshot {path:?}: {e}");
                HashMap::new()
            }
        }
    }

    /// Replace the user's snapshot. Last write wins.
    pub fn set_profile(&self, user_id: Uuid, profile: SessionProfile) {
        {
            let mut map = self.inner.write().unwrap_or_else(|p| p.into_inner());
            map.insert(user_id, profile);
        }
        self.persist();
    }

    /// Drop the user's snapshot (sign-out).
    pub fn clear_profile(&self, user_id: Uuid) {
        {
            let mut map = self.inner.write().unwrap_or_else(|p| p.into_inner());
            map.remove(&user_id);
        }
        self.persist();
    }

    /// Synchronous read of the last-written snapshot.
    pub fn get(&self, user_id: Uuid) -> Option<SessionProfile> {
        let map = self.inner.read().unwrap_or_else(|p| p.into_inner());
        map.get(&user_id).cloned()
    }

    // The store is a cache, not the source of truth, so persistence failures
    // are logged rather than surfaced.
    fn persist(&self) {
        let Some(path) = &self.persist_path else {
            return;
        };

        let serialized = {
            let map = self.inner.read().unwrap_or_else(|p| p.into_inner());
            serde_json::to_string(&*map)
        };

        match serialized {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    log::warn!("Failed to persist session snapshot to {path:?}: {e}");
                }
            }
            Err(e) => log::warn!("Failed to serialize session snapshot: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlanSummary;

    fn profile(user_id: Uuid, name: &str) -> SessionProfile {
        SessionProfile {
            user_id,
            full_name: name.to_string(),
            email: format!("{name}@example.com"),
            phone: None,
            address: None,
            city: None,
            country: None,
            plan: PlanSummary::free(),
        }
    }

    #[test]
    fn test_set_get_clear() {
        let store = SessionStore::new(None);
        let user_id = Uuid::new_v4();

        assert!(store.get(user_id).is_none());

        store.set_profile(user_id, profile(user_id, "jane"));
        assert_eq!(store.get(user_id).unwrap().full_name, "jane");

        store.clear_profile(user_id);
        assert!(store.get(user_id).is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let store = SessionStore::new(None);
        let user_id = Uuid::new_v4();

        store.set_profile(user_id, profile(user_id, "first"));
        store.set_profile(user_id, profile(user_id, "second"));

        assert_eq!(store.get(user_id).unwrap().full_name, "second");
    }

    #[test]
    fn test_snapshot_survives_restart() {
        let path = std::env::temp_dir().join(format!("session-{}.json", Uuid::new_v4()));
        let user_id = Uuid::new_v4();

        let store = SessionStore::new(Some(path.clone()));
        store.set_profile(user_id, profile(user_id, "jane"));

        let reloaded = SessionStore::new(Some(path.clone()));
        assert_eq!(reloaded.get(user_id).unwrap().full_name, "jane");

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_missing_snapshot_starts_empty() {
        let path = std::env::temp_dir().join(format!("session-{}.json", Uuid::new_v4()));
        let store = SessionStore::new(Some(path));
        assert!(store.get(Uuid::new_v4()).is_none());
    }
}
