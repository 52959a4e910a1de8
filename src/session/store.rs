use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

use super::SessionData;

/// In-process session records keyed by session id.
///
/// Each request loads a copy of its own record and writes it back when done;
/// no two browser sessions share a record. Records expire after `idle_ttl`
/// without a load or save, and the least used ones are evicted once the
/// store holds `max_entries`.
pub struct SessionStore {
    inner: Cache<Uuid, SessionData>,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration, max_entries: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_entries)
                .time_to_idle(idle_ttl)
                .build(),
        }
    }

    /// A missing or expired record yields a fresh, empty session.
    pub async fn load(&self, id: Uuid) -> SessionData {
        self.inner.get(&id).await.unwrap_or_default()
    }

    pub async fn save(&self, id: Uuid, data: SessionData) {
        self.inner.insert(id, data).await;
    }

    pub async fn destroy(&self, id: Uuid) {
        self.inner.invalidate(&id).await;
    }

    #[cfg(test)]
    pub async fn len(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }
}
