//! In-memory abuse store for single-node deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::store::{AbuseStore, AttemptRecord, BanRecord};

/// Internal state guarded by one lock.
#[derive(Debug, Default)]
struct Inner {
    /// Identifier → attempt history.
    attempts: HashMap<String, AttemptRecord>,
    /// Identifier → ban state.
    bans: HashMap<String, BanRecord>,
}

/// In-memory abuse store using a single Tokio mutex for both maps.
///
/// Suitable for single-node deployments only.
#[derive(Debug, Clone, Default)]
pub struct MemoryAbuseStore {
    state: Arc<Mutex<Inner>>,
}

impl MemoryAbuseStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AbuseStore for MemoryAbuseStore {
    async fn attempts(&self, identifier: &str) -> Option<AttemptRecord> {
        self.state.lock().await.attempts.get(identifier).cloned()
    }

    async fn put_attempts(&self, identifier: &str, record: AttemptRecord) {
        self.state
            .lock()
            .await
            .attempts
            .insert(identifier.to_string(), record);
    }

    async fn remove_attempts(&self, identifier: &str) -> bool {
        self.state.lock().await.attempts.remove(identifier).is_some()
    }

    async fn ban(&self, identifier: &str) -> Option<BanRecord> {
        self.state.lock().await.bans.get(identifier).cloned()
    }

    async fn put_ban(&self, identifier: &str, record: BanRecord) {
        self.state
            .lock()
            .await
            .bans
            .insert(identifier.to_string(), record);
    }

    async fn remove_ban(&self, identifier: &str) -> bool {
        self.state.lock().await.bans.remove(identifier).is_some()
    }

    async fn attempt_identifiers(&self) -> Vec<String> {
        self.state.lock().await.attempts.keys().cloned().collect()
    }

    async fn banned_identifiers(&self) -> Vec<String> {
        self.state.lock().await.bans.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_remove_roundtrip() {
        let store = MemoryAbuseStore::new();
        assert!(store.attempts("a").await.is_none());

        store.put_attempts("a", AttemptRecord::default()).await;
        assert!(store.attempts("a").await.is_some());
        assert_eq!(store.attempt_identifiers().await, vec!["a".to_string()]);

        assert!(store.remove_attempts("a").await);
        assert!(!store.remove_attempts("a").await);
    }
}
