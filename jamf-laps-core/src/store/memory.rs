use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{Secret, SecretStore, StoreError};

/// Secrets held for the lifetime of the process.
///
/// Used when no keyring is available and by tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Secret>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, Secret>>, StoreError> {
        self.entries.lock().map_err(|e| StoreError::Backend {
            reason: format!("memory store poisoned: {}", e),
        })
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let services: Vec<String> = self
            .entries
            .lock()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("MemoryStore")
            .field("services", &services)
            .finish()
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn get(&self, service: &str) -> Result<Option<Secret>, StoreError> {
        Ok(self.entries()?.get(service).cloned())
    }

    async fn set(&self, service: &str, secret: &Secret) -> Result<(), StoreError> {
        self.entries()?.insert(service.to_string(), secret.clone());
        Ok(())
    }

    async fn delete(&self, service: &str) -> Result<(), StoreError> {
        self.entries()?.remove(service);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_replaces_previous_secret() {
        let store = MemoryStore::new();

        store.set("com.jamf.jamf-laps", &Secret::new("first")).await.unwrap();
        store.set("com.jamf.jamf-laps", &Secret::new("second")).await.unwrap();

        let secret = store.get("com.jamf.jamf-laps").await.unwrap().unwrap();
        assert_eq!(secret.expose(), "second");
        assert!(store.get("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.set("svc", &Secret::new("x")).await.unwrap();

        store.delete("svc").await.unwrap();
        store.delete("svc").await.unwrap();
        assert!(store.get("svc").await.unwrap().is_none());
    }

    #[test]
    fn test_debug_lists_services_only() {
        let store = MemoryStore::new();
        store
            .entries()
            .unwrap()
            .insert("svc".to_string(), Secret::new("hidden"));

        let debug = format!("{:?}", store);
        assert!(debug.contains("svc"));
        assert!(!debug.contains("hidden"));
    }
}
