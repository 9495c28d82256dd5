// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory config store fake for testing without filesystem I/O.

use replay_core::config::{ConfigError, ConfigStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory implementation of [`ConfigStore`] for testing.
///
/// Clones share one backing map, so a test can hand one clone to a
/// `ConfigService` and inspect the other. Call counts and failure injection
/// are available for verification.
///
/// # Example
///
/// ```
/// use replay_dry_tests::InMemoryConfigStore;
/// use replay_core::config::ConfigService;
/// use replay_core::EngineConfig;
///
/// let store = InMemoryConfigStore::new();
/// let service = ConfigService::new(store.clone());
///
/// service.save_engine(&EngineConfig::default()).unwrap();
/// assert_eq!(store.load_count(), 0);
/// assert_eq!(store.save_count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryConfigStore {
    inner: Arc<Mutex<InMemoryConfigStoreInner>>,
}

#[derive(Default)]
struct InMemoryConfigStoreInner {
    data: HashMap<String, Vec<u8>>,
    load_count: usize,
    save_count: usize,
    fail_on_load: bool,
    fail_on_save: bool,
}

impl InMemoryConfigStore {
    /// Create a new empty in-memory config store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one raw document under `key`.
    pub fn with_document(key: &str, document: &[u8]) -> Self {
        let store = Self::new();
        store.lock().data.insert(key.to_owned(), document.to_vec());
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryConfigStoreInner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Configure the store to fail on load operations.
    pub fn set_fail_on_load(&self, fail: bool) {
        self.lock().fail_on_load = fail;
    }

    /// Configure the store to fail on save operations.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.lock().fail_on_save = fail;
    }

    /// Number of `load_raw` attempts, including failed ones.
    pub fn load_count(&self) -> usize {
        self.lock().load_count
    }

    /// Number of `save_raw` attempts, including failed ones.
    pub fn save_count(&self) -> usize {
        self.lock().save_count
    }

    /// Raw bytes currently stored under `key`.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().data.get(key).cloned()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let mut inner = self.lock();
        inner.load_count += 1;

        if inner.fail_on_load {
            return Err(ConfigError::Other("simulated load failure".into()));
        }

        inner.data.get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut inner = self.lock();
        inner.save_count += 1;

        if inner.fail_on_save {
            return Err(ConfigError::Other("simulated save failure".into()));
        }

        inner.data.insert(key.to_string(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use replay_core::config::{ConfigService, ENGINE_CONFIG_KEY};
    use replay_core::{ChannelPolicy, EngineConfig};

    #[test]
    fn round_trip_save_load() {
        let store = InMemoryConfigStore::new();
        store.save_raw("test", b"hello").unwrap();
        assert_eq!(store.load_raw("test").unwrap(), b"hello");
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn load_missing_key_returns_not_found() {
        let store = InMemoryConfigStore::new();
        assert!(matches!(store.load_raw("missing"), Err(ConfigError::NotFound)));
    }

    #[test]
    fn injected_failures_surface_through_the_service() {
        let store = InMemoryConfigStore::with_document(ENGINE_CONFIG_KEY, b"{}");
        store.set_fail_on_load(true);
        let service = ConfigService::new(store.clone());
        assert!(matches!(service.load_engine(), Err(ConfigError::Other(_))));
        store.set_fail_on_save(true);
        assert!(matches!(
            service.save_engine(&EngineConfig::default()),
            Err(ConfigError::Other(_))
        ));
        assert_eq!(store.load_count(), 1);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn service_writes_json() {
        let store = InMemoryConfigStore::new();
        let service = ConfigService::new(store.clone());
        let config = EngineConfig {
            channel_policy: ChannelPolicy::Reject,
            ..EngineConfig::default()
        };
        service.save_engine(&config).unwrap();
        let raw = store.raw(ENGINE_CONFIG_KEY).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(doc["channel_policy"], "reject");
        assert_eq!(doc["hash"], "keccak256");
        assert_eq!(service.load_engine().unwrap(), config);
    }
}
