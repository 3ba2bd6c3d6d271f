//! Settings persistence
//!
//! The engine reads and writes per-community configuration through the
//! `SettingsStore` trait. Two implementations ship with the crate: a
//! YAML file store and an in-memory store for tests and embedding. A
//! bounded cache sits in front of whichever store is used.

use crate::SETTINGS_TARGET;
use crate::automod::{AutomodConfig, CommunityId};
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::warn;

/// Errors raised by settings persistence
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings serialization error: {0}")]
    Serde(#[from] serde_yaml::Error),

    #[error("settings backend error: {0}")]
    Backend(String),
}

/// Per-community configuration persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load a community's configuration, `None` if it was never
    /// configured
    async fn load(&self, community: CommunityId) -> Result<Option<AutomodConfig>, SettingsError>;

    /// Persist a community's configuration. The change is not durable
    /// until this returns ok.
    async fn save(&self, config: &AutomodConfig) -> Result<(), SettingsError>;
}

/// File-backed store holding all community configs in one YAML file
pub struct YamlSettingsStore {
    path: PathBuf,
    configs: DashMap<CommunityId, AutomodConfig>,
    // Serializes snapshot-and-write so a pair of overlapping saves
    // cannot leave the file missing the earlier insert
    persist_lock: tokio::sync::Mutex<()>,
}

impl YamlSettingsStore {
    /// Open a store, loading existing configs from `path` if the file
    /// exists. Stored configs that violate the threshold invariant are
    /// skipped with a warning.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let configs = DashMap::new();

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let loaded: Vec<AutomodConfig> = serde_yaml::from_str(&content)?;
                for config in loaded {
                    if let Err(e) = config.validate() {
                        warn!(
                            target: SETTINGS_TARGET,
                            community_id = %config.community_id,
                            error = %e,
                            "Skipping invalid stored config"
                        );
                        continue;
                    }
                    configs.insert(config.community_id, config);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            path,
            configs,
            persist_lock: tokio::sync::Mutex::new(()),
        })
    }

    async fn persist(&self) -> Result<(), SettingsError> {
        let _guard = self.persist_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut all: Vec<AutomodConfig> = self
            .configs
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(|config| config.community_id);

        let yaml = serde_yaml::to_string(&all)?;
        tokio::fs::write(&self.path, yaml).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SettingsStore for YamlSettingsStore {
    async fn load(&self, community: CommunityId) -> Result<Option<AutomodConfig>, SettingsError> {
        Ok(self
            .configs
            .get(&community)
            .map(|entry| entry.value().clone()))
    }

    async fn save(&self, config: &AutomodConfig) -> Result<(), SettingsError> {
        self.configs.insert(config.community_id, config.clone());
        self.persist().await
    }
}

/// Store keeping configs in memory only. Useful for tests and for
/// embedders that bring their own persistence.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    configs: DashMap<CommunityId, AutomodConfig>,
}

impl MemorySettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self, community: CommunityId) -> Result<Option<AutomodConfig>, SettingsError> {
        Ok(self
            .configs
            .get(&community)
            .map(|entry| entry.value().clone()))
    }

    async fn save(&self, config: &AutomodConfig) -> Result<(), SettingsError> {
        self.configs.insert(config.community_id, config.clone());
        Ok(())
    }
}

/// Default bound on cached communities
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Bounded read-through cache over a settings store.
///
/// Writes go to the store first and land in the cache only after the
/// store accepted them, so a process never reads a value older than
/// its own most recent successful write. Least-recently-used
/// communities are evicted once the bound is hit.
pub struct ConfigCache {
    store: Arc<dyn SettingsStore>,
    entries: DashMap<CommunityId, CacheEntry>,
    capacity: usize,
    clock: AtomicU64,
}

struct CacheEntry {
    config: AutomodConfig,
    last_used: u64,
}

impl ConfigCache {
    #[must_use]
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self::with_capacity(store, DEFAULT_CACHE_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(store: Arc<dyn SettingsStore>, capacity: usize) -> Self {
        Self {
            store,
            entries: DashMap::new(),
            capacity: capacity.max(1),
            clock: AtomicU64::new(0),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Configuration for a community; a fresh default (not persisted)
    /// if it was never configured.
    pub async fn get(&self, community: CommunityId) -> Result<AutomodConfig, SettingsError> {
        if let Some(mut entry) = self.entries.get_mut(&community) {
            entry.last_used = self.tick();
            return Ok(entry.config.clone());
        }

        let config = self
            .store
            .load(community)
            .await?
            .unwrap_or_else(|| AutomodConfig::new(community));
        self.insert(community, config.clone());
        Ok(config)
    }

    /// Persist a configuration and refresh the cached copy
    pub async fn save(&self, config: AutomodConfig) -> Result<(), SettingsError> {
        self.store.save(&config).await?;
        self.insert(config.community_id, config);
        Ok(())
    }

    fn insert(&self, community: CommunityId, config: AutomodConfig) {
        let last_used = self.tick();
        self.entries
            .insert(community, CacheEntry { config, last_used });

        while self.entries.len() > self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().last_used)
                .map(|entry| *entry.key());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }

    /// Number of communities currently cached
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automod::ActionKind;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemorySettingsStore::new();
        assert!(store.load(1).await.unwrap().is_none());

        let mut config = AutomodConfig::new(1);
        config.set_max_strikes(3).unwrap();
        store.save(&config).await.unwrap();

        let loaded = store.load(1).await.unwrap().unwrap();
        assert_eq!(loaded.max_strikes, Some(3));
    }

    #[tokio::test]
    async fn test_yaml_store_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "strike-warden-test-{}.yaml",
            uuid::Uuid::new_v4()
        ));

        {
            let store = YamlSettingsStore::open(&path).await.unwrap();
            let mut config = AutomodConfig::new(42);
            config.set_max_strikes(5).unwrap();
            config.action = Some(ActionKind::Ban);
            store.save(&config).await.unwrap();
        }

        // Re-open from disk
        let store = YamlSettingsStore::open(&path).await.unwrap();
        let loaded = store.load(42).await.unwrap().unwrap();
        assert_eq!(loaded.max_strikes, Some(5));
        assert_eq!(loaded.action, Some(ActionKind::Ban));
        assert!(store.load(43).await.unwrap().is_none());

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_yaml_store_overlapping_saves_both_reach_disk() {
        let path = std::env::temp_dir().join(format!(
            "strike-warden-test-{}.yaml",
            uuid::Uuid::new_v4()
        ));

        {
            let store = YamlSettingsStore::open(&path).await.unwrap();

            let mut first = AutomodConfig::new(1);
            first.set_max_strikes(1).unwrap();
            let mut second = AutomodConfig::new(2);
            second.set_max_strikes(2).unwrap();

            let (a, b) = tokio::join!(store.save(&first), store.save(&second));
            a.unwrap();
            b.unwrap();
        }

        // Whichever write hit the file last must include both configs
        let store = YamlSettingsStore::open(&path).await.unwrap();
        assert_eq!(store.load(1).await.unwrap().unwrap().max_strikes, Some(1));
        assert_eq!(store.load(2).await.unwrap().unwrap().max_strikes, Some(2));

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_yaml_store_skips_invalid_stored_config() {
        let path = std::env::temp_dir().join(format!(
            "strike-warden-test-{}.yaml",
            uuid::Uuid::new_v4()
        ));

        let broken = AutomodConfig {
            community_id: 7,
            max_strikes: Some(0),
            action: None,
            debug_enabled: false,
            log_channel_id: None,
        };
        let yaml = serde_yaml::to_string(&vec![broken]).unwrap();
        tokio::fs::write(&path, yaml).await.unwrap();

        let store = YamlSettingsStore::open(&path).await.unwrap();
        assert!(store.load(7).await.unwrap().is_none());

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_cache_returns_default_for_unconfigured() {
        let cache = ConfigCache::new(Arc::new(MemorySettingsStore::new()));
        let config = cache.get(9).await.unwrap();
        assert_eq!(config, AutomodConfig::new(9));
    }

    #[tokio::test]
    async fn test_cache_read_your_writes() {
        // A store that always serves a stale threshold
        let mut store = MockSettingsStore::new();
        let mut stale = AutomodConfig::new(1);
        stale.set_max_strikes(2).unwrap();
        store
            .expect_load()
            .returning(move |_| Ok(Some(stale.clone())));
        store.expect_save().returning(|_| Ok(()));

        let cache = ConfigCache::new(Arc::new(store));

        let mut fresh = AutomodConfig::new(1);
        fresh.set_max_strikes(10).unwrap();
        cache.save(fresh).await.unwrap();

        // The cache must serve the written value, not the store's
        let config = cache.get(1).await.unwrap();
        assert_eq!(config.max_strikes, Some(10));
    }

    #[tokio::test]
    async fn test_cache_not_updated_when_save_fails() {
        let mut store = MockSettingsStore::new();
        store.expect_load().returning(|_| Ok(None));
        store
            .expect_save()
            .returning(|_| Err(SettingsError::Backend("down".to_string())));

        let cache = ConfigCache::new(Arc::new(store));

        let mut config = AutomodConfig::new(1);
        config.set_max_strikes(10).unwrap();
        assert!(cache.save(config).await.is_err());

        // Change never became durable, so the cache serves the default
        assert_eq!(cache.get(1).await.unwrap().max_strikes, None);
    }

    #[tokio::test]
    async fn test_cache_evicts_least_recently_used() {
        let store = Arc::new(MemorySettingsStore::new());
        let cache = ConfigCache::with_capacity(store.clone(), 2);

        for community in [1, 2, 3] {
            let mut config = AutomodConfig::new(community);
            config.set_max_strikes(community as u32).unwrap();
            cache.save(config).await.unwrap();
        }
        assert_eq!(cache.len(), 2);

        // The evicted community is still served, from the store
        let config = cache.get(1).await.unwrap();
        assert_eq!(config.max_strikes, Some(1));
    }
}
