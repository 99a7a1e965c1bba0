//! Tag-based read cache and the invalidation port used by actions.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::RwLock;
use tracing::debug;

/// Signal that every cached read under `tag` is stale.
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn invalidate(&self, tag: &str);
}

/// Invalidator for deployments without a read cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInvalidator;

#[async_trait]
impl CacheInvalidator for NoopInvalidator {
    async fn invalidate(&self, _tag: &str) {}
}

#[derive(Default)]
struct TagEntry {
    generation: u64,
    reads: HashMap<String, Value>,
}

/// In-memory read-through cache partitioned by tag.
///
/// Each tag carries a generation counter bumped on invalidation. A load that
/// started before an invalidation finished is returned to its caller but not
/// stored.
pub struct TagCache {
    enabled: bool,
    entries: RwLock<HashMap<String, TagEntry>>,
}

impl TagCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Serve `key` under `tag` from memory, or run `load` and remember it.
    pub async fn get_or_load<T, E, F, Fut>(&self, tag: &str, key: &str, load: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.enabled {
            return load().await;
        }

        let generation = {
            let entries = self.entries.read().await;
            match entries.get(tag) {
                Some(entry) => {
                    if let Some(hit) = entry.reads.get(key) {
                        if let Ok(value) = serde_json::from_value::<T>(hit.clone()) {
                            debug!(tag, key, "Read cache hit");
                            return Ok(value);
                        }
                    }
                    entry.generation
                }
                None => 0,
            }
        };

        let value = load().await?;

        match serde_json::to_value(&value) {
            Ok(serialized) => {
                let mut entries = self.entries.write().await;
                let entry = entries.entry(tag.to_string()).or_default();
                if entry.generation == generation {
                    entry.reads.insert(key.to_string(), serialized);
                } else {
                    debug!(tag, key, "Discarding read that raced an invalidation");
                }
            }
            Err(e) => debug!(tag, key, error = %e, "Read not cacheable"),
        }

        Ok(value)
    }

    /// Number of invalidations seen for `tag` since startup
    pub async fn invalidations(&self, tag: &str) -> u64 {
        self.entries
            .read()
            .await
            .get(tag)
            .map(|entry| entry.generation)
            .unwrap_or(0)
    }
}

impl Default for TagCache {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl CacheInvalidator for TagCache {
    async fn invalidate(&self, tag: &str) {
        let mut entries = self.entries.write().await;
        let entry = entries.entry(tag.to_string()).or_default();
        entry.generation += 1;
        entry.reads.clear();
        debug!(tag, generation = entry.generation, "Invalidated cache tag");
    }
}
