//! Caché en memoria con TTL, misma semántica que `RedisClient`

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::CacheOperations;

struct Entry {
    value: String,
    expires_at: Instant,
}

#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }
}

#[async_trait::async_trait]
impl CacheOperations for MemoryCache {
    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let raw = {
            let entries = self.entries.read().await;
            entries
                .get(key)
                .filter(|e| e.expires_at > Instant::now())
                .map(|e| e.value.clone())
        };

        match raw {
            Some(value) => {
                debug!("📥 Cache HIT para clave: {}", key);
                Ok(Some(serde_json::from_str(&value)?))
            }
            None => {
                debug!("❌ Cache MISS para clave: {}", key);
                Ok(None)
            }
        }
    }

    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: u64) -> Result<()> {
        let entry = Entry {
            value: serde_json::to_string(value)?,
            expires_at: Instant::now() + Duration::from_secs(ttl),
        };
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(key.to_string(), entry);
        drop(entries);
        debug!("💾 Cache SET para clave: {} (TTL: {}s)", key, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        debug!("🗑️ Cache DELETE para clave: {}", key);
        Ok(())
    }
}
