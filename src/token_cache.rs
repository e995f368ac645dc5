use crate::auth_headers::AuthHeaders;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;

/// Key/value store for authorization headers with a per-entry TTL.
#[async_trait]
pub trait TokenCache: Send + Sync {
    /// Returns `None` for missing and expired entries.
    async fn get(&self, key: &str) -> Result<Option<AuthHeaders>>;

    async fn set(&self, key: &str, headers: &AuthHeaders, ttl: Duration) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}

/// Longest TTL an entry is stored with. Larger values are clamped to it.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct CacheEntry {
    pub headers: AuthHeaders,

    pub expires: SystemTime,
}

impl CacheEntry {
    pub fn new(headers: AuthHeaders, ttl: Duration) -> CacheEntry {
        CacheEntry {
            headers,
            expires: SystemTime::now() + ttl.min(MAX_TTL),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires <= SystemTime::now()
    }
}

#[derive(Default)]
pub struct MemoryTokenCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryTokenCache {
    pub fn new() -> MemoryTokenCache {
        MemoryTokenCache::default()
    }
}

#[async_trait]
impl TokenCache for MemoryTokenCache {
    async fn get(&self, key: &str) -> Result<Option<AuthHeaders>> {
        let mut entries = self.entries.lock().await;

        let Some(entry) = entries.get(key) else {
            return Ok(None);
        };

        if !entry.is_expired() {
            return Ok(Some(entry.headers.clone()));
        }

        log::debug!("Cached headers for key: {} expired", key);
        entries.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, headers: &AuthHeaders, ttl: Duration) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_owned(), CacheEntry::new(headers.clone(), ttl));

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);

        Ok(())
    }
}
