use crate::auth_headers::AuthHeaders;
use crate::token_cache::{CacheEntry, TokenCache};
use anyhow::{Context, Result};
use async_trait::async_trait;
use file_guard::Lock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

type CacheKey = String;

// fcntl locks don't exclude threads of the same process
static IN_PROCESS_LOCK: Mutex<()> = Mutex::new(());

#[derive(Deserialize, Serialize)]
struct CacheState {
    version: u32,
    data: BTreeMap<CacheKey, CacheEntry>,
}

impl Default for CacheState {
    fn default() -> Self {
        CacheState {
            version: 1,
            data: BTreeMap::new(),
        }
    }
}

/// Token cache persisted as a JSON file, shared between processes.
pub struct FileTokenCache {
    file_path: PathBuf,
}

impl FileTokenCache {
    pub fn new() -> Result<FileTokenCache> {
        let mut home_dir = home::home_dir().context("Couldn't access $HOME_DIR")?;
        home_dir.push(".surveymonkey.json");

        Ok(FileTokenCache {
            file_path: home_dir,
        })
    }

    pub fn from(file_path: PathBuf) -> FileTokenCache {
        FileTokenCache { file_path }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn lock_path(&self) -> PathBuf {
        let mut path = self.file_path.clone().into_os_string();
        path.push(".lock");
        PathBuf::from(path)
    }

    /// Runs `update` against the current state while holding the file lock.
    /// The state is written back only when `update` reports a change.
    async fn with_state<T, F>(&self, update: F) -> Result<T>
    where
        F: FnOnce(&mut CacheState) -> (T, bool) + Send + 'static,
        T: Send + 'static,
    {
        let file_path = self.file_path.clone();
        let lock_path = self.lock_path();

        tokio::task::spawn_blocking(move || -> Result<T> {
            let _in_process = IN_PROCESS_LOCK
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            let lock_file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(false)
                .open(&lock_path)
                .with_context(|| {
                    format!("Failed to open {} lock file", lock_path.to_string_lossy())
                })?;
            let _guard = file_guard::lock(&lock_file, Lock::Exclusive, 0, 1)
                .context("Failed to lock the cache file")?;

            let mut state = read(&file_path);
            let (value, changed) = update(&mut state);

            if changed {
                write(&file_path, &state)?;
            }

            Ok(value)
        })
        .await
        .context("Cache file task failed")?
    }
}

fn read(file_path: &Path) -> CacheState {
    log::debug!("Reading the cache file");
    let text = fs::read_to_string(file_path).unwrap_or_default();

    serde_json::from_str::<CacheState>(&text).unwrap_or_default()
}

fn write(file_path: &Path, state: &CacheState) -> Result<()> {
    log::debug!("Writing the cache file");
    let state_str = serde_json::to_string(state).context("Failed to serialize cache state")?;

    if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {} directory", parent.to_string_lossy()))?;
    }

    fs::write(file_path, state_str)
        .with_context(|| format!("Failed to write to {} file", file_path.to_string_lossy()))?;

    Ok(())
}

#[async_trait]
impl TokenCache for FileTokenCache {
    async fn get(&self, key: &str) -> Result<Option<AuthHeaders>> {
        log::debug!("Reading headers for key: {} from the cache file", key);
        let key = key.to_owned();

        self.with_state(move |state| {
            let Some(entry) = state.data.get(&key) else {
                return (None, false);
            };

            if !entry.is_expired() {
                return (Some(entry.headers.clone()), false);
            }

            log::debug!("Cached headers for key: {} expired", key);
            state.data.remove(&key);
            (None, true)
        })
        .await
    }

    async fn set(&self, key: &str, headers: &AuthHeaders, ttl: Duration) -> Result<()> {
        log::debug!(
            "Saving headers for key: {} to the cache file with ttl: {:?}",
            key,
            ttl
        );
        let key = key.to_owned();
        let entry = CacheEntry::new(headers.clone(), ttl);

        self.with_state(move |state| {
            state.data.insert(key, entry);
            ((), true)
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        log::debug!("Clearing headers for key: {} in the cache file", key);
        let key = key.to_owned();

        self.with_state(move |state| {
            state.data.remove(&key);
            ((), true)
        })
        .await
    }
}
