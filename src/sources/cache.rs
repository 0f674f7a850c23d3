//! TTL cache for source responses.
//!
//! Sources cache raw response payloads between invocations so that listing
//! a large catalog does not hammer the remote on every command. The CLI is
//! short-lived, so the default backend persists to disk; the in-memory
//! backend exists for tests and for embedding the library in a daemon.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::util::config::Config;
use crate::util::fs::ensure_dir;
use crate::util::hash::sha256_str;

/// Backend summary for the `cache status` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatus {
    pub backend: &'static str,
    /// Entries present, including expired ones not yet reaped.
    pub entries: usize,
    /// Entries that would still be served.
    pub live: usize,
}

/// A TTL key-value store for JSON response payloads.
pub trait Cache: Send + Sync {
    /// Fetch a live entry. Expired entries are treated as absent.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store an entry for `ttl` from now.
    fn put(&self, key: &str, value: Value, ttl: Duration);

    fn remove(&self, key: &str);

    fn clear(&self);

    fn status(&self) -> CacheStatus;
}

/// In-memory cache, gone when the process exits.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

struct MemoryEntry {
    value: Value,
    expires_at: Instant,
}

impl MemoryCache {
    pub fn new() -> Self {
        MemoryCache::default()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: &str, value: Value, ttl: Duration) {
        let entry = MemoryEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().unwrap().insert(key.to_string(), entry);
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    fn status(&self) -> CacheStatus {
        let entries = self.entries.lock().unwrap();
        let now = Instant::now();
        CacheStatus {
            backend: "memory",
            entries: entries.len(),
            live: entries.values().filter(|e| e.expires_at > now).count(),
        }
    }
}

/// On-disk envelope: expiry is wall-clock so it survives restarts.
#[derive(Serialize, Deserialize)]
struct DiskEntry {
    expires_at: u64,
    value: Value,
}

/// Disk cache with one file per key under the cache directory.
///
/// Filenames are the SHA-256 of the key, so keys may contain slashes and
/// query strings. Corrupt or expired files count as misses and are removed
/// on read.
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(DiskCache { dir })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sha256_str(key)))
    }

    fn read_entry(&self, path: &Path) -> Option<DiskEntry> {
        let contents = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&contents).ok()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl Cache for DiskCache {
    fn get(&self, key: &str) -> Option<Value> {
        let path = self.entry_path(key);
        if !path.exists() {
            return None;
        }
        match self.read_entry(&path) {
            Some(entry) if entry.expires_at > unix_now() => Some(entry.value),
            _ => {
                let _ = std::fs::remove_file(&path);
                None
            }
        }
    }

    fn put(&self, key: &str, value: Value, ttl: Duration) {
        let entry = DiskEntry {
            expires_at: unix_now().saturating_add(ttl.as_secs()),
            value,
        };
        let path = self.entry_path(key);
        match serde_json::to_string(&entry) {
            Ok(contents) => {
                if let Err(e) = std::fs::write(&path, contents) {
                    tracing::warn!("failed to write cache entry {}: {}", path.display(), e);
                }
            }
            Err(e) => tracing::warn!("failed to encode cache entry for `{}`: {}", key, e),
        }
    }

    fn remove(&self, key: &str) {
        let _ = std::fs::remove_file(self.entry_path(key));
    }

    fn clear(&self) {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let _ = std::fs::remove_file(path);
            }
        }
    }

    fn status(&self) -> CacheStatus {
        let mut total = 0;
        let mut live = 0;
        let now = unix_now();
        if let Ok(entries) = std::fs::read_dir(&self.dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if !path.extension().is_some_and(|ext| ext == "json") {
                    continue;
                }
                total += 1;
                if let Some(entry) = self.read_entry(&path) {
                    if entry.expires_at > now {
                        live += 1;
                    }
                }
            }
        }
        CacheStatus {
            backend: "disk",
            entries: total,
            live,
        }
    }
}

/// Cache that never hits, for `--no-cache` and disabled configs.
pub struct NoCache;

impl Cache for NoCache {
    fn get(&self, _key: &str) -> Option<Value> {
        None
    }

    fn put(&self, _key: &str, _value: Value, _ttl: Duration) {}

    fn remove(&self, _key: &str) {}

    fn clear(&self) {}

    fn status(&self) -> CacheStatus {
        CacheStatus {
            backend: "none",
            entries: 0,
            live: 0,
        }
    }
}

/// Build the cache backend the configuration asks for.
///
/// Falls back from disk to memory when the cache directory is unusable.
pub fn cache_from_config(config: &Config, no_cache: bool) -> Arc<dyn Cache> {
    if no_cache || !config.cache.enabled {
        return Arc::new(NoCache);
    }
    match config.cache_dir() {
        Some(dir) => match DiskCache::new(&dir) {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                tracing::warn!("cache directory {} unusable: {}", dir.display(), e);
                Arc::new(MemoryCache::new())
            }
        },
        None => Arc::new(MemoryCache::new()),
    }
}
