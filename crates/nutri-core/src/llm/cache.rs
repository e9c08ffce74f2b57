//! Persistent image result cache with FIFO eviction.
//!
//! Keys are image paths, compared as exact strings. Values are complete
//! [`LlmResponse`]s. Entries are kept in insertion order and, once the cache
//! holds more than `capacity` entries, the oldest-inserted ones are dropped
//! first. Reading an entry does not refresh its position.
//!
//! The cache persists to a JSON file after every mutation and reloads it on
//! open, so analyses survive restarts. Construct one and hand the same
//! `Arc<ResultCache>` to every gateway that should share it.

use super::response::LlmResponse;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, trace, warn};

/// On-disk representation, oldest entry first.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    entries: Vec<CacheFileEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheFileEntry {
    key: String,
    response: LlmResponse,
}

#[derive(Debug, Default)]
struct CacheState {
    order: VecDeque<String>,
    entries: HashMap<String, LlmResponse>,
}

impl CacheState {
    fn from_file(file: CacheFile) -> Self {
        let mut state = Self::default();
        for entry in file.entries {
            if !entry.response.is_well_formed() {
                warn!(key = %entry.key, "Dropping malformed cache entry");
                continue;
            }
            state.insert(entry.key, entry.response);
        }
        state
    }

    fn to_file(&self) -> CacheFile {
        CacheFile {
            entries: self
                .order
                .iter()
                .filter_map(|key| {
                    self.entries.get(key).map(|response| CacheFileEntry {
                        key: key.clone(),
                        response: response.clone(),
                    })
                })
                .collect(),
        }
    }

    /// Insert or overwrite. Overwriting keeps the original insertion slot.
    fn insert(&mut self, key: String, response: LlmResponse) {
        if self.entries.insert(key.clone(), response).is_none() {
            self.order.push_back(key);
        }
    }

    fn evict_to(&mut self, capacity: usize) -> usize {
        let mut evicted = 0;
        while self.order.len() > capacity {
            if let Some(oldest) = self.order.pop_front() {
                trace!(key = %oldest, "Evicting oldest cache entry");
                self.entries.remove(&oldest);
                evicted += 1;
            }
        }
        evicted
    }
}

/// Bounded, insertion-ordered, file-backed cache of image responses.
pub struct ResultCache {
    state: RwLock<CacheState>,
    path: Option<PathBuf>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    /// Open the cache backed by `path`, loading any entries already on disk.
    ///
    /// A missing file starts empty; an unreadable or corrupt one is logged
    /// and replaced on the next write. `capacity` is clamped to a minimum
    /// of 1. Entries beyond capacity loaded from disk stay until the next
    /// [`evict_overflow`](Self::evict_overflow) or [`put`](Self::put).
    pub fn open(path: impl Into<PathBuf>, capacity: usize) -> Self {
        let path = path.into();
        let state = CacheState::from_file(Self::load_from_disk(&path));
        debug!(
            path = %path.display(),
            entries = state.order.len(),
            "Opened image result cache"
        );
        Self::with_state(state, Some(path), capacity)
    }

    /// A cache that never touches the filesystem.
    pub fn in_memory(capacity: usize) -> Self {
        Self::with_state(CacheState::default(), None, capacity)
    }

    fn with_state(state: CacheState, path: Option<PathBuf>, capacity: usize) -> Self {
        Self {
            state: RwLock::new(state),
            path,
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a cached response by exact key.
    pub async fn get(&self, key: &str) -> Option<LlmResponse> {
        let found = self.state.read().await.entries.get(key).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Whether `key` is cached, without touching hit/miss counters.
    pub async fn contains(&self, key: &str) -> bool {
        self.state.read().await.entries.contains_key(key)
    }

    /// Store a response, then evict oldest entries down to capacity and
    /// persist.
    pub async fn put(&self, key: impl Into<String>, response: LlmResponse) {
        let mut state = self.state.write().await;
        state.insert(key.into(), response);
        state.evict_to(self.capacity);
        self.persist(&state).await;
    }

    /// Drop oldest entries until the cache is within capacity.
    /// Returns how many were removed.
    pub async fn evict_overflow(&self) -> usize {
        if self.state.read().await.order.len() <= self.capacity {
            return 0;
        }
        let mut state = self.state.write().await;
        let evicted = state.evict_to(self.capacity);
        if evicted > 0 {
            debug!(evicted, "Trimmed image result cache to capacity");
            self.persist(&state).await;
        }
        evicted
    }

    /// Remove every entry.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        *state = CacheState::default();
        self.persist(&state).await;
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Cached keys, oldest first.
    pub async fn keys(&self) -> Vec<String> {
        self.state.read().await.order.iter().cloned().collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Aggregate statistics since this cache was opened.
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len().await,
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    // -- private helpers ---------------------------------------------------

    fn load_from_disk(path: &Path) -> CacheFile {
        match std::fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(file) => file,
                Err(e) => {
                    warn!("Image result cache file is corrupt, starting empty: {e}");
                    CacheFile::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CacheFile::default(),
            Err(e) => {
                warn!("Failed to read image result cache, starting empty: {e}");
                CacheFile::default()
            }
        }
    }

    /// Write the state to disk. Called with the write lock held, so file
    /// writes are serialized with mutations.
    async fn persist(&self, state: &CacheState) {
        let Some(path) = &self.path else {
            return;
        };
        let data = match serde_json::to_string_pretty(&state.to_file()) {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to serialize image result cache: {e}");
                return;
            }
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!("Failed to create cache directory {}: {e}", parent.display());
                return;
            }
        }
        let tmp = path.with_extension("json.tmp");
        let written = match tokio::fs::write(&tmp, data).await {
            Ok(()) => tokio::fs::rename(&tmp, path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            warn!("Failed to save image result cache: {e}");
        }
    }
}

/// Aggregate cache statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries currently cached
    pub entries: usize,
    /// Configured maximum
    pub capacity: usize,
    /// Lookups that found an entry
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::response::ErrorKind;

    fn response(text: &str) -> LlmResponse {
        LlmResponse::completed(text.to_string(), 1, None)
    }

    #[tokio::test]
    async fn test_hit_and_miss() {
        let cache = ResultCache::in_memory(10);
        assert!(cache.get("meal.jpg").await.is_none());
        cache.put("meal.jpg", response("soup")).await;
        assert_eq!(cache.get("meal.jpg").await, Some(response("soup")));

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_fifo_eviction_beyond_capacity() {
        let cache = ResultCache::in_memory(10);
        for i in 0..15 {
            cache.put(format!("img-{i}"), response(&i.to_string())).await;
        }
        assert_eq!(cache.len().await, 10);
        for i in 0..5 {
            assert!(!cache.contains(&format!("img-{i}")).await, "img-{i} should be evicted");
        }
        for i in 5..15 {
            assert!(cache.contains(&format!("img-{i}")).await, "img-{i} should remain");
        }
    }

    #[tokio::test]
    async fn test_reads_do_not_refresh_position() {
        let cache = ResultCache::in_memory(2);
        cache.put("a", response("a")).await;
        cache.put("b", response("b")).await;
        // An LRU would keep "a" after this read; FIFO must not.
        assert!(cache.get("a").await.is_some());
        cache.put("c", response("c")).await;
        assert_eq!(cache.keys().await, vec!["b".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn test_overwrite_keeps_slot() {
        let cache = ResultCache::in_memory(2);
        cache.put("a", response("a1")).await;
        cache.put("b", response("b")).await;
        cache.put("a", response("a2")).await;
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("a").await, Some(response("a2")));
        cache.put("c", response("c")).await;
        assert!(!cache.contains("a").await);
    }

    #[tokio::test]
    async fn test_keys_are_exact_strings() {
        let cache = ResultCache::in_memory(4);
        cache.put("/tmp/meal.jpg", response("x")).await;
        assert!(!cache.contains("/tmp/./meal.jpg").await);
        assert!(!cache.contains("/TMP/meal.jpg").await);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.json");

        let cache = ResultCache::open(&path, 5);
        cache.put("first.jpg", response("one")).await;
        cache
            .put(
                "second.jpg",
                LlmResponse::completed("{\"a\":1}".into(), 4, Some(serde_json::json!({"a": 1}))),
            )
            .await;
        drop(cache);

        let reopened = ResultCache::open(&path, 5);
        assert_eq!(reopened.keys().await, vec!["first.jpg", "second.jpg"]);
        let second = reopened.get("second.jpg").await.unwrap();
        assert_eq!(second.parsed_json(), Some(&serde_json::json!({"a": 1})));
        assert_eq!(second.tokens(), Some(4));
    }

    #[tokio::test]
    async fn test_reopen_with_smaller_capacity_trims_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let cache = ResultCache::open(&path, 10);
        for i in 0..6 {
            cache.put(format!("img-{i}"), response("x")).await;
        }
        drop(cache);

        let smaller = ResultCache::open(&path, 4);
        assert_eq!(smaller.len().await, 6);
        assert_eq!(smaller.evict_overflow().await, 2);
        assert_eq!(smaller.keys().await, vec!["img-2", "img-3", "img-4", "img-5"]);
        assert_eq!(smaller.evict_overflow().await, 0);

        let again = ResultCache::open(&path, 4);
        assert_eq!(again.len().await, 4);
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{ not json").unwrap();

        let cache = ResultCache::open(&path, 3);
        assert!(cache.is_empty().await);
        cache.put("a", response("a")).await;
        assert_eq!(ResultCache::open(&path, 3).len().await, 1);
    }

    #[tokio::test]
    async fn test_malformed_entries_dropped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let failed = serde_json::to_value(LlmResponse::failed(ErrorKind::Timeout {
            timeout_ms: 10,
        }))
        .unwrap();
        let file = serde_json::json!({
            "entries": [
                {"key": "good.jpg", "response": {"text": "ok", "tokens": 1}},
                {"key": "both.jpg", "response": {"text": "ok", "error": failed["error"]}},
                {"key": "neither.jpg", "response": {}}
            ]
        });
        std::fs::write(&path, file.to_string()).unwrap();

        let cache = ResultCache::open(&path, 3);
        assert_eq!(cache.keys().await, vec!["good.jpg"]);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = ResultCache::in_memory(3);
        cache.put("a", response("a")).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts_respect_capacity() {
        let cache = std::sync::Arc::new(ResultCache::in_memory(8));
        let mut handles = Vec::new();
        for i in 0..32 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache.put(format!("img-{i}"), response("x")).await;
                let _ = cache.get(&format!("img-{}", i / 2)).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(cache.len().await, 8);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        assert_eq!(ResultCache::in_memory(0).capacity(), 1);
    }
}
