//! Process-wide deduplicating cache of loaded namespace data.
//!
//! Entries are keyed by [`CacheKey`] (`"language:namespace"`). Concurrent
//! requests for a key that is not cached yet share one in-flight load: the
//! first caller starts it, later callers await a clone of the same shared
//! future, and every caller receives the same `Arc`.
//!
//! [`ResourceManager::global`] is the default process-wide instance; tests and
//! embedders that want isolation construct their own with
//! [`ResourceManager::new`] and inject it.

use crate::error::TranslationError;
use crate::i18n::{NamespaceData, TranslationBundle};
use crate::loader::{load_namespace, SharedLoader};
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::debug;

/// Identifies one loaded namespace payload. Never includes a key path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub language: String,
    pub namespace: String,
}

impl CacheKey {
    pub fn new(language: &str, namespace: &str) -> Self {
        Self {
            language: language.to_string(),
            namespace: namespace.to_string(),
        }
    }

    /// Whether this key falls under an invalidation filter.
    ///
    /// `None` matches anything, so `(None, None)` matches every key.
    pub fn matches(&self, language: Option<&str>, namespace: Option<&str>) -> bool {
        language.map_or(true, |language| self.language == language)
            && namespace.map_or(true, |namespace| self.namespace == namespace)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.language, self.namespace)
    }
}

/// A cached value and when it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: DateTime<Utc>,
    /// `None` means the entry lives until invalidated or evicted.
    pub ttl: Option<chrono::Duration>,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            timestamp: Utc::now(),
            ttl: None,
        }
    }

    pub fn with_ttl(data: T, ttl: chrono::Duration) -> Self {
        Self {
            data,
            timestamp: Utc::now(),
            ttl: Some(ttl),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.ttl.map_or(false, |ttl| now - self.timestamp >= ttl)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Snapshot of hit/miss counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    /// `hits / (hits + misses)`; `None` before the first request.
    pub hit_rate: Option<f64>,
}

impl CacheStats {
    pub fn new(hits: u64, misses: u64, size: usize) -> Self {
        let total = hits + misses;
        let hit_rate = if total > 0 {
            Some(hits as f64 / total as f64)
        } else {
            None
        };
        Self {
            hits,
            misses,
            size,
            hit_rate,
        }
    }
}

type LoadResult = Result<Arc<NamespaceData>, TranslationError>;
type PendingLoad = Shared<BoxFuture<'static, LoadResult>>;

struct InFlight {
    id: u64,
    load: PendingLoad,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry<Arc<NamespaceData>>>,
    /// Keys in first-insertion order; drives FIFO eviction.
    insertion_order: VecDeque<CacheKey>,
    in_flight: HashMap<CacheKey, InFlight>,
    hits: u64,
    misses: u64,
    max_size: Option<usize>,
    next_load_id: u64,
}

impl CacheState {
    fn insert(&mut self, key: CacheKey, data: Arc<NamespaceData>) {
        if self.entries.insert(key.clone(), CacheEntry::new(data)).is_none() {
            self.insertion_order.push_back(key);
        }
        self.enforce_limit();
    }

    fn remove_matching(&mut self, language: Option<&str>, namespace: Option<&str>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.matches(language, namespace));
        self.insertion_order
            .retain(|key| !key.matches(language, namespace));
        self.in_flight
            .retain(|key, _| !key.matches(language, namespace));
        before - self.entries.len()
    }

    fn enforce_limit(&mut self) {
        let Some(max_size) = self.max_size else {
            return;
        };
        while self.entries.len() > max_size {
            let Some(oldest) = self.insertion_order.pop_front() else {
                break;
            };
            if self.entries.remove(&oldest).is_some() {
                debug!("Evicted {} from translation cache (limit {})", oldest, max_size);
            }
        }
    }
}

/// Shared namespace cache with in-flight request deduplication.
///
/// Cloning yields another handle to the same cache.
#[derive(Clone, Default)]
pub struct ResourceManager {
    state: Arc<Mutex<CacheState>>,
}

/// Global cache instance (initialized lazily)
static GLOBAL: OnceLock<ResourceManager> = OnceLock::new();

impl ResourceManager {
    /// Create an isolated cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the process-wide cache instance.
    pub fn global() -> &'static ResourceManager {
        GLOBAL.get_or_init(ResourceManager::new)
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cache-first load of one namespace.
    ///
    /// On a miss with a load already in flight for the same key, the pending
    /// load is joined instead of calling `loader` again. Failed loads are not
    /// cached.
    pub async fn get_cached_translations(
        &self,
        language: &str,
        namespace: &str,
        loader: &SharedLoader,
    ) -> LoadResult {
        let key = CacheKey::new(language, namespace);

        let pending = {
            let mut state = self.lock();
            if let Some(entry) = state.entries.get(&key) {
                let data = Arc::clone(&entry.data);
                state.hits += 1;
                debug!("Translation cache hit for {}", key);
                return Ok(data);
            }
            let joined = state.in_flight.get(&key).map(|in_flight| in_flight.load.clone());
            if let Some(load) = joined {
                debug!("Joining in-flight load for {}", key);
                load
            } else {
                state.misses += 1;
                state.next_load_id += 1;
                let id = state.next_load_id;
                let load = self.start_load(key.clone(), id, Arc::clone(loader));
                state.in_flight.insert(
                    key.clone(),
                    InFlight {
                        id,
                        load: load.clone(),
                    },
                );
                debug!("Translation cache miss for {}, loading", key);
                load
            }
        };

        pending.await
    }

    fn start_load(&self, key: CacheKey, id: u64, loader: SharedLoader) -> PendingLoad {
        let state = Arc::clone(&self.state);
        async move {
            let result = load_namespace(loader.as_ref(), &key.language, &key.namespace)
                .await
                .map(Arc::new);

            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            // An invalidation (or a newer load) since this one started wins.
            let is_current = state
                .in_flight
                .get(&key)
                .map_or(false, |in_flight| in_flight.id == id);
            if is_current {
                state.in_flight.remove(&key);
                if let Ok(data) = &result {
                    state.insert(key, Arc::clone(data));
                }
            }
            result
        }
        .boxed()
        .shared()
    }

    /// Read a cached namespace without loading.
    pub fn get_cached_translations_sync(
        &self,
        language: &str,
        namespace: &str,
    ) -> Option<Arc<NamespaceData>> {
        self.lock()
            .entries
            .get(&CacheKey::new(language, namespace))
            .map(|entry| Arc::clone(&entry.data))
    }

    /// Drop cached entries and in-flight loads.
    ///
    /// `(Some, Some)` targets one key, `(Some, None)` a whole language,
    /// `(None, Some)` one namespace across languages and `(None, None)`
    /// everything.
    pub fn invalidate_cache(&self, language: Option<&str>, namespace: Option<&str>) {
        let removed = self.lock().remove_matching(language, namespace);
        debug!(
            "Invalidated {} cached namespaces (language: {:?}, namespace: {:?})",
            removed, language, namespace
        );
    }

    /// Evict oldest-inserted entries until at most `max_size` remain.
    ///
    /// The limit is kept and applied to later inserts. Eviction is by
    /// insertion order, not by access.
    pub fn set_cache_limit(&self, max_size: usize) {
        let mut state = self.lock();
        state.max_size = Some(max_size);
        state.enforce_limit();
    }

    /// Insert a hydration payload directly, bypassing the loader.
    pub fn hydrate_from_ssr(&self, translations: &TranslationBundle) {
        let mut state = self.lock();
        for (language, namespaces) in translations {
            for (namespace, data) in namespaces {
                state.insert(CacheKey::new(language, namespace), Arc::new(data.clone()));
            }
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats::new(state.hits, state.misses, state.entries.len())
    }

    pub fn is_loading(&self, language: &str, namespace: &str) -> bool {
        self.lock()
            .in_flight
            .contains_key(&CacheKey::new(language, namespace))
    }

    /// Cached keys, oldest first.
    pub fn cached_keys(&self) -> Vec<CacheKey> {
        self.lock().insertion_order.iter().cloned().collect()
    }
}

impl fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ResourceManager")
            .field("size", &state.entries.len())
            .field("in_flight", &state.in_flight.len())
            .field("max_size", &state.max_size)
            .finish()
    }
}
