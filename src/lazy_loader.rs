//! On-demand and best-effort namespace loading over a [`ResourceManager`].

use crate::error::TranslationError;
use crate::i18n::NamespaceData;
use crate::loader::SharedLoader;
use crate::resource_manager::{CacheKey, ResourceManager};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Introspection counters for a lazy loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub load_history_size: usize,
    pub preloaded_count: usize,
}

#[derive(Default)]
struct Tracking {
    preloaded: HashSet<CacheKey>,
    /// Last successful on-demand load per key.
    load_history: HashMap<CacheKey, DateTime<Utc>>,
}

/// Loads namespaces when first needed and remembers what was preloaded.
pub struct LazyLoader {
    resources: ResourceManager,
    tracking: Mutex<Tracking>,
}

impl LazyLoader {
    pub fn new(resources: ResourceManager) -> Self {
        Self {
            resources,
            tracking: Mutex::new(Tracking::default()),
        }
    }

    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    fn tracking(&self) -> MutexGuard<'_, Tracking> {
        self.tracking.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load through the shared cache, inheriting its deduplication.
    pub async fn load_on_demand(
        &self,
        language: &str,
        namespace: &str,
        loader: &SharedLoader,
    ) -> Result<Arc<NamespaceData>, TranslationError> {
        let data = self
            .resources
            .get_cached_translations(language, namespace, loader)
            .await?;
        self.tracking()
            .load_history
            .insert(CacheKey::new(language, namespace), Utc::now());
        Ok(data)
    }

    /// Warm the cache for one namespace.
    ///
    /// Repeat calls for a pair already preloaded return without touching the
    /// loader. Failures are logged and swallowed; the pair is unmarked so a
    /// later preload can try again.
    pub async fn preload_namespace(&self, language: &str, namespace: &str, loader: &SharedLoader) {
        let key = CacheKey::new(language, namespace);
        if !self.tracking().preloaded.insert(key.clone()) {
            return;
        }

        if let Err(e) = self.load_on_demand(language, namespace, loader).await {
            debug!("Preload of {} failed: {}", key, e);
            self.tracking().preloaded.remove(&key);
        }
    }

    /// Preload several namespaces concurrently and wait for all to settle.
    pub async fn preload_multiple_namespaces<S: AsRef<str>>(
        &self,
        language: &str,
        namespaces: &[S],
        loader: &SharedLoader,
    ) {
        join_all(
            namespaces
                .iter()
                .map(|namespace| self.preload_namespace(language, namespace.as_ref(), loader)),
        )
        .await;
    }

    pub fn is_preloaded(&self, language: &str, namespace: &str) -> bool {
        self.tracking()
            .preloaded
            .contains(&CacheKey::new(language, namespace))
    }

    pub fn load_stats(&self) -> LoadStats {
        let tracking = self.tracking();
        LoadStats {
            load_history_size: tracking.load_history.len(),
            preloaded_count: tracking.preloaded.len(),
        }
    }

    /// Invalidate the shared cache and forget matching preload/history entries.
    pub fn invalidate_cache(&self, language: Option<&str>, namespace: Option<&str>) {
        self.resources.invalidate_cache(language, namespace);
        let mut tracking = self.tracking();
        tracking
            .preloaded
            .retain(|key| !key.matches(language, namespace));
        tracking
            .load_history
            .retain(|key, _| !key.matches(language, namespace));
    }
}

impl Default for LazyLoader {
    /// A lazy loader over the process-wide cache.
    fn default() -> Self {
        Self::new(ResourceManager::global().clone())
    }
}
