//! The per-application translation engine.
//!
//! A [`Translator`] owns a namespace store, loads it through the configured
//! loader (with retry, optional timeout and a fallback-language chain), and
//! answers synchronous lookups from it. Lookups never fail: unresolved keys
//! render through the missing-key handler.
//!
//! # Example
//!
//! ```rust,ignore
//! let config = TranslatorConfig::new("ko", loader).with_fallback_language("en");
//! let translator = Translator::new(config)?;
//! translator.initialize().await;
//! assert_eq!(translator.translate("common:greeting"), "안녕하세요");
//! ```

mod config;

pub use config::{ErrorHandler, MissingKeyHandler, TranslatorConfig};

use crate::error::{ConfigError, TranslationError};
use crate::i18n::{
    candidate_languages, find_node, interpolate, parse_key, resolve_text, MetricsReport,
    NamespaceData, NamespaceStore, TranslationBundle, TranslationNode, TranslationParams,
    TranslationValidator, TranslatorMetrics, ValidationReport,
};
use crate::loader::load_namespace;
use crate::resource_manager::{CacheEntry, CacheStats};
use crate::retry::with_retry_if;
use futures::FutureExt;
use serde::Serialize;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Handle returned by [`Translator::on_language_change`].
pub type ListenerId = u64;

type LanguageChangeListener = Arc<dyn Fn(&str) + Send + Sync>;

/// Read-only view of a translator for tooling.
#[derive(Debug, Clone, Serialize)]
pub struct DebugSnapshot {
    pub is_initialized: bool,
    pub current_language: String,
    pub loaded_namespaces: Vec<String>,
    pub cache_stats: CacheStats,
    pub cache_size: usize,
    pub all_translations: TranslationBundle,
    pub initialization_error: Option<String>,
}

struct TranslatorState {
    current_language: String,
    is_initialized: bool,
    initialization_error: Option<TranslationError>,
    store: NamespaceStore,
}

pub struct Translator {
    config: TranslatorConfig,
    state: RwLock<TranslatorState>,
    /// `"language:key"` -> resolved template
    lookup_cache: Mutex<HashMap<String, CacheEntry<String>>>,
    metrics: TranslatorMetrics,
    listeners: Mutex<Vec<(ListenerId, LanguageChangeListener)>>,
    next_listener_id: AtomicU64,
    /// Serializes `initialize` so concurrent callers load once.
    init_gate: tokio::sync::Mutex<()>,
}

impl Translator {
    pub fn new(config: TranslatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let store = config
            .initial_translations
            .clone()
            .map(NamespaceStore::from_bundle)
            .unwrap_or_default();

        Ok(Self {
            state: RwLock::new(TranslatorState {
                current_language: config.default_language.clone(),
                is_initialized: false,
                initialization_error: None,
                store,
            }),
            config,
            lookup_cache: Mutex::new(HashMap::new()),
            metrics: TranslatorMetrics::new(),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
            init_gate: tokio::sync::Mutex::new(()),
        })
    }

    fn read_state(&self) -> RwLockReadGuard<'_, TranslatorState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, TranslatorState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup_cache(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<String>>> {
        self.lookup_cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ==================== Initialization ====================

    /// Load every configured namespace for the current and fallback languages.
    ///
    /// Idempotent. Failures are reported to the error handler and absorbed;
    /// afterwards the translator is always ready.
    pub async fn initialize(&self) {
        let _gate = self.init_gate.lock().await;
        if self.read_state().is_initialized {
            debug!("Translator already initialized, skipping");
            return;
        }

        let outcome = AssertUnwindSafe(self.load_initial_namespaces())
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                Err(TranslationError::InitializationFailed(
                    "panic while loading namespaces".to_string(),
                ))
            });

        let language = self.current_language();
        if let Err(error) = &outcome {
            self.report_error(error, &language, "");
        }

        let mut state = self.write_state();
        state.initialization_error = outcome.err();
        state.is_initialized = true;
        info!(
            "Translator initialized for '{}' ({} namespaces loaded)",
            state.current_language,
            state.store.loaded_keys().len()
        );
    }

    async fn load_initial_namespaces(&self) -> Result<(), TranslationError> {
        let current = self.current_language();
        let languages = candidate_languages(&current, self.config.fallback_language.as_deref());

        if let Some(unsupported) = languages
            .iter()
            .find(|language| !self.config.is_supported(language))
        {
            return Err(TranslationError::InitializationFailed(format!(
                "language '{}' is not in supported languages {:?}",
                unsupported, self.config.supported_languages
            )));
        }

        for language in &languages {
            for namespace in &self.config.namespaces {
                if self.is_resident(language, namespace) {
                    debug!("{}:{} already loaded, skipping", language, namespace);
                    continue;
                }
                self.load_with_fallback(language, namespace).await;
            }
        }
        Ok(())
    }

    fn is_resident(&self, language: &str, namespace: &str) -> bool {
        self.read_state().store.contains(language, namespace)
    }

    fn store_namespace(&self, language: &str, namespace: &str, data: Arc<NamespaceData>) {
        self.write_state().store.insert(language, namespace, data);
        // Cached lookups may have resolved through the fallback before this data existed.
        self.lookup_cache().clear();
    }

    /// Load one namespace, degrading to fallback-language data and then to an
    /// empty namespace.
    async fn load_with_fallback(&self, language: &str, namespace: &str) {
        let error = match self.fetch_namespace(language, namespace).await {
            Ok(data) => {
                self.store_namespace(language, namespace, data);
                return;
            }
            Err(error) => error,
        };
        self.report_error(&error, language, namespace);

        let Some(fallback) = self
            .config
            .fallback_language
            .as_deref()
            .filter(|fallback| *fallback != language)
        else {
            self.store_namespace(language, namespace, Arc::new(NamespaceData::new()));
            return;
        };

        let resident = self.read_state().store.get(fallback, namespace).cloned();
        let recovered = match resident {
            Some(data) => Ok(data),
            None => self
                .fetch_namespace(fallback, namespace)
                .await
                .map(|data| {
                    self.store_namespace(fallback, namespace, Arc::clone(&data));
                    data
                }),
        };

        match recovered {
            Ok(data) => {
                debug!(
                    "Using '{}' data for {}:{}",
                    fallback, language, namespace
                );
                self.store_namespace(language, namespace, data);
            }
            Err(fallback_error) => {
                let error = TranslationError::FallbackLoadFailed {
                    language: language.to_string(),
                    fallback_language: fallback.to_string(),
                    namespace: namespace.to_string(),
                    message: fallback_error.to_string(),
                };
                self.report_error(&error, language, namespace);
                // The fallback pair is settled too, so its own pass does not refetch it.
                let empty = Arc::new(NamespaceData::new());
                self.store_namespace(fallback, namespace, Arc::clone(&empty));
                self.store_namespace(language, namespace, empty);
            }
        }
    }

    /// Fetch with the configured retry policy.
    async fn fetch_namespace(
        &self,
        language: &str,
        namespace: &str,
    ) -> Result<Arc<NamespaceData>, TranslationError> {
        let operation_name = format!("Load {}:{}", language, namespace);
        let result = with_retry_if(
            &self.config.retry,
            &operation_name,
            || self.fetch_once(language, namespace),
            |error: &TranslationError| error.is_retryable(),
        )
        .await;

        match result {
            Ok(data) => {
                self.metrics.record_load();
                Ok(data)
            }
            Err(error) => {
                self.metrics.record_load_failure();
                let attempts = self.config.retry.max_attempts;
                if error.is_retryable() && attempts > 1 {
                    Err(TranslationError::RetryFailed {
                        language: language.to_string(),
                        namespace: namespace.to_string(),
                        attempts,
                        message: error.to_string(),
                    })
                } else {
                    Err(error)
                }
            }
        }
    }

    async fn fetch_once(
        &self,
        language: &str,
        namespace: &str,
    ) -> Result<Arc<NamespaceData>, TranslationError> {
        let load = async {
            match &self.config.shared_cache {
                Some(cache) => {
                    cache
                        .get_cached_translations(language, namespace, &self.config.loader)
                        .await
                }
                None => load_namespace(self.config.loader.as_ref(), language, namespace)
                    .await
                    .map(Arc::new),
            }
        };

        let Some(after) = self.config.load_timeout else {
            return load.await;
        };
        match tokio::time::timeout(after, load).await {
            Ok(result) => result,
            Err(_) => {
                // Drop the hung shared load so the next attempt calls the loader again.
                if let Some(cache) = &self.config.shared_cache {
                    cache.invalidate_cache(Some(language), Some(namespace));
                }
                Err(TranslationError::Timeout {
                    language: language.to_string(),
                    namespace: namespace.to_string(),
                    after,
                })
            }
        }
    }

    fn report_error(&self, error: &TranslationError, language: &str, namespace: &str) {
        match &self.config.error_handler {
            Some(handler) => handler(error, language, namespace),
            None => warn!(
                "Translation error [{}] for '{}' namespace '{}': {}",
                error.kind(),
                language,
                namespace,
                error
            ),
        }
    }

    // ==================== Lookups ====================

    fn language_or_current(&self, language: Option<&str>) -> String {
        language.map_or_else(|| self.current_language(), str::to_string)
    }

    fn missing_key(&self, key: &str, language: &str) -> String {
        let namespace = parse_key(key).namespace;
        if self.config.debug {
            warn!("Missing translation for '{}' in '{}'", key, language);
        }
        match &self.config.missing_key_handler {
            Some(handler) => handler(key, language, namespace),
            None => key.to_string(),
        }
    }

    fn cached_template(&self, cache_key: &str) -> Option<String> {
        let mut cache = self.lookup_cache();
        let expired = cache.get(cache_key).map(CacheEntry::is_expired)?;
        if expired {
            cache.remove(cache_key);
            return None;
        }
        cache.get(cache_key).map(|entry| entry.data.clone())
    }

    /// Translate `key` in the current language.
    pub fn translate(&self, key: &str) -> String {
        self.translate_with(key, &TranslationParams::new(), None)
    }

    /// Translate `key` in `language`.
    pub fn translate_in(&self, key: &str, language: &str) -> String {
        self.translate_with(key, &TranslationParams::new(), Some(language))
    }

    /// Translate and interpolate. Tries `language` (or the current language),
    /// then the fallback language, then the missing-key handler.
    pub fn translate_with(
        &self,
        key: &str,
        params: &TranslationParams,
        language: Option<&str>,
    ) -> String {
        let language = self.language_or_current(language);
        let cache_key = format!("{}:{}", language, key);

        let template = match self.cached_template(&cache_key) {
            Some(template) => {
                self.metrics.record_cache_hit();
                Some(template)
            }
            None => {
                self.metrics.record_cache_miss();
                let resolved = {
                    let state = self.read_state();
                    resolve_text(
                        &state.store,
                        key,
                        &language,
                        self.config.fallback_language.as_deref(),
                    )
                    .map(str::to_string)
                };
                if let Some(template) = &resolved {
                    self.lookup_cache().insert(
                        cache_key,
                        CacheEntry::with_ttl(template.clone(), self.config.lookup_cache_ttl),
                    );
                }
                resolved
            }
        };

        match template {
            Some(template) => interpolate(&template, params),
            None => self.missing_key(key, &language),
        }
    }

    /// Load the key's namespace if it is not resident yet, then translate.
    pub async fn translate_async(
        &self,
        key: &str,
        params: &TranslationParams,
        language: Option<&str>,
    ) -> String {
        let language = self.language_or_current(language);
        let namespace = parse_key(key).namespace.to_string();

        for candidate in candidate_languages(&language, self.config.fallback_language.as_deref()) {
            if !self.is_resident(candidate, &namespace) {
                self.load_with_fallback(candidate, &namespace).await;
            }
        }

        self.translate_with(key, params, Some(&language))
    }

    fn find_cloned<F>(&self, key: &str, language: &str, accept: F) -> Option<TranslationNode>
    where
        F: Fn(&TranslationNode) -> bool,
    {
        let parsed = parse_key(key);
        let languages = candidate_languages(language, self.config.fallback_language.as_deref());
        let state = self.read_state();
        find_node(&state.store, &parsed, &languages, accept).cloned()
    }

    /// Pick the plural form for `count` and interpolate it.
    ///
    /// `{count}` is available to the template unless `params` already sets it.
    pub fn t_plural(
        &self,
        key: &str,
        count: i64,
        params: &TranslationParams,
        language: Option<&str>,
    ) -> String {
        let language = self.language_or_current(language);
        let template = self
            .find_cloned(key, &language, |node| node.as_plural().is_some())
            .and_then(|node| {
                node.as_plural()
                    .and_then(|forms| forms.select(count))
                    .map(str::to_string)
            });

        match template {
            Some(template) => {
                let mut params = params.clone();
                params
                    .entry("count".to_string())
                    .or_insert_with(|| count.to_string());
                interpolate(&template, &params)
            }
            None => self.missing_key(key, &language),
        }
    }

    /// The list stored at `key`, or an empty vec.
    pub fn t_array(&self, key: &str, language: Option<&str>) -> Vec<String> {
        let language = self.language_or_current(language);
        match self.find_cloned(key, &language, |node| node.as_list().is_some()) {
            Some(TranslationNode::List(items)) => items,
            _ => Vec::new(),
        }
    }

    /// The node at `key` as stored, without type checks.
    pub fn get_raw_value(&self, key: &str, language: Option<&str>) -> Option<TranslationNode> {
        let language = self.language_or_current(language);
        self.find_cloned(key, &language, |_| true)
    }

    pub fn has_key(&self, key: &str, language: Option<&str>) -> bool {
        self.get_raw_value(key, language).is_some()
    }

    // ==================== Language switching ====================

    /// Switch the current language, load its missing namespaces, then notify
    /// listeners.
    pub async fn set_language(&self, language: &str) {
        if self.current_language() == language {
            return;
        }
        if !self.config.is_supported(language) {
            warn!(
                "Ignoring switch to unsupported language '{}' (supported: {:?})",
                language, self.config.supported_languages
            );
            return;
        }

        self.write_state().current_language = language.to_string();
        info!("Switched language to '{}'", language);

        for namespace in &self.config.namespaces {
            if !self.is_resident(language, namespace) {
                self.load_with_fallback(language, namespace).await;
            }
        }

        let listeners: Vec<LanguageChangeListener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(language);
        }
    }

    pub fn on_language_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Returns whether a listener with `id` was registered.
    pub fn remove_language_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    // ==================== Hydration & caches ====================

    /// Replace the whole store with server-rendered data and mark ready.
    ///
    /// A configured shared cache is seeded with the same data.
    pub fn hydrate_from_ssr(&self, translations: TranslationBundle) {
        if let Some(cache) = &self.config.shared_cache {
            cache.hydrate_from_ssr(&translations);
        }
        {
            let mut state = self.write_state();
            state.store = NamespaceStore::from_bundle(translations);
            state.is_initialized = true;
        }
        self.lookup_cache().clear();
        debug!("Hydrated translator from SSR payload");
    }

    /// Reset the lookup cache and its counters. Loaded namespaces stay.
    pub fn clear_cache(&self) {
        self.lookup_cache().clear();
        self.metrics.reset_cache_counters();
    }

    // ==================== Accessors ====================

    pub fn is_ready(&self) -> bool {
        self.read_state().is_initialized
    }

    pub fn current_language(&self) -> String {
        self.read_state().current_language.clone()
    }

    pub fn fallback_language(&self) -> Option<&str> {
        self.config.fallback_language.as_deref()
    }

    pub fn initialization_error(&self) -> Option<TranslationError> {
        self.read_state().initialization_error.clone()
    }

    /// Loaded pairs as sorted `"language:namespace"` strings.
    pub fn loaded_namespaces(&self) -> Vec<String> {
        self.read_state().store.loaded_keys()
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats::new(
            self.metrics.cache_hits() as u64,
            self.metrics.cache_misses() as u64,
            self.lookup_cache().len(),
        )
    }

    pub fn performance_metrics(&self) -> MetricsReport {
        self.metrics.report()
    }

    /// Compare loaded languages against the fallback (or default) language.
    pub fn validate_translations(&self) -> ValidationReport {
        let reference = self
            .config
            .fallback_language
            .as_deref()
            .unwrap_or(&self.config.default_language);
        TranslationValidator::validate(&self.read_state().store, reference)
    }

    pub fn debug_info(&self) -> DebugSnapshot {
        let cache_stats = self.cache_stats();
        let state = self.read_state();
        DebugSnapshot {
            is_initialized: state.is_initialized,
            current_language: state.current_language.clone(),
            loaded_namespaces: state.store.loaded_keys(),
            cache_size: cache_stats.size,
            cache_stats,
            all_translations: state.store.to_bundle(),
            initialization_error: state
                .initialization_error
                .as_ref()
                .map(ToString::to_string),
        }
    }
}
