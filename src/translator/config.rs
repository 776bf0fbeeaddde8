use crate::error::{ConfigError, TranslationError};
use crate::i18n::{TranslationBundle, DEFAULT_NAMESPACE};
use crate::loader::SharedLoader;
use crate::resource_manager::ResourceManager;
use crate::retry::RetryConfig;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Produces the text shown for an unresolved key: `(key, language, namespace)`.
pub type MissingKeyHandler = Arc<dyn Fn(&str, &str, &str) -> String + Send + Sync>;

/// Receives every absorbed error: `(error, language, namespace)`.
pub type ErrorHandler = Arc<dyn Fn(&TranslationError, &str, &str) + Send + Sync>;

/// Configuration for a [`Translator`](super::Translator).
#[derive(Clone)]
pub struct TranslatorConfig {
    pub default_language: String,
    pub fallback_language: Option<String>,
    /// Empty means every language is accepted.
    pub supported_languages: Vec<String>,
    pub namespaces: Vec<String>,
    pub loader: SharedLoader,
    /// Log missing keys at warn level
    pub debug: bool,
    pub missing_key_handler: Option<MissingKeyHandler>,
    pub error_handler: Option<ErrorHandler>,
    /// Seed data; these namespaces are never fetched by `initialize`.
    pub initial_translations: Option<TranslationBundle>,
    pub retry: RetryConfig,
    /// Upper bound for a single load attempt
    pub load_timeout: Option<Duration>,
    /// Route loads through a deduplicating cache shared with other consumers
    pub shared_cache: Option<ResourceManager>,
    pub lookup_cache_ttl: chrono::Duration,
}

impl TranslatorConfig {
    pub fn new(default_language: impl Into<String>, loader: SharedLoader) -> Self {
        Self {
            default_language: default_language.into(),
            fallback_language: None,
            supported_languages: Vec::new(),
            namespaces: vec![DEFAULT_NAMESPACE.to_string()],
            loader,
            debug: false,
            missing_key_handler: None,
            error_handler: None,
            initial_translations: None,
            retry: RetryConfig::namespace_load(),
            load_timeout: None,
            shared_cache: None,
            lookup_cache_ttl: chrono::Duration::minutes(5),
        }
    }

    pub fn with_fallback_language(mut self, language: impl Into<String>) -> Self {
        self.fallback_language = Some(language.into());
        self
    }

    pub fn with_supported_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces = namespaces.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_missing_key_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &str, &str) -> String + Send + Sync + 'static,
    {
        self.missing_key_handler = Some(Arc::new(handler));
        self
    }

    /// Render unresolved keys as empty strings instead of the key itself.
    pub fn with_silent_missing_keys(self) -> Self {
        self.with_missing_key_handler(|_, _, _| String::new())
    }

    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&TranslationError, &str, &str) + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    pub fn with_initial_translations(mut self, translations: TranslationBundle) -> Self {
        self.initial_translations = Some(translations);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Bound each load attempt. A timed-out attempt is retried under the retry
    /// policy. With a shared cache, the timed-out key is invalidated first so
    /// the retry starts a fresh load instead of joining the hung one.
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    pub fn with_shared_cache(mut self, cache: ResourceManager) -> Self {
        self.shared_cache = Some(cache);
        self
    }

    pub fn with_lookup_cache_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.lookup_cache_ttl = ttl;
        self
    }

    /// Reject configurations the translator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_language.trim().is_empty() {
            return Err(ConfigError::EmptyLanguage("default_language"));
        }
        if matches!(&self.fallback_language, Some(language) if language.trim().is_empty()) {
            return Err(ConfigError::EmptyLanguage("fallback_language"));
        }
        if self
            .supported_languages
            .iter()
            .any(|language| language.trim().is_empty())
        {
            return Err(ConfigError::EmptyLanguage("supported_languages"));
        }
        if let Some(namespace) = self
            .namespaces
            .iter()
            .find(|namespace| namespace.trim().is_empty() || namespace.contains(':'))
        {
            return Err(ConfigError::InvalidNamespace(namespace.clone()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }
        Ok(())
    }

    pub(crate) fn is_supported(&self, language: &str) -> bool {
        self.supported_languages.is_empty()
            || self
                .supported_languages
                .iter()
                .any(|supported| supported == language)
    }
}

impl fmt::Debug for TranslatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatorConfig")
            .field("default_language", &self.default_language)
            .field("fallback_language", &self.fallback_language)
            .field("supported_languages", &self.supported_languages)
            .field("namespaces", &self.namespaces)
            .field("debug", &self.debug)
            .field("missing_key_handler", &self.missing_key_handler.is_some())
            .field("error_handler", &self.error_handler.is_some())
            .field("retry", &self.retry)
            .field("load_timeout", &self.load_timeout)
            .field("shared_cache", &self.shared_cache)
            .field("lookup_cache_ttl", &self.lookup_cache_ttl)
            .finish()
    }
}
