//! Stateless translation against a plain [`TranslationBundle`].
//!
//! These helpers serve server-rendered output before any [`Translator`]
//! exists. Key parsing and fallback match the translator exactly.
//!
//! [`Translator`]: crate::translator::Translator

use crate::i18n::{parse_key, resolve_text, TranslationBundle};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Inputs for [`ssr_translate`].
pub struct SsrTranslateOptions<'a> {
    pub translations: &'a TranslationBundle,
    pub key: &'a str,
    pub language: &'a str,
    pub fallback_language: Option<&'a str>,
    /// Called as `(key, language, namespace)` on a miss.
    pub missing_key_handler: Option<&'a dyn Fn(&str, &str, &str) -> String>,
}

/// Resolve `key` in `language`, then the fallback language.
///
/// A miss yields the handler's result, or the key itself.
pub fn ssr_translate(options: SsrTranslateOptions<'_>) -> String {
    if let Some(text) = resolve_text(
        options.translations,
        options.key,
        options.language,
        options.fallback_language,
    ) {
        return text.to_string();
    }

    match options.missing_key_handler {
        Some(handler) => handler(
            options.key,
            options.language,
            parse_key(options.key).namespace,
        ),
        None => options.key.to_string(),
    }
}

/// Caller-owned hit/miss counters for [`server_translate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SsrMetrics {
    pub hits: u64,
    pub misses: u64,
}

/// Optional per-request extras for [`server_translate`].
#[derive(Default)]
pub struct ServerTranslateOptions<'a> {
    /// Flat `"language:key" -> value` cache, read first and filled on every resolved lookup.
    pub cache: Option<&'a mut HashMap<String, String>>,
    pub metrics: Option<&'a mut SsrMetrics>,
    pub debug: bool,
}

pub struct ServerTranslateRequest<'a> {
    pub translations: &'a TranslationBundle,
    pub key: &'a str,
    pub language: &'a str,
    pub fallback_language: Option<&'a str>,
    pub options: ServerTranslateOptions<'a>,
}

/// [`ssr_translate`] with an external memo cache. A miss returns the key.
pub fn server_translate(request: ServerTranslateRequest<'_>) -> String {
    let ServerTranslateRequest {
        translations,
        key,
        language,
        fallback_language,
        options,
    } = request;
    let ServerTranslateOptions {
        mut cache,
        mut metrics,
        debug,
    } = options;
    let cache_key = format!("{}:{}", language, key);

    if let Some(value) = cache.as_deref().and_then(|cache| cache.get(&cache_key)) {
        if let Some(metrics) = metrics.as_deref_mut() {
            metrics.hits += 1;
        }
        if debug {
            debug!("SSR cache hit for {}", cache_key);
        }
        return value.clone();
    }

    if let Some(metrics) = metrics.as_deref_mut() {
        metrics.misses += 1;
    }

    match resolve_text(translations, key, language, fallback_language) {
        Some(text) => {
            if let Some(cache) = cache.as_deref_mut() {
                cache.insert(cache_key, text.to_string());
            }
            text.to_string()
        }
        None => {
            if debug {
                debug!("Missing SSR translation for '{}' in '{}'", key, language);
            }
            key.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bundle() -> TranslationBundle {
        serde_json::from_value(json!({
            "ko": { "common": { "title": "제목" } },
            "en": {
                "common": { "title": "Title", "subtitle": "Subtitle" },
                "auth": { "login": { "button": "Sign in" } }
            }
        }))
        .unwrap()
    }

    fn request<'a>(
        translations: &'a TranslationBundle,
        key: &'a str,
        options: ServerTranslateOptions<'a>,
    ) -> ServerTranslateRequest<'a> {
        ServerTranslateRequest {
            translations,
            key,
            language: "ko",
            fallback_language: Some("en"),
            options,
        }
    }

    // ==================== ssr_translate Tests ====================

    #[test]
    fn test_ssr_translate_resolves_and_falls_back() {
        let translations = bundle();
        let translate = |key| {
            ssr_translate(SsrTranslateOptions {
                translations: &translations,
                key,
                language: "ko",
                fallback_language: Some("en"),
                missing_key_handler: None,
            })
        };

        assert_eq!(translate("common:title"), "제목");
        assert_eq!(translate("common:subtitle"), "Subtitle");
        assert_eq!(translate("auth.login.button"), "Sign in");
        assert_eq!(translate("common:nope"), "common:nope");
    }

    #[test]
    fn test_ssr_translate_uses_missing_key_handler() {
        let translations = bundle();
        let handler = |key: &str, language: &str, namespace: &str| {
            format!("[{}|{}|{}]", key, language, namespace)
        };

        let result = ssr_translate(SsrTranslateOptions {
            translations: &translations,
            key: "auth:logout",
            language: "ko",
            fallback_language: None,
            missing_key_handler: Some(&handler),
        });

        assert_eq!(result, "[auth:logout|ko|auth]");
    }

    #[test]
    fn test_ssr_translate_with_empty_bundle() {
        let translations = TranslationBundle::new();
        let result = ssr_translate(SsrTranslateOptions {
            translations: &translations,
            key: "title",
            language: "en",
            fallback_language: Some("en"),
            missing_key_handler: None,
        });
        assert_eq!(result, "title");
    }

    // ==================== server_translate Tests ====================

    #[test]
    fn test_server_translate_without_options() {
        let translations = bundle();
        let result = server_translate(request(
            &translations,
            "common:subtitle",
            ServerTranslateOptions::default(),
        ));
        assert_eq!(result, "Subtitle");
    }

    #[test]
    fn test_server_translate_fills_and_reads_cache() {
        let translations = bundle();
        let mut cache = HashMap::new();
        let mut metrics = SsrMetrics::default();

        let first = server_translate(request(
            &translations,
            "common:title",
            ServerTranslateOptions {
                cache: Some(&mut cache),
                metrics: Some(&mut metrics),
                debug: true,
            },
        ));
        assert_eq!(first, "제목");
        assert_eq!(cache.get("ko:common:title").map(String::as_str), Some("제목"));

        // A cached value wins even over what the bundle says.
        cache.insert("ko:common:title".to_string(), "cached".to_string());
        let second = server_translate(request(
            &translations,
            "common:title",
            ServerTranslateOptions {
                cache: Some(&mut cache),
                metrics: Some(&mut metrics),
                debug: false,
            },
        ));

        assert_eq!(second, "cached");
        assert_eq!(metrics, SsrMetrics { hits: 1, misses: 1 });
    }

    #[test]
    fn test_server_translate_miss_is_not_cached() {
        let translations = bundle();
        let mut cache = HashMap::new();
        let mut metrics = SsrMetrics::default();

        let result = server_translate(request(
            &translations,
            "common:absent",
            ServerTranslateOptions {
                cache: Some(&mut cache),
                metrics: Some(&mut metrics),
                debug: true,
            },
        ));

        assert_eq!(result, "common:absent");
        assert!(cache.is_empty());
        assert_eq!(metrics, SsrMetrics { hits: 0, misses: 1 });
    }
}
