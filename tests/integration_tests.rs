//! Integration tests for the i18n engine
//!
//! These tests drive the public API end to end: translator lifecycle,
//! hydration, cache sharing between the lazy loader and translators, and the
//! JSON directory loader.

use i18n_engine::{
    config::AppConfig, ssr, JsonDirectoryLoader, LazyLoader, ResourceManager, RetryConfig,
    SharedLoader, TranslationBundle, TranslationParams, Translator, TranslatorConfig,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

// ==================== Test Helpers ====================

/// Loader backed by an in-memory `{language: {namespace: payload}}` map.
fn map_loader(payloads: Value) -> (SharedLoader, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let loader: SharedLoader = Arc::new(move |language: String, namespace: String| {
        counter.fetch_add(1, Ordering::SeqCst);
        let payload = payloads
            .get(&language)
            .and_then(|namespaces| namespaces.get(&namespace))
            .cloned();
        async move { payload.ok_or_else(|| anyhow::anyhow!("{}:{} not found", language, namespace)) }
    });
    (loader, calls)
}

fn write_locale(dir: &TempDir, language: &str, namespace: &str, content: &str) {
    let language_dir = dir.path().join(language);
    std::fs::create_dir_all(&language_dir).expect("Failed to create language dir");
    std::fs::write(language_dir.join(format!("{}.json", namespace)), content)
        .expect("Failed to write locale file");
}

// ==================== Translator Scenarios ====================

#[tokio::test]
async fn test_korean_with_english_fallback() {
    let (loader, _) = map_loader(json!({
        "ko": { "common": { "greeting": "안녕하세요" } },
        "en": { "common": { "greeting": "Hello" } }
    }));
    let translator = Translator::new(
        TranslatorConfig::new("ko", loader)
            .with_fallback_language("en")
            .with_retry(RetryConfig::immediate(1)),
    )
    .unwrap();

    translator.initialize().await;

    assert_eq!(translator.translate("common:greeting"), "안녕하세요");
    assert_eq!(translator.translate_in("common:greeting", "en"), "Hello");
    assert_eq!(translator.translate("common:missing"), "common:missing");
}

#[tokio::test]
async fn test_silent_missing_keys_render_empty() {
    let (loader, _) = map_loader(json!({ "ko": { "common": {} } }));
    let translator = Translator::new(
        TranslatorConfig::new("ko", loader)
            .with_retry(RetryConfig::immediate(1))
            .with_silent_missing_keys(),
    )
    .unwrap();

    translator.initialize().await;
    assert_eq!(translator.translate("common:missing"), "");
}

#[tokio::test]
async fn test_hydration_makes_translator_ready_without_loading() {
    let (loader, calls) = map_loader(json!({}));
    let translator = Translator::new(TranslatorConfig::new("ko", loader)).unwrap();
    let payload: TranslationBundle =
        serde_json::from_value(json!({ "ko": { "common": { "title": "제목" } } })).unwrap();

    translator.hydrate_from_ssr(payload);

    assert!(translator.is_ready());
    assert_eq!(translator.translate("common:title"), "제목");

    // Hydrated namespaces also satisfy initialize.
    translator.initialize().await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_loader_rejecting_twice_then_empty() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let loader: SharedLoader = Arc::new(move |_: String, _: String| {
        let attempt = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if attempt < 2 {
                anyhow::bail!("attempt {} rejected", attempt + 1);
            }
            Ok(json!({}))
        }
    });
    let translator = Translator::new(
        TranslatorConfig::new("en", loader).with_retry(RetryConfig::immediate(4)),
    )
    .unwrap();

    translator.initialize().await;

    assert!(translator.is_ready());
    assert!(translator.initialization_error().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(translator.loaded_namespaces(), vec!["en:common"]);
    assert_eq!(translator.translate("common:anything"), "common:anything");
}

#[tokio::test]
async fn test_initialize_twice_matches_single_call() {
    let payloads = json!({
        "en": { "common": { "a": "A" }, "auth": { "b": "B" } },
        "fr": { "common": { "a": "À" }, "auth": { "b": "Bé" } }
    });
    let config = |loader: SharedLoader| {
        TranslatorConfig::new("fr", loader)
            .with_fallback_language("en")
            .with_namespaces(["common", "auth"])
    };

    let (once_loader, once_calls) = map_loader(payloads.clone());
    let once = Translator::new(config(once_loader)).unwrap();
    once.initialize().await;

    let (twice_loader, twice_calls) = map_loader(payloads);
    let twice = Translator::new(config(twice_loader)).unwrap();
    twice.initialize().await;
    twice.initialize().await;

    assert_eq!(once_calls.load(Ordering::SeqCst), 4);
    assert_eq!(
        once_calls.load(Ordering::SeqCst),
        twice_calls.load(Ordering::SeqCst)
    );
}

#[tokio::test]
async fn test_key_only_in_fallback_resolves() {
    let (loader, _) = map_loader(json!({
        "de": { "common": { "yes": "Ja" } },
        "en": { "common": { "yes": "Yes", "no": "No" } }
    }));
    let translator = Translator::new(
        TranslatorConfig::new("de", loader).with_fallback_language("en"),
    )
    .unwrap();

    translator.initialize().await;

    assert_eq!(translator.translate("no"), "No");
    assert_eq!(translator.translate("yes"), "Ja");
}

// ==================== Cache Sharing Tests ====================

#[tokio::test]
async fn test_lazy_loader_and_translator_share_one_cache() {
    let (loader, calls) = map_loader(json!({
        "en": { "common": { "title": "Title" }, "auth": { "login": "Log in" } }
    }));
    let cache = ResourceManager::new();
    let lazy = LazyLoader::new(cache.clone());

    let results = futures::future::join_all(
        (0..5).map(|_| lazy.load_on_demand("en", "common", &loader)),
    )
    .await;
    let first = results[0].as_ref().unwrap();
    assert!(results
        .iter()
        .all(|result| Arc::ptr_eq(first, result.as_ref().unwrap())));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    lazy.preload_namespace("en", "auth", &loader).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let hits_before = cache.cache_stats().hits;

    let translator = Translator::new(
        TranslatorConfig::new("en", Arc::clone(&loader))
            .with_namespaces(["common", "auth"])
            .with_shared_cache(cache.clone()),
    )
    .unwrap();
    translator.initialize().await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(translator.translate("auth:login"), "Log in");
    assert_eq!(cache.cache_stats().hits, hits_before + 2);
}

#[tokio::test]
async fn test_cache_limit_evicts_oldest_first() {
    let (loader, _) = map_loader(json!({
        "en": { "a": {}, "b": {}, "c": {} }
    }));
    let lazy = LazyLoader::new(ResourceManager::new());

    for namespace in ["a", "b", "c"] {
        lazy.load_on_demand("en", namespace, &loader).await.unwrap();
    }
    lazy.resources().set_cache_limit(2);

    let resources = lazy.resources();
    assert!(resources.get_cached_translations_sync("en", "a").is_none());
    assert!(resources.get_cached_translations_sync("en", "b").is_some());
    assert!(resources.get_cached_translations_sync("en", "c").is_some());
    assert_eq!(resources.cache_stats().size, 2);
}

// ==================== SSR Tests ====================

#[test]
fn test_ssr_and_translator_agree() {
    let bundle: TranslationBundle = serde_json::from_value(json!({
        "ko": { "common": { "title": "제목" } },
        "en": { "common": { "title": "Title", "subtitle": "Subtitle" } }
    }))
    .unwrap();

    for key in ["common:title", "common.subtitle", "title", "common:none"] {
        let rendered = ssr::ssr_translate(ssr::SsrTranslateOptions {
            translations: &bundle,
            key,
            language: "ko",
            fallback_language: Some("en"),
            missing_key_handler: None,
        });

        let (loader, _) = map_loader(json!({}));
        let translator =
            Translator::new(TranslatorConfig::new("ko", loader).with_fallback_language("en")).unwrap();
        translator.hydrate_from_ssr(bundle.clone());

        assert_eq!(rendered, translator.translate(key), "key {}", key);
    }
}

// ==================== Filesystem Loader Tests ====================

#[tokio::test]
async fn test_translator_over_json_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_locale(&temp_dir, "en", "common", r#"{"greeting": "Hello, {name}!"}"#);
    write_locale(&temp_dir, "es", "common", r#"{"greeting": "¡Hola, {name}!"}"#);

    let translator = Translator::new(
        TranslatorConfig::new("es", Arc::new(JsonDirectoryLoader::new(temp_dir.path())))
            .with_fallback_language("en"),
    )
    .unwrap();
    translator.initialize().await;

    let params: TranslationParams = [("name".to_string(), "Ana".to_string())].into_iter().collect();
    assert_eq!(
        translator.translate_with("greeting", &params, None),
        "¡Hola, Ana!"
    );
    assert!(translator.validate_translations().is_clean());
}

#[tokio::test]
#[serial_test::serial]
async fn test_app_config_drives_translator() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_locale(&temp_dir, "ko", "common", r#"{"ok": "확인"}"#);
    write_locale(&temp_dir, "ko", "auth", r#"{"login": "로그인"}"#);

    std::env::set_var("I18N_LOCALES_DIR", temp_dir.path());
    std::env::set_var("I18N_DEFAULT_LANGUAGE", "ko");
    std::env::set_var("I18N_NAMESPACES", "common,auth");
    let config = AppConfig::from_env();
    for var in ["I18N_LOCALES_DIR", "I18N_DEFAULT_LANGUAGE", "I18N_NAMESPACES"] {
        std::env::remove_var(var);
    }

    let translator = Translator::new(config.unwrap().translator_config()).unwrap();
    translator.initialize().await;

    assert_eq!(translator.translate("auth:login"), "로그인");
    assert_eq!(translator.loaded_namespaces(), vec!["ko:auth", "ko:common"]);
}
