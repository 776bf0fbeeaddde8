use crate::loader::JsonDirectoryLoader;
use crate::translator::TranslatorConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // Loader
    pub locales_dir: PathBuf,

    // Languages
    pub default_language: String,
    pub fallback_language: Option<String>,
    pub supported_languages: Vec<String>,
    pub namespaces: Vec<String>,

    // Behaviour
    pub debug: bool,
    pub load_timeout: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Loader - directory of <language>/<namespace>.json files
            locales_dir: std::env::var("I18N_LOCALES_DIR")
                .context("I18N_LOCALES_DIR not set")?
                .into(),

            // Languages
            default_language: optional_var("I18N_DEFAULT_LANGUAGE")
                .unwrap_or_else(|| "en".to_string()),
            fallback_language: optional_var("I18N_FALLBACK_LANGUAGE"),
            supported_languages: optional_var("I18N_SUPPORTED_LANGUAGES")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            namespaces: optional_var("I18N_NAMESPACES")
                .map(|v| parse_list(&v))
                .filter(|namespaces| !namespaces.is_empty())
                .unwrap_or_else(|| vec!["common".to_string()]),

            // Behaviour
            debug: optional_var("I18N_DEBUG")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            load_timeout: optional_var("I18N_LOAD_TIMEOUT_MS")
                .map(|v| {
                    v.parse::<u64>()
                        .map(Duration::from_millis)
                        .with_context(|| format!("I18N_LOAD_TIMEOUT_MS is not a number: '{}'", v))
                })
                .transpose()?,
        })
    }

    /// Translator settings backed by a [`JsonDirectoryLoader`] over `locales_dir`.
    pub fn translator_config(&self) -> TranslatorConfig {
        let loader = Arc::new(JsonDirectoryLoader::new(&self.locales_dir));
        let mut config = TranslatorConfig::new(&self.default_language, loader)
            .with_supported_languages(self.supported_languages.clone())
            .with_namespaces(self.namespaces.clone())
            .with_debug(self.debug);

        if let Some(fallback) = &self.fallback_language {
            config = config.with_fallback_language(fallback);
        }
        if let Some(timeout) = self.load_timeout {
            config = config.with_load_timeout(timeout);
        }
        config
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Split a comma-separated list, dropping blanks.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
