//! The loader seam: how namespace payloads enter the engine.
//!
//! Applications supply a [`TranslationLoader`]; any async closure
//! `Fn(String, String) -> impl Future<Output = anyhow::Result<Value>>` works.
//! [`load_namespace`] calls it and validates the payload shape.

use crate::error::TranslationError;
use crate::i18n::NamespaceData;
use anyhow::Context;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Source of raw namespace payloads for a `(language, namespace)` pair.
pub trait TranslationLoader: Send + Sync {
    fn load(&self, language: &str, namespace: &str) -> BoxFuture<'static, anyhow::Result<Value>>;
}

/// Shared handle to a loader, as stored in configs and caches.
pub type SharedLoader = Arc<dyn TranslationLoader>;

impl<F, Fut> TranslationLoader for F
where
    F: Fn(String, String) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    fn load(&self, language: &str, namespace: &str) -> BoxFuture<'static, anyhow::Result<Value>> {
        self(language.to_string(), namespace.to_string()).boxed()
    }
}

/// Invoke `loader` once and validate the result.
///
/// Loader errors and panics become [`TranslationError::LoadFailed`]; a payload
/// that is not a namespace object becomes [`TranslationError::MalformedData`].
pub async fn load_namespace(
    loader: &dyn TranslationLoader,
    language: &str,
    namespace: &str,
) -> Result<NamespaceData, TranslationError> {
    let value = AssertUnwindSafe(loader.load(language, namespace))
        .catch_unwind()
        .await
        .map_err(|_| TranslationError::load_failed(language, namespace, "loader panicked"))?
        .map_err(|e| TranslationError::load_failed(language, namespace, format!("{:#}", e)))?;

    NamespaceData::try_from(value).map_err(|e| TranslationError::MalformedData {
        language: language.to_string(),
        namespace: namespace.to_string(),
        message: e.to_string(),
    })
}

/// Loads `<root>/<language>/<namespace>.json` from disk.
#[derive(Debug, Clone)]
pub struct JsonDirectoryLoader {
    root: PathBuf,
}

impl JsonDirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, language: &str, namespace: &str) -> PathBuf {
        self.root.join(language).join(format!("{}.json", namespace))
    }
}

impl TranslationLoader for JsonDirectoryLoader {
    fn load(&self, language: &str, namespace: &str) -> BoxFuture<'static, anyhow::Result<Value>> {
        let path = self.path_for(language, namespace);
        async move {
            debug!("Reading translations from {}", path.display());
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let value = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            Ok(value)
        }
        .boxed()
    }
}
