//! Translation resolution and caching core.
//!
//! - [`translator::Translator`]: per-application engine with fallback, retry and hydration
//! - [`resource_manager::ResourceManager`]: deduplicating namespace cache shared across consumers
//! - [`lazy_loader::LazyLoader`]: on-demand and best-effort preloading over the cache
//! - [`ssr`]: stateless lookups against a plain translations bundle

pub mod config;
pub mod error;
pub mod i18n;
pub mod lazy_loader;
pub mod loader;
pub mod resource_manager;
pub mod retry;
pub mod ssr;
pub mod translator;

pub use error::{ConfigError, ErrorKind, TranslationError};
pub use i18n::{NamespaceData, TranslationBundle, TranslationNode, TranslationParams};
pub use lazy_loader::{LazyLoader, LoadStats};
pub use loader::{JsonDirectoryLoader, SharedLoader, TranslationLoader};
pub use resource_manager::{CacheKey, CacheStats, ResourceManager};
pub use retry::RetryConfig;
pub use translator::{Translator, TranslatorConfig};
