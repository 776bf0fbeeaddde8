//! Translation data model and the pure resolution machinery shared by the
//! translator and the SSR helpers.
//!
//! # Architecture
//!
//! - `namespace`: Typed namespace tree (`Text | List | Plural | Tree`) built from loader JSON
//! - `resolve`: Key parsing (`ns:path`, `ns.path`, bare) and fallback-aware lookup
//! - `interpolate`: `{param}` substitution
//! - `store`: The translator's `language -> namespace -> data` store
//! - `validator`: Cross-language key coverage checks
//! - `metrics`: Lookup-cache and load counters
//!
//! # Example
//!
//! ```rust,ignore
//! use i18n_engine::i18n::{resolve_text, TranslationBundle};
//!
//! let bundle: TranslationBundle = serde_json::from_str(payload)?;
//! let title = resolve_text(&bundle, "common:title", "ko", Some("en"));
//! ```

mod interpolate;
mod metrics;
mod namespace;
mod resolve;
mod store;
mod validator;

use std::collections::BTreeMap;

pub use interpolate::{interpolate, TranslationParams};
pub use metrics::{MetricsReport, TranslatorMetrics};
pub use namespace::{NamespaceData, PluralForms, ShapeError, TranslationNode, PLURAL_CATEGORIES};
pub use resolve::{
    candidate_languages, find_node, parse_key, resolve_text, NamespaceSource, ParsedKey,
    DEFAULT_NAMESPACE,
};
pub use store::NamespaceStore;
pub use validator::{TranslationValidator, ValidationReport};

/// `language -> namespace -> data`: the hydration payload shape.
pub type TranslationBundle = BTreeMap<String, BTreeMap<String, NamespaceData>>;
