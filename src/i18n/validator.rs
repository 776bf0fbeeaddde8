//! Translation coverage validation.
//!
//! Compares the keys each loaded language provides against a reference
//! language so missing or stray entries show up before users see raw keys.

use super::store::NamespaceStore;
use serde::Serialize;
use std::collections::BTreeSet;

/// Validation report containing errors and warnings about loaded translations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Namespaces that resolved to no data at all
    pub errors: Vec<String>,

    /// Keys missing from, or only present in, a non-reference language
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Create a new empty validation report
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if the report has any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for translation coverage.
pub struct TranslationValidator;

impl TranslationValidator {
    /// Check every loaded language against `reference_language`.
    ///
    /// For each namespace the reference language has loaded, a language that
    /// lacks the namespace is skipped (it may simply not be loaded yet), and
    /// otherwise its leaf keys are compared in both directions.
    pub fn validate(store: &NamespaceStore, reference_language: &str) -> ValidationReport {
        let mut report = ValidationReport::new();

        for language in store.languages() {
            for namespace in store.namespaces_for(language) {
                if let Some(data) = store.get(language, namespace) {
                    if data.is_empty() {
                        report.errors.push(format!(
                            "Namespace '{}' for '{}' is empty",
                            namespace, language
                        ));
                    }
                }
            }
        }

        for namespace in store.namespaces_for(reference_language) {
            let Some(reference) = store.get(reference_language, namespace) else {
                continue;
            };
            let expected: BTreeSet<String> = reference.leaf_paths().into_iter().collect();

            for language in store.languages() {
                if language == reference_language {
                    continue;
                }
                let Some(data) = store.get(language, namespace) else {
                    continue;
                };
                let actual: BTreeSet<String> = data.leaf_paths().into_iter().collect();

                for key in expected.difference(&actual) {
                    report.warnings.push(format!(
                        "Missing key '{}:{}' in '{}'",
                        namespace, key, language
                    ));
                }
                for key in actual.difference(&expected) {
                    report.warnings.push(format!(
                        "Key '{}:{}' in '{}' is not present in '{}'",
                        namespace, key, language, reference_language
                    ));
                }
            }
        }

        report
    }
}
