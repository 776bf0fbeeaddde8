//! In-memory `language -> namespace -> data` store owned by a translator.

use super::namespace::NamespaceData;
use super::resolve::NamespaceSource;
use super::TranslationBundle;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct NamespaceStore {
    languages: HashMap<String, HashMap<String, Arc<NamespaceData>>>,
}

impl NamespaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a hydration payload.
    pub fn from_bundle(bundle: TranslationBundle) -> Self {
        let mut store = Self::new();
        for (language, namespaces) in bundle {
            for (namespace, data) in namespaces {
                store.insert(&language, &namespace, Arc::new(data));
            }
        }
        store
    }

    pub fn insert(&mut self, language: &str, namespace: &str, data: Arc<NamespaceData>) {
        self.languages
            .entry(language.to_string())
            .or_default()
            .insert(namespace.to_string(), data);
    }

    pub fn get(&self, language: &str, namespace: &str) -> Option<&Arc<NamespaceData>> {
        self.languages.get(language)?.get(namespace)
    }

    pub fn contains(&self, language: &str, namespace: &str) -> bool {
        self.get(language, namespace).is_some()
    }

    /// Loaded pairs as sorted `"language:namespace"` strings.
    pub fn loaded_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .languages
            .iter()
            .flat_map(|(language, namespaces)| {
                namespaces
                    .keys()
                    .map(move |namespace| format!("{}:{}", language, namespace))
            })
            .collect();
        keys.sort();
        keys
    }

    /// Namespaces loaded for one language, sorted.
    pub fn namespaces_for(&self, language: &str) -> Vec<&str> {
        let mut namespaces: Vec<&str> = self
            .languages
            .get(language)
            .map(|namespaces| namespaces.keys().map(String::as_str).collect())
            .unwrap_or_default();
        namespaces.sort_unstable();
        namespaces
    }

    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.languages.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }

    /// Copy the store out as a plain bundle.
    pub fn to_bundle(&self) -> TranslationBundle {
        self.languages
            .iter()
            .map(|(language, namespaces)| {
                let namespaces = namespaces
                    .iter()
                    .map(|(namespace, data)| (namespace.clone(), data.as_ref().clone()))
                    .collect();
                (language.clone(), namespaces)
            })
            .collect()
    }
}

impl NamespaceSource for NamespaceStore {
    fn namespace(&self, language: &str, namespace: &str) -> Option<&NamespaceData> {
        self.get(language, namespace).map(Arc::as_ref)
    }
}
