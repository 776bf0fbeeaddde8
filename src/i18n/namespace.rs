//! Namespace data model: the typed tree a loader payload is validated into.
//!
//! Leaves are strings, string lists, or plural objects keyed by CLDR plural
//! category. Any other JSON object becomes a nested branch. Only the root is
//! required to be an object; leaves of any other shape are dropped so a
//! lookup of that key misses.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// CLDR plural categories recognised in plural objects.
pub const PLURAL_CATEGORIES: [&str; 6] = ["zero", "one", "two", "few", "many", "other"];

/// A loader payload did not have the shape of a translation namespace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at '{path}'")]
pub struct ShapeError {
    pub path: String,
    pub message: String,
}

impl ShapeError {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: if path.is_empty() {
                "<root>".to_string()
            } else {
                path.to_string()
            },
            message: message.into(),
        }
    }
}

/// One node of a namespace tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TranslationNode {
    Text(String),
    List(Vec<String>),
    Plural(PluralForms),
    Tree(NamespaceData),
}

impl TranslationNode {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TranslationNode::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            TranslationNode::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_plural(&self) -> Option<&PluralForms> {
        match self {
            TranslationNode::Plural(forms) => Some(forms),
            _ => None,
        }
    }

    /// Classify one payload value. Values that cannot be a translation
    /// (`null`, numbers, booleans, lists with non-string entries) yield `None`
    /// so only that key goes missing.
    fn from_value(path: &str, value: Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(TranslationNode::Text(text)),
            Value::Array(items) => {
                let total = items.len();
                let list: Vec<String> = items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(text) => Some(text),
                        _ => None,
                    })
                    .collect();
                if list.len() == total {
                    Some(TranslationNode::List(list))
                } else {
                    debug!("Skipping '{}': list entries must be strings", path);
                    None
                }
            }
            Value::Object(map) => {
                if PluralForms::is_plural_shape(&map) {
                    let forms = map
                        .into_iter()
                        .filter_map(|(category, form)| match form {
                            Value::String(text) => Some((category, TranslationNode::Text(text))),
                            _ => None,
                        })
                        .collect();
                    Some(TranslationNode::Plural(PluralForms(forms)))
                } else {
                    Some(TranslationNode::Tree(NamespaceData::from_object(path, map)))
                }
            }
            other => {
                debug!("Skipping '{}': {} is not a translation value", path, type_name(&other));
                None
            }
        }
    }
}

/// Plural category -> form, e.g. `{"one": "1 item", "other": "{count} items"}`.
///
/// Forms are stored as text nodes so a dotted path such as `items.one` can
/// resolve to a single form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PluralForms(BTreeMap<String, TranslationNode>);

impl PluralForms {
    pub fn new(forms: BTreeMap<String, String>) -> Self {
        Self(
            forms
                .into_iter()
                .map(|(category, form)| (category, TranslationNode::Text(form)))
                .collect(),
        )
    }

    pub fn get(&self, category: &str) -> Option<&str> {
        self.0.get(category).and_then(TranslationNode::as_text)
    }

    /// `one` when `count == 1` and the language defines it, `other` otherwise.
    pub fn select(&self, count: i64) -> Option<&str> {
        if count == 1 {
            if let Some(one) = self.get("one") {
                return Some(one);
            }
        }
        self.get("other")
    }

    fn is_plural_shape(map: &serde_json::Map<String, Value>) -> bool {
        map.contains_key("other")
            && map.iter().all(|(category, form)| {
                PLURAL_CATEGORIES.contains(&category.as_str()) && form.is_string()
            })
    }
}

/// A loaded namespace: key -> node, ordered for stable output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct NamespaceData(BTreeMap<String, TranslationNode>);

impl NamespaceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&TranslationNode> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, node: TranslationNode) {
        self.0.insert(key.into(), node);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Walk a dotted path through nested branches.
    ///
    /// A plural object is entered by category, so `items.other` yields that
    /// form as text. Returns `None` when any segment is missing or an
    /// intermediate node is a text or list leaf.
    pub fn lookup(&self, path: &str) -> Option<&TranslationNode> {
        let mut segments = path.split('.');
        let mut node = self.0.get(segments.next()?)?;
        for segment in segments {
            node = match node {
                TranslationNode::Tree(children) => children.0.get(segment)?,
                TranslationNode::Plural(forms) => forms.0.get(segment)?,
                _ => return None,
            };
        }
        Some(node)
    }

    /// Dotted paths of every leaf, in key order.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_leaf_paths("", &mut paths);
        paths
    }

    fn collect_leaf_paths(&self, prefix: &str, paths: &mut Vec<String>) {
        for (key, node) in &self.0 {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            match node {
                TranslationNode::Tree(children) => children.collect_leaf_paths(&path, paths),
                _ => paths.push(path),
            }
        }
    }

    fn from_object(path: &str, map: serde_json::Map<String, Value>) -> Self {
        let mut entries = BTreeMap::new();
        for (key, value) in map {
            let child_path = if path.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", path, key)
            };
            if let Some(node) = TranslationNode::from_value(&child_path, value) {
                entries.insert(key, node);
            }
        }
        Self(entries)
    }
}

impl TryFrom<Value> for NamespaceData {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::from_object("", map)),
            other => Err(ShapeError::new(
                "",
                format!("expected an object, found {}", type_name(&other)),
            )),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
