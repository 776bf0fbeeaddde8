//! Key parsing and multi-language node resolution.

use super::namespace::{NamespaceData, TranslationNode};
use super::TranslationBundle;

/// Namespace used when a key carries no namespace prefix.
pub const DEFAULT_NAMESPACE: &str = "common";

/// A translation key split into namespace and lookup path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedKey<'a> {
    pub namespace: &'a str,
    pub path: &'a str,
}

/// Split a raw key into namespace and path.
///
/// A colon wins over a dot: `"a:b.c"` is namespace `a`, path `b.c`. Without a
/// colon the text before the first dot is the namespace. A bare key lives in
/// [`DEFAULT_NAMESPACE`].
pub fn parse_key(key: &str) -> ParsedKey<'_> {
    if let Some((namespace, path)) = key.split_once(':') {
        return ParsedKey { namespace, path };
    }
    if let Some((namespace, path)) = key.split_once('.') {
        return ParsedKey { namespace, path };
    }
    ParsedKey {
        namespace: DEFAULT_NAMESPACE,
        path: key,
    }
}

/// Anything that can hand out namespace data by language and namespace.
pub trait NamespaceSource {
    fn namespace(&self, language: &str, namespace: &str) -> Option<&NamespaceData>;
}

impl NamespaceSource for TranslationBundle {
    fn namespace(&self, language: &str, namespace: &str) -> Option<&NamespaceData> {
        self.get(language)?.get(namespace)
    }
}

/// Languages to try, in order: the requested one, then the fallback if distinct.
pub fn candidate_languages<'a>(language: &'a str, fallback: Option<&'a str>) -> Vec<&'a str> {
    let mut languages = vec![language];
    if let Some(fallback) = fallback.filter(|fallback| *fallback != language) {
        languages.push(fallback);
    }
    languages
}

/// Find the first node for `key` across `languages` that satisfies `accept`.
///
/// `accept` lets callers type-check the leaf: a string lookup skips a list
/// in the current language and keeps searching the fallback.
pub fn find_node<'s, S, F>(
    source: &'s S,
    key: &ParsedKey<'_>,
    languages: &[&str],
    accept: F,
) -> Option<&'s TranslationNode>
where
    S: NamespaceSource + ?Sized,
    F: Fn(&TranslationNode) -> bool,
{
    languages.iter().find_map(|language| {
        source
            .namespace(language, key.namespace)
            .and_then(|data| data.lookup(key.path))
            .filter(|node| accept(*node))
    })
}

/// Resolve a string leaf for `key`, trying the fallback language second.
pub fn resolve_text<'s, S>(
    source: &'s S,
    key: &str,
    language: &str,
    fallback: Option<&str>,
) -> Option<&'s str>
where
    S: NamespaceSource + ?Sized,
{
    let parsed = parse_key(key);
    let languages = candidate_languages(language, fallback);
    find_node(source, &parsed, &languages, |node| node.as_text().is_some())
        .and_then(TranslationNode::as_text)
}
