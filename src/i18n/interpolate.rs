//! `{param}` substitution for resolved translation strings.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Named values substituted into `{name}` placeholders.
pub type TranslationParams = HashMap<String, String>;

// Placeholder pattern (cached for performance)
static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("placeholder regex is valid"))
}

/// Replace `{name}` tokens with values from `params`.
///
/// Tokens without a matching parameter are kept verbatim.
pub fn interpolate(template: &str, params: &TranslationParams) -> String {
    if params.is_empty() || !template.contains('{') {
        return template.to_string();
    }

    placeholder_regex()
        .replace_all(template, |caps: &Captures| match params.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
