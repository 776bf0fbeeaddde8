//! Error types for namespace loading and translator configuration.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Coarse classification of translation errors, as reported to error handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A single namespace load failed
    LoadFailed,
    /// The fallback-language load for a failed namespace also failed
    FallbackLoadFailed,
    /// Failure outside the per-namespace loop
    InitializationFailed,
    /// Every backoff attempt was exhausted
    RetryFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::LoadFailed => "LOAD_FAILED",
            ErrorKind::FallbackLoadFailed => "FALLBACK_LOAD_FAILED",
            ErrorKind::InitializationFailed => "INITIALIZATION_FAILED",
            ErrorKind::RetryFailed => "RETRY_FAILED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while loading or resolving translation data.
///
/// The type is `Clone` so a single failed load can be fanned out to every
/// caller waiting on the same in-flight request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("failed to load {language}:{namespace}: {message}")]
    LoadFailed {
        language: String,
        namespace: String,
        message: String,
    },

    #[error("malformed translation data for {language}:{namespace}: {message}")]
    MalformedData {
        language: String,
        namespace: String,
        message: String,
    },

    #[error("loading {language}:{namespace} timed out after {after:?}")]
    Timeout {
        language: String,
        namespace: String,
        after: Duration,
    },

    #[error("fallback load of {fallback_language}:{namespace} for '{language}' failed: {message}")]
    FallbackLoadFailed {
        language: String,
        fallback_language: String,
        namespace: String,
        message: String,
    },

    #[error("loading {language}:{namespace} failed after {attempts} attempts: {message}")]
    RetryFailed {
        language: String,
        namespace: String,
        attempts: u32,
        message: String,
    },

    #[error("initialization failed: {0}")]
    InitializationFailed(String),
}

impl TranslationError {
    pub fn load_failed(language: &str, namespace: &str, message: impl Into<String>) -> Self {
        TranslationError::LoadFailed {
            language: language.to_string(),
            namespace: namespace.to_string(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TranslationError::LoadFailed { .. }
            | TranslationError::MalformedData { .. }
            | TranslationError::Timeout { .. } => ErrorKind::LoadFailed,
            TranslationError::FallbackLoadFailed { .. } => ErrorKind::FallbackLoadFailed,
            TranslationError::RetryFailed { .. } => ErrorKind::RetryFailed,
            TranslationError::InitializationFailed(_) => ErrorKind::InitializationFailed,
        }
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// A payload with the wrong shape will not fix itself, so it fails fast.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TranslationError::LoadFailed { .. } | TranslationError::Timeout { .. }
        )
    }
}

/// Rejected translator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    EmptyLanguage(&'static str),

    #[error("invalid namespace name: '{0}'")]
    InvalidNamespace(String),

    #[error("retry policy must allow at least one attempt")]
    NoAttempts,
}
