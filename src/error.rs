use thiserror::Error;

use crate::i18n::Messages;
use crate::language::Language;

/// Everything the translation boundary can fail with, collapsed to the two
/// kinds the UI distinguishes: a fixable configuration problem and a generic
/// service failure. Neither propagates past the orchestrator; both map to a
/// localized banner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("not configured: {0}")]
    Configuration(String),

    #[error("service error: {0}")]
    Service(String),
}

impl TranslateError {
    /// Key into the UI string table for the error banner.
    #[must_use]
    pub fn message_key(&self) -> &'static str {
        match self {
            TranslateError::Configuration(_) => "error.not_configured",
            TranslateError::Service(_) => "error.connection_failed",
        }
    }

    #[must_use]
    pub fn localized(&self, messages: &Messages, locale: Language, api_key_env: &str) -> String {
        messages.t_with(locale, self.message_key(), &[("env", api_key_env)])
    }
}

impl From<reqwest::Error> for TranslateError {
    fn from(err: reqwest::Error) -> Self {
        TranslateError::Service(err.to_string())
    }
}

impl From<serde_json::Error> for TranslateError {
    fn from(err: serde_json::Error) -> Self {
        TranslateError::Service(format!("malformed response: {err}"))
    }
}

pub type TranslateResult<T> = Result<T, TranslateError>;
