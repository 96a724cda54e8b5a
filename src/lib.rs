pub mod config;
pub mod debounce;
pub mod error;
pub mod feedback;
pub mod i18n;
pub mod language;
pub mod orchestrator;
pub mod progress;
pub mod prompts;
pub mod service;
pub mod session;

pub use error::TranslateError;
pub use language::{Language, SourceLanguage};
pub use orchestrator::TranslateSession;
pub use service::{HttpTranslator, Translation, TranslationRequest, Translator};
pub use session::TranslateLoop;
