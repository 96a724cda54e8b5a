use std::fmt;

use serde::{Deserialize, Serialize};

/// Languages the client translates between. UI locales use the same set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ku,
    Tr,
    En,
}

impl Language {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Language::Ku => "ku",
            Language::Tr => "tr",
            Language::En => "en",
        }
    }

    /// English display name, as embedded in prompts.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Language::Ku => "Kurdish (Kurmanji)",
            Language::Tr => "Turkish",
            Language::En => "English",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ku" | "kur" | "kmr" | "kurdish" => Some(Language::Ku),
            "tr" | "tur" | "turkish" => Some(Language::Tr),
            "en" | "eng" | "english" => Some(Language::En),
            _ => None,
        }
    }

    /// Target forced when a language mutation would leave source == target:
    /// a Kurdish source pairs with English, everything else pairs with Kurdish.
    #[must_use]
    pub fn fallback_target(self) -> Language {
        match self {
            Language::Ku => Language::En,
            _ => Language::Ku,
        }
    }

    /// BCP 47 tag for speech synthesis voice selection. Kurdish has no
    /// usable voice, so it is unsupported.
    #[must_use]
    pub fn speech_tag(self) -> Option<&'static str> {
        match self {
            Language::Ku => None,
            Language::Tr => Some("tr-TR"),
            Language::En => Some("en-US"),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Source side of a translation: a concrete language or auto-detect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLanguage {
    Auto,
    #[serde(untagged)]
    Fixed(Language),
}

impl SourceLanguage {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            SourceLanguage::Auto => "auto",
            SourceLanguage::Fixed(lang) => lang.code(),
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            SourceLanguage::Auto => "the detected language",
            SourceLanguage::Fixed(lang) => lang.display_name(),
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Some(SourceLanguage::Auto);
        }
        Language::parse(s).map(SourceLanguage::Fixed)
    }

    #[must_use]
    pub fn fixed(self) -> Option<Language> {
        match self {
            SourceLanguage::Auto => None,
            SourceLanguage::Fixed(lang) => Some(lang),
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<Language> for SourceLanguage {
    fn from(lang: Language) -> Self {
        SourceLanguage::Fixed(lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_codes_and_names() {
        assert_eq!(Language::parse("ku"), Some(Language::Ku));
        assert_eq!(Language::parse("Turkish"), Some(Language::Tr));
        assert_eq!(Language::parse(" EN "), Some(Language::En));
        assert_eq!(Language::parse("de"), None);
        assert_eq!(SourceLanguage::parse("auto"), Some(SourceLanguage::Auto));
        assert_eq!(
            SourceLanguage::parse("tr"),
            Some(SourceLanguage::Fixed(Language::Tr))
        );
    }

    #[test]
    fn fallback_target_never_equals_source() {
        for lang in [Language::Ku, Language::Tr, Language::En] {
            assert_ne!(lang.fallback_target(), lang);
        }
    }

    #[test]
    fn kurdish_has_no_speech_voice() {
        assert_eq!(Language::Ku.speech_tag(), None);
        assert!(Language::Tr.speech_tag().is_some());
        assert!(Language::En.speech_tag().is_some());
    }
}
