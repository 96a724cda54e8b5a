use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::language::Language;

/// Immutable UI string table, passed by injection instead of living in a
/// process-wide mutable global. Lookup falls back to English, then to the
/// key itself so a missing entry stays visible instead of panicking.
pub struct Messages {
    tables: HashMap<Language, HashMap<&'static str, &'static str>>,
}

impl Messages {
    #[must_use]
    pub fn builtin() -> &'static Messages {
        &BUILTIN
    }

    #[must_use]
    pub fn t<'a>(&'a self, locale: Language, key: &'a str) -> &'a str {
        self.lookup(locale, key)
    }

    /// Lookup with `{paramName}` interpolation by literal substring replacement.
    #[must_use]
    pub fn t_with(&self, locale: Language, key: &str, params: &[(&str, &str)]) -> String {
        let template = self.lookup(locale, key);
        let mut out = template.to_string();
        for (name, value) in params {
            let token = format!("{{{name}}}");
            out = out.replace(&token, value);
        }
        out
    }

    // Unknown keys echo back so the gap stays visible in the UI.
    fn lookup<'a>(&'a self, locale: Language, key: &'a str) -> &'a str {
        if let Some(s) = self.tables.get(&locale).and_then(|t| t.get(key)) {
            return s;
        }
        if let Some(s) = self.tables.get(&Language::En).and_then(|t| t.get(key)) {
            return s;
        }
        key
    }
}

static BUILTIN: Lazy<Messages> = Lazy::new(|| {
    let mut tables = HashMap::new();
    tables.insert(Language::En, en().into_iter().collect());
    tables.insert(Language::Tr, tr().into_iter().collect());
    tables.insert(Language::Ku, ku().into_iter().collect());
    Messages { tables }
});

fn en() -> Vec<(&'static str, &'static str)> {
    vec![
        ("error.not_configured", "API key missing. Add it to werger.toml or set {env}."),
        ("error.connection_failed", "Could not reach the translation service. Check your connection and try again."),
        ("status.loading", "Translating..."),
        ("status.copied", "Copied"),
        ("label.translation", "Translation"),
        ("label.alternatives", "Other options"),
        ("label.correction", "Did you mean: {text}"),
        ("label.note", "Context"),
        ("label.detected", "Detected: {lang}"),
        ("speech.unsupported", "Speech is not available for {lang}."),
    ]
}

fn tr() -> Vec<(&'static str, &'static str)> {
    vec![
        ("error.not_configured", "API anahtarı eksik. werger.toml dosyasına ekleyin veya {env} değişkenini ayarlayın."),
        ("error.connection_failed", "Çeviri servisine ulaşılamadı. Bağlantınızı kontrol edip tekrar deneyin."),
        ("status.loading", "Çevriliyor..."),
        ("status.copied", "Kopyalandı"),
        ("label.translation", "Çeviri"),
        ("label.alternatives", "Diğer seçenekler"),
        ("label.correction", "Bunu mu demek istediniz: {text}"),
        ("label.note", "Bağlam"),
        ("label.detected", "Algılanan: {lang}"),
        ("speech.unsupported", "{lang} için sesli okuma kullanılamıyor."),
    ]
}

fn ku() -> Vec<(&'static str, &'static str)> {
    vec![
        ("error.not_configured", "Kilîta API'yê kêm e. Li werger.toml zêde bike an {env} saz bike."),
        ("error.connection_failed", "Gihîştina servîsa wergerê pêk nehat. Girêdana xwe kontrol bike û dîsa biceribîne."),
        ("status.loading", "Tê wergerandin..."),
        ("status.copied", "Hat kopîkirin"),
        ("label.translation", "Werger"),
        ("label.alternatives", "Vebijarkên din"),
        ("label.correction", "Mebesta te ev bû: {text}"),
        ("label.note", "Naverok"),
        ("label.detected", "Zimanê naskirî: {lang}"),
        ("speech.unsupported", "Deng ji bo {lang} tune ye."),
    ]
}
