use crate::language::SourceLanguage;
use crate::service::TranslationRequest;

pub const TRANSLATE_PROMPT: &str = r#"You are an expert translator for Kurdish (Kurmanji), Turkish and English.
Translate the text below from {{source_lang}} to {{target_lang}}.

Return STRICT JSON only (one JSON object). No markdown. No extra text.

Schema:
{"mainTranslation":"...","alternativeTranslations":["..."],"correctedSourceText":"...","meaningExplanation":"...","detectedLanguage":"..."}

Rules:
- mainTranslation: the single best translation into {{target_lang}}.
- alternativeTranslations: 0-3 genuinely different phrasings in {{target_lang}}; omit near-duplicates.
- correctedSourceText: the source text with spelling/grammar fixed; copy it unchanged if already correct.
- meaningExplanation: one or two sentences in {{ui_lang}} on cultural or contextual nuance; empty string if there is none worth noting.
- detectedLanguage: the language of the source text ("ku", "tr" or "en"){{detected_hint}}.
- Do NOT translate proper names unless they have an established form.

TEXT:
{{text}}"#;

/// Render the instruction prompt for one request. Language names are embedded
/// as English display names; the model answers the note in the UI language.
#[must_use]
pub fn build_translate_prompt(req: &TranslationRequest) -> String {
    let detected_hint = match req.source {
        SourceLanguage::Auto => "",
        SourceLanguage::Fixed(_) => "; the source language is already known, echo it",
    };
    render_template(
        TRANSLATE_PROMPT,
        &[
            ("source_lang", req.source.display_name()),
            ("target_lang", req.target.display_name()),
            ("ui_lang", req.ui.display_name()),
            ("detected_hint", detected_hint),
            ("text", &req.source_text),
        ],
    )
}

pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (k, v) in vars {
        let pat = format!("{{{{{k}}}}}");
        out = out.replace(&pat, v);
    }
    out
}
