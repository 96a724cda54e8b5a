use crate::error::TranslateError;
use crate::language::{Language, SourceLanguage};
use crate::service::{Translation, TranslationRequest};

/// A request the session decided to send, tagged with the generation that a
/// completion must present to be applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatch {
    pub generation: u64,
    pub request: TranslationRequest,
}

/// UI-facing translation state and the dispatch discipline that feeds it.
///
/// This is a pure state machine: `reconcile` turns a settled input into at
/// most one `Dispatch`, and `complete` applies an outcome only if no newer
/// request (or local edit) superseded it in the meantime. All I/O lives
/// behind the `Translator` trait and is driven by `session::TranslateLoop`.
#[derive(Debug)]
pub struct TranslateSession {
    input: String,
    source: SourceLanguage,
    target: Language,
    ui: Language,
    outcome: Option<Translation>,
    error: Option<TranslateError>,
    loading: bool,
    generation: u64,
    last_key: Option<TranslationRequest>,
}

impl TranslateSession {
    #[must_use]
    pub fn new(source: SourceLanguage, target: Language, ui: Language) -> Self {
        let mut session = Self {
            input: String::new(),
            source,
            target,
            ui,
            outcome: None,
            error: None,
            loading: false,
            generation: 0,
            last_key: None,
        };
        // Tolerate a bad initial pair instead of panicking.
        if session.source.fixed() == Some(session.target) {
            session.target = session.target.fallback_target();
        }
        session
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn source(&self) -> SourceLanguage {
        self.source
    }

    pub fn target(&self) -> Language {
        self.target
    }

    pub fn ui(&self) -> Language {
        self.ui
    }

    pub fn outcome(&self) -> Option<&Translation> {
        self.outcome.as_ref()
    }

    pub fn error(&self) -> Option<&TranslateError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record a keystroke-level edit. Translation only starts once the
    /// debounced value comes back through `reconcile`.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Turn a settled input into zero or one dispatch.
    ///
    /// Empty input clears the pane without calling out. A request identical
    /// to the most recently dispatched one is suppressed, which bounds the
    /// external calls to one per distinct (text, source, target, ui) tuple.
    #[must_use]
    pub fn reconcile(&mut self, settled_text: &str) -> Option<Dispatch> {
        let request = TranslationRequest {
            source_text: settled_text.to_string(),
            source: self.source,
            target: self.target,
            ui: self.ui,
        };
        if request.is_blank() {
            self.outcome = None;
            self.error = None;
            // Forget the key: after the pane is cleared, re-entering the
            // same text must translate again. An in-flight completion must
            // not repopulate the cleared pane either.
            self.last_key = None;
            self.invalidate_in_flight();
            return None;
        }
        if self.last_key.as_ref() == Some(&request) {
            return None;
        }

        self.generation += 1;
        self.loading = true;
        self.error = None;
        self.last_key = Some(request.clone());
        Some(Dispatch {
            generation: self.generation,
            request,
        })
    }

    /// Apply the outcome of a dispatched call. A completion carrying a stale
    /// generation is dropped silently regardless of arrival order, so the
    /// visible state always reflects the latest dispatch.
    pub fn complete(&mut self, generation: u64, outcome: Result<Translation, TranslateError>) {
        if generation != self.generation {
            return;
        }
        self.loading = false;
        match outcome {
            Ok(translation) => {
                self.outcome = Some(translation);
                self.error = None;
            }
            Err(err) => {
                self.error = Some(err);
                self.outcome = None;
            }
        }
    }

    /// Exchange source and target. If a translation is on screen, it becomes
    /// the new input so the next reconcile re-translates in the opposite
    /// direction. An auto source collapses to the detected language when one
    /// is known, otherwise to the fixed fallback pairing.
    pub fn swap_languages(&mut self) {
        let old_target = self.target;
        let old_source = self
            .source
            .fixed()
            .or_else(|| self.outcome.as_ref().and_then(|t| t.detected()));

        self.source = SourceLanguage::Fixed(old_target);
        let mut new_target = old_source.unwrap_or_else(|| old_target.fallback_target());
        if new_target == old_target {
            new_target = old_target.fallback_target();
        }
        self.target = new_target;

        if let Some(main) = self
            .outcome
            .as_ref()
            .map(|t| t.main_translation.clone())
            .filter(|s| !s.trim().is_empty())
        {
            self.input = main;
        }
        self.invalidate_in_flight();
    }

    /// Change the source side, forcing the target away when the pair would
    /// collide: a Kurdish source pairs with English, anything else with
    /// Kurdish.
    pub fn set_source_language(&mut self, source: SourceLanguage) {
        self.source = source;
        if let Some(fixed) = source.fixed() {
            if fixed == self.target {
                self.target = fixed.fallback_target();
            }
        }
        self.invalidate_in_flight();
    }

    /// Change the target side. When the user picks the current source as the
    /// target, the source slides to the old target so the pair stays usable.
    pub fn set_target_language(&mut self, target: Language) {
        let old_target = self.target;
        self.target = target;
        if self.source.fixed() == Some(target) {
            self.source = SourceLanguage::Fixed(old_target);
        }
        self.invalidate_in_flight();
    }

    /// Replace the input with the model's corrected source text. The edit
    /// re-enters the debounce pipeline as fresh input.
    pub fn accept_correction(&mut self) -> bool {
        let corrected = match &self.outcome {
            Some(t) if !t.corrected_source_text.trim().is_empty() => {
                t.corrected_source_text.clone()
            }
            _ => return false,
        };
        self.input = corrected;
        self.invalidate_in_flight();
        true
    }

    /// Make the chosen alternative the main translation, demoting the old
    /// main into the alternatives. Pure local edit: no dispatch, corrected
    /// text and the note stay untouched.
    pub fn promote_alternative(&mut self, alternative: &str) -> bool {
        let Some(translation) = self.outcome.as_mut() else {
            return false;
        };
        let Some(pos) = translation
            .alternative_translations
            .iter()
            .position(|a| a == alternative)
        else {
            return false;
        };

        let chosen = translation.alternative_translations.remove(pos);
        let old_main = std::mem::replace(&mut translation.main_translation, chosen);
        if !old_main.trim().is_empty()
            && old_main != translation.main_translation
            && !translation.alternative_translations.contains(&old_main)
        {
            translation.alternative_translations.push(old_main);
        }
        self.invalidate_in_flight();
        true
    }

    // A local mutation supersedes whatever is in flight: bump the generation
    // so a late completion cannot overwrite the edit, and stop showing the
    // loading state for a request whose outcome will be dropped.
    fn invalidate_in_flight(&mut self) {
        self.generation += 1;
        self.loading = false;
    }
}

impl Default for TranslateSession {
    fn default() -> Self {
        Self::new(SourceLanguage::Fixed(Language::Ku), Language::Tr, Language::En)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> TranslateSession {
        TranslateSession::new(SourceLanguage::Fixed(Language::Ku), Language::En, Language::En)
    }

    fn translation(main: &str) -> Translation {
        Translation {
            main_translation: main.to_string(),
            ..Translation::default()
        }
    }

    #[test]
    fn empty_input_clears_without_dispatch() {
        let mut s = session();
        let d = s.reconcile("rojbaş").unwrap();
        s.complete(d.generation, Ok(translation("good morning")));

        assert!(s.reconcile("   ").is_none());
        assert!(s.outcome().is_none());
        assert!(s.error().is_none());
        assert!(!s.is_loading());
    }

    #[test]
    fn identical_tuple_is_dispatched_once() {
        let mut s = session();
        assert!(s.reconcile("rojbaş").is_some());
        assert!(s.reconcile("rojbaş").is_none());
        assert!(s.reconcile("rojbaş").is_none());
    }

    #[test]
    fn changing_any_key_field_redispatches() {
        let mut s = session();
        assert!(s.reconcile("rojbaş").is_some());
        s.set_target_language(Language::Tr);
        assert!(s.reconcile("rojbaş").is_some());
    }

    #[test]
    fn cleared_pane_retranslates_same_text() {
        let mut s = session();
        assert!(s.reconcile("rojbaş").is_some());
        assert!(s.reconcile("").is_none());
        assert!(s.reconcile("rojbaş").is_some());
    }

    #[test]
    fn clearing_while_in_flight_drops_the_late_completion() {
        let mut s = session();
        let d = s.reconcile("rojbaş").unwrap();
        assert!(s.is_loading());

        // The user clears the pane before the call comes back.
        assert!(s.reconcile("").is_none());
        assert!(!s.is_loading());

        s.complete(d.generation, Ok(translation("good morning")));
        assert!(s.outcome().is_none());
        assert!(s.error().is_none());
        assert!(!s.is_loading());
    }

    #[test]
    fn dispatch_sets_loading_and_clears_error() {
        let mut s = session();
        let d = s.reconcile("xyz").unwrap();
        s.complete(d.generation, Err(TranslateError::Service("boom".into())));
        assert!(s.error().is_some());

        assert!(s.reconcile("rojbaş").is_some());
        assert!(s.is_loading());
        assert!(s.error().is_none());
    }

    #[test]
    fn later_dispatch_wins_regardless_of_completion_order() {
        let mut s = session();
        let first = s.reconcile("one").unwrap();
        let second = s.reconcile("two").unwrap();
        assert!(second.generation > first.generation);

        // The newer request completes first.
        s.complete(second.generation, Ok(translation("du")));
        assert_eq!(s.outcome().unwrap().main_translation, "du");
        assert!(!s.is_loading());

        // The superseded one arrives late and is dropped.
        s.complete(first.generation, Ok(translation("yek")));
        assert_eq!(s.outcome().unwrap().main_translation, "du");
    }

    #[test]
    fn stale_error_is_dropped_too() {
        let mut s = session();
        let first = s.reconcile("one").unwrap();
        let second = s.reconcile("two").unwrap();
        s.complete(second.generation, Ok(translation("du")));
        s.complete(first.generation, Err(TranslateError::Service("late".into())));
        assert!(s.error().is_none());
        assert_eq!(s.outcome().unwrap().main_translation, "du");
    }

    #[test]
    fn failure_clears_result_and_loading() {
        let mut s = session();
        let d = s.reconcile("rojbaş").unwrap();
        s.complete(d.generation, Ok(translation("good morning")));

        let d = s.reconcile("rojbaş dinya").unwrap();
        s.complete(d.generation, Err(TranslateError::Configuration("no key".into())));
        assert!(s.outcome().is_none());
        assert!(!s.is_loading());
        assert_eq!(s.error().unwrap().message_key(), "error.not_configured");
    }

    #[test]
    fn swap_exchanges_pair_and_adopts_translation_as_input() {
        let mut s = session();
        s.set_input("rojbaş");
        let d = s.reconcile("rojbaş").unwrap();
        s.complete(d.generation, Ok(translation("good morning")));

        s.swap_languages();
        assert_eq!(s.source(), SourceLanguage::Fixed(Language::En));
        assert_eq!(s.target(), Language::Ku);
        assert_eq!(s.input(), "good morning");
    }

    #[test]
    fn swap_without_result_keeps_input() {
        let mut s = session();
        s.set_input("rojb");
        s.swap_languages();
        assert_eq!(s.input(), "rojb");
        assert_eq!(s.source(), SourceLanguage::Fixed(Language::En));
        assert_eq!(s.target(), Language::Ku);
    }

    #[test]
    fn swap_with_auto_source_uses_detected_language() {
        let mut s = TranslateSession::new(SourceLanguage::Auto, Language::En, Language::En);
        let d = s.reconcile("merhaba").unwrap();
        let mut t = translation("hello");
        t.detected_language = "tr".into();
        s.complete(d.generation, Ok(t));

        s.swap_languages();
        assert_eq!(s.source(), SourceLanguage::Fixed(Language::En));
        assert_eq!(s.target(), Language::Tr);
    }

    #[test]
    fn swap_with_auto_source_and_no_detection_stays_unequal() {
        let mut s = TranslateSession::new(SourceLanguage::Auto, Language::En, Language::En);
        s.swap_languages();
        assert_eq!(s.source(), SourceLanguage::Fixed(Language::En));
        assert_ne!(s.source().fixed(), Some(s.target()));
    }

    #[test]
    fn source_change_forces_target_apart() {
        let mut s = session(); // ku -> en
        s.set_source_language(SourceLanguage::Fixed(Language::En));
        assert_eq!(s.target(), Language::Ku);

        s.set_source_language(SourceLanguage::Fixed(Language::Ku));
        assert_eq!(s.target(), Language::En);
    }

    #[test]
    fn target_change_onto_source_slides_source_over() {
        let mut s = session(); // ku -> en
        s.set_target_language(Language::Ku);
        assert_eq!(s.target(), Language::Ku);
        assert_eq!(s.source(), SourceLanguage::Fixed(Language::En));
    }

    #[test]
    fn language_mutations_never_leave_pair_equal() {
        for src in [Language::Ku, Language::Tr, Language::En] {
            for tgt in [Language::Ku, Language::Tr, Language::En] {
                let mut s = TranslateSession::new(
                    SourceLanguage::Fixed(Language::Ku),
                    Language::Tr,
                    Language::En,
                );
                s.set_source_language(SourceLanguage::Fixed(src));
                s.set_target_language(tgt);
                assert_ne!(s.source().fixed(), Some(s.target()), "{src} -> {tgt}");
            }
        }
    }

    #[test]
    fn accept_correction_replaces_input() {
        let mut s = session();
        s.set_input("rojbas");
        let d = s.reconcile("rojbas").unwrap();
        let mut t = translation("good morning");
        t.corrected_source_text = "rojbaş".into();
        s.complete(d.generation, Ok(t));

        assert!(s.accept_correction());
        assert_eq!(s.input(), "rojbaş");
        // The next reconcile for the corrected text dispatches normally.
        assert!(s.reconcile("rojbaş").is_some());
    }

    #[test]
    fn accept_correction_without_result_is_a_noop() {
        let mut s = session();
        s.set_input("rojbas");
        assert!(!s.accept_correction());
        assert_eq!(s.input(), "rojbas");
    }

    #[test]
    fn promote_swaps_main_and_alternative_exactly() {
        let mut s = session();
        let d = s.reconcile("silav").unwrap();
        let mut t = translation("M");
        t.alternative_translations = vec!["A".into(), "B".into()];
        t.corrected_source_text = "silav".into();
        t.meaning_explanation = "greeting".into();
        s.complete(d.generation, Ok(t));

        assert!(s.promote_alternative("A"));
        let t = s.outcome().unwrap();
        assert_eq!(t.main_translation, "A");
        let mut alts = t.alternative_translations.clone();
        alts.sort();
        assert_eq!(alts, vec!["B".to_string(), "M".to_string()]);
        assert_eq!(t.corrected_source_text, "silav");
        assert_eq!(t.meaning_explanation, "greeting");
    }

    #[test]
    fn promote_unknown_alternative_is_rejected() {
        let mut s = session();
        let d = s.reconcile("silav").unwrap();
        let mut t = translation("M");
        t.alternative_translations = vec!["A".into()];
        s.complete(d.generation, Ok(t));

        assert!(!s.promote_alternative("Z"));
        assert_eq!(s.outcome().unwrap().main_translation, "M");
    }

    #[test]
    fn promote_never_duplicates_an_existing_alternative() {
        let mut s = session();
        let d = s.reconcile("silav").unwrap();
        let mut t = translation("A");
        t.alternative_translations = vec!["A".into(), "B".into()];
        s.complete(d.generation, Ok(t));

        assert!(s.promote_alternative("A"));
        let t = s.outcome().unwrap();
        assert_eq!(t.main_translation, "A");
        assert_eq!(t.alternative_translations, vec!["B".to_string()]);
    }

    #[test]
    fn promote_bumps_generation_so_stale_response_cannot_clobber_it() {
        let mut s = session();
        let first = s.reconcile("silav").unwrap();
        let mut t = translation("M");
        t.alternative_translations = vec!["A".into()];
        s.complete(first.generation, Ok(t));

        // A newer request is still in flight when the user promotes.
        let second = s.reconcile("silav hevalno").unwrap();
        assert!(s.promote_alternative("A"));
        assert!(!s.is_loading());

        s.complete(second.generation, Ok(translation("hello friends")));
        assert_eq!(s.outcome().unwrap().main_translation, "A");
    }

    #[test]
    fn swap_while_loading_drops_the_in_flight_outcome() {
        let mut s = session();
        s.set_input("rojbaş");
        let d = s.reconcile("rojbaş").unwrap();
        assert!(s.is_loading());

        s.swap_languages();
        assert!(!s.is_loading());
        s.complete(d.generation, Ok(translation("good morning")));
        assert!(s.outcome().is_none());
    }

    #[test]
    fn equal_initial_pair_is_repaired() {
        let s = TranslateSession::new(SourceLanguage::Fixed(Language::En), Language::En, Language::En);
        assert_eq!(s.target(), Language::Ku);
    }
}
