use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::i18n::Messages;
use crate::language::Language;

pub const COPIED_RESET: Duration = Duration::from_millis(2000);

/// Transient "copied" feedback for one clipboard target. `mark` raises the
/// indicator and schedules a revert; marking again restarts the clock, and a
/// revert scheduled before the latest mark never clears the newer state.
pub struct CopiedIndicator {
    reset_after: Duration,
    state: Arc<Mutex<State>>,
    updates: watch::Sender<Option<String>>,
}

struct State {
    active: Option<String>,
    generation: u64,
}

impl CopiedIndicator {
    #[must_use]
    pub fn new(reset_after: Duration) -> Self {
        let (updates, _) = watch::channel(None);
        Self {
            reset_after,
            state: Arc::new(Mutex::new(State {
                active: None,
                generation: 0,
            })),
            updates,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.updates.subscribe()
    }

    /// Which target (if any) currently shows the indicator.
    #[must_use]
    pub fn active(&self) -> Option<String> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).active.clone()
    }

    /// Show the indicator on `target` and revert after the delay.
    pub fn mark(&self, target: &str) {
        let generation = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.generation += 1;
            state.active = Some(target.to_string());
            state.generation
        };
        let _ = self.updates.send(Some(target.to_string()));

        let state = Arc::clone(&self.state);
        let updates = self.updates.clone();
        let delay = self.reset_after;
        tokio::spawn(async move {
            time::sleep(delay).await;
            let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
            // A newer mark owns the indicator now.
            if state.generation != generation {
                return;
            }
            state.active = None;
            let _ = updates.send(None);
        });
    }
}

/// Speech synthesis availability. Kurdish has no usable voice, so the UI
/// shows a localized notice instead of attempting playback.
#[must_use]
pub fn speech_notice(messages: &Messages, ui: Language, spoken: Language) -> Option<String> {
    if spoken.speech_tag().is_some() {
        return None;
    }
    Some(messages.t_with(ui, "speech.unsupported", &[("lang", spoken.display_name())]))
}
