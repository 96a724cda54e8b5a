use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use crate::debounce::Debouncer;
use crate::error::TranslateError;
use crate::language::{Language, SourceLanguage};
use crate::orchestrator::TranslateSession;
use crate::progress::ConsoleProgress;
use crate::service::{Translation, Translator};

/// Read-only view of the session for rendering, published on every change.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub input: String,
    pub source: SourceLanguage,
    pub target: Language,
    pub ui: Language,
    pub outcome: Option<Translation>,
    pub error: Option<TranslateError>,
    pub loading: bool,
}

impl Snapshot {
    fn of(session: &TranslateSession) -> Self {
        Self {
            input: session.input().to_string(),
            source: session.source(),
            target: session.target(),
            ui: session.ui(),
            outcome: session.outcome().cloned(),
            error: session.error().cloned(),
            loading: session.is_loading(),
        }
    }
}

struct Shared {
    session: Mutex<TranslateSession>,
    translator: Arc<dyn Translator>,
    updates: watch::Sender<Snapshot>,
    progress: ConsoleProgress,
}

impl Shared {
    fn publish(&self, session: &TranslateSession) {
        let _ = self.updates.send(Snapshot::of(session));
    }

    async fn reconcile_settled(shared: &Arc<Shared>, settled: &str) {
        let dispatch = {
            let mut session = shared.session.lock().await;
            let dispatch = session.reconcile(settled);
            shared.publish(&session);
            dispatch
        };
        let Some(dispatch) = dispatch else { return };

        shared.progress.info(format!(
            "translate #{}: {} -> {} ({} chars)",
            dispatch.generation,
            dispatch.request.source,
            dispatch.request.target,
            dispatch.request.source_text.chars().count()
        ));

        let shared = Arc::clone(shared);
        tokio::spawn(async move {
            let outcome = shared.translator.translate(&dispatch.request).await;
            let mut session = shared.session.lock().await;
            if dispatch.generation != session.generation() {
                shared.progress.info(format!(
                    "translate #{}: superseded, dropped",
                    dispatch.generation
                ));
            } else {
                match &outcome {
                    Ok(_) => shared
                        .progress
                        .info(format!("translate #{}: ok", dispatch.generation)),
                    Err(e) => shared
                        .progress
                        .info(format!("translate #{}: {e}", dispatch.generation)),
                }
            }
            session.complete(dispatch.generation, outcome);
            shared.publish(&session);
        });
    }
}

/// Async driver around `TranslateSession`: keystrokes go through the
/// debouncer, settled values through `reconcile`, and each dispatch runs as
/// its own task whose completion is applied under the generation guard.
/// Superseded calls are never cancelled, only ignored. Dropping the loop
/// tears down the debouncer and its pending window.
pub struct TranslateLoop {
    shared: Arc<Shared>,
    feed: mpsc::UnboundedSender<String>,
    driver: JoinHandle<()>,
}

impl TranslateLoop {
    #[must_use]
    pub fn new(
        translator: Arc<dyn Translator>,
        session: TranslateSession,
        debounce: Duration,
        progress: ConsoleProgress,
    ) -> Self {
        let (updates, _) = watch::channel(Snapshot::of(&session));
        let shared = Arc::new(Shared {
            session: Mutex::new(session),
            translator,
            updates,
            progress,
        });

        let mut debouncer = Debouncer::<String>::new(debounce);
        let feed = debouncer.feeder();
        let driver = tokio::spawn({
            let shared = Arc::clone(&shared);
            async move {
                while let Some(settled) = debouncer.settled().await {
                    Shared::reconcile_settled(&shared, settled.as_str()).await;
                }
            }
        });

        Self {
            shared,
            feed,
            driver,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.updates.subscribe()
    }

    /// Record a keystroke-level edit and restart the quiet window.
    pub async fn edit(&self, text: &str) {
        {
            let mut session = self.shared.session.lock().await;
            session.set_input(text);
            self.shared.publish(&session);
        }
        let _ = self.feed.send(text.to_string());
    }

    pub async fn swap_languages(&self) {
        let mut session = self.shared.session.lock().await;
        session.swap_languages();
        self.shared.publish(&session);
        // The swapped-in translation re-enters the pipeline as input.
        let _ = self.feed.send(session.input().to_string());
    }

    pub async fn set_source_language(&self, source: SourceLanguage) {
        let mut session = self.shared.session.lock().await;
        session.set_source_language(source);
        self.shared.publish(&session);
        let _ = self.feed.send(session.input().to_string());
    }

    pub async fn set_target_language(&self, target: Language) {
        let mut session = self.shared.session.lock().await;
        session.set_target_language(target);
        self.shared.publish(&session);
        let _ = self.feed.send(session.input().to_string());
    }

    pub async fn accept_correction(&self) -> bool {
        let mut session = self.shared.session.lock().await;
        let accepted = session.accept_correction();
        if accepted {
            self.shared.publish(&session);
            let _ = self.feed.send(session.input().to_string());
        }
        accepted
    }

    pub async fn promote_alternative(&self, alternative: &str) -> bool {
        let mut session = self.shared.session.lock().await;
        let promoted = session.promote_alternative(alternative);
        if promoted {
            self.shared.publish(&session);
        }
        promoted
    }

    pub async fn snapshot(&self) -> Snapshot {
        Snapshot::of(&*self.shared.session.lock().await)
    }
}

impl Drop for TranslateLoop {
    fn drop(&mut self) {
        self.driver.abort();
    }
}
