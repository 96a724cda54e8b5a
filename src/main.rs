use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::select;

use werger::config::{find_default_config, init_default_config, load_config, AppConfig};
use werger::feedback::{speech_notice, CopiedIndicator};
use werger::i18n::Messages;
use werger::progress::ConsoleProgress;
use werger::session::Snapshot;
use werger::{
    HttpTranslator, Language, SourceLanguage, TranslateLoop, TranslateSession, Translation,
    TranslationRequest, Translator,
};

#[derive(Parser, Debug)]
#[command(name = "werger")]
#[command(about = "Kurdish-Turkish-English translator (LLM backend)", long_about = None)]
struct Args {
    /// Generate a default config file, then exit
    #[arg(long)]
    init_config: bool,

    /// Directory to write the config file (default: current directory)
    #[arg(long, value_name = "DIR")]
    init_config_dir: Option<PathBuf>,

    /// Overwrite an existing config file when used with --init-config
    #[arg(long)]
    force: bool,

    /// Config file path (default: search for werger.toml upwards)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Source language: auto, ku, tr or en
    #[arg(long)]
    source_lang: Option<String>,

    /// Target language: ku, tr or en
    #[arg(long)]
    target_lang: Option<String>,

    /// Interface language: en, tr or ku
    #[arg(long)]
    ui_lang: Option<String>,

    /// Chat-completions endpoint URL (overrides config)
    #[arg(long)]
    endpoint: Option<String>,

    /// Model name (overrides config)
    #[arg(long)]
    model: Option<String>,

    /// Interactive session: retranslates as you type lines
    #[arg(short, long)]
    interactive: bool,

    /// Suppress progress lines on stderr
    #[arg(short, long)]
    quiet: bool,

    /// Text to translate (one-shot mode)
    #[arg(value_name = "TEXT")]
    text: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.init_config {
        let dir = args
            .init_config_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let cfg_path = init_default_config(&dir, args.force).context("init default config")?;
        eprintln!("Wrote config: {}", cfg_path.display());
        return Ok(());
    }

    let mut cfg = match args.config.clone().or_else(find_default_config) {
        Some(path) => load_config(&path)?,
        None => AppConfig::default(),
    };
    if let Some(endpoint) = args.endpoint.clone() {
        cfg.service.endpoint = endpoint;
    }
    if let Some(model) = args.model.clone() {
        cfg.service.model = model;
    }

    let source = match args.source_lang.as_deref() {
        Some(s) => SourceLanguage::parse(s)
            .with_context(|| format!("unknown source language: {s} (use auto, ku, tr or en)"))?,
        None => SourceLanguage::Auto,
    };
    let target = match args.target_lang.as_deref() {
        Some(s) => Language::parse(s)
            .with_context(|| format!("unknown target language: {s} (use ku, tr or en)"))?,
        None => source
            .fixed()
            .map(Language::fallback_target)
            .unwrap_or(Language::Ku),
    };
    if source.fixed() == Some(target) {
        anyhow::bail!("source and target language are the same: {target}");
    }
    let ui = match args.ui_lang.as_deref() {
        Some(s) => Language::parse(s)
            .with_context(|| format!("unknown interface language: {s} (use en, tr or ku)"))?,
        None => cfg.ui.language,
    };

    let messages = Messages::builtin();
    let translator = Arc::new(HttpTranslator::new(&cfg.service)?);

    if let Some(text) = args.text {
        return translate_once(translator, &cfg, messages, text, source, target, ui).await;
    }

    if args.interactive {
        return interactive(translator, &cfg, messages, source, target, ui, args.quiet).await;
    }

    let mut cmd = Args::command();
    cmd.print_help().context("print help")?;
    eprintln!(
        "\n\nUSAGE:\n  werger \"rojbaş\"\n  werger --interactive --target-lang en\n\nTIPS:\n  - Default config search: werger.toml (upwards), or set WERGER_CONFIG.\n  - The API key comes from werger.toml or the WERGER_API_KEY environment variable.\n"
    );
    Ok(())
}

async fn translate_once(
    translator: Arc<HttpTranslator>,
    cfg: &AppConfig,
    messages: &Messages,
    text: String,
    source: SourceLanguage,
    target: Language,
    ui: Language,
) -> anyhow::Result<()> {
    let req = TranslationRequest {
        source_text: text,
        source,
        target,
        ui,
    };
    match translator.translate(&req).await {
        Ok(translation) => {
            print_translation(messages, ui, source, &translation);
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", err.localized(messages, ui, &cfg.service.api_key_env));
            Err(err.into())
        }
    }
}

fn print_translation(
    messages: &Messages,
    ui: Language,
    source: SourceLanguage,
    t: &Translation,
) {
    println!("{}", t.main_translation);
    if source == SourceLanguage::Auto {
        if let Some(detected) = t.detected() {
            eprintln!(
                "{}",
                messages.t_with(ui, "label.detected", &[("lang", detected.display_name())])
            );
        }
    }
    if !t.corrected_source_text.is_empty() {
        eprintln!(
            "{}",
            messages.t_with(ui, "label.correction", &[("text", &t.corrected_source_text)])
        );
    }
    if !t.alternative_translations.is_empty() {
        eprintln!("{}:", messages.t(ui, "label.alternatives"));
        for (i, alt) in t.alternative_translations.iter().enumerate() {
            eprintln!("  {}. {alt}", i + 1);
        }
    }
    if !t.meaning_explanation.is_empty() {
        eprintln!("{}: {}", messages.t(ui, "label.note"), t.meaning_explanation);
    }
}

async fn interactive(
    translator: Arc<HttpTranslator>,
    cfg: &AppConfig,
    messages: &Messages,
    source: SourceLanguage,
    target: Language,
    ui: Language,
    quiet: bool,
) -> anyhow::Result<()> {
    let session = TranslateSession::new(source, target, ui);
    let tl = TranslateLoop::new(
        translator,
        session,
        Duration::from_millis(cfg.ui.debounce_ms),
        ConsoleProgress::new(!quiet),
    );
    let mut updates = tl.subscribe();
    let copied = CopiedIndicator::new(Duration::from_millis(cfg.ui.copied_reset_ms));
    let mut copied_rx = copied.subscribe();

    eprintln!(
        "{} -> {} | type text to translate; :swap :source :target :accept :promote N :copy :say :quit",
        source, target
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    loop {
        select! {
            line = lines.next_line() => {
                let Some(line) = line.context("read stdin")? else { break };
                if !handle_line(&tl, &copied, messages, line.trim()).await {
                    break;
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                render_snapshot(messages, cfg, &updates.borrow().clone());
            }
            changed = copied_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                if copied_rx.borrow().is_some() {
                    let snap = tl.snapshot().await;
                    eprintln!("{}", messages.t(snap.ui, "status.copied"));
                }
            }
        }
    }
    Ok(())
}

/// Returns false when the session should end.
async fn handle_line(
    tl: &TranslateLoop,
    copied: &CopiedIndicator,
    messages: &Messages,
    line: &str,
) -> bool {
    let Some(command) = line.strip_prefix(':') else {
        tl.edit(line).await;
        return true;
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match name {
        "q" | "quit" => return false,
        "swap" => tl.swap_languages().await,
        "source" => match SourceLanguage::parse(arg) {
            Some(source) => tl.set_source_language(source).await,
            None => eprintln!("usage: :source auto|ku|tr|en"),
        },
        "target" => match Language::parse(arg) {
            Some(target) => tl.set_target_language(target).await,
            None => eprintln!("usage: :target ku|tr|en"),
        },
        "accept" => {
            if !tl.accept_correction().await {
                eprintln!("nothing to accept");
            }
        }
        "promote" => {
            let snap = tl.snapshot().await;
            let alt = arg
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| {
                    snap.outcome
                        .as_ref()
                        .and_then(|t| t.alternative_translations.get(i).cloned())
                });
            match alt {
                Some(alt) => {
                    tl.promote_alternative(&alt).await;
                }
                None => eprintln!("usage: :promote N (an alternative number)"),
            }
        }
        "copy" => {
            let snap = tl.snapshot().await;
            match snap.outcome.as_ref().filter(|t| !t.main_translation.is_empty()) {
                // The terminal has no clipboard; marking still drives the
                // indicator so its revert shows up in the stream.
                Some(t) => {
                    println!("{}", t.main_translation);
                    copied.mark("main");
                }
                None => eprintln!("nothing to copy"),
            }
        }
        "say" => {
            let snap = tl.snapshot().await;
            match speech_notice(messages, snap.ui, snap.target) {
                Some(notice) => eprintln!("{notice}"),
                None => {
                    if let Some(t) = snap.outcome.as_ref() {
                        if let Some(tag) = snap.target.speech_tag() {
                            eprintln!("say [{tag}]: {}", t.main_translation);
                        }
                    }
                }
            }
        }
        _ => eprintln!("unknown command: :{name}"),
    }
    true
}

fn render_snapshot(messages: &Messages, cfg: &AppConfig, snap: &Snapshot) {
    if snap.loading {
        eprintln!("{}", messages.t(snap.ui, "status.loading"));
        return;
    }
    if let Some(err) = &snap.error {
        eprintln!(
            "{}",
            err.localized(messages, snap.ui, &cfg.service.api_key_env)
        );
        return;
    }
    let Some(t) = &snap.outcome else { return };
    if t.main_translation.is_empty() {
        return;
    }
    print_translation(messages, snap.ui, snap.source, t);
}
