use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::language::Language;

pub const CONFIG_FILENAME: &str = "werger.toml";
pub const CONFIG_ENV: &str = "WERGER_CONFIG";
pub const DEFAULT_API_KEY_ENV: &str = "WERGER_API_KEY";

pub const DEFAULT_DEBOUNCE_MS: u64 = 750;
pub const DEFAULT_COPIED_RESET_MS: u64 = 2000;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServiceConfig {
    /// Chat-completions endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Inline API key. Prefer `api_key_env` so the key stays out of the file.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable consulted when `api_key` is absent.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UiConfig {
    /// UI locale for labels, banners and the cultural note.
    #[serde(default = "default_ui_language")]
    pub language: Language,

    /// Quiet period before a keystroke burst becomes a request.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// How long the transient "copied" indicator stays on.
    #[serde(default = "default_copied_reset_ms")]
    pub copied_reset_ms: u64,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ui_language() -> Language {
    Language::En
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_copied_reset_ms() -> u64 {
    DEFAULT_COPIED_RESET_MS
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            language: default_ui_language(),
            debounce_ms: default_debounce_ms(),
            copied_reset_ms: default_copied_reset_ms(),
        }
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: AppConfig = toml::from_str(&text).context("parse config toml")?;
    Ok(cfg)
}

/// Search for `werger.toml` upwards from the working directory, then from the
/// executable directory. `WERGER_CONFIG` overrides the search entirely.
pub fn find_default_config() -> Option<PathBuf> {
    if let Ok(p) = std::env::var(CONFIG_ENV) {
        let p = PathBuf::from(p);
        if p.is_file() {
            return Some(p);
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(p) = find_file_upwards(&cwd, CONFIG_FILENAME, 8) {
            return Some(p);
        }
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            if let Some(p) = find_file_upwards(dir, CONFIG_FILENAME, 8) {
                return Some(p);
            }
        }
    }
    None
}

fn find_file_upwards(start: &Path, filename: &str, max_depth: usize) -> Option<PathBuf> {
    let mut dir = Some(start.to_path_buf());
    for _ in 0..max_depth {
        let d = dir?;
        let cand = d.join(filename);
        if cand.is_file() {
            return Some(cand);
        }
        dir = d.parent().map(|p| p.to_path_buf());
    }
    None
}

pub fn init_default_config(dir: &Path, force: bool) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create config dir: {}", dir.display()))?;
    let cfg_path = dir.join(CONFIG_FILENAME);
    if cfg_path.exists() && !force {
        return Ok(cfg_path);
    }
    std::fs::write(&cfg_path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("write config: {}", cfg_path.display()))?;
    Ok(cfg_path)
}

pub const DEFAULT_CONFIG_TOML: &str = r#"[service]
# Chat-completions endpoint and model.
endpoint = "https://api.openai.com/v1/chat/completions"
model = "gpt-4o-mini"
# Prefer the environment variable; uncomment to inline the key instead.
# api_key = "sk-..."
api_key_env = "WERGER_API_KEY"
timeout_secs = 30

[ui]
# Interface language: en, tr or ku.
language = "en"
# Quiet period (ms) before typed text is sent for translation.
debounce_ms = 750
# How long (ms) the "copied" indicator stays visible.
copied_reset_ms = 2000
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.ui.debounce_ms, DEFAULT_DEBOUNCE_MS);
        assert_eq!(cfg.ui.copied_reset_ms, DEFAULT_COPIED_RESET_MS);
        assert_eq!(cfg.ui.language, Language::En);
        assert_eq!(cfg.service.api_key_env, DEFAULT_API_KEY_ENV);
        assert!(cfg.service.api_key.is_none());
    }

    #[test]
    fn partial_sections_override_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [service]
            model = "test-model"

            [ui]
            language = "ku"
            debounce_ms = 200
            "#,
        )
        .unwrap();
        assert_eq!(cfg.service.model, "test-model");
        assert_eq!(cfg.service.timeout_secs, 30);
        assert_eq!(cfg.ui.language, Language::Ku);
        assert_eq!(cfg.ui.debounce_ms, 200);
    }

    #[test]
    fn shipped_default_config_parses() {
        let cfg: AppConfig = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(cfg.ui.debounce_ms, DEFAULT_DEBOUNCE_MS);
        assert_eq!(cfg.service.model, "gpt-4o-mini");
    }
}
