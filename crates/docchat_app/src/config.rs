//! Configuration file handling.
//!
//! Settings load from `./docchat.ron` (or the path in `DOCCHAT_CONFIG`).
//! A missing file means defaults; an unreadable or unparsable file falls
//! back to defaults with a note. `DOCCHAT_BASE_URL` overrides the backend
//! address after the file is read.

use std::path::{Path, PathBuf};
use std::time::Duration;

use docchat_core::{Provider, SessionSettings};
use docchat_engine::{BackendSettings, SpeechSettings};
use serde::Deserialize;

use crate::logging::LogDestination;

const CONFIG_FILENAME: &str = "./docchat.ron";
const CONFIG_PATH_VAR: &str = "DOCCHAT_CONFIG";
const BASE_URL_VAR: &str = "DOCCHAT_BASE_URL";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub chat: ChatConfig,
    pub upload: UploadConfig,
    pub speech: SpeechConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        let settings = BackendSettings::default();
        Self {
            base_url: settings.base_url,
            connect_timeout_secs: settings.connect_timeout.as_secs(),
            request_timeout_secs: settings.request_timeout.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Provider name as the backend expects it ("gemini" or "groq").
    pub provider: String,
    pub top_k: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default().wire_name().to_string(),
            top_k: SessionSettings::default().top_k,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub stage_delay_ms: u64,
    pub grace_delay_ms: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        let settings = SessionSettings::default();
        Self {
            stage_delay_ms: settings.upload_stage_delay.as_millis() as u64,
            grace_delay_ms: settings.upload_grace_delay.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub recognizer_program: Option<String>,
    pub recognizer_args: Vec<String>,
    pub synthesizer_program: Option<String>,
    pub synthesizer_args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub destination: LogDestination,
}

impl AppConfig {
    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            base_url: self.backend.base_url.clone(),
            connect_timeout: Duration::from_secs(self.backend.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.backend.request_timeout_secs),
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            upload_stage_delay: Duration::from_millis(self.upload.stage_delay_ms),
            upload_grace_delay: Duration::from_millis(self.upload.grace_delay_ms),
            top_k: self.chat.top_k,
        }
    }

    pub fn speech_settings(&self) -> SpeechSettings {
        SpeechSettings {
            recognizer_program: self.speech.recognizer_program.clone(),
            recognizer_args: self.speech.recognizer_args.clone(),
            synthesizer_program: self.speech.synthesizer_program.clone(),
            synthesizer_args: self.speech.synthesizer_args.clone(),
        }
    }

    pub fn provider(&self) -> Provider {
        Provider::from_name(&self.chat.provider).unwrap_or_default()
    }
}

/// Loads the configuration, returning notes to log once logging is up.
pub fn load() -> (AppConfig, Vec<String>) {
    let path = match std::env::var(CONFIG_PATH_VAR) {
        Ok(custom) => PathBuf::from(custom),
        Err(_) => PathBuf::from(CONFIG_FILENAME),
    };
    let (mut config, mut notes) = load_from(&path);
    if let Ok(base_url) = std::env::var(BASE_URL_VAR) {
        apply_base_url_override(&mut config, &base_url);
    }
    validate(&mut config, &mut notes);
    (config, notes)
}

fn load_from(path: &Path) -> (AppConfig, Vec<String>) {
    let content = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return (AppConfig::default(), Vec::new());
        }
        Err(err) => {
            let note = format!("Failed to read config from {path:?}: {err}; using defaults");
            return (AppConfig::default(), vec![note]);
        }
    };

    match ron::from_str(&content) {
        Ok(config) => (config, Vec::new()),
        Err(err) => {
            let note = format!("Failed to parse config from {path:?}: {err}; using defaults");
            (AppConfig::default(), vec![note])
        }
    }
}

fn apply_base_url_override(config: &mut AppConfig, base_url: &str) {
    config.backend.base_url = base_url.to_string();
}

fn validate(config: &mut AppConfig, notes: &mut Vec<String>) {
    if Provider::from_name(&config.chat.provider).is_none() {
        notes.push(format!(
            "Unknown chat provider {:?}; using {}",
            config.chat.provider,
            Provider::default().wire_name()
        ));
        config.chat.provider = Provider::default().wire_name().to_string();
    }
    if config.chat.top_k == 0 {
        let fallback = SessionSettings::default().top_k;
        notes.push(format!("chat.top_k must be at least 1; using {fallback}"));
        config.chat.top_k = fallback;
    }
}
