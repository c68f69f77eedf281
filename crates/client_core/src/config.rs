use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

pub const SETTINGS_FILE: &str = "analyzer.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Where uploads are posted.
    pub endpoint_url: String,
    /// Sent with every upload, never modified after load.
    pub csrf_token: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint_url: "http://127.0.0.1:8000/upload/".into(),
            csrf_token: String::new(),
        }
    }
}

impl Settings {
    pub fn endpoint(&self) -> anyhow::Result<Url> {
        Url::parse(self.endpoint_url.trim())
            .with_context(|| format!("invalid endpoint url '{}'", self.endpoint_url))
    }
}

/// Defaults, then `analyzer.toml` in the working directory, then environment.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    if let Ok(raw) = fs::read_to_string(Path::new(SETTINGS_FILE)) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        tracing::warn!("config: ignoring unreadable {SETTINGS_FILE}");
        return;
    };
    if let Some(v) = file_cfg.get("endpoint_url") {
        settings.endpoint_url = v.clone();
    }
    if let Some(v) = file_cfg.get("csrf_token") {
        settings.csrf_token = v.clone();
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("ANALYZER_ENDPOINT_URL") {
        settings.endpoint_url = v;
    }
    if let Some(v) = lookup("APP__ENDPOINT_URL") {
        settings.endpoint_url = v;
    }

    if let Some(v) = lookup("ANALYZER_CSRF_TOKEN") {
        settings.csrf_token = v;
    }
    if let Some(v) = lookup("APP__CSRF_TOKEN") {
        settings.csrf_token = v;
    }
}
