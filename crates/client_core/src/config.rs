use std::{fs, io, path::Path};

use anyhow::{anyhow, Context};
use serde::Deserialize;

use crate::widget::ReplyOrdering;

pub const DEFAULT_CONFIG_FILE: &str = "chat_widget.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_url: String,
    pub reply_ordering: ReplyOrdering,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            reply_ordering: ReplyOrdering::Arrival,
            log_filter: "info".into(),
        }
    }
}

/// Defaults, then `chat_widget.toml` (or `CHAT_WIDGET_CONFIG`), then env.
pub fn load_settings() -> anyhow::Result<Settings> {
    let path = std::env::var("CHAT_WIDGET_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
    let settings = load_file_settings(Path::new(&path))?;
    apply_env_overrides(settings, |key| std::env::var(key).ok())
}

fn load_file_settings(path: &Path) -> anyhow::Result<Settings> {
    match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<Settings>(&raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(err) => Err(err)
            .with_context(|| format!("failed to read config file '{}'", path.display())),
    }
}

fn apply_env_overrides(
    mut settings: Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    if let Some(v) = lookup("CHAT_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    for key in ["CHAT_REPLY_ORDERING", "APP__REPLY_ORDERING"] {
        if let Some(v) = lookup(key) {
            settings.reply_ordering = v
                .parse::<ReplyOrdering>()
                .map_err(|err: String| anyhow!("{key}: {err}"))?;
        }
    }

    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
