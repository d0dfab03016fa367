//! Classification of chat endpoint bodies into transcript lines.
//!
//! Everything here is pure: front ends call [`render_outcome`] once per
//! completed exchange and materialize the resulting [`LogLine`]s themselves.

use serde_json::{Map, Number, Value};
use shared::error::ChatError;
use tracing::{error, warn};

pub const APOLOGY_TEXT: &str = "Sorry, something went wrong. Try again!";
pub const UNEXPECTED_FORMAT_TEXT: &str = "Unexpected response format.";
pub const MISSING_TITLE_TEXT: &str = "No title available";
pub const AVAILABILITY_LINK_LABEL: &str = "Check Availability";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotReply {
    RecommendationList {
        titles: Vec<String>,
        check_availability: Option<String>,
    },
    TextReply(String),
    UnexpectedShape,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    Text(String),
    Link {
        label: String,
        href: String,
        /// Target opens in a new browsing context.
        new_tab: bool,
    },
}

impl LogLine {
    pub fn display_text(&self) -> &str {
        match self {
            LogLine::Text(text) => text,
            LogLine::Link { label, .. } => label,
        }
    }
}

impl BotReply {
    pub fn lines(&self) -> Vec<LogLine> {
        match self {
            BotReply::RecommendationList {
                titles,
                check_availability,
            } => {
                let mut lines: Vec<LogLine> =
                    titles.iter().cloned().map(LogLine::Text).collect();
                if let Some(href) = check_availability {
                    lines.push(LogLine::Link {
                        label: AVAILABILITY_LINK_LABEL.to_string(),
                        href: href.clone(),
                        new_tab: true,
                    });
                }
                lines
            }
            BotReply::TextReply(text) => vec![LogLine::Text(text.clone())],
            BotReply::UnexpectedShape => vec![LogLine::Text(UNEXPECTED_FORMAT_TEXT.to_string())],
            BotReply::Error => vec![LogLine::Text(APOLOGY_TEXT.to_string())],
        }
    }

    /// Display text of every line joined by newlines, links shown by label.
    pub fn plain_text(&self) -> String {
        self.lines()
            .iter()
            .map(LogLine::display_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn render_outcome(outcome: &Result<Value, ChatError>) -> BotReply {
    match outcome {
        Ok(payload) => render_response(payload),
        Err(err) => {
            error!("chat exchange failed: {err}");
            BotReply::Error
        }
    }
}

pub fn render_response(payload: &Value) -> BotReply {
    let Some(object) = payload.as_object() else {
        error!(body = %payload, "invalid response from server");
        return BotReply::Error;
    };

    if let Some(Value::Array(entries)) = object.get("recommendations") {
        return BotReply::RecommendationList {
            titles: entries.iter().map(recommendation_title).collect(),
            check_availability: non_empty_str(object, "check_availability"),
        };
    }

    if let Some(text) = non_empty_str(object, "response") {
        return BotReply::TextReply(text);
    }

    warn!(body = %payload, "unexpected response structure");
    BotReply::UnexpectedShape
}

fn recommendation_title(entry: &Value) -> String {
    match entry {
        Value::String(title) if !title.is_empty() => title.clone(),
        Value::Object(movie) => non_empty_str(movie, "title")
            .unwrap_or_else(|| MISSING_TITLE_TEXT.to_string()),
        Value::Number(n) if n.as_f64().is_some_and(|v| v != 0.0) => number_text(n),
        Value::Bool(true) => "true".to_string(),
        _ => MISSING_TITLE_TEXT.to_string(),
    }
}

/// Integral values print without a fractional part, so `1.0` shows as `1`.
fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e21 => format!("{v:.0}"),
        Some(v) => v.to_string(),
        None => n.to_string(),
    }
}

fn non_empty_str(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
