//! Line-oriented rendering of the chat widget.

use client_core::{LogEntry, LogLine};
use shared::domain::LogRole;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalInput {
    Open,
    Close,
    Quit,
    /// Typed text followed by Enter.
    Line(String),
}

pub fn parse_input(line: &str) -> TerminalInput {
    match line.trim() {
        "/open" => TerminalInput::Open,
        "/close" => TerminalInput::Close,
        "/quit" | "/exit" => TerminalInput::Quit,
        _ => TerminalInput::Line(line.to_string()),
    }
}

pub fn format_entry(entry: &LogEntry) -> Vec<String> {
    let prefix = match entry.role() {
        LogRole::User => "you>",
        LogRole::Bot => "bot>",
    };
    entry
        .lines()
        .into_iter()
        .map(|line| match line {
            LogLine::Text(text) => format!("{prefix} {text}"),
            LogLine::Link { label, href, .. } => format!("{prefix} {label}: {href}"),
        })
        .collect()
}

/// Prints entries appended since the last call and advances `printed`.
pub fn print_new_entries(entries: &[LogEntry], printed: &mut usize) {
    for entry in entries.iter().skip(*printed) {
        for line in format_entry(entry) {
            println!("{line}");
        }
    }
    *printed = entries.len();
}

#[cfg(test)]
mod tests {
    use client_core::BotReply;

    use super::*;

    #[test]
    fn slash_commands_map_to_affordances() {
        assert_eq!(parse_input("/open"), TerminalInput::Open);
        assert_eq!(parse_input(" /close "), TerminalInput::Close);
        assert_eq!(parse_input("/quit"), TerminalInput::Quit);
        assert_eq!(
            parse_input("  a heist movie "),
            TerminalInput::Line("  a heist movie ".into())
        );
    }

    #[test]
    fn recommendation_entry_prints_each_title_then_link() {
        let entry = LogEntry::Bot(BotReply::RecommendationList {
            titles: vec!["Heat".into(), "Ronin".into()],
            check_availability: Some("https://www.justwatch.com".into()),
        });
        assert_eq!(
            format_entry(&entry),
            vec![
                "bot> Heat".to_string(),
                "bot> Ronin".to_string(),
                "bot> Check Availability: https://www.justwatch.com".to_string(),
            ]
        );
    }

    #[test]
    fn user_entry_uses_user_prefix() {
        assert_eq!(
            format_entry(&LogEntry::User("genre".into())),
            vec!["you> genre".to_string()]
        );
    }
}
