//! UI-agnostic chat widget state: modal visibility, input draft, transcript,
//! and the bookkeeping for replies still in flight.
//!
//! The controller performs no I/O. Front ends forward affordance events to it,
//! send every [`OutboundMessage`] it hands out, and pass each completed
//! exchange back through [`ChatWidgetController::deliver_reply`] on the same
//! thread that renders the transcript.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{
    domain::{LogRole, RequestSeq, SessionId},
    error::ChatError,
    protocol::ChatRequest,
};
use tracing::{debug, warn};

use crate::{
    render::{render_outcome, BotReply, LogLine},
    session::generate_session_id,
};

/// How replies to overlapping submissions are appended to the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyOrdering {
    /// Append each reply as soon as it arrives.
    #[default]
    Arrival,
    /// Hold replies until every earlier submission has been rendered.
    Submission,
}

impl FromStr for ReplyOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arrival" => Ok(Self::Arrival),
            "submission" => Ok(Self::Submission),
            other => Err(format!(
                "unknown reply ordering '{other}' (expected 'arrival' or 'submission')"
            )),
        }
    }
}

impl fmt::Display for ReplyOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arrival => f.write_str("arrival"),
            Self::Submission => f.write_str("submission"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    Enter,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    User(String),
    Bot(BotReply),
}

impl LogEntry {
    pub fn role(&self) -> LogRole {
        match self {
            LogEntry::User(_) => LogRole::User,
            LogEntry::Bot(_) => LogRole::Bot,
        }
    }

    pub fn lines(&self) -> Vec<LogLine> {
        match self {
            LogEntry::User(text) => vec![LogLine::Text(text.clone())],
            LogEntry::Bot(reply) => reply.lines(),
        }
    }

    pub fn plain_text(&self) -> String {
        match self {
            LogEntry::User(text) => text.clone(),
            LogEntry::Bot(reply) => reply.plain_text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub seq: RequestSeq,
    pub request: ChatRequest,
}

pub struct ChatWidgetController {
    session_id: SessionId,
    ordering: ReplyOrdering,
    modal_open: bool,
    draft: String,
    entries: Vec<LogEntry>,
    next_seq: RequestSeq,
    awaiting: BTreeSet<RequestSeq>,
    held: BTreeMap<RequestSeq, BotReply>,
    scroll_to_bottom: bool,
}

impl ChatWidgetController {
    pub fn new(ordering: ReplyOrdering) -> Self {
        Self::with_session_id(generate_session_id(), ordering)
    }

    pub fn with_session_id(session_id: SessionId, ordering: ReplyOrdering) -> Self {
        debug!(%session_id, %ordering, "chat widget initialized");
        Self {
            session_id,
            ordering,
            modal_open: false,
            draft: String::new(),
            entries: Vec::new(),
            next_seq: RequestSeq(0),
            awaiting: BTreeSet::new(),
            held: BTreeMap::new(),
            scroll_to_bottom: false,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn ordering(&self) -> ReplyOrdering {
        self.ordering
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    pub fn open_modal(&mut self) {
        self.modal_open = true;
    }

    pub fn close_modal(&mut self) {
        self.modal_open = false;
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Input field binding.
    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Submissions whose reply has not been rendered yet.
    pub fn in_flight(&self) -> usize {
        self.awaiting.len()
    }

    /// Returns `true` once per transcript change that should pin the log to
    /// its bottom.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_bottom)
    }

    /// Key press on the input field; submits the current draft on Enter.
    pub fn on_key_press(&mut self, key: InputKey) -> Option<OutboundMessage> {
        let text = self.draft.clone();
        self.submit_message(key, &text)
    }

    pub fn submit_message(&mut self, key: InputKey, text: &str) -> Option<OutboundMessage> {
        let message = text.trim();
        if key != InputKey::Enter || message.is_empty() || !self.modal_open {
            return None;
        }

        self.entries.push(LogEntry::User(message.to_string()));
        self.draft.clear();
        self.scroll_to_bottom = true;

        let seq = self.next_seq;
        self.next_seq = seq.next();
        self.awaiting.insert(seq);

        Some(OutboundMessage {
            seq,
            request: ChatRequest::new(self.session_id.clone(), message),
        })
    }

    /// Records the completed exchange for `seq` and returns how many bot
    /// entries were appended as a result.
    pub fn deliver_reply(&mut self, seq: RequestSeq, outcome: Result<Value, ChatError>) -> usize {
        if !self.awaiting.contains(&seq) || self.held.contains_key(&seq) {
            warn!(seq = seq.0, "ignoring reply for unknown or completed request");
            return 0;
        }

        let reply = render_outcome(&outcome);
        let appended = match self.ordering {
            ReplyOrdering::Arrival => {
                self.awaiting.remove(&seq);
                self.entries.push(LogEntry::Bot(reply));
                1
            }
            ReplyOrdering::Submission => {
                self.held.insert(seq, reply);
                self.release_held()
            }
        };

        if appended > 0 {
            self.scroll_to_bottom = true;
        }
        appended
    }

    fn release_held(&mut self) -> usize {
        let mut appended = 0;
        while let Some(&oldest) = self.awaiting.first() {
            let Some(reply) = self.held.remove(&oldest) else {
                break;
            };
            self.awaiting.remove(&oldest);
            self.entries.push(LogEntry::Bot(reply));
            appended += 1;
        }
        appended
    }
}

impl Default for ChatWidgetController {
    fn default() -> Self {
        Self::new(ReplyOrdering::default())
    }
}

#[cfg(test)]
#[path = "tests/widget_tests.rs"]
mod tests;
