//! Events marshaled from the backend worker onto the UI thread.

use serde_json::Value;
use shared::{domain::RequestSeq, error::ChatError};

pub enum UiEvent {
    Info(String),
    BackendFailed(String),
    ReplyReceived {
        seq: RequestSeq,
        outcome: Result<Value, ChatError>,
    },
}
