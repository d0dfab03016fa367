use serde::{Deserialize, Serialize};

use crate::domain::SessionId;

pub const CHAT_PATH: &str = "chat";

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_id: SessionId,
    pub message: String,
}

impl ChatRequest {
    pub fn new(user_id: SessionId, message: impl Into<String>) -> Self {
        Self {
            user_id,
            message: message.into(),
        }
    }
}
