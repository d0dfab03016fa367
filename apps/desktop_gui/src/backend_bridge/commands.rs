//! Backend commands queued from UI to backend worker.

use client_core::OutboundMessage;

pub enum BackendCommand {
    SendChat(OutboundMessage),
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::SendChat(_) => "send_chat",
        }
    }
}
