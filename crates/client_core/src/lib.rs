use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use shared::{
    error::ChatError,
    protocol::{ChatRequest, CHAT_PATH},
};
use tracing::{debug, error, info};
use url::Url;

pub mod config;
pub mod render;
pub mod session;
pub mod widget;

pub use config::{load_settings, Settings};
pub use render::{render_outcome, render_response, BotReply, LogLine};
pub use session::generate_session_id;
pub use widget::{ChatWidgetController, InputKey, LogEntry, OutboundMessage, ReplyOrdering};

/// One request/response exchange with the chat endpoint.
///
/// Implementations return the decoded JSON body whatever its shape; shape
/// classification is left to [`render_response`].
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_chat(&self, request: &ChatRequest) -> Result<Value, ChatError>;
}

#[async_trait]
impl<T> ChatTransport for Arc<T>
where
    T: ChatTransport + ?Sized,
{
    async fn send_chat(&self, request: &ChatRequest) -> Result<Value, ChatError> {
        (**self).send_chat(request).await
    }
}

#[derive(Debug, Clone)]
pub struct HttpChatClient {
    http: Client,
    endpoint: Url,
}

impl HttpChatClient {
    pub fn new(server_url: &str) -> Result<Self, ChatError> {
        Ok(Self {
            http: Client::new(),
            endpoint: chat_endpoint(server_url)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpChatClient {
    async fn send_chat(&self, request: &ChatRequest) -> Result<Value, ChatError> {
        info!(
            user_id = %request.user_id,
            message = %request.message,
            endpoint = %self.endpoint,
            "sending chat message"
        );
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|err| {
                error!("chat request failed: {err}");
                ChatError::transport(err)
            })?;

        // Status is informational only; error bodies are parsed like any other.
        debug!(status = %response.status(), "chat response status");
        let body = response.bytes().await.map_err(|err| {
            error!("failed to read chat response body: {err}");
            ChatError::transport(err)
        })?;

        let value: Value = serde_json::from_slice(&body).map_err(|err| {
            error!("chat response body is not valid JSON: {err}");
            ChatError::decode(err)
        })?;
        debug!(body = %value, "chat response body");
        Ok(value)
    }
}

/// Resolves `{server_url}/chat`, keeping any base path on the server URL.
pub fn chat_endpoint(server_url: &str) -> Result<Url, ChatError> {
    let trimmed = server_url.trim();
    let mut base = Url::parse(trimmed)
        .map_err(|err| ChatError::InvalidEndpoint(format!("{trimmed}: {err}")))?;
    if base.cannot_be_a_base() {
        return Err(ChatError::InvalidEndpoint(format!(
            "{trimmed}: not a hierarchical URL"
        )));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(CHAT_PATH)
        .map_err(|err| ChatError::InvalidEndpoint(format!("{trimmed}: {err}")))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
