use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("chat request failed: {0}")]
    Transport(String),
    #[error("chat response is not valid JSON: {0}")]
    Decode(String),
    #[error("invalid chat endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ChatError {
    pub fn transport(err: impl ToString) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl ToString) -> Self {
        Self::Decode(err.to_string())
    }
}
