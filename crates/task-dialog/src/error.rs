use thiserror::Error;

pub type Result<T, E = DialogError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DialogError {
    /// The recognizer cannot serve requests; the conversation is aborted.
    #[error("intent recognizer is not configured")]
    RecognizerNotConfigured,
    /// The conversation ended while a turn was waiting on an external call.
    #[error("turn cancelled")]
    Cancelled,
    #[error("invalid dialog configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid session id: {0}")]
    InvalidSessionId(String),
}
