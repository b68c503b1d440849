use robot_gateway::Interrupted;
use thiserror::Error;

pub type Result<T, E = RecognizerError> = core::result::Result<T, E>;

/// A recognizer payload that does not match the expected schema.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecognitionDecodeError {
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("unexpected result kind: {0}")]
    UnexpectedKind(String),
    #[error("unknown intent: {0}")]
    UnknownIntent(String),
    #[error("intent {0} scored more than once")]
    DuplicateIntent(String),
    #[error("intent {intent} has invalid score {score}")]
    InvalidScore { intent: String, score: f64 },
}

impl From<serde_json::Error> for RecognitionDecodeError {
    fn from(e: serde_json::Error) -> Self {
        RecognitionDecodeError::Malformed(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("recognizer is not configured")]
    NotConfigured,
    #[error("invalid recognizer settings: {0}")]
    InvalidSettings(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("recognizer returned status {0}")]
    Status(u16),
    #[error(transparent)]
    Decode(#[from] RecognitionDecodeError),
    #[error("call interrupted: {0}")]
    Interrupted(#[from] Interrupted),
}

impl RecognizerError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RecognizerError::Interrupted(Interrupted::Cancelled))
    }
}
